//! Adjustment State Module
//!
//! Handles persistence of per-channel fee adjustment times, including:
//! - State file location (~/.charge-lnd/flow_state.json by default)
//! - Fail-open load and best-effort save
//! - Adjustment frequency policy

pub mod clock;
mod error;
pub mod location;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StateError, StateResult};
pub use location::{resolve_state_path, HomeStateDir, StateLocation};
pub use store::{load_document, save_document, TimestampStore};
