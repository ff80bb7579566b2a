// Flowstate - per-channel fee adjustment bookkeeping
// Remembers when each channel's fees were last adjusted and decides when the next adjustment is due

pub mod cli;
pub mod models;
pub mod state;
pub mod utils;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use models::{ChannelId, ChannelRecord, StateDocument};
pub use state::{Clock, ManualClock, StateError, SystemClock, TimestampStore};
