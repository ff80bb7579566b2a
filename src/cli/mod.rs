pub mod forget;
pub mod get;
pub mod list;
pub mod path;
pub mod set;
pub mod should_adjust;

use crate::state::TimestampStore;
use crate::Result;
use anyhow::Context;
use std::path::PathBuf;

/// Open the state file named by `--state-file`, or the per-user default
pub fn open_store(state_file: Option<PathBuf>) -> Result<TimestampStore> {
    TimestampStore::open(state_file).context("Failed to resolve state file location")
}
