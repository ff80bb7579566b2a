//! `flowstate path` - show where state is kept

use crate::state::resolve_state_path;
use crate::Result;
use anyhow::Context;
use std::path::PathBuf;

pub fn run(state_file: Option<PathBuf>) -> Result<()> {
    let path = resolve_state_path(state_file).context("Failed to resolve state file location")?;
    println!("{}", path.display());
    Ok(())
}
