//! State file location resolution
//!
//! Default location: ~/.charge-lnd/flow_state.json

use super::error::{StateError, StateResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-user state directory, relative to the home directory
pub const DEFAULT_STATE_DIR: &str = ".charge-lnd";

/// State file name inside the state directory
pub const DEFAULT_STATE_FILE: &str = "flow_state.json";

/// Something that can name a readable/writable state file
pub trait StateLocation {
    fn resolve(&self) -> StateResult<PathBuf>;
}

impl StateLocation for Path {
    fn resolve(&self) -> StateResult<PathBuf> {
        Ok(self.to_path_buf())
    }
}

impl StateLocation for PathBuf {
    fn resolve(&self) -> StateResult<PathBuf> {
        Ok(self.clone())
    }
}

/// Per-user state directory, created on first use
#[derive(Debug, Clone, Default)]
pub struct HomeStateDir {
    base: Option<PathBuf>,
}

impl HomeStateDir {
    /// Use the current user's home directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `base` in place of the home directory
    pub fn under(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl StateLocation for HomeStateDir {
    fn resolve(&self) -> StateResult<PathBuf> {
        let home = match &self.base {
            Some(base) => base.clone(),
            None => dirs::home_dir().ok_or(StateError::NoHomeDir)?,
        };

        let state_dir = home.join(DEFAULT_STATE_DIR);

        if !state_dir.exists() {
            fs::create_dir_all(&state_dir).map_err(|source| StateError::CreateDir {
                path: state_dir.clone(),
                source,
            })?;
        }

        Ok(state_dir.join(DEFAULT_STATE_FILE))
    }
}

/// Explicit path if given, otherwise the per-user default
pub fn resolve_state_path(explicit: Option<PathBuf>) -> StateResult<PathBuf> {
    match explicit {
        Some(path) => path.resolve(),
        None => HomeStateDir::new().resolve(),
    }
}
