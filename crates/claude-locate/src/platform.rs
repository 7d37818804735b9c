//! Platform helpers.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Returns the current user's home directory.
///
/// # Errors
///
/// Returns [`Error::HomeNotFound`] when the platform cannot report one.
pub fn home_dir() -> Result<PathBuf> {
    home::home_dir()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(Error::HomeNotFound)
}

/// Returns the per-user configuration root (`$XDG_CONFIG_HOME` or `~/.config`).
pub fn config_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(dir);
        if path.is_absolute() {
            return Ok(path);
        }
    }
    Ok(home_dir()?.join(".config"))
}
