use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Reads a file, mapping "not found" to `None`.
///
/// # Errors
///
/// Returns [`Error::Io`] for any failure other than a missing file.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads and parses an optional file, degrading to `T::default()`.
///
/// Absence is logged at debug level, unreadable or malformed content at warn.
pub(crate) fn load_or_default<T, F>(path: &Path, what: &str, parse: F) -> T
where
    T: Default + Debug,
    F: FnOnce(&str) -> Result<T>,
{
    let content = match read_optional(path) {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!(path = %path.display(), "no {what} file");
            return T::default();
        }
        Err(err) => {
            warn!("{err}");
            return T::default();
        }
    };

    match parse(&content) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), "ignoring malformed {what}: {err}");
            T::default()
        }
    }
}

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_optional_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn read_optional_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_optional(dir.path()), Err(Error::Io { .. })));
    }

    #[test]
    fn load_or_default_swallows_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        let value: Vec<u8> = load_or_default(&path, "test", |s| {
            serde_json::from_str(s).map_err(Error::from)
        });
        assert!(value.is_empty());
    }
}
