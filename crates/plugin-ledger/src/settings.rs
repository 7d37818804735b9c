//! `settings.json` / `settings.local.json` enablement maps.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::read::{load_or_default, null_as_default};
use crate::{PluginKey, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, deserialize_with = "null_as_default")]
    enabled_plugins: BTreeMap<String, Value>,
}

/// `pluginKey → enabled` as declared by one settings file.
///
/// Keys are kept verbatim; lookups use the `<plugin>@<marketplace>` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnablementMap(BTreeMap<String, bool>);

impl EnablementMap {
    /// Explicit setting for the plugin, if the file mentions it.
    #[must_use]
    pub fn get(&self, key: &PluginKey) -> Option<bool> {
        self.0.get(&key.to_string()).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for EnablementMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses the `enabledPlugins` section of a settings file.
///
/// Non-boolean values are ignored; the rest of the document is not inspected.
pub fn parse_settings(content: &str) -> Result<EnablementMap> {
    let file: SettingsFile = serde_json::from_str(content)?;
    Ok(file
        .enabled_plugins
        .into_iter()
        .filter_map(|(key, value)| value.as_bool().map(|enabled| (key, enabled)))
        .collect())
}

/// Loads a settings file; absent or malformed files give an empty map.
#[must_use]
pub fn load_enablement(path: &Path) -> EnablementMap {
    load_or_default(path, "settings", parse_settings)
}
