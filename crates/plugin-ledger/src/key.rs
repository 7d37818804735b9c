use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Identifies an installed plugin: `<plugin>@<marketplace>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    pub plugin: String,
    pub marketplace: String,
}

impl PluginKey {
    #[must_use]
    pub fn new(plugin: impl Into<String>, marketplace: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            marketplace: marketplace.into(),
        }
    }
}

impl FromStr for PluginKey {
    type Err = Error;

    /// Splits at the last `@` so scoped package names like `@org/tool@market`
    /// keep their leading `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((plugin, marketplace)) if !plugin.is_empty() && !marketplace.is_empty() => {
                Ok(Self::new(plugin, marketplace))
            }
            _ => Err(Error::InvalidPluginKey(s.to_string())),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.plugin, self.marketplace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plugin_and_marketplace() {
        let key: PluginKey = "review@official".parse().unwrap();
        assert_eq!(key, PluginKey::new("review", "official"));
        assert_eq!(key.to_string(), "review@official");
    }

    #[test]
    fn splits_at_last_at_sign() {
        let key: PluginKey = "@org/tool@market".parse().unwrap();
        assert_eq!(key.plugin, "@org/tool");
        assert_eq!(key.marketplace, "market");
    }

    #[test]
    fn rejects_missing_parts() {
        assert!("nomarket".parse::<PluginKey>().is_err());
        assert!("plugin@".parse::<PluginKey>().is_err());
        assert!("@market".parse::<PluginKey>().is_err());
    }
}
