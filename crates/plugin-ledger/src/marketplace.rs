//! `plugins/known_marketplaces.json`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::Result;
use crate::read::load_or_default;

/// Where a marketplace was cloned from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarketplaceSource {
    /// Source kind, e.g. `github`, `git`, `directory`.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl MarketplaceSource {
    /// Display form of the backing repository.
    ///
    /// Prefers the explicit `repo` (`owner/name`), then shortens GitHub URLs
    /// to `owner/name`, then falls back to the raw URL or local path.
    #[must_use]
    pub fn repository(&self) -> Option<String> {
        if let Some(repo) = self.repo.as_deref().filter(|r| !r.is_empty()) {
            return Some(repo.to_string());
        }
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(github_slug(url).unwrap_or_else(|| url.to_string()));
        }
        self.path.clone().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketplaceRecord {
    pub source: MarketplaceSource,
}

/// Marketplace name → record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownMarketplaces(BTreeMap<String, MarketplaceRecord>);

impl KnownMarketplaces {
    /// Marketplace name → repository display string.
    #[must_use]
    pub fn repos(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(name, record)| Some((name.clone(), record.source.repository()?)))
            .collect()
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

/// Parses the marketplace registry, skipping records that do not decode.
pub fn parse_known_marketplaces(content: &str) -> Result<KnownMarketplaces> {
    let raw: BTreeMap<String, Value> = serde_json::from_str(content)?;
    let mut known = BTreeMap::new();
    for (name, value) in raw {
        match serde_json::from_value::<MarketplaceRecord>(value) {
            Ok(record) => {
                known.insert(name, record);
            }
            Err(err) => warn!(marketplace = %name, "skipping malformed marketplace: {err}"),
        }
    }
    Ok(KnownMarketplaces(known))
}

#[must_use]
pub fn load_known_marketplaces(path: &Path) -> KnownMarketplaces {
    load_or_default(path, "known marketplaces", parse_known_marketplaces)
}

/// `https://github.com/owner/repo(.git)` or `git@github.com:owner/repo.git`
/// → `owner/repo`.
fn github_slug(raw: &str) -> Option<String> {
    let path = if let Some(rest) = raw.strip_prefix("git@github.com:") {
        rest.to_string()
    } else {
        let url = Url::parse(raw).ok()?;
        let host = url.host_str()?;
        if host != "github.com" && host != "www.github.com" {
            return None;
        }
        url.path().to_string()
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?.trim_end_matches(".git");
    if repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}
