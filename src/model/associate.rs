//! Fan records produced by the per-film crawl

use serde::{Deserialize, Deserializer, Serialize};

/// One fan of a film
///
/// Identity is the `(identifier, entity_slug)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Associate {
    #[serde(alias = "username", deserialize_with = "trimmed_identifier")]
    pub identifier: String,

    #[serde(rename = "entitySlug", alias = "filmSlug")]
    pub entity_slug: String,
}

impl Associate {
    pub fn new(identifier: impl Into<String>, entity_slug: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            entity_slug: entity_slug.into(),
        }
    }

    /// Builds a fan from a profile link such as `/some-user/`
    ///
    /// Returns None when the link has no path left after trimming slashes.
    pub fn from_profile_href(href: &str, entity_slug: &str) -> Option<Self> {
        let identifier = href.trim().trim_matches('/');
        if identifier.is_empty() {
            return None;
        }
        Some(Self::new(identifier, entity_slug))
    }
}

/// Older checkpoints kept the profile path with its trailing slash
fn trimmed_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().trim_matches('/').to_string())
}
