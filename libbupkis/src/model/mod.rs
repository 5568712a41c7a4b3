//! Shared data model.
//!
//! Wire types for the catalog and tag-list endpoints, and the normalized
//! [`ImageRecord`] produced by enumeration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Response from the catalog endpoint listing repositories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogResponse {
    /// List of repository names.
    #[serde(default)]
    pub repositories: Vec<String>,
}

/// Response from the tags endpoint listing tags for a repository.
///
/// Registries answer `"tags": null` for a repository whose tags were all
/// deleted; that decodes as an empty list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagList {
    /// Repository name.
    pub name: String,
    /// List of tags.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Metadata for one tagged image on one registry.
///
/// Identity is `(hostname, repository, tag)`; the client does not enforce
/// uniqueness, so inconsistent upstream data may yield duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Registry hostname the record was fetched from
    pub hostname: String,
    /// Repository name (e.g. `library/nginx`)
    pub repository: String,
    /// Tag name
    pub tag: String,
    /// Creation time from the first manifest history entry
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Creates a new record.
    pub fn new(
        hostname: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            repository: repository.into(),
            tag: tag.into(),
            created_at,
        }
    }

    /// Returns `hostname/repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::ImageRecord;
    /// use chrono::Utc;
    ///
    /// let record = ImageRecord::new("registry.example.com", "ns/app", "v1", Utc::now());
    /// assert_eq!(record.display_name(), "registry.example.com/ns/app");
    /// ```
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.hostname, self.repository)
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.hostname, self.repository, self.tag)
    }
}
