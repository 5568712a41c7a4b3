//! Schema1 image manifests.
//!
//! Schema1 manifests carry image metadata in `history[].v1Compatibility`,
//! a field whose value is a JSON document encoded as a JSON *string*.
//! Reading the creation time therefore takes two decoding steps: the
//! manifest envelope first, then the string held by its first history entry.
//!
//! Schema2, OCI manifests and manifest lists are not understood here; they
//! have no `history` array and are rejected as protocol errors.

use crate::error::{BupkisError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;


/// `Accept` header value asking the registry for a schema1 manifest.
pub const SCHEMA1_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v1+prettyjws, \
                                  application/vnd.docker.distribution.manifest.v1+json";

/// Outer schema1 manifest envelope.
///
/// Only the fields needed for metadata listing are decoded; layers and
/// signatures are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Schema1Manifest {
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// One entry of the schema1 `history` array.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// JSON document encoded as a string
    #[serde(rename = "v1Compatibility")]
    pub v1_compatibility: String,
}

/// Decoded contents of a `v1Compatibility` string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct V1Compatibility {
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub docker_version: Option<String>,
}

impl Schema1Manifest {
    /// Decodes the outer manifest envelope.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::manifest::Schema1Manifest;
    ///
    /// let body = br#"{"schemaVersion":1,"history":[{"v1Compatibility":"{\"created\":\"2020-01-01T00:00:00Z\"}"}]}"#;
    /// let manifest = Schema1Manifest::from_bytes(body).unwrap();
    /// assert_eq!(manifest.history.len(), 1);
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| BupkisError::protocol_with_source("Failed to decode manifest", e))
    }

    /// Returns the first (most recent) history entry.
    ///
    /// # Errors
    ///
    /// Returns a `Protocol` error if the manifest has no history entries,
    /// which is also what schema2 and OCI manifests look like to this decoder.
    pub fn first_history(&self) -> Result<&HistoryEntry> {
        self.history.first().ok_or_else(|| {
            BupkisError::protocol(
                "Manifest has no history entries (only schema1 manifests are supported)",
            )
        })
    }

    /// Returns the `created` timestamp of the first history entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::manifest::Schema1Manifest;
    ///
    /// let body = br#"{"history":[{"v1Compatibility":"{\"created\":\"2020-01-01T00:00:00Z\"}"}]}"#;
    /// let created = Schema1Manifest::from_bytes(body).unwrap().creation_time().unwrap();
    /// assert_eq!(created.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    /// ```
    pub fn creation_time(&self) -> Result<DateTime<Utc>> {
        Ok(self.first_history()?.decode()?.created)
    }
}

impl HistoryEntry {
    /// Decodes the embedded `v1Compatibility` JSON string.
    pub fn decode(&self) -> Result<V1Compatibility> {
        serde_json::from_str(&self.v1_compatibility).map_err(|e| {
            BupkisError::protocol_with_source("Failed to decode v1Compatibility history entry", e)
        })
    }
}
