//! Display rows for image listings.

use libbupkis::ImageRecord;
use libbupkis::format::{format_rfc3339, format_timestamp, is_unset_timestamp};
use serde::Serialize;
use tabled::Tabled;

/// One line of `get` / `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ImageRow {
    /// `hostname/repository`
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "TAG")]
    pub tag: String,

    /// Relative age, e.g. "2 months ago"
    #[tabled(rename = "CREATED")]
    pub created: String,

    /// Absolute creation time (structured output only)
    #[tabled(skip)]
    pub created_at: String,
}

impl ImageRow {
    /// Builds a row, or `None` when the record carries no creation time.
    pub fn from_record(record: &ImageRecord) -> Option<Self> {
        if is_unset_timestamp(&record.created_at) {
            return None;
        }

        Some(Self {
            name: record.display_name(),
            tag: record.tag.clone(),
            created: format_timestamp(&record.created_at),
            created_at: format_rfc3339(&record.created_at),
        })
    }
}

/// Converts records to rows in order, dropping those without a creation time.
pub fn images_to_rows(records: &[ImageRecord]) -> Vec<ImageRow> {
    records.iter().filter_map(ImageRow::from_record).collect()
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
