//! The journal container type.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entry::JournalEntry;

/// Current schema version of the persisted container.
///
/// Stored blobs with a different (or missing) version are migrated on load.
pub const SCHEMA_VERSION: &str = "2.0";

/// The persisted journal container.
///
/// This is the single unit of persistence: it is always read in full,
/// mutated in memory, and written back in full. The serialized shape is also
/// the export document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalData {
    /// Entries, newest-first by creation time.
    pub entries: Vec<JournalEntry>,
    /// Schema version string.
    pub version: String,
    /// Timestamp of the last successful sync reconciliation.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync_at: Option<OffsetDateTime>,
    /// Store-wide encryption setting.
    #[serde(default)]
    pub encryption_enabled: bool,
}

impl Default for JournalData {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            version: SCHEMA_VERSION.to_string(),
            last_sync_at: None,
            encryption_enabled: false,
        }
    }
}

impl JournalData {
    /// Whether an entry with the given ID exists in the container.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}
