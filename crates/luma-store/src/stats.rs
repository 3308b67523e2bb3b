//! Read-side sync status aggregation.

use serde::{Deserialize, Serialize};

use luma_types::{JournalEntry, SyncStatus};

/// Counts of entries per sync status bucket.
///
/// Pure aggregation over the current container: no side effects, no caching,
/// safe to compute at any frequency. The result is only as fresh as the last
/// store read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Total number of entries.
    pub total: usize,
    /// Entries pinned to the device by the local-only policy.
    pub local: usize,
    /// Entries acknowledged by the server.
    pub synced: usize,
    /// Entries waiting for the next sweep.
    pub pending: usize,
    /// Entries whose last sweep failed.
    pub failed: usize,
}

impl SyncStats {
    /// Aggregate stats in a single pass over the given entries.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Self {
        let mut stats = SyncStats::default();
        for entry in entries {
            stats.total += 1;
            match entry.sync_status {
                SyncStatus::Local => stats.local += 1,
                SyncStatus::Synced => stats.synced += 1,
                SyncStatus::Pending => stats.pending += 1,
                SyncStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}
