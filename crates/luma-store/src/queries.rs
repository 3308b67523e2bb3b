//! Query builder for journal entries.
//!
//! # Example
//!
//! ```
//! use luma_store::EntryQuery;
//! use luma_types::SyncStatus;
//!
//! // Second page of sync-eligible pending entries
//! let query = EntryQuery::new()
//!     .local_only(false)
//!     .status(SyncStatus::Pending)
//!     .limit(20)
//!     .offset(20);
//! ```

use luma_types::{JournalEntry, SyncStatus};

/// Fluent query builder for [`Store::entries`](crate::Store::entries).
///
/// All filters are optional and can be chained in any order. Results are
/// ordered by `created_at` descending (newest first) unless
/// [`oldest_first`](EntryQuery::oldest_first) is set; pagination is plain
/// offset/limit slicing of the sorted result.
#[derive(Debug, Clone)]
pub struct EntryQuery {
    /// Filter by the local-only flag.
    pub local_only: Option<bool>,
    /// Filter by sync status.
    pub status: Option<SyncStatus>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by created_at descending (newest first).
    pub newest_first: bool,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryQuery {
    /// Create a new query with default settings (no filters, newest first).
    pub fn new() -> Self {
        Self {
            local_only: None,
            status: None,
            limit: None,
            offset: None,
            newest_first: true,
        }
    }

    /// Filter by the local-only flag.
    #[must_use]
    pub fn local_only(mut self, local_only: bool) -> Self {
        self.local_only = Some(local_only);
        self
    }

    /// Filter by sync status.
    #[must_use]
    pub fn status(mut self, status: SyncStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Maximum number of results.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip this many results (applied after sorting).
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results oldest first (chronological).
    #[must_use]
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Whether an entry passes this query's filters.
    pub(crate) fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(local_only) = self.local_only
            && entry.is_local_only != local_only
        {
            return false;
        }
        if let Some(status) = self.status
            && entry.sync_status != status
        {
            return false;
        }
        true
    }
}
