//! Durable local persistence for Luma journal entries.
//!
//! This crate owns the on-device journal container: a versioned JSON
//! document holding every entry, persisted whole to a single file. It is the
//! single source of truth for reads; the sync reconciler (luma-sync) only
//! observes it through the operations exposed here.
//!
//! # Features
//!
//! - Load-or-init with schema migration and a pre-migration backup
//! - CRUD with whole-container replace-on-save (atomic temp file + rename)
//! - Filtered, paginated queries
//! - Sync-status aggregation for status displays
//! - Whole-store export/import
//! - Store events for the reconciler (entry became pending)
//!
//! # Example
//!
//! ```
//! use luma_store::{EntryQuery, Store};
//! use luma_types::{NewEntry, SyncStatus};
//!
//! let mut store = Store::open_in_memory();
//! let entry = store.add_entry(NewEntry::new("Today was calm.").emotion_score(6))?;
//! assert_eq!(entry.sync_status, SyncStatus::Pending);
//!
//! let pending = store.entries(&EntryQuery::new().status(SyncStatus::Pending));
//! assert_eq!(pending.len(), 1);
//! # Ok::<(), luma_store::Error>(())
//! ```

mod error;
mod events;
mod migrate;
mod queries;
mod stats;
mod store;

pub use error::{Error, Result};
pub use events::{EventReceiver, EventSender, StoreEvent, default_event_channel, event_channel};
pub use queries::EntryQuery;
pub use stats::SyncStats;
pub use store::{Store, backup_path};

/// Default container path following platform conventions.
///
/// - Linux: `~/.local/share/luma/journal.json`
/// - macOS: `~/Library/Application Support/luma/journal.json`
/// - Windows: `C:\Users\<user>\AppData\Local\luma\journal.json`
pub fn default_store_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("luma")
        .join("journal.json")
}
