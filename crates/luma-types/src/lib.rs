//! Shared data model for the Luma local journal store.
//!
//! This crate provides the types shared by the local persistence layer
//! (luma-store) and the sync reconciler (luma-sync).
//!
//! # Features
//!
//! - Journal entry and container types with their JSON wire shape
//! - Sync status state machine
//! - Word count derivation
//! - Local ID generation
//!
//! # Example
//!
//! ```
//! use luma_types::{NewEntry, SyncStatus, word_count};
//!
//! let draft = NewEntry::new("Today was calm.").emotion_score(6);
//! assert_eq!(word_count(&draft.content), 3);
//! assert_eq!("pending".parse::<SyncStatus>(), Ok(SyncStatus::Pending));
//! ```

pub mod data;
pub mod entry;
pub mod error;
pub mod status;

pub use data::{JournalData, SCHEMA_VERSION};
pub use entry::{EntryPatch, JournalEntry, NewEntry, generate_entry_id, word_count};
pub use error::{ParseError, ParseResult};
pub use status::SyncStatus;
