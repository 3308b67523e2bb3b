//! Journal entry types.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::status::SyncStatus;

/// A single journal entry as stored on device and sent over the wire.
///
/// Serialized field names are camelCase to match the REST contract and the
/// export document format.
///
/// Invariants maintained by the store:
///
/// - `id` is unique within a container and immutable once assigned.
/// - `is_local_only == true` implies `sync_status == SyncStatus::Local`.
/// - `word_count` is derived from `content` unless explicitly supplied.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Locally generated identifier (millisecond timestamp + random suffix).
    pub id: String,
    /// The entry text.
    pub content: String,
    /// Application-defined emotional rating.
    #[serde(default)]
    pub emotion_score: i32,
    /// Count of whitespace-delimited tokens in `content`.
    #[serde(default)]
    pub word_count: u32,
    /// Creation time, immutable.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Refreshed on every mutation.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Privacy preference: once true, the entry is never queued for sync.
    #[serde(default)]
    pub is_local_only: bool,
    /// Current position in the sync state machine.
    pub sync_status: SyncStatus,
    /// Whether `content` is encrypted at rest in the store.
    #[serde(default)]
    pub encrypted_locally: bool,
    /// Optional set of tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
}

impl JournalEntry {
    /// Whether this entry takes part in sync sweeps.
    ///
    /// Local-only entries never do, regardless of recorded status.
    #[must_use]
    pub fn is_sync_eligible(&self) -> bool {
        !self.is_local_only
    }
}

/// Input for creating a new entry.
///
/// Only `content` is required; everything else has a default. Fields left
/// unset are filled in by the store (`word_count` is computed from the
/// content, timestamps default to now).
///
/// # Example
///
/// ```
/// use luma_types::NewEntry;
///
/// let draft = NewEntry::new("Slept well, long walk at noon.")
///     .emotion_score(7)
///     .local_only(true);
/// assert!(draft.is_local_only);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    /// The entry text.
    pub content: String,
    /// Application-defined emotional rating.
    pub emotion_score: i32,
    /// Explicit word count; computed from `content` when `None`.
    pub word_count: Option<u32>,
    /// Privacy preference.
    pub is_local_only: bool,
    /// Whether the content is stored encrypted.
    pub encrypted_locally: bool,
    /// Optional set of tags.
    pub tags: Option<BTreeSet<String>>,
    /// Explicit creation time (backdated imports); now when `None`.
    pub created_at: Option<OffsetDateTime>,
}

impl NewEntry {
    /// Create a new draft with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the emotion score.
    #[must_use]
    pub fn emotion_score(mut self, score: i32) -> Self {
        self.emotion_score = score;
        self
    }

    /// Supply an explicit word count instead of deriving it.
    #[must_use]
    pub fn word_count(mut self, count: u32) -> Self {
        self.word_count = Some(count);
        self
    }

    /// Mark the entry local-only (never synced).
    #[must_use]
    pub fn local_only(mut self, local_only: bool) -> Self {
        self.is_local_only = local_only;
        self
    }

    /// Mark the content as encrypted at rest.
    #[must_use]
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted_locally = encrypted;
        self
    }

    /// Set the tag set.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Backdate the creation time.
    #[must_use]
    pub fn created_at(mut self, at: OffsetDateTime) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Partial update for an existing entry.
///
/// Every field is optional; absent fields leave the entry untouched. When
/// `content` changes without an explicit `word_count`, the store recomputes
/// the count from the new content.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    /// Replace the entry text.
    pub content: Option<String>,
    /// Replace the emotion score.
    pub emotion_score: Option<i32>,
    /// Explicit word count override.
    pub word_count: Option<u32>,
    /// Change the privacy preference.
    pub is_local_only: Option<bool>,
    /// Change the encryption flag.
    pub encrypted_locally: Option<bool>,
    /// Replace the tag set.
    pub tags: Option<BTreeSet<String>>,
}

impl EntryPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry text.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replace the emotion score.
    #[must_use]
    pub fn emotion_score(mut self, score: i32) -> Self {
        self.emotion_score = Some(score);
        self
    }

    /// Override the derived word count.
    #[must_use]
    pub fn word_count(mut self, count: u32) -> Self {
        self.word_count = Some(count);
        self
    }

    /// Change the privacy preference.
    #[must_use]
    pub fn local_only(mut self, local_only: bool) -> Self {
        self.is_local_only = Some(local_only);
        self
    }

    /// Change the encryption flag.
    #[must_use]
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted_locally = Some(encrypted);
        self
    }

    /// Replace the tag set.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Count the non-empty whitespace-delimited tokens in `content`.
///
/// # Examples
///
/// ```
/// use luma_types::word_count;
///
/// assert_eq!(word_count("Today was calm."), 3);
/// assert_eq!(word_count("  spaced \t out \n words "), 3);
/// assert_eq!(word_count(""), 0);
/// ```
#[must_use]
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Generate a locally unique entry ID.
///
/// Millisecond unix timestamp plus an 8-hex-digit random suffix, the same
/// shape the original client produced. The store additionally guards against
/// the (unlikely) collision within a single container.
#[must_use]
pub fn generate_entry_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: u32 = rand::rng().random();
    format!("{millis}-{suffix:08x}")
}
