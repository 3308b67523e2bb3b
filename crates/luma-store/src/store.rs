//! Main store implementation.

use std::fmt;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use luma_types::{
    EntryPatch, JournalData, JournalEntry, NewEntry, SCHEMA_VERSION, SyncStatus, generate_entry_id,
    word_count,
};

use crate::error::{Error, Result};
use crate::events::{EventSender, StoreEvent};
use crate::queries::EntryQuery;
use crate::stats::SyncStats;
use crate::migrate;

/// The local journal store.
///
/// Owns the container in memory and a backing file. Every read is served
/// from memory; every mutation rewrites the whole file (replace-on-save to a
/// single path, atomic via temp file + rename). There is no partial or
/// field-level write, which trivially avoids torn containers at an O(n)
/// serialization cost per mutation.
pub struct Store {
    path: Option<PathBuf>,
    data: JournalData,
    events: Option<EventSender>,
}

// Journal text stays out of debug output; only shape and location.
impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("version", &self.data.version)
            .field("entries", &self.data.entries.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open or create a container at the given path.
    ///
    /// A missing or unparseable file yields a fresh empty container (read
    /// paths fail closed rather than erroring). A legacy or older-versioned
    /// blob is migrated in place, with the raw pre-migration blob preserved
    /// next to the container (see [`backup_path`]).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = Self::load_or_init(&path)?;
        Ok(Self {
            path: Some(path),
            data,
            events: None,
        })
    }

    /// Open the default container location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_store_path())
    }

    /// Open an in-memory store with no file backing (for testing).
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            data: JournalData::default(),
            events: None,
        }
    }

    /// Attach an event sender; mutations that leave an entry pending will
    /// emit [`StoreEvent::EntryPending`] on it.
    pub fn set_event_sender(&mut self, sender: EventSender) {
        self.events = Some(sender);
    }

    /// The current container.
    pub fn data(&self) -> &JournalData {
        &self.data
    }

    /// The backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_or_init(path: &Path) -> Result<JournalData> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No journal container at {}, starting fresh", path.display());
                return Ok(JournalData::default());
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Journal container at {} is corrupt ({e}), starting fresh",
                    path.display()
                );
                return Ok(JournalData::default());
            }
        };

        if migrate::needs_migration(&value) {
            // Preserve the pre-migration blob before touching anything.
            let backup = backup_path(path);
            write_atomic(&backup, &raw)?;
            let data = migrate::migrate(&value);
            save(path, &data)?;
            info!(
                "Migrated journal container at {} to version {SCHEMA_VERSION} ({} entries, backup at {})",
                path.display(),
                data.entries.len(),
                backup.display()
            );
            return Ok(data);
        }

        match serde_json::from_value(value) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(
                    "Journal container at {} does not match schema ({e}), starting fresh",
                    path.display()
                );
                Ok(JournalData::default())
            }
        }
    }

    fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => save(path, &self.data),
            None => Ok(()),
        }
    }

    fn emit(&self, event: StoreEvent) {
        if let Some(sender) = &self.events {
            // Best effort: no receiver means no reconciler is listening yet.
            let _ = sender.send(event);
        }
    }

    fn fresh_id(&self) -> String {
        let mut id = generate_entry_id();
        while self.data.contains_id(&id) {
            id = generate_entry_id();
        }
        id
    }
}

// CRUD operations
impl Store {
    /// Add a new entry at the head of the container.
    ///
    /// Assigns the ID and timestamps, computes the word count when not
    /// explicitly supplied, and sets the sync status to `local` for
    /// local-only entries and `pending` otherwise. Persists before
    /// returning; a pending entry is announced on the event channel.
    pub fn add_entry(&mut self, new: NewEntry) -> Result<JournalEntry> {
        let now = OffsetDateTime::now_utc();
        let created_at = new.created_at.unwrap_or(now);
        let entry = JournalEntry {
            id: self.fresh_id(),
            word_count: new.word_count.unwrap_or_else(|| word_count(&new.content)),
            content: new.content,
            emotion_score: new.emotion_score,
            created_at,
            // Backdated entries still satisfy updated_at >= created_at.
            updated_at: now.max(created_at),
            is_local_only: new.is_local_only,
            sync_status: if new.is_local_only {
                SyncStatus::Local
            } else {
                SyncStatus::Pending
            },
            encrypted_locally: new.encrypted_locally,
            tags: new.tags,
        };

        self.data.entries.insert(0, entry.clone());
        self.persist()?;

        debug!(
            "Added entry {} ({} words, {})",
            entry.id, entry.word_count, entry.sync_status
        );
        if entry.sync_status == SyncStatus::Pending {
            self.emit(StoreEvent::EntryPending {
                id: entry.id.clone(),
            });
        }

        Ok(entry)
    }

    /// Apply a partial update to an entry.
    ///
    /// Returns `Ok(None)` when the ID is absent; this is a normal outcome
    /// callers check, not an error, and the store is left untouched. Any
    /// edit to a sync-eligible entry resets it to `pending`, including
    /// previously synced or failed ones.
    pub fn update_entry(&mut self, id: &str, patch: EntryPatch) -> Result<Option<JournalEntry>> {
        let Some(entry) = self.data.entries.iter_mut().find(|e| e.id == id) else {
            debug!("Update of unknown entry {id} ignored");
            return Ok(None);
        };

        if let Some(content) = patch.content {
            entry.word_count = patch.word_count.unwrap_or_else(|| word_count(&content));
            entry.content = content;
        } else if let Some(count) = patch.word_count {
            entry.word_count = count;
        }
        if let Some(score) = patch.emotion_score {
            entry.emotion_score = score;
        }
        if let Some(local_only) = patch.is_local_only {
            entry.is_local_only = local_only;
        }
        if let Some(encrypted) = patch.encrypted_locally {
            entry.encrypted_locally = encrypted;
        }
        if let Some(tags) = patch.tags {
            entry.tags = Some(tags);
        }

        entry.updated_at = OffsetDateTime::now_utc().max(entry.created_at);
        entry.sync_status = if entry.is_local_only {
            SyncStatus::Local
        } else {
            SyncStatus::Pending
        };

        let updated = entry.clone();
        self.persist()?;

        debug!("Updated entry {} ({})", updated.id, updated.sync_status);
        if updated.sync_status == SyncStatus::Pending {
            self.emit(StoreEvent::EntryPending {
                id: updated.id.clone(),
            });
        }

        Ok(Some(updated))
    }

    /// Delete an entry by ID.
    ///
    /// Returns whether an entry was actually removed; persists only then.
    pub fn delete_entry(&mut self, id: &str) -> Result<bool> {
        let before = self.data.entries.len();
        self.data.entries.retain(|e| e.id != id);
        if self.data.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        debug!("Deleted entry {id}");
        Ok(true)
    }

    /// Query entries with filters, sorted by creation time, with optional
    /// offset/limit slicing.
    pub fn entries(&self, query: &EntryQuery) -> Vec<JournalEntry> {
        let mut matched: Vec<JournalEntry> = self
            .data
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();

        if query.newest_first {
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        } else {
            matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let mut matched: Vec<JournalEntry> = matched.into_iter().skip(offset).collect();
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }
        matched
    }

    /// Aggregate sync status counts over the whole container.
    pub fn sync_stats(&self) -> SyncStats {
        SyncStats::from_entries(&self.data.entries)
    }

    /// Wipe the container and re-initialize to the empty default.
    pub fn clear_all(&mut self) -> Result<()> {
        let dropped = self.data.entries.len();
        self.data = JournalData::default();
        self.persist()?;
        info!("Cleared journal container ({dropped} entries dropped)");
        Ok(())
    }
}

// Export/import operations
impl Store {
    /// Pretty-printed JSON snapshot of the full container.
    ///
    /// No filtering, no redaction: callers needing a privacy-safe export
    /// must pre-filter.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    /// Replace the container wholesale from an exported document.
    ///
    /// Validation happens on a parsed copy before anything is touched:
    /// `entries` must be an array of objects each carrying a string `id`,
    /// `content` and `createdAt`, the container must carry a string
    /// `version`, and sync statuses must be known. `Ok(false)` rejects the
    /// document without partial application. Import never merges; warn the
    /// user before calling this on a non-empty store.
    pub fn import_json(&mut self, json: &str) -> Result<bool> {
        let parsed: JournalData = match serde_json::from_str(json) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Rejected import document: {e}");
                return Ok(false);
            }
        };

        let count = parsed.entries.len();
        self.data = parsed;
        self.persist()?;
        info!("Imported journal container ({count} entries)");
        Ok(true)
    }
}

// Sweep bookkeeping for the reconciler
impl Store {
    /// Collect the batch for the next sync sweep.
    ///
    /// Failed entries re-enter `pending` here; a retried sweep does not
    /// distinguish them from entries that were never attempted. Returns a
    /// snapshot of every sync-eligible pending entry, oldest first so the
    /// server sees them in creation order.
    pub fn take_sweep_batch(&mut self) -> Result<Vec<JournalEntry>> {
        let mut retried = 0;
        for entry in &mut self.data.entries {
            if entry.is_sync_eligible() && entry.sync_status == SyncStatus::Failed {
                entry.sync_status = SyncStatus::Pending;
                retried += 1;
            }
        }
        if retried > 0 {
            self.persist()?;
            debug!("Re-queued {retried} failed entries for sweep");
        }

        let mut batch: Vec<JournalEntry> = self
            .data
            .entries
            .iter()
            .filter(|e| e.is_sync_eligible() && e.sync_status.is_sweepable())
            .cloned()
            .collect();
        batch.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(batch)
    }

    /// Apply a successful sweep response.
    ///
    /// Marks uploaded entries `synced`, merges server-originated entries the
    /// store has never seen (idempotent on ID; an existing local entry is
    /// never overwritten by a server copy), and advances the sync
    /// checkpoint. Returns `(uploaded, merged)` counts.
    pub fn apply_sweep_success(
        &mut self,
        uploaded_ids: &[String],
        server_entries: &[JournalEntry],
        sync_timestamp: OffsetDateTime,
    ) -> Result<(usize, usize)> {
        let mut uploaded = 0;
        for entry in &mut self.data.entries {
            if entry.is_sync_eligible() && uploaded_ids.iter().any(|id| *id == entry.id) {
                entry.sync_status = SyncStatus::Synced;
                uploaded += 1;
            }
        }

        let mut merged = 0;
        for server_entry in server_entries {
            if self.data.contains_id(&server_entry.id) {
                continue;
            }
            let mut entry = server_entry.clone();
            entry.sync_status = SyncStatus::Synced;
            self.data.entries.push(entry);
            merged += 1;
        }
        if merged > 0 {
            self.data
                .entries
                .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        self.data.last_sync_at = Some(sync_timestamp);
        self.persist()?;

        info!("Sweep applied: {uploaded} uploaded, {merged} merged from server");
        Ok((uploaded, merged))
    }

    /// Mark every entry of a failed sweep batch as `failed`.
    ///
    /// The sync contract cannot disambiguate partial acceptance, so a failed
    /// batch is fully failed.
    pub fn mark_sweep_failed(&mut self, ids: &[String]) -> Result<usize> {
        let mut failed = 0;
        for entry in &mut self.data.entries {
            if entry.is_sync_eligible()
                && entry.sync_status == SyncStatus::Pending
                && ids.iter().any(|id| *id == entry.id)
            {
                entry.sync_status = SyncStatus::Failed;
                failed += 1;
            }
        }
        if failed > 0 {
            self.persist()?;
            warn!("Sweep failed: {failed} entries marked failed");
        }
        Ok(failed)
    }
}

/// Sibling path preserving the raw pre-migration blob.
///
/// `journal.json` becomes `journal-backup.json`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "journal".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}-backup.{}", ext.to_string_lossy()),
        None => format!("{stem}-backup"),
    };
    path.with_file_name(name)
}

fn save(path: &Path, data: &JournalData) -> Result<()> {
    let serialized = serde_json::to_string(data)?;
    write_atomic(path, &serialized)
}

/// Replace-on-save via a temp file in the same directory plus rename, so a
/// crash mid-write can never leave a torn container behind.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            parent
        }
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::io::Write::write_all(&mut file, contents.as_bytes()).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.persist(path).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn pending_entry(store: &mut Store, content: &str) -> JournalEntry {
        store.add_entry(NewEntry::new(content)).unwrap()
    }

    #[test]
    fn test_open_in_memory_is_empty() {
        let store = Store::open_in_memory();
        assert!(store.data().entries.is_empty());
        assert_eq!(store.sync_stats(), SyncStats::default());
    }

    #[test]
    fn test_add_entry_defaults() {
        let mut store = Store::open_in_memory();
        let entry = store
            .add_entry(NewEntry::new("Today was calm.").emotion_score(6))
            .unwrap();

        assert!(!entry.id.is_empty());
        assert_eq!(entry.word_count, 3);
        assert_eq!(entry.sync_status, SyncStatus::Pending);
        assert!(entry.updated_at >= entry.created_at);
    }

    #[test]
    fn test_add_local_only_entry_stays_local() {
        let mut store = Store::open_in_memory();
        let entry = store
            .add_entry(NewEntry::new("private thought").local_only(true))
            .unwrap();
        assert_eq!(entry.sync_status, SyncStatus::Local);
    }

    #[test]
    fn test_explicit_word_count_wins() {
        let mut store = Store::open_in_memory();
        let entry = store
            .add_entry(NewEntry::new("one two three").word_count(42))
            .unwrap();
        assert_eq!(entry.word_count, 42);
    }

    #[test]
    fn test_add_entry_ids_are_unique() {
        let mut store = Store::open_in_memory();
        let mut ids = std::collections::HashSet::new();
        for i in 0..200 {
            let entry = pending_entry(&mut store, &format!("entry {i}"));
            assert!(ids.insert(entry.id));
        }
    }

    #[test]
    fn test_new_entries_go_to_head() {
        let mut store = Store::open_in_memory();
        pending_entry(&mut store, "first");
        pending_entry(&mut store, "second");
        assert_eq!(store.data().entries[0].content, "second");
    }

    #[test]
    fn test_update_unknown_id_returns_none() {
        let mut store = Store::open_in_memory();
        pending_entry(&mut store, "only");
        let before = store.data().clone();

        let result = store
            .update_entry("nonexistent-id", EntryPatch::new().content("x"))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.data(), &before);
    }

    #[test]
    fn test_update_recomputes_word_count() {
        let mut store = Store::open_in_memory();
        let entry = pending_entry(&mut store, "a b c");

        let updated = store
            .update_entry(&entry.id, EntryPatch::new().content("now four words here"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.word_count, 4);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn test_update_resets_synced_to_pending() {
        let mut store = Store::open_in_memory();
        let entry = pending_entry(&mut store, "was synced");
        store
            .apply_sweep_success(
                &[entry.id.clone()],
                &[],
                datetime!(2024-01-01 00:00:00 UTC),
            )
            .unwrap();

        let updated = store
            .update_entry(&entry.id, EntryPatch::new().emotion_score(2))
            .unwrap()
            .unwrap();
        assert_eq!(updated.sync_status, SyncStatus::Pending);
    }

    #[test]
    fn test_update_local_only_entry_stays_local() {
        let mut store = Store::open_in_memory();
        let entry = store
            .add_entry(NewEntry::new("private").local_only(true))
            .unwrap();

        let updated = store
            .update_entry(&entry.id, EntryPatch::new().content("still private"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.sync_status, SyncStatus::Local);

        // Flipping the flag off queues the entry for sync.
        let updated = store
            .update_entry(&entry.id, EntryPatch::new().local_only(false))
            .unwrap()
            .unwrap();
        assert_eq!(updated.sync_status, SyncStatus::Pending);
    }

    #[test]
    fn test_delete_entry() {
        let mut store = Store::open_in_memory();
        let entry = pending_entry(&mut store, "doomed");

        assert!(store.delete_entry(&entry.id).unwrap());
        assert!(!store.delete_entry(&entry.id).unwrap());
        assert!(store.data().entries.is_empty());
    }

    #[test]
    fn test_entries_query_filters_and_paginates() {
        let mut store = Store::open_in_memory();
        for i in 0..5i64 {
            store
                .add_entry(
                    NewEntry::new(format!("entry {i}"))
                        .created_at(datetime!(2024-01-01 00:00:00 UTC) + time::Duration::days(i)),
                )
                .unwrap();
        }
        store
            .add_entry(
                NewEntry::new("private")
                    .local_only(true)
                    .created_at(datetime!(2024-02-01 00:00:00 UTC)),
            )
            .unwrap();

        let all = store.entries(&EntryQuery::new());
        assert_eq!(all.len(), 6);
        // Newest first.
        assert_eq!(all[0].content, "private");

        let pending_only = store.entries(&EntryQuery::new().status(SyncStatus::Pending));
        assert_eq!(pending_only.len(), 5);

        let page = store
            .entries(&EntryQuery::new().local_only(false).offset(2).limit(2));
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].content, "entry 2");
        assert_eq!(page[1].content, "entry 1");

        let chronological = store.entries(&EntryQuery::new().local_only(false).oldest_first());
        assert_eq!(chronological[0].content, "entry 0");
    }

    #[test]
    fn test_sync_stats_buckets() {
        let mut store = Store::open_in_memory();
        store
            .add_entry(NewEntry::new("private").local_only(true))
            .unwrap();
        let a = pending_entry(&mut store, "a");
        let b = pending_entry(&mut store, "b");
        store
            .apply_sweep_success(&[a.id.clone()], &[], datetime!(2024-01-01 00:00:00 UTC))
            .unwrap();
        store.mark_sweep_failed(&[b.id.clone()]).unwrap();

        let stats = store.sync_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.local, 1);
        assert_eq!(stats.synced, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_clear_all() {
        let mut store = Store::open_in_memory();
        pending_entry(&mut store, "gone soon");
        store.clear_all().unwrap();
        assert_eq!(store.data(), &JournalData::default());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut store = Store::open_in_memory();
        pending_entry(&mut store, "first entry");
        store
            .add_entry(NewEntry::new("private").local_only(true).encrypted(true))
            .unwrap();

        let exported = store.export_json().unwrap();
        let before = store.data().clone();

        let mut other = Store::open_in_memory();
        assert!(other.import_json(&exported).unwrap());
        assert_eq!(other.data(), &before);
    }

    #[test]
    fn test_import_rejects_invalid_shape() {
        let mut store = Store::open_in_memory();
        let entry = pending_entry(&mut store, "keep me");
        let before = store.data().clone();

        // entries must be an array
        assert!(
            !store
                .import_json(r#"{"entries": "not-an-array", "version": "2.0"}"#)
                .unwrap()
        );
        // entries must carry id/content/createdAt
        assert!(
            !store
                .import_json(r#"{"entries": [{"content": "x"}], "version": "2.0"}"#)
                .unwrap()
        );
        // version must be a string
        assert!(
            !store
                .import_json(r#"{"entries": [], "version": 2}"#)
                .unwrap()
        );
        // unknown sync status strings are rejected
        let bad_status = format!(
            r#"{{"entries": [{{"id": "{id}", "content": "x",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z",
                "syncStatus": "uploading"}}], "version": "2.0"}}"#,
            id = entry.id
        );
        assert!(!store.import_json(&bad_status).unwrap());

        assert_eq!(store.data(), &before);
    }

    #[test]
    fn test_import_replaces_wholesale() {
        let mut store = Store::open_in_memory();
        pending_entry(&mut store, "old content");

        let replacement = r#"{
            "entries": [{
                "id": "imported-1",
                "content": "imported entry",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z",
                "syncStatus": "synced"
            }],
            "version": "2.0",
            "encryptionEnabled": false
        }"#;

        assert!(store.import_json(replacement).unwrap());
        assert_eq!(store.data().entries.len(), 1);
        assert_eq!(store.data().entries[0].id, "imported-1");
    }

    #[test]
    fn test_take_sweep_batch_requeues_failed() {
        let mut store = Store::open_in_memory();
        let a = pending_entry(&mut store, "a");
        let b = pending_entry(&mut store, "b");
        store
            .add_entry(NewEntry::new("private").local_only(true))
            .unwrap();
        store
            .mark_sweep_failed(&[a.id.clone(), b.id.clone()])
            .unwrap();

        let batch = store.take_sweep_batch().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| e.sync_status == SyncStatus::Pending));
        assert!(batch.iter().all(|e| !e.is_local_only));
        assert_eq!(store.sync_stats().failed, 0);
    }

    #[test]
    fn test_apply_sweep_success_merges_idempotently() {
        let mut store = Store::open_in_memory();
        let local = pending_entry(&mut store, "mine");

        let server_entry = JournalEntry {
            id: "server-1".to_string(),
            content: "from another device".to_string(),
            emotion_score: 5,
            word_count: 3,
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00:00 UTC),
            is_local_only: false,
            sync_status: SyncStatus::Synced,
            encrypted_locally: false,
            tags: None,
        };
        // A stale server copy of a local entry must never win.
        let stale_copy = JournalEntry {
            id: local.id.clone(),
            content: "stale".to_string(),
            ..server_entry.clone()
        };

        let (uploaded, merged) = store
            .apply_sweep_success(
                &[local.id.clone()],
                &[server_entry.clone(), stale_copy],
                datetime!(2024-06-01 00:00:00 UTC),
            )
            .unwrap();
        assert_eq!(uploaded, 1);
        assert_eq!(merged, 1);

        let ours = store
            .data()
            .entries
            .iter()
            .find(|e| e.id == local.id)
            .unwrap();
        assert_eq!(ours.content, "mine");
        assert_eq!(ours.sync_status, SyncStatus::Synced);
        assert!(store.data().contains_id("server-1"));
        assert_eq!(
            store.data().last_sync_at,
            Some(datetime!(2024-06-01 00:00:00 UTC))
        );
    }

    #[test]
    fn test_mark_sweep_failed_only_touches_pending() {
        let mut store = Store::open_in_memory();
        let a = pending_entry(&mut store, "a");
        let b = pending_entry(&mut store, "b");
        store
            .apply_sweep_success(&[b.id.clone()], &[], datetime!(2024-01-01 00:00:00 UTC))
            .unwrap();

        let failed = store
            .mark_sweep_failed(&[a.id.clone(), b.id.clone()])
            .unwrap();
        assert_eq!(failed, 1);
        assert_eq!(store.sync_stats().synced, 1);
    }

    #[test]
    fn test_pending_mutations_emit_events() {
        let (sender, mut receiver) = crate::default_event_channel();
        let mut store = Store::open_in_memory();
        store.set_event_sender(sender);

        let entry = pending_entry(&mut store, "announce me");
        let StoreEvent::EntryPending { id } = receiver.try_recv().unwrap();
        assert_eq!(id, entry.id);

        // Local-only mutations stay quiet.
        store
            .add_entry(NewEntry::new("private").local_only(true))
            .unwrap();
        assert!(receiver.try_recv().is_err());
    }

    // Disk-backed behavior

    #[test]
    fn test_open_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("journal.json")).unwrap();
        assert!(store.data().entries.is_empty());
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");

        let id = {
            let mut store = Store::open(&path).unwrap();
            pending_entry(&mut store, "durable").id
        };

        let store = Store::open(&path).unwrap();
        assert_eq!(store.data().entries.len(), 1);
        assert_eq!(store.data().entries[0].id, id);
    }

    #[test]
    fn test_open_corrupt_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let store = Store::open(&path).unwrap();
        assert!(store.data().entries.is_empty());
        // The corrupt blob is left in place until the next mutation.
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("{not"));
    }

    #[test]
    fn test_open_migrates_legacy_array_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        let legacy = r#"[{"content": "old entry", "date": "2023-01-01T00:00:00Z"}]"#;
        std::fs::write(&path, legacy).unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.data().version, SCHEMA_VERSION);
        assert_eq!(store.data().entries.len(), 1);

        let entry = &store.data().entries[0];
        assert!(!entry.id.is_empty());
        assert_eq!(entry.created_at, datetime!(2023-01-01 00:00:00 UTC));

        // The raw pre-migration blob is preserved verbatim.
        let backup = backup_path(&path);
        assert_eq!(std::fs::read_to_string(backup).unwrap(), legacy);

        // The migrated container round-trips without further migration.
        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.data(), store.data());
    }

    #[test]
    fn test_migration_is_idempotent_at_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");

        {
            let mut store = Store::open(&path).unwrap();
            pending_entry(&mut store, "already current");
        }
        let on_disk = std::fs::read_to_string(&path).unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.data().version, SCHEMA_VERSION);
        // No rewrite, no backup for an already-current container.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), on_disk);
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_debug_output_elides_entry_content() {
        let mut store = Store::open_in_memory();
        store
            .add_entry(NewEntry::new("deeply personal words"))
            .unwrap();

        let rendered = format!("{store:?}");
        assert!(rendered.contains("entries: 1"));
        assert!(!rendered.contains("deeply personal words"));
    }

    #[test]
    fn test_backup_path_shape() {
        assert_eq!(
            backup_path(Path::new("/data/luma/journal.json")),
            Path::new("/data/luma/journal-backup.json")
        );
        assert_eq!(
            backup_path(Path::new("journal")),
            Path::new("journal-backup")
        );
    }
}
