//! Schema migration for stored journal blobs.
//!
//! Two legacy shapes exist in the wild: a bare JSON array of records (the
//! oldest format, no container at all) and a container object carrying an
//! older `version`. Both are lifted to the current [`JournalData`] shape on
//! load, backfilling any field a legacy record is missing. The caller writes
//! the raw pre-migration blob to a backup file before persisting the
//! migrated container, so a migration bug never silently destroys data.

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use luma_types::{JournalData, JournalEntry, SCHEMA_VERSION, SyncStatus};

/// Whether the raw stored value requires migration.
///
/// A container already at [`SCHEMA_VERSION`] passes through untouched, which
/// makes migration idempotent.
pub(crate) fn needs_migration(raw: &Value) -> bool {
    match raw {
        Value::Array(_) => true,
        Value::Object(map) => map.get("version").and_then(Value::as_str) != Some(SCHEMA_VERSION),
        _ => true,
    }
}

/// Lift a raw stored value to the current container shape.
pub(crate) fn migrate(raw: &Value) -> JournalData {
    let (records, last_sync_at, encryption_enabled) = match raw {
        // Oldest format: a bare array of records, no container fields.
        Value::Array(records) => (records.as_slice(), None, false),
        Value::Object(map) => {
            let records = map
                .get("entries")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let last_sync_at = map
                .get("lastSyncAt")
                .and_then(Value::as_str)
                .and_then(parse_rfc3339);
            let encryption_enabled = map
                .get("encryptionEnabled")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            (records, last_sync_at, encryption_enabled)
        }
        other => {
            warn!("Unrecognized stored blob shape ({other}), starting fresh");
            (&[][..], None, false)
        }
    };

    let mut entries: Vec<JournalEntry> = records.iter().filter_map(migrate_record).collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!("Migrated {} legacy records to version {SCHEMA_VERSION}", entries.len());

    JournalData {
        entries,
        version: SCHEMA_VERSION.to_string(),
        last_sync_at,
        encryption_enabled,
    }
}

/// Backfill a single legacy record, or drop it when it is not an object.
fn migrate_record(raw: &Value) -> Option<JournalEntry> {
    let Value::Object(map) = raw else {
        warn!("Skipping non-object legacy record");
        return None;
    };

    let content = map
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // Older records kept the creation time under "date".
    let created_at = map
        .get("createdAt")
        .or_else(|| map.get("date"))
        .and_then(Value::as_str)
        .and_then(parse_rfc3339)
        .unwrap_or_else(OffsetDateTime::now_utc);
    let updated_at = map
        .get("updatedAt")
        .and_then(Value::as_str)
        .and_then(parse_rfc3339)
        .filter(|t| *t >= created_at)
        .unwrap_or(created_at);

    let is_local_only = map
        .get("isLocalOnly")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let sync_status = if is_local_only {
        SyncStatus::Local
    } else {
        map.get("syncStatus")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(SyncStatus::Pending)
    };

    Some(JournalEntry {
        id: map
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(luma_types::generate_entry_id),
        word_count: map
            .get("wordCount")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            // Absent or nonsensical counts are re-derived from the content.
            .unwrap_or_else(|| luma_types::word_count(&content)),
        emotion_score: map
            .get("emotionScore")
            .and_then(Value::as_i64)
            .map(|n| n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            .unwrap_or(0),
        encrypted_locally: map
            .get("encryptedLocally")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        tags: map.get("tags").and_then(Value::as_array).map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        }),
        content,
        created_at,
        updated_at,
        is_local_only,
        sync_status,
    })
}

fn parse_rfc3339(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}
