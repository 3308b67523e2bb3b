//! Transport seam for the reconciler.

use async_trait::async_trait;
use time::OffsetDateTime;

use luma_types::JournalEntry;

use crate::client::SyncResponse;
use crate::error::Result;

/// Transport carrying a sync batch to the remote endpoint.
///
/// The reconciler only ever talks to this trait; production code uses
/// [`HttpSyncClient`](crate::HttpSyncClient), tests use
/// [`MockTransport`](crate::MockTransport).
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Upload the full pending set plus the last known checkpoint in one
    /// batch request.
    ///
    /// The response enumerates accepted entry IDs and may carry
    /// server-originated entries unknown to this device. Any transport or
    /// non-2xx failure is an error; the contract cannot express partial
    /// acceptance.
    async fn sync_batch(
        &self,
        entries: &[JournalEntry],
        last_sync_at: Option<OffsetDateTime>,
    ) -> Result<SyncResponse>;
}
