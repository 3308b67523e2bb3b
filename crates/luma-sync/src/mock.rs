//! Scripted transport for testing without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use luma_types::JournalEntry;

use crate::client::{SyncRequest, SyncResponse};
use crate::error::{Error, Result};
use crate::traits::SyncTransport;

/// One scripted outcome for a [`MockTransport`] call.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Accept every entry in the request.
    Accept,
    /// Accept every entry and return additional server-originated entries.
    AcceptWith { server_entries: Vec<JournalEntry> },
    /// Fail the batch with an HTTP error.
    HttpError { status: u16, message: String },
}

/// In-memory [`SyncTransport`] driven by a script of outcomes.
///
/// Each call consumes the next scripted response; once the script runs dry,
/// every further call is an [`Accept`](ScriptedResponse::Accept). Requests
/// are recorded for assertions.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<SyncRequest>>,
}

impl MockTransport {
    /// A transport that accepts everything.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// A transport driven by the given script.
    pub fn scripted(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests observed so far.
    pub fn requests(&self) -> Vec<SyncRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    /// Number of calls observed so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn sync_batch(
        &self,
        entries: &[JournalEntry],
        last_sync_at: Option<OffsetDateTime>,
    ) -> Result<SyncResponse> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(SyncRequest {
                entries: entries.to_vec(),
                last_sync_at,
            });

        let next = self
            .script
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or(ScriptedResponse::Accept);

        let accept = |server_entries: Option<Vec<JournalEntry>>| SyncResponse {
            uploaded_ids: entries.iter().map(|e| e.id.clone()).collect(),
            server_entries,
            sync_timestamp: OffsetDateTime::now_utc(),
        };

        match next {
            ScriptedResponse::Accept => Ok(accept(None)),
            ScriptedResponse::AcceptWith { server_entries } => Ok(accept(Some(server_entries))),
            ScriptedResponse::HttpError { status, message } => Err(Error::Api { status, message }),
        }
    }
}
