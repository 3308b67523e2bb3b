//! The sync reconciler task.
//!
//! Reads the pending set from the store, ships it to the transport in one
//! batch, and writes the outcome back as entry status. Reconciliation is
//! at-least-once and idempotent on entry ID: overlapping or repeated sweeps
//! can double-submit, and the server must tolerate that; no entry is lost
//! locally because the store is only ever rewritten whole.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use luma_store::{EventReceiver, Store, StoreEvent};

use crate::error::Result;
use crate::traits::SyncTransport;

/// Shared handle to the store, as the reconciler and the UI layer both
/// mutate it.
pub type SharedStore = Arc<Mutex<Store>>;

/// Connectivity transitions signalled by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// Connectivity was regained; sweep immediately.
    Online,
    /// Connectivity was lost. The reconciler ignores this (a sweep during an
    /// outage simply fails the batch), but hosts may want to broadcast it
    /// for status displays.
    Offline,
}

/// Sender for network events.
pub type NetworkSender = broadcast::Sender<NetworkEvent>;

/// Receiver for network events.
pub type NetworkReceiver = broadcast::Receiver<NetworkEvent>;

/// Create a network event channel.
pub fn network_channel() -> (NetworkSender, NetworkReceiver) {
    broadcast::channel(16)
}

/// Configuration for the reconciler loop.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Fixed re-sweep interval, independent of mutation activity.
    pub interval: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The pending set was empty; nothing was sent.
    Nothing,
    /// The batch was accepted.
    Synced {
        /// Entries the server acknowledged.
        uploaded: usize,
        /// Server-originated entries merged into the store.
        merged: usize,
    },
    /// The batch failed as a whole; every swept entry is now `failed`.
    Failed {
        /// Size of the failed batch.
        attempted: usize,
    },
}

/// Best-effort reconciler between the local store and the sync endpoint.
#[derive(Debug, Clone)]
pub struct Reconciler<T: SyncTransport> {
    store: SharedStore,
    transport: T,
    config: ReconcilerConfig,
}

impl<T: SyncTransport> Reconciler<T> {
    /// Create a reconciler with the default configuration.
    pub fn new(store: SharedStore, transport: T) -> Self {
        Self::with_config(store, transport, ReconcilerConfig::default())
    }

    /// Create a reconciler with a custom configuration.
    pub fn with_config(store: SharedStore, transport: T, config: ReconcilerConfig) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Manual "sync now": run one sweep immediately.
    ///
    /// Transport failures are reflected in the returned outcome (and in
    /// entry status), not as errors; only local persistence failures error.
    pub async fn attempt_sync(&self) -> Result<SweepOutcome> {
        self.sweep().await
    }

    async fn sweep(&self) -> Result<SweepOutcome> {
        // Snapshot the batch and checkpoint, then release the lock for the
        // duration of the network call.
        let (batch, checkpoint) = {
            let mut store = self.store.lock().await;
            let batch = store.take_sweep_batch()?;
            (batch, store.data().last_sync_at)
        };

        if batch.is_empty() {
            return Ok(SweepOutcome::Nothing);
        }
        debug!("Sweeping {} pending entries", batch.len());

        match self.transport.sync_batch(&batch, checkpoint).await {
            Ok(response) => {
                let server_entries = response.server_entries.unwrap_or_default();
                let mut store = self.store.lock().await;
                let (uploaded, merged) = store.apply_sweep_success(
                    &response.uploaded_ids,
                    &server_entries,
                    response.sync_timestamp,
                )?;
                Ok(SweepOutcome::Synced { uploaded, merged })
            }
            Err(e) => {
                warn!("Sync sweep failed: {e}");
                let ids: Vec<String> = batch.iter().map(|e| e.id.clone()).collect();
                self.store.lock().await.mark_sweep_failed(&ids)?;
                Ok(SweepOutcome::Failed {
                    attempted: ids.len(),
                })
            }
        }
    }

    async fn sweep_for(&self, trigger: &str) {
        match self.sweep().await {
            Ok(SweepOutcome::Nothing) => {}
            Ok(outcome) => debug!("Sweep ({trigger}): {outcome:?}"),
            // Store bookkeeping failed; entry state is discovered via stats,
            // nothing to surface from a background task.
            Err(e) => warn!("Sweep ({trigger}) could not record its outcome: {e}"),
        }
    }

    /// Run the reconciler loop until `shutdown` is cancelled.
    ///
    /// Sweeps on: store events announcing a newly pending entry, the fixed
    /// interval, and online transitions. Closed channels silence that
    /// trigger without stopping the loop; the timer always keeps running.
    pub async fn run(
        &self,
        mut store_events: EventReceiver,
        mut network_events: NetworkReceiver,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The immediate first tick doubles as the startup sweep, picking up
        // whatever was left pending by a previous session.

        let mut store_open = true;
        let mut network_open = true;

        info!(
            "Reconciler running (interval {:?})",
            self.config.interval
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Reconciler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_for("timer").await;
                }
                event = store_events.recv(), if store_open => {
                    match event {
                        Ok(StoreEvent::EntryPending { id }) => {
                            debug!("Entry {id} became pending");
                            self.sweep_for("mutation").await;
                        }
                        // Event kinds added later are not sweep triggers.
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // Missed announcements still mean pending work.
                            debug!("Store events lagged by {missed}, sweeping anyway");
                            self.sweep_for("mutation").await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            store_open = false;
                        }
                    }
                }
                event = network_events.recv(), if network_open => {
                    match event {
                        Ok(NetworkEvent::Online) => {
                            debug!("Back online");
                            self.sweep_for("online").await;
                        }
                        Ok(NetworkEvent::Offline) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => {
                            network_open = false;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, ScriptedResponse};
    use luma_types::NewEntry;

    fn shared_store() -> SharedStore {
        Arc::new(Mutex::new(Store::open_in_memory()))
    }

    #[tokio::test]
    async fn test_sweep_with_empty_store_is_noop() {
        let store = shared_store();
        let reconciler = Reconciler::new(store, MockTransport::accepting());

        let outcome = reconciler.attempt_sync().await.unwrap();
        assert_eq!(outcome, SweepOutcome::Nothing);
        assert_eq!(reconciler.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sweep_skips_local_only_entries() {
        let store = shared_store();
        store
            .lock()
            .await
            .add_entry(NewEntry::new("private").local_only(true))
            .unwrap();

        let reconciler = Reconciler::new(store, MockTransport::accepting());
        assert_eq!(
            reconciler.attempt_sync().await.unwrap(),
            SweepOutcome::Nothing
        );
    }

    #[tokio::test]
    async fn test_failed_batch_marks_whole_batch_failed() {
        let store = shared_store();
        {
            let mut store = store.lock().await;
            store.add_entry(NewEntry::new("one")).unwrap();
            store.add_entry(NewEntry::new("two")).unwrap();
        }

        let reconciler = Reconciler::new(
            store.clone(),
            MockTransport::scripted([ScriptedResponse::HttpError {
                status: 500,
                message: "server error".to_string(),
            }]),
        );

        let outcome = reconciler.attempt_sync().await.unwrap();
        assert_eq!(outcome, SweepOutcome::Failed { attempted: 2 });

        let stats = store.lock().await.sync_stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.pending, 0);
    }
}
