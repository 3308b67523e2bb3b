//! Background sync reconciler for the Luma local journal store.
//!
//! Best-effort, at-least-once reconciliation between the on-device container
//! (luma-store) and the remote `POST /journal/local-sync` endpoint. Entries
//! the user marked local-only never take part; everything else moves through
//! the `pending → synced | failed` state machine recorded on the entries
//! themselves, so a failed sweep is discovered through status badges rather
//! than thrown at whoever happened to write last.
//!
//! Sweeps are triggered four ways: a store event when a mutation leaves an
//! entry pending, a fixed-interval timer, an online-transition event from
//! the host, and manual "sync now" calls.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use luma_store::{Store, default_event_channel};
//! use luma_sync::{HttpSyncClient, NetworkEvent, Reconciler, network_channel};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (store_tx, store_rx) = default_event_channel();
//! let mut store = Store::open_default()?;
//! store.set_event_sender(store_tx);
//!
//! let client = HttpSyncClient::new("https://api.luma.example")?;
//! let reconciler = Reconciler::new(Arc::new(tokio::sync::Mutex::new(store)), client);
//!
//! let (net_tx, net_rx) = network_channel();
//! let shutdown = CancellationToken::new();
//! tokio::spawn({
//!     let reconciler = reconciler.clone();
//!     let shutdown = shutdown.clone();
//!     async move { reconciler.run(store_rx, net_rx, shutdown).await }
//! });
//!
//! // The host signals connectivity recovery:
//! let _ = net_tx.send(NetworkEvent::Online);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod reconciler;
pub mod traits;

pub use client::{HttpSyncClient, SYNC_ENDPOINT, SyncRequest, SyncResponse};
pub use error::{Error, Result};
pub use mock::{MockTransport, ScriptedResponse};
pub use reconciler::{
    NetworkEvent, NetworkReceiver, NetworkSender, Reconciler, ReconcilerConfig, SharedStore,
    SweepOutcome, network_channel,
};
pub use traits::SyncTransport;
