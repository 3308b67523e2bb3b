//! Sync status state machine for journal entries.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Synchronization state of a single journal entry.
///
/// State transitions:
///
/// - [`Local`](SyncStatus::Local) is terminal by policy: an entry the user
///   marked local-only never leaves the device.
/// - [`Pending`](SyncStatus::Pending) moves to [`Synced`](SyncStatus::Synced)
///   when a sweep uploads it, or to [`Failed`](SyncStatus::Failed) when the
///   batch it was part of fails.
/// - [`Failed`](SyncStatus::Failed) re-enters `Pending` on the next mutation
///   touching the entry, and is swept together with `Pending` entries on the
///   next sweep.
/// - [`Synced`](SyncStatus::Synced) is terminal until a later edit resets the
///   entry to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never leaves the device (local-only entries).
    Local,
    /// Uploaded and acknowledged by the server.
    Synced,
    /// Waiting to be included in the next sync sweep.
    Pending,
    /// The last sweep that carried this entry failed.
    Failed,
}

impl SyncStatus {
    /// The lowercase wire representation of this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Failed => "failed",
        }
    }

    /// Whether an entry in this state takes part in sync sweeps.
    ///
    /// `Failed` entries count as sweepable: a retried sweep does not
    /// distinguish them from `Pending` ones.
    #[must_use]
    pub fn is_sweepable(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::Failed)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(SyncStatus::Local),
            "synced" => Ok(SyncStatus::Synced),
            "pending" => Ok(SyncStatus::Pending),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(ParseError::UnknownSyncStatus(other.to_string())),
        }
    }
}
