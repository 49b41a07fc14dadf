//! Change notifications for PII configuration.
//!
//! Whenever rules are edited somewhere, a [`ConfigChange`] is broadcast to
//! every listener so cached rule sets can be reloaded. Versions only ever
//! increase; a listener never hands out the same or an older version twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChange {
    pub version: u64,
    pub source: String,
    pub changed_at: DateTime<Utc>,
}

impl ConfigChange {
    /// A change stamped with the current time.
    pub fn new(version: u64, source: impl Into<String>) -> Self {
        Self {
            version,
            source: source.into(),
            changed_at: Utc::now(),
        }
    }
}

pub struct ChangeBus {
    sender: broadcast::Sender<ConfigChange>,
    version: AtomicU64,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            version: AtomicU64::new(0),
        }
    }

    /// Records a local change and assigns it the next version.
    pub fn publish(&self, source: impl Into<String>) -> ConfigChange {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let change = ConfigChange::new(version, source);
        self.send(change.clone());
        change
    }

    /// Relays a change that was versioned elsewhere (another process or a
    /// replayed event). The local counter is advanced so later local
    /// publishes stay ahead of it.
    pub fn relay(&self, change: ConfigChange) {
        self.version.fetch_max(change.version, Ordering::SeqCst);
        self.send(change);
    }

    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> ChangeListener {
        ChangeListener {
            receiver: self.sender.subscribe(),
            last_seen: 0,
        }
    }

    fn send(&self, change: ConfigChange) {
        match self.sender.send(change) {
            Ok(receivers) => debug!(receivers, "Broadcast PII config change"),
            Err(broadcast::error::SendError(change)) => {
                debug!(version = change.version, "No listeners for PII config change")
            }
        }
    }
}

pub struct ChangeListener {
    receiver: broadcast::Receiver<ConfigChange>,
    last_seen: u64,
}

impl ChangeListener {
    /// Waits for the next change newer than anything returned so far.
    /// Returns `None` once the bus is dropped.
    pub async fn next_change(&mut self) -> Option<ConfigChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.version > self.last_seen => {
                    self.last_seen = change.version;
                    return Some(change);
                }
                Ok(change) => {
                    debug!(
                        version = change.version,
                        last_seen = self.last_seen,
                        "Skipping already processed change"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Change listener lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }
}
