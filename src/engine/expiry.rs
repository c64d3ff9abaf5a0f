// Deferred expiry: one-shot timers that remove a session once its TTL has elapsed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::store::SessionStore;

/// Spawns one timer task per session. When a timer fires it removes the
/// session unconditionally; removal is idempotent, so a timer firing after an
/// explicit delete or a read-time expiry does nothing.
///
/// Cancellation only saves the wakeup. Correctness never depends on it.
pub struct ExpiryScheduler {
    store: Arc<SessionStore>,
    ttl: Duration,
    pending: Arc<Mutex<HashMap<String, CancellationToken>>>,
    shutdown_token: CancellationToken,
}

impl ExpiryScheduler {
    pub fn new(store: Arc<SessionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            pending: Arc::new(Mutex::new(HashMap::new())),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Start the expiry timer for `session_id`. Must be called from within a
    /// tokio runtime. Scheduling an id twice replaces the earlier timer; after
    /// `shutdown` nothing is scheduled.
    pub fn schedule(&self, session_id: &str) {
        if self.shutdown_token.is_cancelled() {
            debug!("scheduler shut down, no expiry timer for session {}", session_id);
            return;
        }

        let token = self.shutdown_token.child_token();
        if let Some(previous) = self
            .pending
            .lock()
            .insert(session_id.to_string(), token.clone())
        {
            previous.cancel();
        }

        let store = self.store.clone();
        let pending = self.pending.clone();
        let ttl = self.ttl;
        let id = session_id.to_string();

        info!("session {} will expire in {}s", id, ttl.as_secs());

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("expiry timer for session {} cancelled", id);
                }
                _ = tokio::time::sleep(ttl) => {
                    pending.lock().remove(&id);
                    if store.remove(&id) {
                        info!("session {} expired after timeout", id);
                    }
                }
            }
        });
    }

    /// Stop the pending timer for `session_id`, if any.
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.pending.lock().remove(session_id) {
            Some(token) => {
                token.cancel();
                debug!("cancelled expiry timer for session {}", session_id);
                true
            }
            None => false,
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Cancel every pending timer. Sessions they guarded stay in the store.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
        self.pending.lock().clear();
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}
