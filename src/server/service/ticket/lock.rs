use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-ticket async mutexes.
///
/// Every read-modify-write of a ticket's claimers or status runs while holding the guard for
/// that ticket, so two handlers for the same ticket never interleave. Different tickets do not
/// contend with each other.
#[derive(Clone, Default)]
pub struct TicketLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `ticket_name`.
    pub async fn acquire(&self, ticket_name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().await;
            locks
                .entry(ticket_name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Drops the mutex of a ticket that reached a terminal state.
    ///
    /// Entries still held or awaited elsewhere are kept.
    pub async fn release(&self, ticket_name: &str) {
        let mut locks = self.inner.lock().await;
        if let Some(lock) = locks.get(ticket_name) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(ticket_name);
            }
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
