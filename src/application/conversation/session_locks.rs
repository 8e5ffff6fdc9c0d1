//! Per-session mutual exclusion.
//!
//! Every read-then-append cycle on a session runs while holding that
//! session's lease, so appends and generations within one session are
//! strictly sequential. Different sessions never share a lock.
//!
//! Entries are created on first use and removed when the last lease (held or
//! still waiting) is dropped, so the map only holds sessions with work in
//! flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::SessionId;

#[derive(Debug, Default)]
struct LockEntry {
    mutex: Arc<AsyncMutex<()>>,
    /// Leases holding or waiting on `mutex`.
    users: usize,
}

type LockMap = HashMap<SessionId, LockEntry>;

/// Keyed lock map: session id to an async mutex.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `session_id`.
    ///
    /// Dropping the returned lease releases the session. Dropping the future
    /// before it resolves is safe and leaves no entry behind.
    pub async fn acquire(&self, session_id: SessionId) -> SessionLease {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = map.entry(session_id).or_default();
            entry.users += 1;
            Arc::clone(&entry.mutex)
        };

        // The lease exists before the await so a cancelled waiter still
        // gives back its slot.
        let mut lease = SessionLease {
            session_id,
            locks: Arc::clone(&self.inner),
            guard: None,
        };
        lease.guard = Some(mutex.lock_owned().await);
        lease
    }

    /// Number of sessions with a held or pending lease.
    pub fn active_sessions(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one session, released on drop.
#[derive(Debug)]
pub struct SessionLease {
    session_id: SessionId,
    locks: Arc<Mutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLease {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = map.get_mut(&self.session_id) {
            entry.users = entry.users.saturating_sub(1);
            if entry.users == 0 {
                map.remove(&self.session_id);
            }
        }
    }
}
