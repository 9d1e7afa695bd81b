// SPDX-License-Identifier: MIT
//
// Who is online.
//
// The only state sessions share. Every connection registers on accept and
// gets a `SessionGuard` back; dropping the guard (the session thread ending
// for any reason, panics included) takes the entry out again.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use tracing::debug;

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub peer: SocketAddr,
    pub connected_at: SystemTime,
}

#[derive(Debug, Default)]
struct Sessions {
    next_id: SessionId,
    by_id: HashMap<SessionId, SessionInfo>,
}

/// Shared, cloneable handle to the session table.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Sessions>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A session that panicked while holding the lock cannot have left the
    // map half-updated: every critical section is a single insert/remove.
    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a session for `peer`. It stays registered until the returned
    /// guard is dropped.
    #[must_use]
    pub fn register(&self, peer: SocketAddr) -> SessionGuard {
        let mut sessions = self.lock();
        sessions.next_id += 1;
        let id = sessions.next_id;
        sessions.by_id.insert(
            id,
            SessionInfo {
                id,
                peer,
                connected_at: SystemTime::now(),
            },
        );
        debug!(id, online = sessions.by_id.len(), "session registered");
        SessionGuard {
            registry: self.clone(),
            id,
        }
    }

    /// Remove session `id`, returning its entry if it was registered.
    pub fn unregister(&self, id: SessionId) -> Option<SessionInfo> {
        let mut sessions = self.lock();
        let info = sessions.by_id.remove(&id);
        if info.is_some() {
            debug!(id, online = sessions.by_id.len(), "session unregistered");
        }
        info
    }

    /// Number of sessions online.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of every entry, oldest session first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SessionInfo> {
        let mut all: Vec<SessionInfo> = self.lock().by_id.values().cloned().collect();
        all.sort_unstable_by_key(|info| info.id);
        all
    }
}

/// Keeps one session registered for as long as it lives.
#[derive(Debug)]
pub struct SessionGuard {
    registry: SessionRegistry,
    id: SessionId,
}

impl SessionGuard {
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Sessions online, this one included.
    #[must_use]
    pub fn online(&self) -> usize {
        self.registry.len()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
