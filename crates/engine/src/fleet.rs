//! Shared holder for the current session collection.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::filter::filter_by_date_range;
use crate::fingerprint::content_fingerprint;
use crate::session::Session;

struct Loaded {
    sessions: Arc<[Session]>,
    fingerprint: String,
}

/// Readers take cheap `Arc` snapshots; `replace` swaps the whole collection,
/// so a query already holding a snapshot never sees a partial update.
pub struct Fleet {
    inner: RwLock<Loaded>,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self::from_sessions(Vec::new())
    }

    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self {
            inner: RwLock::new(Self::load(sessions)),
        }
    }

    fn load(sessions: Vec<Session>) -> Loaded {
        let fingerprint = content_fingerprint(&sessions);
        Loaded {
            sessions: sessions.into(),
            fingerprint,
        }
    }

    /// Swap in a new collection and return its fingerprint
    pub fn replace(&self, sessions: Vec<Session>) -> String {
        let loaded = Self::load(sessions);
        let fingerprint = loaded.fingerprint.clone();
        let count = loaded.sessions.len();

        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.fingerprint == fingerprint {
            debug!(sessions = count, "Session data unchanged");
        } else {
            info!(sessions = count, fingerprint = %fingerprint, "Replaced session data");
        }
        *guard = loaded;
        fingerprint
    }

    pub fn snapshot(&self) -> Arc<[Session]> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.sessions)
    }

    pub fn fingerprint(&self) -> String {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.fingerprint.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_date_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<Session> {
        filter_by_date_range(&self.snapshot(), from, to)
    }
}
