//! Registry of crawl sessions keyed by opaque identifiers
//!
//! A `SessionStore` is an explicit object handed to whoever needs it (an API
//! layer, a supervisor). Sessions are created on start, read many times and
//! removed explicitly; expiry is up to the owner of the store.

use crate::config::Config;
use crate::crawler::{start_crawl, CrawlHandle};
use crate::output::SinkSet;
use crate::state::CrawlStatus;
use crate::CrawlError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Opaque identifier of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Thread-safe map of session identifiers to crawl handles
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, CrawlHandle>>,
}

impl SessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, CrawlHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a crawl and registers it under a new identifier
    ///
    /// Seed validation failures are returned without registering anything.
    pub fn start(&self, seed: &str, config: Config, sinks: SinkSet) -> Result<SessionId, CrawlError> {
        let handle = start_crawl(seed, config, sinks)?;
        let id = self.insert(handle);
        tracing::info!("Session {} created", id);
        Ok(id)
    }

    /// Registers an existing handle under a new identifier
    pub fn insert(&self, handle: CrawlHandle) -> SessionId {
        let id = SessionId::new();
        self.lock().insert(id, handle);
        id
    }

    /// Returns a handle to the session
    pub fn get(&self, id: &SessionId) -> Option<CrawlHandle> {
        self.lock().get(id).cloned()
    }

    /// Returns a status snapshot of the session
    pub fn status(&self, id: &SessionId) -> Option<CrawlStatus> {
        self.get(id).map(|handle| handle.status())
    }

    /// Requests the session to stop; returns false for unknown ids
    pub fn stop(&self, id: &SessionId) -> bool {
        match self.get(id) {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    /// Forgets a session
    ///
    /// A crawl that is still running keeps running; stop it first if needed.
    pub fn remove(&self, id: &SessionId) -> Option<CrawlHandle> {
        self.lock().remove(id)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no session is registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Identifiers of all registered sessions
    pub fn ids(&self) -> Vec<SessionId> {
        self.lock().keys().copied().collect()
    }
}
