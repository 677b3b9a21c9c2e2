//! Session store keeping navigation state per browser session.
//!
//! Each session's state sits behind its own async mutex. A request holds the
//! lock for its whole duration, so two tabs of the same session are
//! serialized while different sessions proceed independently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::navigation::NavigationState;

/// Unique identifier for a session.
pub type SessionId = String;

/// Everything remembered about one browser session.
#[derive(Debug)]
pub struct SessionState {
    id: SessionId,
    principal: Option<String>,
    /// Navigation state of the collection browser.
    pub navigation: NavigationState,
    last_seen: Instant,
}

impl SessionState {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            principal: None,
            navigation: NavigationState::new(),
            last_seen: Instant::now(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Principal the session belongs to, once bound.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Bind the session to a principal.
    ///
    /// A session that changes hands starts over with fresh navigation state.
    /// Returns true if the state was reset.
    pub fn bind_principal(&mut self, principal: &str) -> bool {
        match &self.principal {
            Some(existing) if existing == principal => false,
            Some(existing) => {
                tracing::info!(
                    session_id = %self.id,
                    previous = %existing,
                    principal = %principal,
                    "Session changed principal, resetting navigation"
                );
                self.principal = Some(principal.to_string());
                self.navigation = NavigationState::new();
                true
            }
            None => {
                self.principal = Some(principal.to_string());
                false
            }
        }
    }

    /// Mark the session as used now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Time since the session was last used.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

/// Handle to a session's state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Thread-safe session store using DashMap.
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionHandle>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Creates a store that forgets sessions idle for longer than `idle_timeout`.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Look up a session by id, creating a new one when the id is absent or
    /// unknown.
    ///
    /// Returns the handle and whether a new session was created. Ids are
    /// always minted by the store; a client-supplied unknown id is replaced.
    pub fn get_or_create(&self, id: Option<&str>) -> (SessionId, SessionHandle, bool) {
        if let Some(id) = id {
            if let Some(entry) = self.sessions.get(id) {
                return (id.to_string(), Arc::clone(entry.value()), false);
            }
        }

        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(SessionState::new(id.clone())));
        self.sessions.insert(id.clone(), Arc::clone(&handle));
        tracing::debug!(session_id = %id, "Created new session");
        (id, handle, true)
    }

    /// Gets a session by id.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes a session.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no session.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops sessions idle for longer than the timeout.
    ///
    /// Sessions locked by an in-flight request are in use and skipped.
    pub async fn cleanup(&self) -> usize {
        let mut to_remove = Vec::new();

        for entry in self.sessions.iter() {
            if let Ok(state) = entry.value().try_lock() {
                if state.idle_for() > self.idle_timeout {
                    to_remove.push(entry.key().clone());
                }
            }
        }

        let mut removed = 0;
        for id in to_remove {
            if self.sessions.remove(&id).is_some() {
                tracing::info!(session_id = %id, "Expired idle session");
                removed += 1;
            }
        }
        removed
    }

    /// Starts a background task that periodically expires idle sessions
    /// until `shutdown` is cancelled.
    pub fn start_cleanup_task(self: &Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Session cleanup task stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        store.cleanup().await;
                    }
                }
            }
        });
    }
}
