use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Session, SessionId};

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: Vec<SessionId>,
}

/// The set of sessions eligible to receive broadcasts.
///
/// Membership changes and broadcasts take the same lock, so a broadcast sees a
/// stable membership and never writes to a session after it was unregistered.
/// Sends happen with the lock held; a stalled recipient delays everyone else
/// by at most `send_timeout` before it is evicted.
#[derive(Clone)]
pub struct SessionRegistry {
    members: Arc<Mutex<HashMap<SessionId, Session>>>,
    send_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            members: Arc::new(Mutex::new(HashMap::new())),
            send_timeout,
        }
    }

    /// Register a freshly accepted session.
    pub async fn register(&self, session: Session) {
        let id = session.id();
        let mut members = self.members.lock().await;
        if members.insert(id, session).is_some() {
            warn!("Session {} was registered twice", id);
        }
        debug!("Session {} registered ({} live)", id, members.len());
    }

    /// Remove a session. Removing an absent session is a no-op.
    pub async fn unregister(&self, id: &SessionId) -> Option<Session> {
        let mut members = self.members.lock().await;
        let removed = members.remove(id);
        if removed.is_some() {
            debug!("Session {} unregistered ({} live)", id, members.len());
        }
        removed
    }

    /// Send `payload` to every member except `exclude`.
    ///
    /// Failed or timed-out recipients are dropped from the registry and told
    /// to close; the caller only sees the report.
    pub async fn broadcast(&self, payload: &[u8], exclude: &SessionId) -> BroadcastReport {
        let mut members = self.members.lock().await;
        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        for (id, session) in members.iter() {
            if id == exclude {
                continue;
            }
            match timeout(self.send_timeout, session.send(payload)).await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!("Broadcast to session {} ({}) failed: {}", id, session.peer(), e);
                    failed.push(*id);
                }
                Err(_) => {
                    warn!(
                        "Broadcast to session {} ({}) timed out after {:?}",
                        id,
                        session.peer(),
                        self.send_timeout
                    );
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            if let Some(session) = members.remove(&id) {
                session.close();
                report.evicted.push(id);
            }
        }

        report
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.members.lock().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Unregisters its session when dropped, however the owning task ends.
pub struct SessionGuard {
    registry: SessionRegistry,
    id: SessionId,
}

impl SessionGuard {
    pub fn new(registry: SessionRegistry, id: SessionId) -> Self {
        Self { registry, id }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let registry = self.registry.clone();
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    registry.unregister(&id).await;
                });
            }
            Err(_) => warn!("No runtime to unregister session {}", id),
        }
    }
}
