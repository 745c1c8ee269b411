use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, Notify};
use tracing::debug;
use uuid::Uuid;

pub type SessionId = Uuid;

type SessionWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Server-side handle for one connected client.
///
/// Clones share the same writer and close signal. The read half of the
/// connection is not part of the session; only the connection handler reads.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    peer: String,
    writer: Arc<Mutex<SessionWriter>>,
    closed: Arc<Notify>,
}

impl Session {
    pub fn new<W>(peer: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            peer: peer.into(),
            writer: Arc::new(Mutex::new(Box::new(writer))),
            closed: Arc::new(Notify::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Write one encoded frame. Concurrent senders are serialised, so frames
    /// never interleave on the wire.
    pub async fn send(&self, payload: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await?;
        writer.flush().await
    }

    /// Ask the owning connection handler to stop.
    pub fn close(&self) {
        self.closed.notify_one();
    }

    /// Resolves once `close` has been called, including calls made before
    /// this future was created.
    pub async fn closed(&self) {
        self.closed.notified().await
    }

    /// Best-effort shutdown of the write side.
    pub async fn shutdown(&self) {
        if let Err(e) = self.writer.lock().await.shutdown().await {
            debug!("Shutdown of session {} failed: {}", self.id, e);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .finish()
    }
}
