use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::codec::{Decoder, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::connection::msg_add_handler::handle_add_message;
use crate::connection::msg_get_handler::handle_get_message;
use crate::connection::msg_update_handler::handle_update_message;
use crate::connection::Reply;
use crate::models::{DecodeError, ErrorResponse, Request, Response};
use crate::services::TodoStore;
use crate::session::{Session, SessionGuard};
use crate::state::AppState;

/// Serve one connection until it closes.
///
/// The session must already be registered. Frames are handled strictly in
/// the order they arrive; the loop ends on end-of-stream, a read error, a
/// failed reply, or when the registry evicts the session. On the way out the
/// session is unregistered and its write side shut down.
pub async fn handle_connection<R>(state: Arc<AppState>, session: Session, mut reader: R)
where
    R: AsyncRead + Unpin,
{
    // Whatever happens, make sure the session leaves the registry
    let _guard = SessionGuard::new(state.sessions.clone(), session.id());

    info!("Client connected: session={} peer={}", session.id(), session.peer());

    let mut codec = LinesCodec::new_with_max_length(state.config.max_frame_bytes);
    let mut buf = BytesMut::with_capacity(state.config.read_buffer_bytes);

    loop {
        tokio::select! {
            read = reader.read_buf(&mut buf) => {
                match read {
                    Ok(0) => {
                        debug!("Session {} reached end of stream", session.id());
                        break;
                    }
                    Ok(_) => {
                        if let Err(e) = process_frames(&state, &session, &mut codec, &mut buf).await {
                            warn!("Reply to session {} failed: {}", session.id(), e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Read from session {} failed: {}", session.id(), e);
                        break;
                    }
                }
            }
            _ = session.closed() => {
                debug!("Session {} was evicted", session.id());
                break;
            }
        }
    }

    state.sessions.unregister(&session.id()).await;
    session.shutdown().await;
    info!("Client disconnected: session={} peer={}", session.id(), session.peer());
}

/// Drain every complete frame currently in `buf`.
async fn process_frames(
    state: &AppState,
    session: &Session,
    codec: &mut LinesCodec,
    buf: &mut BytesMut,
) -> io::Result<()> {
    loop {
        match codec.decode(buf) {
            Ok(Some(frame)) => {
                if frame.is_empty() {
                    continue;
                }
                handle_frame(state, session, &frame).await?;
            }
            Ok(None) => return Ok(()),
            Err(e) => {
                // The codec skips the rest of a bad frame by itself
                warn!("Discarding frame from session {}: {}", session.id(), DecodeError::from(e));
            }
        }
    }
}

/// Decode, dispatch, reply to the originator, then broadcast if needed.
async fn handle_frame(state: &AppState, session: &Session, frame: &str) -> io::Result<()> {
    let request = match Request::decode(frame) {
        Ok(request) => request,
        Err(e) => {
            warn!("Discarding frame from session {}: {}", session.id(), e);
            return Ok(());
        }
    };
    debug!("Session {} sent {:?}", session.id(), request);

    let reply = dispatch(&state.store, request).await;
    let payload = match reply.response.encode() {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to encode response for session {}: {}", session.id(), e);
            return Ok(());
        }
    };

    match timeout(state.config.send_timeout(), session.send(payload.as_bytes())).await {
        Ok(sent) => sent?,
        Err(_) => return Err(io::Error::new(io::ErrorKind::TimedOut, "reply timed out")),
    }

    if reply.broadcast {
        let report = state.sessions.broadcast(payload.as_bytes(), &session.id()).await;
        debug!(
            "Broadcast from session {} reached {} sessions, evicted {}",
            session.id(),
            report.delivered,
            report.evicted.len()
        );
    }

    Ok(())
}

/// Run one request against the store.
pub async fn dispatch(store: &TodoStore, request: Request) -> Reply {
    match request {
        Request::Get => handle_get_message(store).await,
        Request::Add { description } => handle_add_message(store, description).await,
        Request::Update { id } => handle_update_message(store, id).await,
        Request::Unknown => Reply::direct(Response::Error(ErrorResponse::unknown_action())),
    }
}
