use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::connection::handle_connection;
use crate::session::Session;
use crate::state::AppState;

/// Accepts connections and gives each one its own handler task.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind to the configured host and port
    pub async fn bind(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.server_address()).await?;
        Ok(Self::from_listener(listener, config))
    }

    pub fn from_listener(listener: TcpListener, config: Config) -> Self {
        Self {
            listener,
            state: AppState::new(config),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Accept forever. A failed accept is logged and retried after a short pause.
    pub async fn run(self) {
        let backoff = self.state.config.accept_backoff();
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                    }
                    let (reader, writer) = stream.into_split();
                    let session = Session::new(addr.to_string(), writer);
                    self.state.sessions.register(session.clone()).await;
                    tokio::spawn(handle_connection(self.state.clone(), session, reader));
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.listener.local_addr().ok())
            .finish()
    }
}

/// Start serving on an already bound listener; returns the accept loop task.
pub fn spawn(listener: TcpListener, config: Config) -> (Arc<AppState>, tokio::task::JoinHandle<()>) {
    let server = Server::from_listener(listener, config);
    let state = server.state();
    info!("Serving on {:?}", server.local_addr().ok());
    (state, tokio::spawn(server.run()))
}
