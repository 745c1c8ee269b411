use anyhow::Context;
use todo_hub::{Config, Server};
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;

#[tokio::main]
async fn main() -> anyhow::Result<()> {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration first, the environment picks the default log filter
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.default_log_filter().into()))
        .init();

    info!("Starting server...");
    match loaded {
        Ok(_) => info!("✅ Configuration loaded successfully ({})", config.environment),
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            warn!("Using default configuration");
        }
    }

    let address = config.server_address();
    let server = Server::bind(config)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!("🚀 Server listening on {}", server.local_addr()?);
    server.run().await;
    Ok(())
}
