use anyhow::{Context, Result};
use docqa::{api, cleanup, config, logging, processing::DocumentService};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Ports tried in order when `SERVER_PORT` is unset.
const FALLBACK_PORTS: RangeInclusive<u16> = 8000..=8099;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    if let Some(policy) = cleanup::CleanupPolicy::from_config(config) {
        cleanup::spawn_cleanup(policy);
    }

    let service = Arc::new(DocumentService::from_config(config));
    let app = api::create_router(service);

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind HTTP listener")?;
    tracing::info!(port, "Document service listening on http://0.0.0.0:{port}");
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated")
}

/// Bind the configured port, or the first free port in [`FALLBACK_PORTS`].
async fn bind_listener(configured: Option<u16>) -> std::io::Result<(TcpListener, u16)> {
    if let Some(port) = configured {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        return Ok((listener, port));
    }

    for port in FALLBACK_PORTS {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => return Ok((listener, port)),
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port busy");
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        format!(
            "every port in {}-{} is in use",
            FALLBACK_PORTS.start(),
            FALLBACK_PORTS.end()
        ),
    ))
}
