use ragbridge::{api, config, logging, processing};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Ports probed when `SERVER_PORT` is not set.
const FALLBACK_PORTS: std::ops::RangeInclusive<u16> = 7600..=7699;

#[tokio::main]
async fn main() {
    logging::init_tracing();
    config::init_config();

    let service = Arc::new(processing::PipelineService::new());
    let router = api::create_router(service);

    let listener = bind_listener().await.expect("Failed to bind server port");
    match listener.local_addr() {
        Ok(addr) => tracing::info!(%addr, "ragbridge listening"),
        Err(err) => tracing::warn!(error = %err, "Listener bound but address unknown"),
    }
    axum::serve(listener, router)
        .await
        .expect("Server terminated abnormally");
}

async fn bind_listener() -> std::io::Result<TcpListener> {
    if let Some(port) = config::get_config().server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await;
    }

    for port in FALLBACK_PORTS {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port in use; probing next");
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        format!(
            "no free port in {}-{}",
            FALLBACK_PORTS.start(),
            FALLBACK_PORTS.end()
        ),
    ))
}
