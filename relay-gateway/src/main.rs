//! Entry point for the `hass-relay` HTTP server.

use std::sync::Arc;

use relay_gateway::{
    create_router,
    sink::{FileSink, LogSink, ResultsSink},
    telemetry, AppState, ServerOptions,
};
use tracing::info;

#[tokio::main]
async fn main() {
    telemetry::init();

    let options_path = ServerOptions::path_from_env();
    let options = match ServerOptions::load(&options_path) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "failed to load options");
            std::process::exit(1);
        }
    };

    let sink: Arc<dyn ResultsSink> = match &options.results_path {
        Some(path) => Arc::new(FileSink::new(path.clone())),
        None => Arc::new(LogSink),
    };

    let addr = options.listen_addr();
    for (path, target) in &options.forward_routes {
        info!(%path, %target, "relay route");
    }
    let app = create_router(AppState::new(Arc::new(options), sink));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "hass-relay listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("shutting down");
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
