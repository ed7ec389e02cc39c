pub mod ai;
pub mod api;
pub mod config;
pub mod route;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use crate::ai::ollama::OllamaProvider;
use crate::ai::providers::AIProvider;
use crate::config::OllamaConfig;

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ollama = OllamaConfig::from_env();
    tracing::info!(base_url = %ollama.base_url, model = %ollama.model, "using inference daemon");
    let provider: Arc<dyn AIProvider> = Arc::new(OllamaProvider::new(ollama));

    let router = route::create_router(provider);

    // Headless deployments ship a prebuilt ui/ folder next to the binary.
    let ui_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("ui")));
    let router = match ui_dir.filter(|dir| dir.exists()) {
        Some(dir) => {
            tracing::info!(path = %dir.display(), "serving ui folder");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    let app = router.layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], *config::HTTP_PORT));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "floatchat server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("floatchat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
