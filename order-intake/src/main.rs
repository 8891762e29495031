//! order-intake: HTTP entry point

use order_intake::{AppState, Config, api};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    shared::logger::init_logger(
        "order-intake",
        "order_intake=info,tower_http=info",
        log_dir.as_deref(),
    );

    let config = Config::from_env()?;
    tracing::info!("Starting order-intake (env: {})", config.environment);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(config).await?;
    let app = api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("order-intake HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("order-intake stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
