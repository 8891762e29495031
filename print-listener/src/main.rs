//! print-listener: daemon entry point

use print_listener::ticket::TicketRenderer;
use print_listener::{Config, PrintHandler, daemon, device};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    shared::logger::init_logger("print-listener", "print_listener=info", log_dir.as_deref());

    let config = Config::from_env()?;
    tracing::info!(topic = %config.topic, "Starting print-listener");

    let printer = device::detect(&config).await;
    let handler = PrintHandler::new(
        printer,
        TicketRenderer::new(config.paper_width, config.timezone),
    );

    daemon::run(&config, &handler, shutdown_signal()).await?;

    tracing::info!("print-listener stopped");
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
