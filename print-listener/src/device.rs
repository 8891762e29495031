//! Printer detection
//!
//! A network printer (`PRINTER_ADDR`) takes precedence over the USB device
//! node. Detection runs once at startup; when it finds nothing, tickets go
//! to the log for the lifetime of the process.

use ticket_printer::{DevicePrinter, NetworkPrinter, PrintResult, Printer};
use tracing::{info, warn};

use crate::config::Config;

/// The printer found at startup
#[derive(Debug, Clone)]
pub enum AttachedPrinter {
    Device(DevicePrinter),
    Network(NetworkPrinter),
}

impl Printer for AttachedPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            Self::Device(p) => p.print(data).await,
            Self::Network(p) => p.print(data).await,
        }
    }

    async fn is_online(&self) -> bool {
        match self {
            Self::Device(p) => p.is_online().await,
            Self::Network(p) => p.is_online().await,
        }
    }
}

pub async fn detect(config: &Config) -> Option<AttachedPrinter> {
    let printer = match config.printer_addr.as_deref() {
        Some(addr) => match NetworkPrinter::from_addr(addr) {
            Ok(p) => AttachedPrinter::Network(p),
            Err(e) => {
                warn!(addr, error = %e, "Ignoring PRINTER_ADDR");
                return None;
            }
        },
        None => AttachedPrinter::Device(DevicePrinter::new(&config.printer_device)),
    };

    if printer.is_online().await {
        info!(?printer, "Printer attached");
        Some(printer)
    } else {
        warn!(?printer, "No printer attached, tickets will be logged");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detects_device_node() {
        let node = tempfile::NamedTempFile::new().unwrap();
        let config = Config {
            printer_device: node.path().to_path_buf(),
            ..Config::with_endpoint("localhost")
        };

        let printer = detect(&config).await;
        assert!(matches!(printer, Some(AttachedPrinter::Device(_))));
    }

    #[tokio::test]
    async fn test_missing_device_node() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            printer_device: dir.path().join("lp0"),
            ..Config::with_endpoint("localhost")
        };

        assert!(detect(&config).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_network_address() {
        let config = Config {
            printer_addr: Some("kitchen-printer".to_string()),
            ..Config::with_endpoint("localhost")
        };

        assert!(detect(&config).await.is_none());
    }
}
