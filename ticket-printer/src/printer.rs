//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - USB printers exposed by the kernel `usblp` driver (`/dev/usb/lp*`)
//! - Network printers (TCP port 9100)

use crate::error::{PrintError, PrintResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// USB printer addressed through its device node
///
/// The `usblp` driver exposes each attached printer as a character device
/// that accepts raw ESC/POS bytes. The node only exists while the printer
/// is plugged in.
#[derive(Debug, Clone)]
pub struct DevicePrinter {
    path: PathBuf,
}

impl DevicePrinter {
    /// Create a printer for the given device node (e.g. `/dev/usb/lp0`)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Printer for DevicePrinter {
    #[instrument(skip(data), fields(path = %self.path.display(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(PrintError::DeviceNotFound(self.path.clone()));
        }

        let mut device = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await?;

        device.write_all(data).await?;
        device.flush().await?;

        info!("Print job written to device");
        Ok(())
    }

    #[instrument(fields(path = %self.path.display()))]
    async fn is_online(&self) -> bool {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await
        {
            Ok(_) => {
                info!("Printer online");
                true
            }
            Err(e) => {
                warn!(error = %e, "Printer offline");
                false
            }
        }
    }
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
        })
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        info!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}
