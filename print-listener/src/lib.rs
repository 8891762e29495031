//! print-listener: kitchen ticket printer daemon
//!
//! Subscribes to the printer topic on the broker over mutual TLS and prints
//! one kitchen ticket per message on the attached thermal printer. Without a
//! printer, tickets are written to the log.

pub mod config;
pub mod daemon;
pub mod device;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod ticket;

pub use config::Config;
pub use error::{ConfigError, ListenerError};
pub use handler::{PrintHandler, PrintOutcome};
