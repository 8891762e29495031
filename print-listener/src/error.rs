//! Print listener errors
//!
//! Everything here is fatal to the daemon. Per-message problems (bad JSON,
//! printer I/O) are handled in place and never surface as errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid PEM file {}: {reason}", path.display())]
    Tls { path: PathBuf, reason: String },

    #[error("no connection to the broker within {0}s")]
    ConnectTimeout(u64),

    #[error("no subscription acknowledgement within {0}s")]
    SubscribeTimeout(u64),

    #[error("broker rejected the subscription to {0}")]
    SubscriptionRejected(String),

    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
