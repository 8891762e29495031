//! Print ticket publishing
//!
//! The intake publishes one message per order to the printer topic.

mod iot;

pub use iot::IotPublisher;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("ticket encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("IoT publish to {topic} failed: {message}")]
    Iot { topic: String, message: String },
}

/// Publish a payload to a topic, QoS 1
#[async_trait]
pub trait TicketPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// Writes tickets to the log instead of the broker (development)
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl TicketPublisher for LogPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        tracing::info!(
            topic,
            payload = %String::from_utf8_lossy(&payload),
            "Ticket not sent, no IoT endpoint configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_publisher_accepts_every_ticket() {
        let publisher = LogPublisher;
        for _ in 0..3 {
            publisher
                .publish("printers/orders/print", br#"{"orderId":"A1"}"#.to_vec())
                .await
                .unwrap();
        }
    }
}
