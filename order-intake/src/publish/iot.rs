//! AWS IoT data plane publisher

use async_trait::async_trait;
use aws_sdk_iotdataplane::Client as IotClient;
use aws_sdk_iotdataplane::error::DisplayErrorContext;
use aws_sdk_iotdataplane::primitives::Blob;

use super::{PublishError, TicketPublisher};

pub struct IotPublisher {
    client: IotClient,
}

impl IotPublisher {
    pub fn new(client: IotClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TicketPublisher for IotPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.client
            .publish()
            .topic(topic)
            .qos(1)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| PublishError::Iot {
                topic: topic.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::info!(topic, "Ticket published");
        Ok(())
    }
}
