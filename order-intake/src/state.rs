//! Application state for order-intake

use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_iotdataplane::Client as IotClient;
use aws_sdk_sesv2::Client as SesClient;

use crate::config::Config;
use crate::email::{ReceiptMailer, SesMailer};
use crate::publish::{IotPublisher, LogPublisher, TicketPublisher};
use crate::store::{DynamoStore, MemoryStore, OrderStore};
use crate::stripe::{PaymentGateway, StripeClient};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
///
/// Collaborators are built once at startup; tests swap in fakes through
/// [`AppState::from_parts`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Order table
    pub store: Arc<dyn OrderStore>,
    /// Printer topic publisher
    pub publisher: Arc<dyn TicketPublisher>,
    /// Receipt email transport
    pub mailer: Arc<dyn ReceiptMailer>,
    /// Charge lookups
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Create a new AppState backed by AWS and Stripe
    ///
    /// In development a missing table falls back to the in-memory store and
    /// a missing IoT endpoint to logging the tickets.
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let store: Arc<dyn OrderStore> = match &config.dynamodb_table_name {
            Some(table) => Arc::new(DynamoStore::new(DynamoClient::new(&aws_config), table)),
            None => {
                tracing::warn!("DYNAMODB_TABLE_NAME not set, orders are kept in memory");
                Arc::new(MemoryStore::new())
            }
        };

        let publisher: Arc<dyn TicketPublisher> = match &config.iot_data_endpoint {
            Some(endpoint) => {
                let iot_config = aws_sdk_iotdataplane::config::Builder::from(&aws_config)
                    .endpoint_url(endpoint)
                    .build();
                Arc::new(IotPublisher::new(IotClient::from_conf(iot_config)))
            }
            None => {
                tracing::warn!("IOT_DATA_ENDPOINT not set, tickets are only logged");
                Arc::new(LogPublisher)
            }
        };

        let ses_config = aws_config
            .to_builder()
            .region(aws_config::Region::new(config.ses_region.clone()))
            .build();
        let mailer = Arc::new(SesMailer::new(SesClient::new(&ses_config)));

        let payments = Arc::new(StripeClient::new(
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
        )?);

        if config.stripe_webhook_secret.is_none() {
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set, all webhooks will be rejected");
        }

        Ok(Self::from_parts(config, store, publisher, mailer, payments))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        config: Config,
        store: Arc<dyn OrderStore>,
        publisher: Arc<dyn TicketPublisher>,
        mailer: Arc<dyn ReceiptMailer>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            publisher,
            mailer,
            payments,
        }
    }
}
