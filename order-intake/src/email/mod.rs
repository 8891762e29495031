//! Receipt email
//!
//! Takeout orders get an HTML receipt through SES. Nothing in this module
//! fails the intake: every problem is logged and reported as an
//! [`EmailOutcome`].

pub mod receipt;

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::Order;
use thiserror::Error;

use crate::config::Config;
use crate::stripe::PaymentMethodDetails;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email content: {0}")]
    Build(String),
    #[error("SES send_email failed: {0}")]
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail transport
#[async_trait]
pub trait ReceiptMailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Amazon SES v2 mailer
pub struct SesMailer {
    ses: SesClient,
}

impl SesMailer {
    pub fn new(ses: SesClient) -> Self {
        Self { ses }
    }
}

fn utf8(data: String) -> Result<Content, MailError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl ReceiptMailer for SesMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let body = Body::builder().html(utf8(email.html)?).build();
        let message = Message::builder()
            .subject(utf8(email.subject)?)
            .body(body)
            .build();

        self.ses
            .send_email()
            .from_email_address(&email.from)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Send(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// What happened to the receipt of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent,
    /// Only takeout orders get a receipt
    NotTakeout,
    NoRecipient,
    NoSender,
    TemplateUnavailable,
    Failed,
}

pub fn receipt_subject(restaurant: &str, order_id: &str) -> String {
    format!("Your {restaurant} Receipt [{order_id}]")
}

/// Render and send the receipt for a takeout order
pub async fn send_receipt(
    mailer: &dyn ReceiptMailer,
    config: &Config,
    order: &Order,
    payment: Option<&PaymentMethodDetails>,
) -> EmailOutcome {
    if !order.is_takeout() {
        return EmailOutcome::NotTakeout;
    }

    let Some(to) = order.receipt_email.as_deref() else {
        tracing::warn!(order_id = %order.order_id, "No recipient email found, skipping receipt");
        return EmailOutcome::NoRecipient;
    };

    let Some(from) = config.sender_email.as_deref() else {
        tracing::warn!(order_id = %order.order_id, "SENDER_EMAIL not set, skipping receipt");
        return EmailOutcome::NoSender;
    };

    let template = match tokio::fs::read_to_string(&config.email_template_path).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(
                path = %config.email_template_path.display(),
                error = %e,
                "Receipt template unavailable, skipping receipt"
            );
            return EmailOutcome::TemplateUnavailable;
        }
    };

    let email = OutgoingEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: receipt_subject(&config.restaurant_name, &order.order_id),
        html: receipt::render_receipt(&template, order, payment),
    };

    match mailer.send(email).await {
        Ok(()) => {
            tracing::info!(order_id = %order.order_id, to, "Receipt sent");
            EmailOutcome::Sent
        }
        Err(e) => {
            tracing::error!(order_id = %order.order_id, to, error = %e, "Failed to send receipt");
            EmailOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::{OrderType, PaymentStatus};
    use std::io::Write;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl ReceiptMailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
            self.sent.lock().await.push(email);
            if self.fail {
                return Err(MailError::Send("throttled".to_string()));
            }
            Ok(())
        }
    }

    fn order(order_type: OrderType, email: Option<&str>) -> Order {
        Order {
            order_id: "A1".to_string(),
            payment_id: None,
            customer_name: "N/A".to_string(),
            customer_phone: None,
            receipt_email: email.map(str::to_string),
            payment_status: PaymentStatus::DineIn,
            order_type: Some(order_type),
            table_id: None,
            notes: String::new(),
            items: vec![],
            total: Decimal::new(1700, 2),
            subtotal_cents: None,
            tax_total_cents: None,
            order_date: Utc::now(),
        }
    }

    fn config_with_template(template: &tempfile::NamedTempFile) -> Config {
        Config {
            sender_email: Some("orders@example.com".to_string()),
            email_template_path: template.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn template() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>{}</p>", receipt::AMOUNT).unwrap();
        file
    }

    #[tokio::test]
    async fn test_sends_takeout_receipt() {
        let file = template();
        let config = config_with_template(&file);
        let mailer = RecordingMailer::default();

        let outcome = send_receipt(&mailer, &config, &order(OrderType::Takeout, Some("a@b.com")), None).await;

        assert_eq!(outcome, EmailOutcome::Sent);
        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(sent[0].from, "orders@example.com");
        assert_eq!(sent[0].subject, "Your Momotaro Sushi Receipt [A1]");
        assert_eq!(sent[0].html, "<p>CA$17.00</p>");
    }

    #[tokio::test]
    async fn test_skips_without_sending() {
        let file = template();
        let config = config_with_template(&file);
        let mailer = RecordingMailer::default();

        let dine_in = send_receipt(&mailer, &config, &order(OrderType::DineIn, Some("a@b.com")), None).await;
        assert_eq!(dine_in, EmailOutcome::NotTakeout);

        let no_recipient = send_receipt(&mailer, &config, &order(OrderType::Takeout, None), None).await;
        assert_eq!(no_recipient, EmailOutcome::NoRecipient);

        let no_sender = Config {
            sender_email: None,
            ..config.clone()
        };
        let outcome = send_receipt(&mailer, &no_sender, &order(OrderType::Takeout, Some("a@b.com")), None).await;
        assert_eq!(outcome, EmailOutcome::NoSender);

        let no_template = Config {
            email_template_path: file.path().with_extension("missing"),
            ..config.clone()
        };
        let outcome = send_receipt(&mailer, &no_template, &order(OrderType::Takeout, Some("a@b.com")), None).await;
        assert_eq!(outcome, EmailOutcome::TemplateUnavailable);

        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_reported_not_raised() {
        let file = template();
        let config = config_with_template(&file);
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };

        let outcome = send_receipt(&mailer, &config, &order(OrderType::Takeout, Some("a@b.com")), None).await;
        assert_eq!(outcome, EmailOutcome::Failed);
    }
}
