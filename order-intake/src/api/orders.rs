//! Order submission
//!
//! POST /orders: a request carrying `Stripe-Signature` is a payment webhook,
//! anything else is a dine-in submission from the table ordering page.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use shared::ApiResponse;

use crate::error::IntakeError;
use crate::intake::{OrderSubmission, process_order};
use crate::state::AppState;
use crate::stripe::{self, PaymentIntent, SignatureError, WebhookEvent};

pub const ORDER_PROCESSED: &str = "Order processed successfully";
pub const EVENT_IGNORED: &str = "Event ignored";

/// Handle an incoming order
///
/// Receives the raw body so the webhook signature can be checked against
/// the exact bytes Stripe signed.
pub async fn submit_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse, IntakeError> {
    match headers.get("stripe-signature") {
        Some(value) => {
            let sig_header = value
                .to_str()
                .map_err(|_| SignatureError::MalformedHeader)?;
            handle_webhook(&state, sig_header, &body).await
        }
        None => handle_dine_in(&state, &body).await,
    }
}

async fn handle_webhook(
    state: &AppState,
    sig_header: &str,
    body: &[u8],
) -> Result<ApiResponse, IntakeError> {
    stripe::verify_webhook_signature(
        body,
        sig_header,
        state.config.stripe_webhook_secret.as_deref(),
        Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_slice(body)?;
    tracing::info!(event_id = ?event.id, event_type = %event.event_type, "Received Stripe webhook");

    if event.event_type != stripe::PAYMENT_SUCCEEDED {
        tracing::debug!(event_type = %event.event_type, "Unhandled webhook event type");
        return Ok(ApiResponse::ok(EVENT_IGNORED));
    }

    let intent: PaymentIntent = serde_json::from_value(event.data.object)?;

    let charge = match intent.latest_charge_id() {
        Some(charge_id) => match state.payments.retrieve_charge(charge_id).await {
            Ok(charge) => {
                tracing::info!(charge_id, "Retrieved charge");
                Some(charge)
            }
            Err(e) => {
                tracing::error!(charge_id, error = %e, "Could not retrieve charge");
                None
            }
        },
        None => None,
    };

    let order = OrderSubmission::from_payment_intent(&intent, charge.as_ref())?.into_order(Utc::now())?;
    let payment = charge.as_ref().and_then(|c| c.payment_method_details.as_ref());
    let outcome = process_order(state, &order, payment).await?;

    tracing::info!(order_id = %outcome.order_id, email = ?outcome.email, "Webhook order processed");
    Ok(ApiResponse::ok(ORDER_PROCESSED))
}

async fn handle_dine_in(state: &AppState, body: &[u8]) -> Result<ApiResponse, IntakeError> {
    let order = OrderSubmission::from_dine_in(body)?.into_order(Utc::now())?;
    let outcome = process_order(state, &order, None).await?;

    tracing::info!(order_id = %outcome.order_id, email = ?outcome.email, "Dine-in order processed");
    Ok(ApiResponse::ok(ORDER_PROCESSED))
}
