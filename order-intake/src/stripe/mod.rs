//! Stripe integration via REST API (no SDK dependency)
//!
//! Webhook signature verification, the event payloads the intake reads,
//! and the charge lookup used to enrich a paid order.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

/// Event type that carries a paid order
pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("webhook signing secret is not configured")]
    MissingSecret,
    #[error("invalid Stripe-Signature header")]
    MalformedHeader,
    #[error("no v1 signature matches the payload")]
    Mismatch,
    #[error("webhook timestamp outside the 300s tolerance")]
    Expired,
}

/// Verify a Stripe webhook signature (HMAC-SHA256)
///
/// The header carries `t=<unix>` and one or more `v1=<hex>` entries; any
/// matching `v1` accepts the payload. `now` is the current unix time.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: Option<&str>,
    now: i64,
) -> Result<(), SignatureError> {
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingSecret)?;

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Constant-time comparison via hmac::verify_slice
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    Ok(())
}

// ========== Payloads ==========

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Creation time, unix seconds
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Charge id, or the charge object when expanded
    #[serde(default)]
    pub latest_charge: Option<Value>,
}

impl PaymentIntent {
    pub fn latest_charge_id(&self) -> Option<&str> {
        match self.latest_charge.as_ref()? {
            Value::String(id) => Some(id.as_str()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub billing_details: BillingDetails,
    #[serde(default)]
    pub payment_method_details: Option<PaymentMethodDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMethodDetails {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub wallet: Option<CardWallet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardWallet {
    #[serde(rename = "type")]
    pub kind: String,
}

// ========== Charge lookup ==========

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Stripe secret key is not configured")]
    NotConfigured,
    #[error("Stripe request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Stripe API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Payment processor lookups
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError>;
}

/// Stripe REST client
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn new(api_base: impl Into<String>, secret_key: Option<String>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured)?;

        let resp = self
            .http
            .get(format!("{}/v1/charges/{charge_id}", self.api_base))
            .basic_auth(secret_key, None::<&str>)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<Charge>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_760_000_000;

    fn sign(secret: &str, ts: i64, payload: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{ts}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let header = format!("t={NOW},v1={}", sign(SECRET, NOW, payload));
        assert_eq!(
            verify_webhook_signature(payload, &header, Some(SECRET), NOW + 10),
            Ok(())
        );
    }

    #[test]
    fn test_any_v1_may_match() {
        let payload = b"{}";
        let header = format!(
            "t={NOW},v1={},v1={}",
            sign("whsec_old", NOW, payload),
            sign(SECRET, NOW, payload)
        );
        assert!(verify_webhook_signature(payload, &header, Some(SECRET), NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload() {
        let header = format!("t={NOW},v1={}", sign(SECRET, NOW, b"{}"));
        assert_eq!(
            verify_webhook_signature(b"{ }", &header, Some(SECRET), NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_expired_timestamp() {
        let payload = b"{}";
        let header = format!("t={NOW},v1={}", sign(SECRET, NOW, payload));
        assert_eq!(
            verify_webhook_signature(payload, &header, Some(SECRET), NOW + 301),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_missing_secret_fails_closed() {
        let payload = b"{}";
        let header = format!("t={NOW},v1={}", sign("", NOW, payload));
        assert_eq!(
            verify_webhook_signature(payload, &header, None, NOW),
            Err(SignatureError::MissingSecret)
        );
        assert_eq!(
            verify_webhook_signature(payload, &header, Some(""), NOW),
            Err(SignatureError::MissingSecret)
        );
    }

    #[test]
    fn test_malformed_header() {
        for header in ["", "v1=abcd", "t=abc,v1=abcd", "t=123"] {
            assert_eq!(
                verify_webhook_signature(b"{}", header, Some(SECRET), NOW),
                Err(SignatureError::MalformedHeader),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_latest_charge_id_forms() {
        let plain: PaymentIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_1", "latest_charge": "ch_1"
        }))
        .unwrap();
        assert_eq!(plain.latest_charge_id(), Some("ch_1"));

        let expanded: PaymentIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_1", "latest_charge": { "id": "ch_2" }
        }))
        .unwrap();
        assert_eq!(expanded.latest_charge_id(), Some("ch_2"));

        let none: PaymentIntent =
            serde_json::from_value(serde_json::json!({ "id": "pi_1", "latest_charge": null })).unwrap();
        assert_eq!(none.latest_charge_id(), None);
    }

    #[test]
    fn test_charge_parses_wallet() {
        let charge: Charge = serde_json::from_value(serde_json::json!({
            "id": "ch_1",
            "billing_details": { "email": "a@b.com", "name": "Ken", "phone": null },
            "payment_method_details": {
                "type": "card",
                "card": { "brand": "visa", "last4": "4242", "wallet": { "type": "apple_pay" } }
            }
        }))
        .unwrap();
        let card = charge.payment_method_details.unwrap().card.unwrap();
        assert_eq!(card.wallet.unwrap().kind, "apple_pay");
        assert_eq!(charge.billing_details.email.as_deref(), Some("a@b.com"));
    }
}
