//! Order normalization and processing
//!
//! Both entry points (signed payment webhook and direct dine-in request)
//! produce an [`OrderSubmission`]. It is normalized into an [`Order`], then
//! [`process_order`] persists it, publishes the print ticket and sends the
//! receipt, in that order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::money::{decimal_from_json, money_from_json};
use shared::{Order, OrderItem, OrderType, PaymentStatus};
use uuid::Uuid;

use crate::email::{self, EmailOutcome};
use crate::error::IntakeError;
use crate::publish::PublishError;
use crate::state::AppState;
use crate::stripe::{Charge, PaymentIntent, PaymentMethodDetails};

/// Metadata keys the payment processor value always overrides
const PROCESSOR_FIELDS: [&str; 3] = ["paymentId", "paymentStatus", "transaction_timestamp"];

/// Raw order fields as submitted by the checkout front-end
///
/// Everything is optional; missing values get defaults during
/// normalization rather than rejecting the order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSubmission {
    /// Order id under any of the spellings the front-ends send; string or number
    #[serde(default)]
    pub order_id: Value,
    #[serde(default, rename = "orderId")]
    pub order_id_camel: Value,
    #[serde(default, rename = "orderNumber")]
    pub order_number: Value,
    #[serde(default, rename = "orderType")]
    pub order_type: Option<String>,
    /// Table number or label
    #[serde(default)]
    pub table: Value,
    #[serde(default)]
    pub notes: Option<String>,
    /// Cart serialized as a JSON string (payment metadata only holds strings)
    #[serde(default)]
    pub items_json: Option<String>,
    #[serde(default)]
    pub items: Value,
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub subtotal_cents: Value,
    #[serde(default)]
    pub tax_total_cents: Value,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default, rename = "customerName")]
    pub customer_name: Option<String>,
    #[serde(default, rename = "customerPhone")]
    pub customer_phone: Option<String>,
    #[serde(skip)]
    pub payment_id: Option<String>,
    /// Set by the entry point, never taken from the body
    #[serde(skip)]
    pub payment_status: PaymentStatus,
    /// Unix seconds
    #[serde(skip)]
    pub transaction_timestamp: Option<i64>,
}

impl OrderSubmission {
    /// Parse a direct dine-in request body
    pub fn from_dine_in(body: &[u8]) -> Result<Self, IntakeError> {
        let mut submission: Self = serde_json::from_slice(body)?;
        submission.payment_status = PaymentStatus::DineIn;
        Ok(submission)
    }

    /// Merge payment intent metadata with the charge billing details
    ///
    /// Contact fields prefer metadata and fall back to billing details.
    pub fn from_payment_intent(
        intent: &PaymentIntent,
        charge: Option<&Charge>,
    ) -> Result<Self, IntakeError> {
        let metadata: Map<String, Value> = intent
            .metadata
            .iter()
            .filter(|(key, _)| !PROCESSOR_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        let mut submission: Self = serde_json::from_value(Value::Object(metadata))?;

        if let Some(billing) = charge.map(|c| &c.billing_details) {
            if non_empty(submission.receipt_email.as_deref()).is_none() {
                submission.receipt_email = billing.email.clone();
            }
            if non_empty(submission.customer_name.as_deref()).is_none() {
                submission.customer_name = billing.name.clone();
            }
        }

        submission.payment_id = Some(intent.id.clone());
        submission.payment_status = PaymentStatus::Paid;
        submission.transaction_timestamp = intent.created;
        Ok(submission)
    }

    /// Normalize into the persisted order
    ///
    /// `received_at` is used as the order date when the processor gave no
    /// transaction time.
    pub fn into_order(self, received_at: DateTime<Utc>) -> Result<Order, IntakeError> {
        let total = match money_from_json(&self.total) {
            Ok(Some(total)) => total,
            Ok(None) => {
                tracing::warn!("Order has no total, recording 0.00");
                shared::round_money(Decimal::ZERO)
            }
            Err(_) => return Err(IntakeError::InvalidTotal(self.total.to_string())),
        };

        let order_type = non_empty(self.order_type.as_deref()).and_then(|raw| {
            let parsed = OrderType::parse(raw);
            if parsed.is_none() {
                tracing::warn!(order_type = raw, "Unrecognized order type");
            }
            parsed
        });

        let payment_id = non_empty(self.payment_id.as_deref()).map(str::to_string);
        let order_id = [&self.order_id, &self.order_id_camel, &self.order_number]
            .into_iter()
            .find_map(scalar_text)
            .or_else(|| payment_id.clone())
            .unwrap_or_else(generate_order_id);

        let table_id = match order_type {
            Some(OrderType::Takeout) => None,
            _ => scalar_text(&self.table),
        };

        let order_date = self
            .transaction_timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(received_at);

        Ok(Order {
            items: parse_items(self.items_json.as_deref(), &self.items),
            subtotal_cents: cents_field("subtotal_cents", &self.subtotal_cents),
            tax_total_cents: cents_field("tax_total_cents", &self.tax_total_cents),
            customer_name: non_empty(self.customer_name.as_deref())
                .unwrap_or("N/A")
                .to_string(),
            customer_phone: non_empty(self.customer_phone.as_deref()).map(str::to_string),
            receipt_email: non_empty(self.receipt_email.as_deref()).map(str::to_string),
            notes: self.notes.unwrap_or_default(),
            payment_status: self.payment_status,
            order_id,
            payment_id,
            order_type,
            table_id,
            total,
            order_date,
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Short upper-case id for orders that arrive without one
fn generate_order_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

/// String or number as trimmed text; anything else counts as absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s)).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer-cents field; unreadable values are dropped with a warning
fn cents_field(name: &str, value: &Value) -> Option<Decimal> {
    decimal_from_json(value).unwrap_or_else(|e| {
        tracing::warn!(field = name, error = %e, "Ignoring unreadable amount");
        None
    })
}

/// Items from `items_json` (string) or `items` (array)
///
/// A parse failure means no items.
pub fn parse_items(items_json: Option<&str>, items: &Value) -> Vec<OrderItem> {
    let parsed;
    let list = match non_empty(items_json) {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse items_json");
                return Vec::new();
            }
        },
        None => items,
    };

    match list {
        Value::Array(entries) => entries.iter().filter_map(normalize_item).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(items = %other, "Items are not a list");
            Vec::new()
        }
    }
}

/// Accepts the cart shape (`menuItem.name`, `finalPrice`, `selectedOptions`)
/// and the flat shape (`name`, `price`, `options`)
fn normalize_item(entry: &Value) -> Option<OrderItem> {
    let Value::Object(obj) = entry else {
        tracing::warn!(item = %entry, "Skipping item that is not an object");
        return None;
    };

    let name = obj
        .get("menuItem")
        .and_then(|m| m.get("name"))
        .or_else(|| obj.get("name"))
        .and_then(Value::as_str)
        .and_then(|n| non_empty(Some(n)))
        .unwrap_or("Unknown Item")
        .to_string();

    let quantity = match obj.get("quantity") {
        Some(Value::Number(n)) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(1);

    let price = obj
        .get("finalPrice")
        .or_else(|| obj.get("price"))
        .and_then(|p| money_from_json(p).ok().flatten());

    let options = obj
        .get("selectedOptions")
        .and_then(selected_options_text)
        .or_else(|| obj.get("options").and_then(options_text));

    Some(OrderItem {
        name,
        quantity,
        options,
        price,
    })
}

/// `{group: {name, priceModifier}}` to `"Large, Extra ginger"`
fn selected_options_text(value: &Value) -> Option<String> {
    let names: Vec<&str> = match value {
        Value::Object(groups) => groups
            .values()
            .filter_map(|choice| match choice {
                Value::Object(c) => c.get("name").and_then(Value::as_str),
                Value::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect(),
        _ => return None,
    };
    join_options(names)
}

fn options_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s)).map(str::to_string),
        Value::Array(list) => join_options(list.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn join_options(names: Vec<&str>) -> Option<String> {
    let names: Vec<&str> = names.into_iter().filter_map(|n| non_empty(Some(n))).collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// Result of a processed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub order_id: String,
    pub email: EmailOutcome,
}

/// Persist, publish, then (takeout only) email
///
/// A store failure stops before publishing. Email problems never fail the
/// intake.
pub async fn process_order(
    state: &AppState,
    order: &Order,
    payment: Option<&PaymentMethodDetails>,
) -> Result<IntakeOutcome, IntakeError> {
    tracing::info!(
        order_id = %order.order_id,
        order_type = ?order.order_type,
        payment_status = order.payment_status.as_str(),
        items = order.items.len(),
        total = %order.total,
        "Processing order"
    );

    state.store.put_order(order).await?;

    let payload = serde_json::to_vec(&order.print_ticket()).map_err(PublishError::from)?;
    state
        .publisher
        .publish(&state.config.printer_topic, payload)
        .await?;

    let email = email::send_receipt(state.mailer.as_ref(), &state.config, order, payment).await;

    Ok(IntakeOutcome {
        order_id: order.order_id.clone(),
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::BillingDetails;
    use serde_json::json;

    fn submission(body: Value) -> OrderSubmission {
        OrderSubmission::from_dine_in(body.to_string().as_bytes()).unwrap()
    }

    fn received() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    #[test]
    fn test_cart_items_from_items_json() {
        let order = submission(json!({
            "orderType": "takeout",
            "items_json": "[{\"menuItem\":{\"name\":\"Roll\"},\"quantity\":2,\"finalPrice\":8.5}]",
            "total": 17.0,
            "subtotal_cents": 1700,
            "tax_total_cents": 85,
            "receipt_email": "a@b.com"
        }))
        .into_order(received())
        .unwrap();

        assert_eq!(order.total.to_string(), "17.00");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Roll");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price.unwrap().to_string(), "8.50");
        assert_eq!(order.subtotal_cents, Some(Decimal::from(1700)));
        assert_eq!(order.tax_total_cents, Some(Decimal::from(85)));
        assert_eq!(order.receipt_email.as_deref(), Some("a@b.com"));
        assert_eq!(order.order_type, Some(OrderType::Takeout));
        assert_eq!(order.customer_name, "N/A");
        assert_eq!(order.notes, "");
        assert_eq!(order.order_date, received());
    }

    #[test]
    fn test_dine_in_status_cannot_be_overridden() {
        let order = submission(json!({
            "orderType": "dine-in",
            "table": 12,
            "paymentStatus": "PAID",
            "items": [{ "name": "Miso", "quantity": 1 }],
            "total": "4.5"
        }))
        .into_order(received())
        .unwrap();

        assert_eq!(order.payment_status, PaymentStatus::DineIn);
        assert_eq!(order.table_id.as_deref(), Some("12"));
        assert_eq!(order.total.to_string(), "4.50");
    }

    #[test]
    fn test_half_up_rounding_of_total() {
        let order = submission(json!({ "total": 10.005 })).into_order(received()).unwrap();
        assert_eq!(order.total.to_string(), "10.01");
    }

    #[test]
    fn test_invalid_total_is_rejected() {
        let err = submission(json!({ "total": "seventeen" }))
            .into_order(received())
            .unwrap_err();
        assert!(matches!(err, IntakeError::InvalidTotal(_)));
    }

    #[test]
    fn test_generated_order_id() {
        let order = submission(json!({ "total": 1 })).into_order(received()).unwrap();
        assert_eq!(order.order_id.len(), 8);
        assert_eq!(order.order_id, order.order_id.to_uppercase());
    }

    #[test]
    fn test_bad_items_json_means_no_items() {
        let order = submission(json!({ "items_json": "[{oops", "total": 1 }))
            .into_order(received())
            .unwrap();
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_item_options() {
        let items = parse_items(
            None,
            &json!([
                {
                    "menuItem": { "name": "Ramen" },
                    "selectedOptions": {
                        "broth": { "name": "Tonkotsu", "priceModifier": 0 },
                        "size": { "name": "Large", "priceModifier": 2 }
                    }
                },
                { "name": "Roll", "options": ["No wasabi", "Extra ginger"], "quantity": "3" },
                { "name": "Tea", "options": "Hot" },
                "garbage"
            ]),
        );

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].options.as_deref(), Some("Tonkotsu, Large"));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].options.as_deref(), Some("No wasabi, Extra ginger"));
        assert_eq!(items[1].quantity, 3);
        assert_eq!(items[2].options.as_deref(), Some("Hot"));
    }

    #[test]
    fn test_payment_intent_merge() {
        let intent: PaymentIntent = serde_json::from_value(json!({
            "id": "pi_123",
            "created": 1_760_000_100,
            "latest_charge": "ch_1",
            "metadata": {
                "order_id": "K3F9Q",
                "orderType": "takeout",
                "customerName": "Ken",
                "paymentStatus": "UNKNOWN",
                "items_json": "[]",
                "total": "17.00",
                "subtotal_cents": "1700"
            }
        }))
        .unwrap();
        let charge = Charge {
            id: "ch_1".to_string(),
            billing_details: BillingDetails {
                email: Some("billing@b.com".to_string()),
                name: Some("Billing Name".to_string()),
            },
            payment_method_details: None,
        };

        let order = OrderSubmission::from_payment_intent(&intent, Some(&charge))
            .unwrap()
            .into_order(received())
            .unwrap();

        assert_eq!(order.order_id, "K3F9Q");
        assert_eq!(order.payment_id.as_deref(), Some("pi_123"));
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.customer_name, "Ken");
        assert_eq!(order.receipt_email.as_deref(), Some("billing@b.com"));
        assert_eq!(order.subtotal_cents, Some(Decimal::from(1700)));
        assert_eq!(order.order_date.timestamp(), 1_760_000_100);
    }

    #[test]
    fn test_order_id_spellings() {
        let numeric = submission(json!({ "order_id": 42, "total": 1 }))
            .into_order(received())
            .unwrap();
        assert_eq!(numeric.order_id, "42");

        let camel = submission(json!({ "orderId": "A7", "total": 1 }))
            .into_order(received())
            .unwrap();
        assert_eq!(camel.order_id, "A7");

        let number = submission(json!({ "orderNumber": 1042, "order_id": "", "total": 1 }))
            .into_order(received())
            .unwrap();
        assert_eq!(number.order_id, "1042");

        let ignored = submission(json!({ "order_id": { "id": 1 }, "total": 1 }))
            .into_order(received())
            .unwrap();
        assert_eq!(ignored.order_id.len(), 8);
    }

    #[test]
    fn test_order_type_is_exact() {
        for raw in ["pickup", "Take-Out", "Dine In"] {
            let order = submission(json!({ "orderType": raw, "total": 1 }))
                .into_order(received())
                .unwrap();
            assert_eq!(order.order_type, None, "{raw}");
        }
    }

    #[test]
    fn test_order_id_falls_back_to_payment_id() {
        let intent: PaymentIntent =
            serde_json::from_value(json!({ "id": "pi_9", "metadata": { "total": "1" } })).unwrap();
        let order = OrderSubmission::from_payment_intent(&intent, None)
            .unwrap()
            .into_order(received())
            .unwrap();
        assert_eq!(order.order_id, "pi_9");
    }
}
