//! DynamoDB order table

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use shared::{Order, OrderItem};

use super::{OrderStore, StoreError};

pub struct DynamoStore {
    client: DynamoClient,
    table: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl OrderStore for DynamoStore {
    async fn put_order(&self, order: &Order) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(order_to_item(order)))
            .send()
            .await
            .map_err(|e| StoreError::Dynamo(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(order_id = %order.order_id, table = %self.table, "Order saved");
        Ok(())
    }
}

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

/// Decimals go over the wire as `N` strings, never floats
fn n(value: Decimal) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn item_to_attr(item: &OrderItem) -> AttributeValue {
    let mut map = HashMap::from([
        ("name".to_string(), s(&item.name)),
        ("quantity".to_string(), n(Decimal::from(item.quantity))),
    ]);
    if let Some(options) = &item.options {
        map.insert("options".to_string(), s(options));
    }
    if let Some(price) = item.price {
        map.insert("price".to_string(), n(price));
    }
    AttributeValue::M(map)
}

/// Convert an order to a DynamoDB item
///
/// Absent optional fields are left out of the item.
pub fn order_to_item(order: &Order) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("orderId".to_string(), s(&order.order_id)),
        ("customerName".to_string(), s(&order.customer_name)),
        ("paymentStatus".to_string(), s(order.payment_status.as_str())),
        ("notes".to_string(), s(&order.notes)),
        (
            "items".to_string(),
            AttributeValue::L(order.items.iter().map(item_to_attr).collect()),
        ),
        ("total".to_string(), n(order.total)),
        ("orderDate".to_string(), s(order.order_date.to_rfc3339_opts(SecondsFormat::Secs, true))),
    ]);

    let optional = [
        ("paymentId", order.payment_id.as_deref().map(s)),
        ("customerPhone", order.customer_phone.as_deref().map(s)),
        ("receiptEmail", order.receipt_email.as_deref().map(s)),
        ("orderType", order.order_type.map(|t| s(t.as_str()))),
        ("tableId", order.table_id.as_deref().map(s)),
        ("subtotalCents", order.subtotal_cents.map(n)),
        ("taxTotalCents", order.tax_total_cents.map(n)),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            item.insert(key.to_string(), value);
        }
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use shared::{OrderType, PaymentStatus};

    #[test]
    fn test_order_to_item() {
        let order = Order {
            order_id: "K3F9Q".to_string(),
            payment_id: Some("pi_1".to_string()),
            customer_name: "Ken".to_string(),
            customer_phone: None,
            receipt_email: Some("a@b.com".to_string()),
            payment_status: PaymentStatus::Paid,
            order_type: Some(OrderType::Takeout),
            table_id: None,
            notes: String::new(),
            items: vec![OrderItem {
                name: "Roll".to_string(),
                quantity: 2,
                options: None,
                price: Some(Decimal::new(850, 2)),
            }],
            total: Decimal::new(1700, 2),
            subtotal_cents: Some(Decimal::from(1700)),
            tax_total_cents: None,
            order_date: DateTime::from_timestamp(1_760_000_000, 0).unwrap(),
        };

        let item = order_to_item(&order);
        assert_eq!(item["total"], AttributeValue::N("17.00".to_string()));
        assert_eq!(item["paymentStatus"], AttributeValue::S("PAID".to_string()));
        assert_eq!(item["orderType"], AttributeValue::S("takeout".to_string()));
        assert_eq!(item["orderDate"], AttributeValue::S("2025-10-09T08:53:20Z".to_string()));
        assert_eq!(item["subtotalCents"], AttributeValue::N("1700".to_string()));
        assert!(!item.contains_key("tableId"));
        assert!(!item.contains_key("taxTotalCents"));

        let AttributeValue::L(items) = &item["items"] else {
            panic!("items should be a list");
        };
        let AttributeValue::M(line) = &items[0] else {
            panic!("item should be a map");
        };
        assert_eq!(line["price"], AttributeValue::N("8.50".to_string()));
        assert_eq!(line["quantity"], AttributeValue::N("2".to_string()));
    }
}
