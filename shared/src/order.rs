//! Order Model
//!
//! `Order` is the persisted record written by the intake service.
//! `PrintTicket` is the display projection published for kitchen printing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    /// Paid online through the payment processor
    #[serde(rename = "PAID")]
    Paid,
    /// Submitted from a table, paid at the counter
    #[serde(rename = "Dine-In")]
    DineIn,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::DineIn => "Dine-In",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// How the order is served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    Takeout,
    DineIn,
}

impl OrderType {
    /// Parse the wire name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "takeout" => Some(Self::Takeout),
            "dine-in" => Some(Self::DineIn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Takeout => "takeout",
            Self::DineIn => "dine-in",
        }
    }

    /// Ticket header text
    pub fn label(&self) -> &'static str {
        match self {
            Self::Takeout => "TAKEOUT",
            Self::DineIn => "DINE-IN",
        }
    }
}

/// Order line, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Selected options collapsed to display text ("Large, Extra ginger")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// Per-unit price including option modifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

/// Order entity (one record per `order_id`, last write wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub receipt_email: Option<String>,
    pub payment_status: PaymentStatus,
    pub order_type: Option<OrderType>,
    pub table_id: Option<String>,
    pub notes: String,
    pub items: Vec<OrderItem>,
    /// Total in currency unit, 2 decimal places
    pub total: Decimal,
    pub subtotal_cents: Option<Decimal>,
    pub tax_total_cents: Option<Decimal>,
    pub order_date: DateTime<Utc>,
}

impl Order {
    pub fn is_takeout(&self) -> bool {
        self.order_type == Some(OrderType::Takeout)
    }

    /// Project the fields the kitchen ticket needs
    pub fn print_ticket(&self) -> PrintTicket {
        PrintTicket {
            order_id: self.order_id.clone(),
            customer_name: Some(self.customer_name.clone()),
            notes: self.notes.clone(),
            order_type: self.order_type,
            table: self.table_id.clone(),
            total: self.total,
            items: self
                .items
                .iter()
                .map(|item| TicketItem {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    options: item.options.clone(),
                })
                .collect(),
        }
    }
}

/// Ticket line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

/// Message published to the printer topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTicket {
    pub order_id: String,
    pub customer_name: Option<String>,
    pub notes: String,
    pub order_type: Option<OrderType>,
    pub table: Option<String>,
    /// Decimal string, never a float
    pub total: Decimal,
    pub items: Vec<TicketItem>,
}
