//! Kitchen ticket
//!
//! Parses the print message published by order intake and renders it for a
//! thermal printer, or as plain text for the log when no printer is attached.
//!
//! Parsing is lenient: the message shape changed over time, so identifiers,
//! quantities and options are accepted in every form a publisher has used.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use shared::OrderType;
use thiserror::Error;
use ticket_printer::EscPosBuilder;

const UNKNOWN_ITEM: &str = "Unknown Item";

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("print message is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobItem {
    pub name: String,
    pub quantity: u32,
    pub options: Vec<String>,
}

/// One kitchen ticket to print
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintJob {
    pub order_number: Option<String>,
    pub order_type: Option<OrderType>,
    pub table: Option<String>,
    pub notes: String,
    pub items: Vec<JobItem>,
}

#[derive(Deserialize)]
struct RawJob {
    #[serde(default)]
    items: Option<Vec<Value>>,
    #[serde(default)]
    notes: Option<Value>,
    #[serde(default, rename = "orderType")]
    order_type: Option<Value>,
    #[serde(default)]
    table: Option<Value>,
    #[serde(default, rename = "orderNumber")]
    order_number: Option<Value>,
    #[serde(default, rename = "orderId")]
    order_id: Option<Value>,
    #[serde(default, rename = "order_id")]
    order_id_snake: Option<Value>,
}

/// Scalar as display text; empty strings count as absent
///
/// Control characters other than newline are dropped so payload text can
/// never smuggle printer commands onto the ticket.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let printable: String = s
                .chars()
                .filter(|c| *c == '\n' || !c.is_control())
                .collect();
            Some(printable.trim().to_string()).filter(|s| !s.is_empty())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn quantity(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.unwrap_or(1)
}

fn options(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(list)) => list.iter().filter_map(|v| text(Some(v))).collect(),
        Some(other) => text(Some(other)).into_iter().collect(),
        None => Vec::new(),
    }
}

fn job_item(value: &Value) -> Option<JobItem> {
    let item = value.as_object()?;
    Some(JobItem {
        name: text(item.get("name")).unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
        quantity: quantity(item.get("quantity")),
        options: options(item.get("options")),
    })
}

impl PrintJob {
    /// Parse one broker message payload
    pub fn from_slice(payload: &[u8]) -> Result<Self, JobError> {
        let value: Value = serde_json::from_slice(payload)?;
        if !value.is_object() {
            return Err(JobError::NotAnObject);
        }
        let raw = RawJob::deserialize(value)?;

        let order_type = text(raw.order_type.as_ref()).and_then(|t| OrderType::parse(&t));
        let items = raw.items.unwrap_or_default();

        Ok(Self {
            order_number: text(raw.order_number.as_ref())
                .or_else(|| text(raw.order_id.as_ref()))
                .or_else(|| text(raw.order_id_snake.as_ref())),
            order_type,
            table: text(raw.table.as_ref()),
            notes: text(raw.notes.as_ref()).unwrap_or_default(),
            items: items.iter().filter_map(job_item).collect(),
        })
    }

    /// Ticket heading: the order type, else the kitchen station named by the topic
    pub fn heading(&self, topic: &str) -> String {
        match self.order_type {
            Some(order_type) => order_type.label().to_string(),
            None => station_from_topic(topic)
                .map(|station| format!("{} KITCHEN", station.to_uppercase()))
                .unwrap_or_else(|| "NEW ORDER".to_string()),
        }
    }

    /// `TABLE <n>` for dine-in orders that name a table
    pub fn table_line(&self) -> Option<String> {
        match (self.order_type, &self.table) {
            (Some(OrderType::DineIn), Some(table)) => Some(format!("TABLE {table}")),
            _ => None,
        }
    }
}

/// `printers/<station>/print` → `<station>`
pub fn station_from_topic(topic: &str) -> Option<&str> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("printers"), Some(station), Some("print"), None) if !station.is_empty() => {
            Some(station)
        }
        _ => None,
    }
}

/// Kitchen ticket renderer
pub struct TicketRenderer {
    width: usize,
    timezone: Tz,
}

impl TicketRenderer {
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    /// Render a job to ESC/POS bytes
    pub fn render(&self, job: &PrintJob, topic: &str, printed_at: DateTime<Utc>) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);

        self.render_header(&mut b, job, topic);
        self.render_notes(&mut b, job);
        self.render_items(&mut b, job);
        self.render_footer(&mut b, printed_at);

        b.build()
    }

    fn render_header(&self, b: &mut EscPosBuilder, job: &PrintJob, topic: &str) {
        b.center();
        b.double_size();
        b.bold();
        b.line(&job.heading(topic));
        if let Some(table) = job.table_line() {
            b.line(&table);
        }
        b.bold_off();
        b.reset_size();

        if let Some(ref number) = job.order_number {
            b.line(&format!("Order #{number}"));
        }

        b.left();
        b.sep_double();
    }

    fn render_notes(&self, b: &mut EscPosBuilder, job: &PrintJob) {
        if job.notes.is_empty() {
            b.line("No special notes.");
        } else {
            b.font_b();
            b.bold();
            b.double_height();
            b.wrapped("", &format!("NOTES: {}", job.notes));
            b.reset_size();
            b.bold_off();
            b.font_a();
        }
        b.sep_double();
        b.newline();
    }

    fn render_items(&self, b: &mut EscPosBuilder, job: &PrintJob) {
        if job.items.is_empty() {
            b.line("No items in this order.");
            return;
        }

        for (i, item) in job.items.iter().enumerate() {
            b.bold();
            b.wrapped("", &item_line(i + 1, item));
            b.bold_off();
            for option in &item.options {
                b.wrapped("    ", option);
            }
            b.newline();
        }
    }

    fn render_footer(&self, b: &mut EscPosBuilder, printed_at: DateTime<Utc>) {
        b.center();
        b.sep_double();
        b.line(&format!("Printed: {}", format_timestamp(printed_at, self.timezone)));
        b.left();

        b.feed(3);
        b.cut();
    }

    /// Plain-text rendering for the log
    pub fn render_console(&self, job: &PrintJob, topic: &str) -> String {
        let rule = "=".repeat(self.width);
        let mut out = vec![rule.clone(), job.heading(topic)];
        out.extend(job.table_line());
        if let Some(ref number) = job.order_number {
            out.push(format!("Order #{number}"));
        }
        out.push(if job.notes.is_empty() {
            "NOTES: none".to_string()
        } else {
            format!("NOTES: {}", job.notes)
        });
        out.push("ITEMS:".to_string());
        if job.items.is_empty() {
            out.push("  (none)".to_string());
        }
        for item in &job.items {
            out.push(format!("  - {} (Qty: {})", item.name, item.quantity));
            out.extend(item.options.iter().map(|o| format!("      {o}")));
        }
        out.push(rule);
        out.join("\n")
    }
}

fn item_line(position: usize, item: &JobItem) -> String {
    format!("{position}. {} (Qty: {})", item.name, item.quantity)
}

fn format_timestamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string()
}
