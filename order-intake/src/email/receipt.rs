//! Receipt HTML rendering
//!
//! The template is a static HTML document with placeholder tokens; each
//! token is replaced with pre-formatted, escaped markup.

use rust_decimal::Decimal;
use shared::money::cents_to_amount;
use shared::{Order, OrderItem, format_cad};

use crate::stripe::PaymentMethodDetails;

pub const RECEIPT_ID: &str = "__RECEIPT_ID_PLACEHOLDER__";
pub const ITEMS_LIST: &str = "__ITEMS_LIST_PLACEHOLDER__";
pub const AMOUNT: &str = "__AMOUNT_PLACEHOLDER__";
pub const DATE: &str = "__DATE_PLACEHOLDER__";
pub const PAYMENT_METHOD_CHIPS: &str = "__PAYMENT_METHOD_CHIPS_PLACEHOLDER__";
pub const SUBTOTAL: &str = "__SUBTOTAL_PLACEHOLDER__";
pub const TAX: &str = "__TAX_PLACEHOLDER__";

const CHIP_STYLE: &str = "display: inline-block; border-radius: 9999px; padding: 4px 10px; \
                          font-size: 12px; font-weight: 500; color: #ffffff;";

/// Fill every placeholder in `template` from the order
pub fn render_receipt(
    template: &str,
    order: &Order,
    payment: Option<&PaymentMethodDetails>,
) -> String {
    let subtotal = cents_to_amount(order.subtotal_cents.unwrap_or(Decimal::ZERO));
    let tax = cents_to_amount(order.tax_total_cents.unwrap_or(Decimal::ZERO));

    template
        .replace(RECEIPT_ID, &escape_html(&order.order_id))
        .replace(ITEMS_LIST, &item_rows(&order.items))
        .replace(AMOUNT, &format_cad(order.total))
        .replace(DATE, &order.order_date.format("%b %d, %Y").to_string())
        .replace(PAYMENT_METHOD_CHIPS, &payment_chip(payment))
        .replace(SUBTOTAL, &format_cad(subtotal))
        .replace(TAX, &format_cad(tax))
}

fn item_rows(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "<tr>\
                 <td style=\"padding: 8px 0; font-size: 14px; color: #0f172a;\">{}x {}</td>\
                 <td style=\"padding: 8px 0; font-size: 14px; color: #0f172a; text-align: right;\">{}</td>\
                 </tr>",
                item.quantity,
                escape_html(&item.name),
                format_cad(item.price.unwrap_or(Decimal::ZERO)),
            )
        })
        .collect()
}

fn chip(background: &str, label: &str) -> String {
    format!("<div style=\"background-color: {background}; {CHIP_STYLE}\">{label}</div>")
}

/// Payment method badge
///
/// Apple Pay and Google Pay get a wallet badge; everything else is labelled
/// by card brand. Unknown payment method renders nothing.
pub fn payment_chip(payment: Option<&PaymentMethodDetails>) -> String {
    let Some(card) = payment.and_then(|p| p.card.as_ref()) else {
        return String::new();
    };

    match card.wallet.as_ref().map(|w| w.kind.to_lowercase()).as_deref() {
        Some("apple_pay") => return chip("#000000", "Apple Pay"),
        Some("google_pay") => return chip("#1a73e8", "Google Pay"),
        _ => {}
    }

    let last4 = escape_html(card.last4.as_deref().unwrap_or(""));
    let brand = card.brand.as_deref().unwrap_or("card").to_lowercase();
    match brand.as_str() {
        "visa" => chip("#2563eb", &format!("VISA •••• {last4}")),
        "mastercard" => chip("#ea580c", &format!("Mastercard •••• {last4}")),
        "amex" => chip("#0284c7", &format!("AMEX •••• {last4}")),
        _ => chip("#334155", &format!("Card •••• {last4}")),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
