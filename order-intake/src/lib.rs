//! order-intake: payment webhook and dine-in order intake
//!
//! Receives an order from a signed Stripe webhook or a direct dine-in
//! request, normalizes it, then:
//! - writes one record to the order table (DynamoDB)
//! - publishes one print ticket to the printer topic (AWS IoT)
//! - emails a receipt for takeout orders (SES)

pub mod api;
pub mod config;
pub mod email;
pub mod error;
pub mod intake;
pub mod publish;
pub mod state;
pub mod store;
pub mod stripe;

pub use config::Config;
pub use error::IntakeError;
pub use state::AppState;
