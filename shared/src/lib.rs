//! Shared types for the order intake and print listener services
//!
//! Common types used across crates: the order model and its print
//! projection, money conversion, error codes and HTTP error bodies,
//! and the logging bootstrap.

pub mod error;
pub mod logger;
pub mod money;
pub mod order;

// Re-exports
pub use error::{ApiResponse, AppError, ErrorCode};
pub use money::{MoneyError, format_cad, round_money};
pub use order::{Order, OrderItem, OrderType, PaymentStatus, PrintTicket, TicketItem};
