//! # ticket-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Windows-1252 encoding for Latin text (accents, `€`)
//! - USB printing through the kernel device node (`/dev/usb/lp0`)
//! - Network printing (TCP port 9100)
//!
//! Business logic (WHAT to print) stays in application code:
//! - Kitchen ticket rendering → print-listener
//!
//! ## Example
//!
//! ```ignore
//! use ticket_printer::{DevicePrinter, EscPosBuilder, Printer};
//!
//! let mut builder = EscPosBuilder::new(42);
//! builder.center();
//! builder.double_size();
//! builder.line("TAKEOUT");
//! builder.reset_size();
//! builder.sep_double();
//! builder.left();
//! builder.line("1. Salmon Roll (Qty: 2)");
//! builder.cut();
//!
//! let printer = DevicePrinter::new("/dev/usb/lp0");
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::{convert_to_cp1252, text_width};
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use printer::{DevicePrinter, NetworkPrinter, Printer};
