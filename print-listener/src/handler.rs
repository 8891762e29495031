//! Print message handler
//!
//! Turns one broker message into one printed ticket. The handler never
//! fails: malformed messages are dropped and printer problems fall back to
//! a console rendering in the log.

use chrono::Utc;
use ticket_printer::Printer;
use tracing::{error, info, warn};

use crate::ticket::{PrintJob, TicketRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Printed,
    /// No printer attached; the ticket went to the log
    ConsoleFallback,
    /// Printer I/O failed; the ticket went to the log
    Failed,
    /// Message could not be parsed
    Dropped,
}

impl PrintOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Printed)
    }
}

pub struct PrintHandler<P> {
    printer: Option<P>,
    renderer: TicketRenderer,
}

impl<P: Printer> PrintHandler<P> {
    pub fn new(printer: Option<P>, renderer: TicketRenderer) -> Self {
        Self { printer, renderer }
    }

    pub fn has_printer(&self) -> bool {
        self.printer.is_some()
    }

    pub async fn handle_message(&self, topic: &str, payload: &[u8]) -> PrintOutcome {
        let job = match PrintJob::from_slice(payload) {
            Ok(job) => job,
            Err(e) => {
                warn!(topic, bytes = payload.len(), error = %e, "Dropping malformed print message");
                return PrintOutcome::Dropped;
            }
        };

        info!(
            topic,
            order = job.order_number.as_deref().unwrap_or("-"),
            items = job.items.len(),
            "Print job received"
        );

        let Some(printer) = &self.printer else {
            info!("No printer attached, ticket follows\n{}", self.renderer.render_console(&job, topic));
            return PrintOutcome::ConsoleFallback;
        };

        let data = self.renderer.render(&job, topic, Utc::now());
        match printer.print(&data).await {
            Ok(()) => PrintOutcome::Printed,
            Err(e) => {
                error!(error = %e, "Printing failed, ticket follows\n{}", self.renderer.render_console(&job, topic));
                PrintOutcome::Failed
            }
        }
    }
}
