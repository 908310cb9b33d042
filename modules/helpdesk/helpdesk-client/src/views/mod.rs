//! Presentation state for each page, without markup.
//!
//! Reads degrade to empty lists plus a notice; mutations report failures as
//! inline text and also return the error to the caller.

mod forms;
mod history;
mod reports;
mod tickets;
mod users;

pub use forms::{LoginForm, RegisterForm};
pub use history::{HistoryEntry, TicketHistoryView};
pub use reports::{ChartSlice, ReportView, TicketSummary};
pub use tickets::{TicketBoard, TicketFilter};
pub use users::UserDirectory;

use helpdesk_sdk::{HelpdeskError, Identity};

fn require_staff(identity: &Identity, action: &'static str) -> Result<(), HelpdeskError> {
    if identity.role.is_staff() {
        Ok(())
    } else {
        Err(HelpdeskError::Forbidden { action })
    }
}

/// Fraction of `total` that `part` represents, `0.0` for an empty total.
fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let part = u32::try_from(part).unwrap_or(u32::MAX);
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    f64::from(part) / f64::from(total)
}
