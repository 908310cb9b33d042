use std::sync::Arc;

use helpdesk_sdk::{
    HelpdeskClient, HelpdeskError, Identity, NewTicket, Role, Ticket, TicketId, TicketPriority,
    TicketRef, TicketStatus, TicketUpdate, UserId,
};
use tokio::sync::watch;

use super::require_staff;
use crate::session::SessionState;

const EMPTY_STATE: &str = "No hay tickets disponibles.";
const CREATE_FALLBACK: &str = "No se pudo crear el ticket";
const UPDATE_FALLBACK: &str = "No se pudo actualizar el ticket";
const CREATE_REQUIRED: &str = "Email del cliente y asunto son obligatorios";

/// Status and priority filter; `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl TicketFilter {
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|s| s == ticket.status)
            && self.priority.is_none_or(|p| p == ticket.priority)
    }
}

/// Ticket list of the signed-in user.
///
/// The list belongs to an (identity, role) pair and is fetched again only
/// when that pair changes.
pub struct TicketBoard {
    client: Arc<dyn HelpdeskClient>,
    owner: Option<Identity>,
    tickets: Vec<Ticket>,
    filter: TicketFilter,
    error: Option<String>,
}

impl TicketBoard {
    #[must_use]
    pub fn new(client: Arc<dyn HelpdeskClient>) -> Self {
        Self {
            client,
            owner: None,
            tickets: Vec::new(),
            filter: TicketFilter::default(),
            error: None,
        }
    }

    fn scope(&self) -> Option<(UserId, Role)> {
        self.owner.as_ref().map(|i| (i.id, i.role))
    }

    /// Follow the session state. Refetches when the (identity, role) pair
    /// differs from the one the list was loaded for; returns whether it did.
    pub async fn sync(&mut self, state: &SessionState) -> bool {
        let Some(identity) = state.resolved() else {
            return false;
        };
        if identity.map(|i| (i.id, i.role)) == self.scope() {
            return false;
        }

        self.owner = identity.cloned();
        self.error = None;
        if self.owner.is_some() {
            self.refresh().await;
        } else {
            self.tickets.clear();
        }
        true
    }

    /// Keep the board in step with the session until the session is gone.
    pub async fn follow(&mut self, mut session: watch::Receiver<SessionState>) {
        loop {
            let state = session.borrow_and_update().clone();
            self.sync(&state).await;
            if session.changed().await.is_err() {
                break;
            }
        }
    }

    /// Reload the list for the current owner. A failed read leaves the
    /// board empty.
    pub async fn refresh(&mut self) {
        let Some((user_id, role)) = self.scope() else {
            self.tickets.clear();
            return;
        };
        match self.client.list_tickets(user_id, role).await {
            Ok(tickets) => {
                tracing::debug!(count = tickets.len(), "tickets loaded");
                self.tickets = tickets;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tickets");
                self.tickets.clear();
            }
        }
    }

    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Tickets passing the current filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Ticket> {
        self.tickets
            .iter()
            .filter(|t| self.filter.matches(t))
            .collect()
    }

    #[must_use]
    pub fn filter(&self) -> TicketFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TicketFilter) {
        self.filter = filter;
    }

    /// Message for an empty board.
    #[must_use]
    pub fn empty_state(&self) -> Option<&'static str> {
        self.visible().is_empty().then_some(EMPTY_STATE)
    }

    /// Inline error from the last mutation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn can_create(&self) -> bool {
        self.owner.as_ref().is_some_and(|i| i.role.is_staff())
    }

    /// Open a ticket for a customer, then reload the list.
    ///
    /// # Errors
    /// `Forbidden` for non-staff, `Validation` for a blank client email or
    /// subject, otherwise the service's error.
    pub async fn create_ticket(&mut self, ticket: NewTicket) -> Result<TicketRef, HelpdeskError> {
        let result = self.try_create(ticket).await;
        self.record(&result, CREATE_FALLBACK);
        let created = result?;
        tracing::info!(ticket_id = %created.id, "ticket created");
        self.refresh().await;
        Ok(created)
    }

    async fn try_create(&self, ticket: NewTicket) -> Result<TicketRef, HelpdeskError> {
        let operator = self.staff("create ticket")?;
        let ticket = NewTicket {
            client_email: ticket.client_email.trim().to_owned(),
            subject: ticket.subject.trim().to_owned(),
            ..ticket
        };
        if ticket.client_email.is_empty() || ticket.subject.is_empty() {
            return Err(HelpdeskError::validation("asunto", CREATE_REQUIRED));
        }
        self.client.create_ticket(operator.id, &ticket).await
    }

    /// # Errors
    /// `Forbidden` for non-staff, otherwise the service's error.
    pub async fn change_status(
        &mut self,
        id: &TicketId,
        status: TicketStatus,
    ) -> Result<(), HelpdeskError> {
        let result = match self.staff("change ticket status") {
            Ok(_) => self.client.change_status(id, status).await,
            Err(e) => Err(e),
        };
        self.record(&result, UPDATE_FALLBACK);
        self.apply(id, result?, |t| t.status = status);
        Ok(())
    }

    /// # Errors
    /// `Forbidden` for non-staff, otherwise the service's error.
    pub async fn change_priority(
        &mut self,
        id: &TicketId,
        priority: TicketPriority,
    ) -> Result<(), HelpdeskError> {
        let result = match self.staff("change ticket priority") {
            Ok(_) => self.client.change_priority(id, priority).await,
            Err(e) => Err(e),
        };
        self.record(&result, UPDATE_FALLBACK);
        self.apply(id, result?, |t| t.priority = priority);
        Ok(())
    }

    fn staff(&self, action: &'static str) -> Result<&Identity, HelpdeskError> {
        let identity = self.owner.as_ref().ok_or(HelpdeskError::NotAuthenticated)?;
        require_staff(identity, action)?;
        Ok(identity)
    }

    fn record<T>(&mut self, result: &Result<T, HelpdeskError>, fallback: &str) {
        self.error = result.as_ref().err().map(|e| {
            tracing::debug!(error = %e, "ticket mutation failed");
            e.user_message(fallback)
        });
    }

    /// Use the service's record when it sent one, otherwise patch locally.
    fn apply(&mut self, id: &TicketId, update: TicketUpdate, patch: impl FnOnce(&mut Ticket)) {
        let Some(slot) = self.tickets.iter_mut().find(|t| &t.id == id) else {
            return;
        };
        match update {
            TicketUpdate::Full(ticket) => *slot = ticket,
            TicketUpdate::Acknowledged => patch(slot),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn ticket(id: &str, status: TicketStatus, priority: TicketPriority) -> Ticket {
        Ticket {
            id: id.to_owned(),
            subject: "s".to_owned(),
            description: String::new(),
            priority,
            status,
            created_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn test_filter() {
        let t = ticket("1", TicketStatus::Open, TicketPriority::High);
        assert!(TicketFilter::default().matches(&t));
        assert!(
            TicketFilter {
                status: Some(TicketStatus::Open),
                priority: Some(TicketPriority::High),
            }
            .matches(&t)
        );
        assert!(
            !TicketFilter {
                status: Some(TicketStatus::Closed),
                priority: None,
            }
            .matches(&t)
        );
    }
}
