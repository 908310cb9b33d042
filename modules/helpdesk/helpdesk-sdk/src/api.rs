//! Client trait for the remote ticket/user service.

use async_trait::async_trait;

use crate::error::HelpdeskError;
use crate::models::{
    Identity, IdentityPatch, Interaction, NewTicket, NewUser, Role, Ticket, TicketId,
    TicketPriority, TicketRef, TicketStatus, TicketUpdate, UserId,
};

/// Operations offered by the remote ticket/user service.
///
/// Implementations own the wire format and hand back canonical domain
/// values; callers never see the service's record shapes. The trait is
/// object safe so the session layer can hold an `Arc<dyn HelpdeskClient>`
/// and tests can swap in a fake.
///
/// ```ignore
/// let client: Arc<dyn HelpdeskClient> = Arc::new(HttpHelpdeskClient::new(&config)?);
/// let me = client.login("ana@example.com").await?;
/// let tickets = client.list_tickets(me.id, me.role).await?;
/// ```
#[async_trait]
pub trait HelpdeskClient: Send + Sync {
    /// Resolve the user behind a stored session email.
    ///
    /// # Errors
    /// `NotAuthenticated` when the service does not know the email.
    async fn who_am_i(&self, email: &str) -> Result<Identity, HelpdeskError>;

    /// Start a session for `email`.
    ///
    /// # Errors
    /// `Authentication` carrying the service's reason when it refuses.
    async fn login(&self, email: &str) -> Result<Identity, HelpdeskError>;

    /// Create an account.
    async fn register(&self, user: &NewUser) -> Result<Identity, HelpdeskError>;

    /// Tickets visible to `user_id` acting as `role`: their own for
    /// customers, all for staff. Scoping is enforced by the service.
    async fn list_tickets(&self, user_id: UserId, role: Role)
    -> Result<Vec<Ticket>, HelpdeskError>;

    /// Open a ticket on behalf of a customer.
    async fn create_ticket(
        &self,
        operator_id: UserId,
        ticket: &NewTicket,
    ) -> Result<TicketRef, HelpdeskError>;

    async fn change_status(
        &self,
        ticket_id: &TicketId,
        status: TicketStatus,
    ) -> Result<TicketUpdate, HelpdeskError>;

    async fn change_priority(
        &self,
        ticket_id: &TicketId,
        priority: TicketPriority,
    ) -> Result<TicketUpdate, HelpdeskError>;

    /// Interactions of a ticket, oldest first.
    async fn ticket_history(&self, ticket_id: &TicketId)
    -> Result<Vec<Interaction>, HelpdeskError>;

    async fn list_users(&self) -> Result<Vec<Identity>, HelpdeskError>;

    async fn update_user(
        &self,
        id: UserId,
        patch: &IdentityPatch,
    ) -> Result<Identity, HelpdeskError>;
}
