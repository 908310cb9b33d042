#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for helpdesk client integration tests

use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_client::{HistoryNavigator, MemorySessionStore, Route, SessionContext};
use helpdesk_sdk::{
    HelpdeskClient, HelpdeskError, Identity, IdentityPatch, Interaction, InteractionAuthor,
    NewTicket, NewUser, Role, Ticket, TicketId, TicketPriority, TicketRef, TicketStatus,
    TicketUpdate, UserId,
};
use parking_lot::Mutex;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Notify;

pub fn identity(id: UserId, role: Role, email: &str) -> Identity {
    Identity {
        id,
        display_name: format!("user{id}"),
        role,
        email: email.to_owned(),
        active: true,
    }
}

pub fn ticket(id: &str, status: TicketStatus, priority: TicketPriority) -> Ticket {
    Ticket {
        id: id.to_owned(),
        subject: format!("subject {id}"),
        description: String::new(),
        priority,
        status,
        created_at: datetime!(2024-03-01 10:00 UTC),
    }
}

pub fn interaction(id: i64, author: InteractionAuthor, at: OffsetDateTime) -> Interaction {
    Interaction {
        id,
        author,
        message: format!("message {id}"),
        created_at: at,
    }
}

/// Scripted [`HelpdeskClient`] that records every call.
///
/// `hold_responses` makes `login` and `who_am_i` wait until [`release`](Self::release).
#[derive(Default)]
pub struct FakeHelpdeskClient {
    pub who_am_i: Mutex<Option<Result<Identity, HelpdeskError>>>,
    pub login: Mutex<Option<Result<Identity, HelpdeskError>>>,
    pub register: Mutex<Option<Result<Identity, HelpdeskError>>>,
    pub tickets: Mutex<Option<Result<Vec<Ticket>, HelpdeskError>>>,
    pub created: Mutex<Option<Result<TicketRef, HelpdeskError>>>,
    pub update: Mutex<Option<Result<TicketUpdate, HelpdeskError>>>,
    pub history: Mutex<Option<Result<Vec<Interaction>, HelpdeskError>>>,
    pub users: Mutex<Option<Result<Vec<Identity>, HelpdeskError>>>,
    pub updated_user: Mutex<Option<Result<Identity, HelpdeskError>>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

fn scripted<T: Clone>(slot: &Mutex<Option<Result<T, HelpdeskError>>>) -> Result<T, HelpdeskError> {
    slot.lock()
        .clone()
        .unwrap_or_else(|| Err(HelpdeskError::network("not scripted")))
}

impl FakeHelpdeskClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn hold_responses(&self) {
        *self.gate.lock() = Some(Arc::new(Notify::new()));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().as_ref() {
            gate.notify_one();
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl HelpdeskClient for FakeHelpdeskClient {
    async fn who_am_i(&self, email: &str) -> Result<Identity, HelpdeskError> {
        self.record(format!("who_am_i {email}"));
        self.wait_gate().await;
        scripted(&self.who_am_i)
    }

    async fn login(&self, email: &str) -> Result<Identity, HelpdeskError> {
        self.record(format!("login {email}"));
        self.wait_gate().await;
        scripted(&self.login)
    }

    async fn register(&self, user: &NewUser) -> Result<Identity, HelpdeskError> {
        self.record(format!("register {}", user.email));
        scripted(&self.register)
    }

    async fn list_tickets(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<Vec<Ticket>, HelpdeskError> {
        self.record(format!("list_tickets {user_id} {}", role.as_wire()));
        scripted(&self.tickets)
    }

    async fn create_ticket(
        &self,
        operator_id: UserId,
        ticket: &NewTicket,
    ) -> Result<TicketRef, HelpdeskError> {
        self.record(format!("create_ticket {operator_id} {}", ticket.client_email));
        scripted(&self.created)
    }

    async fn change_status(
        &self,
        ticket_id: &TicketId,
        status: TicketStatus,
    ) -> Result<TicketUpdate, HelpdeskError> {
        self.record(format!("change_status {ticket_id} {}", status.as_wire()));
        scripted(&self.update)
    }

    async fn change_priority(
        &self,
        ticket_id: &TicketId,
        priority: TicketPriority,
    ) -> Result<TicketUpdate, HelpdeskError> {
        self.record(format!("change_priority {ticket_id} {}", priority.as_wire()));
        scripted(&self.update)
    }

    async fn ticket_history(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Interaction>, HelpdeskError> {
        self.record(format!("ticket_history {ticket_id}"));
        scripted(&self.history)
    }

    async fn list_users(&self) -> Result<Vec<Identity>, HelpdeskError> {
        self.record("list_users".to_owned());
        scripted(&self.users)
    }

    async fn update_user(
        &self,
        id: UserId,
        _patch: &IdentityPatch,
    ) -> Result<Identity, HelpdeskError> {
        self.record(format!("update_user {id}"));
        scripted(&self.updated_user)
    }
}

/// A session wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub client: Arc<FakeHelpdeskClient>,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<HistoryNavigator>,
    pub session: Arc<SessionContext>,
}

impl Harness {
    pub fn new(token: Option<&str>) -> Self {
        Self::with_client(FakeHelpdeskClient::new(), token)
    }

    pub fn with_client(client: FakeHelpdeskClient, token: Option<&str>) -> Self {
        let client = Arc::new(client);
        let store = Arc::new(token.map_or_else(MemorySessionStore::new, MemorySessionStore::with_token));
        let navigator = Arc::new(HistoryNavigator::new(Route::Home));
        let session = Arc::new(SessionContext::new(
            client.clone(),
            store.clone(),
            navigator.clone(),
        ));
        Self {
            client,
            store,
            navigator,
            session,
        }
    }
}
