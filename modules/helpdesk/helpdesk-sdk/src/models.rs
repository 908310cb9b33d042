//! Domain models for the helpdesk module.
//!
//! The remote service speaks Spanish (`operador`, `en_proceso`, `alta`); these
//! types are the canonical in-process shapes. Each enum knows its wire value
//! and its display label, and parses leniently from either.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Primary key of a user on the remote service.
pub type UserId = i64;

/// Ticket identifier. The service emits integers; they are carried as
/// strings so the rest of the client never does arithmetic on them.
pub type TicketId = String;

/// A string did not name any variant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: '{value}'")]
pub struct ParseEnumError {
    /// Which enum was being parsed (`"role"`, `"priority"`...).
    pub kind: &'static str,
    /// The rejected input, as received.
    pub value: String,
}

/// Lowercase with word separators dropped, so `in_progress`, `In Progress`
/// and `InProgress` compare equal.
fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_lowercase()
}

/// Match `raw` against every spelling a variant answers to (wire value,
/// display label, English name), ignoring case, `_`/`-`/space separators
/// and camel-case word joins.
fn parse_variant<T: Copy>(
    kind: &'static str,
    raw: &str,
    variants: &[T],
    spellings: impl Fn(T) -> [&'static str; 3],
) -> Result<T, ParseEnumError> {
    let needle = normalize(raw);
    variants
        .iter()
        .copied()
        .find(|v| spellings(*v).iter().any(|s| normalize(s) == needle))
        .ok_or_else(|| ParseEnumError {
            kind,
            value: raw.to_owned(),
        })
}

/// Role of a user. Gates every view and action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::Customer];

    /// Operators and admins see administration views and may create tickets.
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }

    /// Value sent to and received from the remote service.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operador",
            Role::Customer => "cliente",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Operator => "Operador",
            Role::Customer => "Cliente",
        }
    }

    fn spellings(self) -> [&'static str; 3] {
        let english = match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Customer => "customer",
        };
        [self.as_wire(), self.label(), english]
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("role", s, &Role::ALL, Role::spellings)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ticket priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            TicketPriority::Low => "baja",
            TicketPriority::Medium => "media",
            TicketPriority::High => "alta",
            TicketPriority::Urgent => "urgente",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TicketPriority::Low => "Baja",
            TicketPriority::Medium => "Media",
            TicketPriority::High => "Alta",
            TicketPriority::Urgent => "Urgente",
        }
    }

    fn spellings(self) -> [&'static str; 3] {
        let english = match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        };
        [self.as_wire(), self.label(), english]
    }
}

impl FromStr for TicketPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("priority", s, &TicketPriority::ALL, TicketPriority::spellings)
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ticket lifecycle status. Transitions are the service's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
    Rejected,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Closed,
        TicketStatus::Rejected,
    ];

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            TicketStatus::Open => "abierto",
            TicketStatus::InProgress => "en_proceso",
            TicketStatus::Closed => "cerrado",
            TicketStatus::Rejected => "rechazado",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TicketStatus::Open => "Abierto",
            TicketStatus::InProgress => "En Progreso",
            TicketStatus::Closed => "Cerrado",
            TicketStatus::Rejected => "Rechazado",
        }
    }

    fn spellings(self) -> [&'static str; 3] {
        let english = match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
            TicketStatus::Rejected => "rejected",
        };
        [self.as_wire(), self.label(), english]
    }
}

impl FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("status", s, &TicketStatus::ALL, TicketStatus::spellings)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The authenticated user, as resolved from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub display_name: String,
    pub role: Role,
    pub email: String,
    /// Defaults to `true` when the service does not say otherwise.
    pub active: bool,
}

/// A support ticket. Never deleted by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Who wrote an interaction on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAuthor {
    Customer,
    Operator,
}

impl InteractionAuthor {
    pub const ALL: [InteractionAuthor; 2] = [InteractionAuthor::Customer, InteractionAuthor::Operator];

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            InteractionAuthor::Customer => "cliente",
            InteractionAuthor::Operator => "operador",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            InteractionAuthor::Customer => "Cliente",
            InteractionAuthor::Operator => "Operador",
        }
    }

    fn spellings(self) -> [&'static str; 3] {
        let english = match self {
            InteractionAuthor::Customer => "customer",
            InteractionAuthor::Operator => "operator",
        };
        [self.as_wire(), self.label(), english]
    }
}

impl FromStr for InteractionAuthor {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("author", s, &InteractionAuthor::ALL, InteractionAuthor::spellings)
    }
}

impl fmt::Display for InteractionAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One message in a ticket's history. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub author: InteractionAuthor,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Ticket creation input. The operator opening it is passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Email of the customer the ticket is opened for.
    pub client_email: String,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
}

/// Partial update of a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl IdentityPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.active.is_none()
    }
}

/// Result of creating a ticket: the service only acknowledges with the new id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRef {
    pub id: TicketId,
}

/// Result of a status or priority change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketUpdate {
    /// The service returned the updated record.
    Full(Ticket),
    /// The service only acknowledged the change; callers patch their copy.
    Acknowledged,
}
