//! Helpdesk SDK
//!
//! This crate provides the public API of the helpdesk module:
//!
//! - [`HelpdeskClient`] - async client trait for the remote ticket/user service
//! - [`Identity`], [`Ticket`], [`Interaction`] and friends - domain models
//! - [`HelpdeskError`] - error taxonomy shared by every implementation
//!
//! ## Usage
//!
//! ```ignore
//! use helpdesk_sdk::{HelpdeskClient, Role};
//!
//! let me = client.who_am_i("ana@example.com").await?;
//! let tickets = client.list_tickets(me.id, me.role).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::HelpdeskClient;
pub use error::HelpdeskError;
pub use models::{
    Identity, IdentityPatch, Interaction, InteractionAuthor, NewTicket, NewUser, ParseEnumError,
    Role, Ticket, TicketId, TicketPriority, TicketRef, TicketStatus, TicketUpdate, UserId,
};
