//! Session token storage and the bootstrap that owns the signed-in identity.

mod bootstrap;
mod store;

pub use bootstrap::{LoginOutcome, SessionContext, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
