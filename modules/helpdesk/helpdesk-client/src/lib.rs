#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Helpdesk client
//!
//! Everything between the remote ticket/user service and a front-end:
//!
//! - [`HttpHelpdeskClient`] - [`HelpdeskClient`](helpdesk_sdk::HelpdeskClient) over HTTP
//! - [`mapper`] - service records to domain values
//! - [`session`] - token storage and the bootstrap that owns the identity
//! - [`routing`] - routes, navigation and role-aware guards
//! - [`views`] - per-page presentation state
//!
//! ```ignore
//! let client: Arc<dyn HelpdeskClient> = Arc::new(HttpHelpdeskClient::new(&api)?);
//! let session = SessionContext::new(client, store, navigator);
//! session.init().await;
//!
//! let mut guard = RouteGuard::new(Route::Tickets);
//! if let GuardDecision::Render(Some(me)) = guard.check(&session.snapshot(), &*navigator) {
//!     // ...
//! }
//! ```

pub mod config;
pub mod http;
pub mod mapper;
pub mod routing;
pub mod session;
pub mod views;
pub mod wire;

pub use config::{ApiConfig, ApiRetryConfig, SessionConfig};
pub use http::HttpHelpdeskClient;
pub use routing::{
    Access, GuardDecision, HistoryNavigator, NavEntry, NavSection, Navigator, Route, RouteGuard,
    navigation_for,
};
pub use session::{
    FileSessionStore, LoginOutcome, MemorySessionStore, SessionContext, SessionState, SessionStore,
};
