#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client infrastructure for `TicketDesk`
//!
//! This crate provides a hyper-based HTTP client with:
//! - Automatic TLS via rustls (HTTPS only by default)
//! - Connection pooling
//! - Configurable per-attempt timeouts
//! - Retries with exponential backoff for idempotent requests
//! - Default `User-Agent` and `Accept` headers
//! - Response body size limits
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_http::{HttpClientBuilder, HttpClientConfig, TlsRootConfig};
//!
//! let client = HttpClientBuilder::with_config(HttpClientConfig {
//!     tls_roots: TlsRootConfig::Native,
//!     ..HttpClientConfig::default()
//! })
//! .build()?;
//!
//! let body = client
//!     .get("https://desk.example.com/api/tickets?user_id=1&user_role=cliente")
//!     .send()
//!     .await?
//!     .checked_bytes()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod retry;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, ExponentialBackoff, HttpClientConfig, RetryConfig, TlsRootConfig,
    TransportSecurity, is_idempotent_method,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{DefaultHeadersLayer, DefaultHeadersService};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
