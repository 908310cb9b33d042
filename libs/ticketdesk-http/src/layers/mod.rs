//! Tower layers composed by [`HttpClientBuilder`](crate::HttpClientBuilder).

mod headers;

pub use headers::{DefaultHeadersLayer, DefaultHeadersService};
