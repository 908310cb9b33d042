use crate::config::{RetryConfig, TransportSecurity};
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::buffer::Buffer;

/// Type alias for the future type of the inner service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Type alias for the buffered service
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a tower middleware stack
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// channel, so store it directly without a `Mutex`.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
    pub(crate) retry: Option<RetryConfig>,
}

impl HttpClient {
    /// Create a GET request builder
    ///
    /// The URL must be absolute (scheme and host); query parameters are
    /// expected to be encoded into it already.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::GET, url)
    }

    /// Create a POST request builder
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::POST, url)
    }

    /// Create a PUT request builder
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::PUT, url)
    }

    fn request(&self, method: http::Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
            self.retry.clone(),
        )
    }
}

/// Map buffer errors to `HttpError`
///
/// Buffer wraps inner service errors in a `BoxError`, or reports its own
/// failure when the worker task has gone away.
pub(crate) fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::builder::HttpClientBuilder;
    use crate::config::{ExponentialBackoff, HttpClientConfig};
    use crate::error::InvalidUriKind;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client_with(config: HttpClientConfig) -> HttpClient {
        HttpClientBuilder::with_config(config).build().unwrap()
    }

    fn test_client() -> HttpClient {
        client_with(HttpClientConfig::for_testing())
    }

    #[tokio::test]
    async fn test_http_client_get() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/tickets")
                .query_param("user_id", "1")
                .header("accept", "application/json");
            then.status(200).json_body(json!([{"id_ticket": 1}]));
        });

        let client = test_client();
        let resp = client
            .get(&server.url("/tickets?user_id=1"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body = resp.checked_bytes().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body[0]["id_ticket"], 1);
        mock.assert();
    }

    #[tokio::test]
    async fn test_http_client_post_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .header("content-type", "application/json")
                .json_body(json!({"email": "ana@example.com"}));
            then.status(200).json_body(json!({"id": 1}));
        });

        let client = test_client();
        let resp = client
            .post(&server.url("/auth/login"))
            .json(&json!({"email": "ana@example.com"}))
            .unwrap()
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        mock.assert();
    }

    #[tokio::test]
    async fn test_http_client_put() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT).path("/tickets/3/estado");
            then.status(200).json_body(json!({"mensaje": "ok"}));
        });

        let client = test_client();
        let resp = client
            .put(&server.url("/tickets/3/estado"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        mock.assert();
    }

    #[tokio::test]
    async fn test_non_2xx_returns_http_status_error() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/me");
            then.status(404).json_body(json!({"detail": "Usuario no encontrado"}));
        });

        let client = test_client();
        let err = client
            .get(&server.url("/me"))
            .send()
            .await
            .unwrap()
            .checked_bytes()
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_custom_user_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/").header("user-agent", "ticketdesk-test/1.0");
            then.status(200);
        });

        let client = client_with(HttpClientConfig {
            user_agent: "ticketdesk-test/1.0".to_owned(),
            ..HttpClientConfig::for_testing()
        });
        client.get(&server.url("/")).send().await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/usuarios");
            then.status(200).body("x".repeat(256));
        });

        let client = client_with(HttpClientConfig {
            max_body_size: 64,
            ..HttpClientConfig::for_testing()
        });
        let err = client
            .get(&server.url("/usuarios"))
            .send()
            .await
            .unwrap()
            .checked_bytes()
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::BodyTooLarge { limit: 64, .. }));
    }

    #[tokio::test]
    async fn test_http_rejected_when_tls_only() {
        let client = client_with(HttpClientConfig::default());
        let err = client.get("http://desk.local/me").send().await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidScheme { .. }));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let err = test_client().get("/tickets").send().await.unwrap_err();
        match err {
            HttpError::InvalidUri { kind, .. } => assert_eq!(kind, InvalidUriKind::MissingAuthority),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let err = test_client()
            .get(&format!("http://127.0.0.1:{port}/me"))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }

    #[tokio::test]
    async fn test_timeout_retried_for_get() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/tickets");
            then.status(200).delay(Duration::from_millis(400));
        });

        let config = HttpClientConfig {
            request_timeout: Duration::from_millis(50),
            retry: Some(RetryConfig {
                max_retries: 2,
                backoff: ExponentialBackoff::fast(),
            }),
            ..HttpClientConfig::for_testing()
        };
        let client = client_with(config);

        let err = client
            .get(&server.url("/tickets"))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout(_)));
        mock.assert_calls(3);
    }

    #[tokio::test]
    async fn test_post_never_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/tickets");
            then.status(200).delay(Duration::from_millis(400));
        });

        let config = HttpClientConfig {
            request_timeout: Duration::from_millis(50),
            retry: Some(RetryConfig {
                max_retries: 3,
                backoff: ExponentialBackoff::fast(),
            }),
            ..HttpClientConfig::for_testing()
        };
        let client = client_with(config);

        let err = client
            .post(&server.url("/tickets"))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout(_)));
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn test_client_is_clone() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/usuarios");
            then.status(200).json_body(json!([]));
        });

        let client = test_client();
        let clone = client.clone();
        let (a, b) = tokio::join!(
            client.get(&server.url("/usuarios")).send(),
            clone.get(&server.url("/usuarios")).send()
        );
        assert!(a.is_ok() && b.is_ok());
        mock.assert_calls(2);
    }

    #[test]
    fn test_http_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }
}
