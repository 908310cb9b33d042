use crate::client::{BufferedService, map_buffer_error};
use crate::config::{RetryConfig, TransportSecurity};
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use crate::retry::backoff_delay;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, Response};
use http_body_util::Full;
use serde::Serialize;
use tower::{Service, ServiceExt};

/// HTTP request builder with fluent API
///
/// Created by [`HttpClient::get`](crate::HttpClient::get),
/// [`HttpClient::post`](crate::HttpClient::post) and
/// [`HttpClient::put`](crate::HttpClient::put).
///
/// Query strings are not composed here; build the URL with `url::Url` and
/// pass the final string.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    json_body: Option<Bytes>,
    transport_security: TransportSecurity,
    retry: Option<RetryConfig>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
        retry: Option<RetryConfig>,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            json_body: None,
            transport_security,
            retry,
        }
    }

    /// Set request body as JSON
    ///
    /// Also sets `Content-Type: application/json`.
    ///
    /// # Errors
    /// Returns `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, HttpError> {
        self.json_body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Parse the URL and check its scheme against the transport security mode.
    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match self.transport_security {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    fn build_request(&self, uri: &http::Uri) -> Result<Request<Full<Bytes>>, HttpError> {
        let mut builder = Request::builder().method(self.method.clone()).uri(uri.clone());
        if self.json_body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }

        let body = self.json_body.clone().unwrap_or_default();
        Ok(builder.body(Full::new(body))?)
    }

    async fn dispatch(&mut self, request: Request<Full<Bytes>>) -> Result<Response<ResponseBody>, HttpError> {
        self.service
            .ready()
            .await
            .map_err(map_buffer_error)?
            .call(request)
            .await
            .map_err(map_buffer_error)
    }

    /// Send the request and return the response
    ///
    /// Any HTTP status is returned as `Ok`; status checks happen when the body
    /// is read. With a retry policy, transport failures and timeouts of
    /// idempotent requests are retried with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - The URL does not parse or has no host
    /// - URL scheme is invalid for the transport security mode
    /// - Network/transport error or timeout on the last attempt
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        let uri = self.validate_url()?;
        let mut attempt = 0usize;

        loop {
            let request = self.build_request(&uri)?;
            match self.dispatch(request).await {
                Ok(inner) => {
                    return Ok(HttpResponse {
                        inner,
                        max_body_size: self.max_body_size,
                    });
                }
                Err(err) => {
                    let Some(retry) = self.retry.as_ref() else {
                        return Err(err);
                    };
                    if attempt >= retry.max_retries || !retry.should_retry(&err, &self.method) {
                        return Err(err);
                    }

                    let delay = backoff_delay(&retry.backoff, attempt);
                    attempt += 1;
                    tracing::debug!(
                        method = %self.method,
                        url = %self.url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
