use crate::error::HttpError;
use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::BodyExt;

/// Maximum body preview kept in `HttpError::HttpStatus` (8 KB).
///
/// Error bodies from the service are short JSON documents (`{"detail": ...}`);
/// anything larger is truncated to protect memory.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Type-erased response body produced by the tower stack.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// HTTP response wrapper
///
/// The body is read with [`checked_bytes`](Self::checked_bytes), which
/// enforces the configured `max_body_size` limit.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    /// Get the response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Read response body as bytes with status check
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` (with a bounded body preview) if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        checked_body(self.inner, self.max_body_size).await
    }
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_limited(response, max_body_size).await;
    }

    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // A huge error body must not hide the status itself.
    let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
    let body_preview = match read_limited(response, preview_limit).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
        Err(e) => return Err(e),
    };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: u16, body: &'static str, limit: usize) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| match never {})
            .boxed();
        let inner = Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        HttpResponse {
            inner,
            max_body_size: limit,
        }
    }

    #[tokio::test]
    async fn test_success_body_returned() {
        let body = response(200, r#"{"id": 7}"#, 1024).checked_bytes().await.unwrap();
        assert_eq!(&body[..], br#"{"id": 7}"#);
    }

    #[tokio::test]
    async fn test_non_2xx_carries_preview_and_content_type() {
        let err = response(401, r#"{"detail":"nope"}"#, 1024)
            .checked_bytes()
            .await
            .unwrap_err();

        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
            } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body_preview.contains("nope"));
                assert_eq!(content_type.as_deref(), Some("application/json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let err = response(200, "0123456789", 4).checked_bytes().await.unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn test_oversized_error_body_keeps_status() {
        let err = response(500, "0123456789", 4).checked_bytes().await.unwrap_err();
        match err {
            HttpError::HttpStatus { body_preview, .. } => {
                assert_eq!(body_preview, "<body too large for preview>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
