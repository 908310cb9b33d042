use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketdesk_http::{
    ExponentialBackoff, HttpClientConfig, RetryConfig, TlsRootConfig, TransportSecurity,
};

/// How to reach the remote ticket/user service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to, e.g. `https://desk.example.com/api`.
    pub base_url: String,
    /// Per-attempt timeout, humantime format (`"10s"`, `"750ms"`).
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
    /// Permit `http://` base URLs. Off by default.
    pub allow_insecure_http: bool,
    /// Trusted roots for HTTPS: bundled Mozilla roots (`webpki`) or the OS store (`native`).
    pub tls_roots: TlsRootConfig,
    /// Retry reads that failed before reaching the service. Disabled when absent.
    pub retry: Option<ApiRetryConfig>,
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8000/api".to_owned(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("ticketdesk/", env!("CARGO_PKG_VERSION")).to_owned(),
            allow_insecure_http: false,
            tls_roots: TlsRootConfig::WebPki,
            retry: None,
            max_body_size: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiRetryConfig {
    pub max_retries: usize,
    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for ApiRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl ApiConfig {
    /// Transport settings for [`ticketdesk_http::HttpClient`].
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.timeout,
            max_body_size: self.max_body_size,
            user_agent: self.user_agent.clone(),
            retry: self.retry.as_ref().map(|r| RetryConfig {
                max_retries: r.max_retries,
                backoff: ExponentialBackoff::new(r.initial_backoff, r.max_backoff),
            }),
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            tls_roots: self.tls_roots,
            ..HttpClientConfig::default()
        }
    }
}

/// Where the session token lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Token file. Defaults to `<home>/.ticketdesk/session`.
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    /// Effective token file path; `None` when no home directory can be found
    /// and no path was configured.
    #[must_use]
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".ticketdesk").join("session")))
    }
}

/// Serde adapter for `Duration` fields written as humantime strings.
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    /// # Errors
    /// Fails when the string is not a humantime duration.
    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }

    /// # Errors
    /// Propagates serializer errors.
    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_config_parses_humantime() {
        let config: ApiConfig = serde_json::from_value(json!({
            "base_url": "https://desk.example.com/api",
            "timeout": "750ms",
            "retry": { "max_retries": 3, "initial_backoff": "50ms" }
        }))
        .unwrap();

        assert_eq!(config.timeout, Duration::from_millis(750));
        let retry = config.retry.unwrap();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.initial_backoff, Duration::from_millis(50));
        assert_eq!(retry.max_backoff, Duration::from_secs(2));
    }

    #[test]
    fn test_api_config_round_trips_duration_text() {
        let value = serde_json::to_value(ApiConfig::default()).unwrap();
        assert_eq!(value["timeout"], "10s");
    }

    #[test]
    fn test_http_config_transport() {
        let mut config = ApiConfig::default();
        assert_eq!(config.http_config().transport, TransportSecurity::TlsOnly);
        config.allow_insecure_http = true;
        assert_eq!(
            config.http_config().transport,
            TransportSecurity::AllowInsecureHttp
        );
        assert!(config.http_config().retry.is_none());
    }

    #[test]
    fn test_tls_roots_reach_transport() {
        assert_eq!(ApiConfig::default().http_config().tls_roots, TlsRootConfig::WebPki);

        let config: ApiConfig = serde_json::from_value(json!({ "tls_roots": "native" })).unwrap();
        assert_eq!(config.http_config().tls_roots, TlsRootConfig::Native);
        assert_eq!(serde_json::to_value(&config).unwrap()["tls_roots"], "native");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ApiConfig, _> = serde_json::from_value(json!({"base_uri": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_path_override() {
        let config = SessionConfig {
            path: Some(PathBuf::from("/tmp/td-session")),
        };
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/tmp/td-session")));
    }
}
