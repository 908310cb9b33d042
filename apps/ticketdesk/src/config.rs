use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use helpdesk_client::{ApiConfig, SessionConfig};
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "ticketdesk.yaml";

/// Environment prefix; `__` separates nesting levels
/// (`TICKETDESK__API__BASE_URL`).
pub const ENV_PREFIX: &str = "TICKETDESK__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layered load: defaults, then the YAML file, then `TICKETDESK__*`.
    ///
    /// An explicit `path` must exist; without one, `ticketdesk.yaml` in the
    /// working directory is used if present.
    ///
    /// # Errors
    /// Missing explicit file, unreadable YAML or values of the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => {
                bail!("config file does not exist: {}", path.display())
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "loading config file");
            figment = figment.merge(Yaml::file(file));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, api_url: Option<&str>) {
        if let Some(url) = api_url {
            url.clone_into(&mut self.api.base_url);
        }
    }

    /// Token file location.
    ///
    /// # Errors
    /// No path configured and no home directory.
    pub fn session_path(&self) -> Result<PathBuf> {
        self.session
            .resolved_path()
            .context("no home directory found; set session.path")
    }
}
