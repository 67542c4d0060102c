/// `load_config` module: merges an optional static YAML file with secrets from the environment into [`AppConfig`].
///
/// # Responsibilities
/// - Parse the optional YAML file (no secrets) into typed sections
/// - Read the API key and organisation id from the environment; both are required
/// - Fill the document directory from `DOCUMENT_DIRECTORY` when the YAML leaves it unset
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
///
/// Accepted YAML (every key optional):
///
/// ```yaml
/// api:
///   base_url: https://api.codegpt.co/api/v1
///   request_timeout_secs: 120
/// ingest:
///   directory: ./documents
///   throttle_secs: 2
/// ```
use anyhow::Result;
use doc_ingest_core::config::IngestConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const API_KEY_VAR: &str = "CODEGPT_API_KEY";
pub const ORG_ID_VAR: &str = "CODEGPT_ORG_ID";
pub const DIRECTORY_VAR: &str = "DOCUMENT_DIRECTORY";
pub const DEFAULT_BASE_URL: &str = "https://api.codegpt.co/api/v1";

/// Connection settings for the document API.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub organization_id: String,
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub ingest: IngestConfig,
    /// Directory to ingest when `upload` is run without `--dir`.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api: ApiSection,
    ingest: IngestSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ApiSection {
    base_url: String,
    /// `0` disables the request timeout.
    request_timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct IngestSection {
    directory: Option<PathBuf>,
    throttle_secs: u64,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            directory: None,
            throttle_secs: IngestConfig::default().throttle.as_secs(),
        }
    }
}

/// Loads the optional YAML file and injects secrets from the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let raw = match path {
        Some(path) => read_yaml(path)?,
        None => {
            info!("No config file given, using defaults");
            RawConfig::default()
        }
    };

    let api_key = required_env(API_KEY_VAR)?;
    let organization_id = required_env(ORG_ID_VAR)?;

    let directory = raw
        .ingest
        .directory
        .or_else(|| std::env::var_os(DIRECTORY_VAR).map(PathBuf::from))
        .filter(|d| !d.as_os_str().is_empty());

    let request_timeout = match raw.api.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let ingest = IngestConfig::default().with_throttle(Duration::from_secs(raw.ingest.throttle_secs));
    ingest.trace_loaded();

    let api = ApiConfig {
        base_url: raw.api.base_url.trim_end_matches('/').to_string(),
        api_key,
        organization_id,
        request_timeout,
    };

    info!(
        base_url = %api.base_url,
        directory = ?directory,
        "Config loaded and merged successfully"
    );

    Ok(AppConfig {
        api,
        ingest,
        directory,
    })
}

fn read_yaml(path: &Path) -> Result<RawConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            info!(var = name, "Credential found in env");
            Ok(value)
        }
        Ok(_) => {
            error!(var = name, "Credential environment variable is empty");
            Err(anyhow::anyhow!("{name} environment variable is empty"))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Credential environment variable not set");
            Err(anyhow::anyhow!("{name} environment variable not set: {e}"))
        }
    }
}
