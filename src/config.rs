//! Runtime configuration for the session client. Values come from `ARKWORK_*`
//! environment variables (or CLI flags that shadow them) with trim/normalize
//! semantics: blank values fall back to defaults, base URLs lose trailing
//! slashes. Configuration values are public; do not store secrets here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;
use url::Url;

/// Default backend base URL used by development deployments.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
/// Default request timeout applied to all HTTP helpers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub snapshot_dir: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Builds a config from explicit values, applying normalization and
    /// falling back to defaults for blank or missing inputs.
    pub fn new(api_base_url: &str, snapshot_dir: Option<PathBuf>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            snapshot_dir: snapshot_dir.unwrap_or_else(default_snapshot_dir),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads config from the environment.
    pub fn load() -> Self {
        let api_base_url = env::var("ARKWORK_API_BASE_URL").unwrap_or_default();
        let snapshot_dir = env::var("ARKWORK_SNAPSHOT_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self::new(&api_base_url, snapshot_dir)
    }

    /// Validates that the configured base URL parses and has a host.
    ///
    /// # Errors
    /// Returns an error if the base URL is unparsable or missing a host.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|err| AppError::Config(format!("Invalid API base URL: {err}")))?;
        if url.host().is_none() {
            return Err(AppError::Config(
                "Invalid API base URL: no host specified".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_snapshot_dir() -> PathBuf {
    env::temp_dir().join("arkwork")
}

/// Trims the value and strips trailing slashes; blank input yields `None`.
fn normalize_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
