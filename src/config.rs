//! Configuration types for cert-desk

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Backend API connection settings
///
/// Groups settings for reaching the certificate service.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the certificate service API (default: "http://localhost:5000/api")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Bulk export behavior settings
///
/// The defaults deliberately throttle the export: the backend renders each PDF
/// on demand, so requests are spaced out and failed fetches are retried with a
/// linearly growing wait.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum fetch attempts per certificate, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay; attempt n waits n times this (default: 3 seconds)
    #[serde(default = "default_retry_base_delay", with = "duration_serde")]
    pub retry_base_delay: Duration,

    /// Fixed pause between successive certificates (default: 3 seconds)
    #[serde(default = "default_inter_item_delay", with = "duration_serde")]
    pub inter_item_delay: Duration,

    /// Directory artifacts are saved into (default: "./certificates")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_base_delay: default_retry_base_delay(),
            inter_item_delay: default_inter_item_delay(),
            output_dir: default_output_dir(),
        }
    }
}

/// Roster import validation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Minimum trainee age in years at import time (default: 14)
    #[serde(default = "default_min_age_years")]
    pub min_age_years: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_age_years: default_min_age_years(),
        }
    }
}

/// Main configuration for cert-desk
///
/// Fields are organized into logical sub-configs:
/// - [`api`](ApiConfig) — backend URL and timeouts
/// - [`export`](ExportConfig) — retry, throttling and output directory
/// - [`import`](ImportConfig) — roster validation rules
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Bulk export behavior settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Roster import validation settings
    #[serde(default)]
    pub import: ImportConfig,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_inter_item_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./certificates")
}

fn default_min_age_years() -> u32 {
    14
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
