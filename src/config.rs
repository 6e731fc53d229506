//! Runtime configuration from the environment.

use std::time::Duration;

use crate::error::{FebosError, Result};

pub const DEFAULT_BASE_URL: &str = "https://emmeti.aq-iot.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Web app prefix; used only to build `Referer` values.
pub const APP_PATH: &str = "/aq-iot-app-emmeti";
/// Prefix of every API endpoint path.
pub const API_PATH: &str = "/aq-iot-server-frontend-ha/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin without trailing slash, e.g. `https://emmeti.aq-iot.net`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `FEBOS_BASE_URL` and `FEBOS_TIMEOUT_SECS`; unset or blank values fall back
    /// to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = match lookup("FEBOS_BASE_URL") {
            Some(v) if !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
            _ => DEFAULT_BASE_URL.to_string(),
        };

        let timeout_secs = match lookup("FEBOS_TIMEOUT_SECS") {
            Some(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| FebosError::Config("FEBOS_TIMEOUT_SECS must be a positive integer".to_string()))?,
            _ => DEFAULT_TIMEOUT_SECS,
        };

        Ok(ClientConfig {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
