/*!
 * Client Options
 * Configuration a client is built from
 *
 * The core hands these to the client builder untouched; only
 * `shutdown_timeout` is read back, to bound `Client::close`.
 *
 * Environment variables (see `ClientOptions::from_env`):
 * - CAPTURE_PAYLOAD_COMPRESSION: 1/0/true/false (default: false)
 * - CAPTURE_SHUTDOWN_TIMEOUT_MS: whole milliseconds (default: 2000)
 */

use crate::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

pub const ENV_PAYLOAD_COMPRESSION: &str = "CAPTURE_PAYLOAD_COMPRESSION";
pub const ENV_SHUTDOWN_TIMEOUT_MS: &str = "CAPTURE_SHUTDOWN_TIMEOUT_MS";

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub payload_compression: bool,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "shutdown_timeout_ms")]
    pub shutdown_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            payload_compression: false,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload_compression(mut self, enabled: bool) -> Self {
        self.payload_compression = enabled;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Defaults overridden by any `CAPTURE_*` variables that are set
    pub fn from_env() -> SdkResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SdkResult<Self> {
        let mut options = Self::default();

        if let Some(raw) = lookup(ENV_PAYLOAD_COMPRESSION) {
            options.payload_compression = parse_bool(&raw)
                .ok_or_else(|| invalid(ENV_PAYLOAD_COMPRESSION, &raw))?;
        }

        if let Some(raw) = lookup(ENV_SHUTDOWN_TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_SHUTDOWN_TIMEOUT_MS, &raw))?;
            options.shutdown_timeout = Duration::from_millis(ms);
        }

        Ok(options)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn invalid(name: &str, value: &str) -> SdkError {
    SdkError::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let options = ClientOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, ClientOptions::default());
        assert!(!options.payload_compression);
        assert_eq!(options.shutdown_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_env_overrides() {
        let options = ClientOptions::from_lookup(lookup(&[
            (ENV_PAYLOAD_COMPRESSION, "TRUE"),
            (ENV_SHUTDOWN_TIMEOUT_MS, "250"),
        ]))
        .unwrap();

        assert!(options.payload_compression);
        assert_eq!(options.shutdown_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_env_value() {
        let err = ClientOptions::from_lookup(lookup(&[(ENV_SHUTDOWN_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            SdkError::InvalidOption {
                name: ENV_SHUTDOWN_TIMEOUT_MS.to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ClientOptions =
            serde_json::from_str(r#"{"shutdown_timeout_ms": 500}"#).unwrap();
        assert_eq!(
            options,
            ClientOptions::new().with_shutdown_timeout(Duration::from_millis(500))
        );
    }
}
