/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::guard::GuardError;

/// Failures surfaced by a client backend
///
/// The SDK relays these unchanged; it never retries or suppresses them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ClientError {
    #[error("Transport failure: {0}")]
    #[diagnostic(
        code(client::transport),
        help("The backend could not be reached. Delivery is fire-and-forget; the event is dropped.")
    )]
    Transport(String),

    #[error("Client operation timed out after {elapsed_ms}ms (limit {timeout_ms}ms)")]
    #[diagnostic(
        code(client::timeout),
        help("Raise shutdown_timeout or check backend latency.")
    )]
    Timeout { elapsed_ms: u64, timeout_ms: u64 },

    #[error("Client is closed")]
    #[diagnostic(
        code(client::closed),
        help("The client was shut down. Re-initialize the SDK to capture again.")
    )]
    Closed,

    #[error("Event rejected: {0}")]
    #[diagnostic(code(client::rejected), help("The backend refused this event."))]
    Rejected(String),

    #[error("Failed to construct client: {0}")]
    #[diagnostic(
        code(client::construction),
        help("Check the client options passed to init.")
    )]
    Construction(String),
}

/// SDK facade errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SdkError {
    #[error("Client construction failed: {0}")]
    #[diagnostic(
        code(sdk::client_construction),
        help("The previous client (if any) remains installed.")
    )]
    ClientConstruction(#[from] ClientError),

    #[error("Invalid option {name}={value}")]
    #[diagnostic(
        code(sdk::invalid_option),
        help("Booleans accept 1/0/true/false; durations are whole milliseconds.")
    )]
    InvalidOption { name: String, value: String },
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for SDK facade operations
pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_serializes_tagged() {
        let err = ClientError::Timeout {
            elapsed_ms: 2100,
            timeout_ms: 2000,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error_type"], "timeout");
        assert_eq!(json["details"]["timeout_ms"], 2000);

        let back: ClientError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_sdk_error_from_client_error() {
        let err: SdkError = ClientError::Construction("bad endpoint".into()).into();
        assert_eq!(
            err.to_string(),
            "Client construction failed: Failed to construct client: bad endpoint"
        );
    }
}
