/*!
 * Captured Events
 * Opaque payloads handed to the client together with the resolved scope
 */

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::fmt;
use time::OffsetDateTime;

/// Event severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Error wrapped into an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Rust type name of the outermost error
    pub kind: String,
    pub message: String,
    /// `Display` of each `source()` in order, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Message(String),
    Exception(ExceptionInfo),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub timestamp: OffsetDateTime,
    pub level: Level,
    pub payload: Payload,
}

impl Event {
    pub fn message(message: impl Into<String>, level: Level) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            level,
            payload: Payload::Message(message.into()),
        }
    }

    /// Exception event at `Level::Error`, including the `source()` chain
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        Self {
            timestamp: OffsetDateTime::now_utc(),
            level: Level::Error,
            payload: Payload::Exception(ExceptionInfo {
                kind: std::any::type_name::<E>().to_string(),
                message: error.to_string(),
                chain,
            }),
        }
    }

    /// Short human-readable summary
    pub fn summary(&self) -> &str {
        match &self.payload {
            Payload::Message(m) => m,
            Payload::Exception(info) => &info.message,
        }
    }
}

impl From<&str> for Event {
    fn from(message: &str) -> Self {
        Event::message(message, Level::Info)
    }
}

impl From<String> for Event {
    fn from(message: String) -> Self {
        Event::message(message, Level::Info)
    }
}
