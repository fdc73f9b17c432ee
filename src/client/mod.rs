/*!
 * Client Capability
 * The narrow interface captured events are sent through
 *
 * Transport, batching, retries and serialisation live behind this trait.
 * The core only needs two ways to hand over an event: blocking and
 * suspending.
 */

pub mod backends;
pub mod event;
pub mod options;

pub use backends::{CapturedEvent, NoopClient, RecordingClient, TracingClient};
pub use event::{Event, ExceptionInfo, Level, Payload};
pub use options::ClientOptions;

use crate::errors::ClientResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::scope::Scope;

/// Identifier assigned to a captured event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Reserved id returned when no client is registered
    pub const SENTINEL: EventId = EventId(Uuid::nil());

    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Backend capability
///
/// Implementations must be shareable across flows. A failure is returned to
/// the caller as-is.
#[async_trait]
pub trait Client: Send + Sync {
    /// Capture `event` under `scope`, completing synchronously
    fn capture_event(&self, event: Event, scope: &Scope) -> ClientResult<EventId>;

    /// Capture `event` under `scope` without blocking the caller
    async fn capture_event_async(&self, event: Event, scope: &Scope) -> ClientResult<EventId>;

    /// Release resources once the client is no longer reachable
    ///
    /// Called exactly once, after the last in-flight capture holding this
    /// client has finished.
    fn close(&self, _timeout: Duration) -> ClientResult<()> {
        Ok(())
    }
}

/// Operations derived from the `Client` capability
pub trait ClientExt: Client {
    /// Wrap `error` into an exception event and capture it
    fn capture_exception<E>(&self, error: &E, scope: &Scope) -> ClientResult<EventId>
    where
        E: std::error::Error + ?Sized,
    {
        self.capture_event(Event::from_error(error), scope)
    }
}

impl<C: Client + ?Sized> ClientExt for C {}
