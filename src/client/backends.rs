/*!
 * Client Backends
 * In-process implementations of the `Client` capability
 *
 * - **NoopClient**: accepts everything, keeps nothing
 * - **RecordingClient**: testing stub that records every capture
 * - **TracingClient**: emits events as structured tracing records
 */

use super::{Client, ClientOptions, Event, EventId};
use crate::errors::{ClientError, ClientResult};
use crate::scope::Scope;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Returns fresh ids and drops the events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

#[async_trait]
impl Client for NoopClient {
    fn capture_event(&self, _event: Event, _scope: &Scope) -> ClientResult<EventId> {
        Ok(EventId::new())
    }

    async fn capture_event_async(&self, _event: Event, _scope: &Scope) -> ClientResult<EventId> {
        Ok(EventId::new())
    }
}

/// One capture as seen by a `RecordingClient`
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub id: EventId,
    pub event: Event,
    /// `Scope::render()` at capture time
    pub scope: String,
    pub tags: Vec<String>,
    pub asynchronous: bool,
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Mutex<Vec<CapturedEvent>>,
    fail_with: Mutex<Option<ClientError>>,
    close_calls: AtomicUsize,
    closed: AtomicBool,
}

/// Testing stub
///
/// Clones share state, so a test can keep a handle to a client it gave away.
/// After `close`, captures fail with `ClientError::Closed` and are not
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    state: Arc<RecordingState>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every following capture with `error`
    pub fn fail_with(&self, error: ClientError) {
        *self.state.fail_with.lock() = Some(error);
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.state.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.state.events.lock().len()
    }

    pub fn close_calls(&self) -> usize {
        self.state.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn record(&self, event: Event, scope: &Scope, asynchronous: bool) -> ClientResult<EventId> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        if let Some(error) = self.state.fail_with.lock().clone() {
            return Err(error);
        }

        let id = EventId::new();
        self.state.events.lock().push(CapturedEvent {
            id,
            event,
            scope: scope.render(),
            tags: scope.tags().to_vec(),
            asynchronous,
        });
        Ok(id)
    }
}

#[async_trait]
impl Client for RecordingClient {
    fn capture_event(&self, event: Event, scope: &Scope) -> ClientResult<EventId> {
        self.record(event, scope, false)
    }

    async fn capture_event_async(&self, event: Event, scope: &Scope) -> ClientResult<EventId> {
        tokio::task::yield_now().await;
        self.record(event, scope, true)
    }

    fn close(&self, _timeout: Duration) -> ClientResult<()> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Writes each event to the active tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingClient {
    payload_compression: bool,
}

impl TracingClient {
    pub fn from_options(options: &ClientOptions) -> Self {
        Self {
            payload_compression: options.payload_compression,
        }
    }

    fn emit(&self, event: &Event, scope: &Scope) -> ClientResult<EventId> {
        let payload = serde_json::to_vec(event).map_err(|e| ClientError::Rejected(e.to_string()))?;
        let id = EventId::new();
        info!(
            event_id = %id,
            level = %event.level,
            scope = %scope,
            payload_bytes = payload.len(),
            compressed = self.payload_compression,
            "{}",
            event.summary()
        );
        Ok(id)
    }
}

#[async_trait]
impl Client for TracingClient {
    fn capture_event(&self, event: Event, scope: &Scope) -> ClientResult<EventId> {
        self.emit(&event, scope)
    }

    async fn capture_event_async(&self, event: Event, scope: &Scope) -> ClientResult<EventId> {
        self.emit(&event, scope)
    }

    fn close(&self, timeout: Duration) -> ClientResult<()> {
        debug!(timeout_ms = timeout.as_millis() as u64, "tracing client closed");
        Ok(())
    }
}
