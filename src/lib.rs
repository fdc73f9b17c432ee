/*!
 * Capture Scope
 * Context propagation core of an event-capture SDK
 *
 * - `scope`: per-flow persistent scope stacks with RAII push guards
 * - `client`: the backend capability events are dispatched through
 * - `sdk`: the client registry and the capture/configure facade
 */

pub mod client;
pub mod errors;
pub mod guard;
pub mod logging;
pub mod scope;
pub mod sdk;

// Re-exports
pub use client::{Client, ClientExt, ClientOptions, Event, EventId, Level, Payload};
pub use errors::{ClientError, ClientResult, SdkError, SdkResult};
pub use guard::{Guard, GuardError, GuardResult};
pub use logging::init_tracing;
pub use scope::{current_scope, current_stack, spawn, spawn_thread, FlowContext, Scope, ScopeGuard, ScopeStack};
pub use sdk::{
    capture_event, capture_event_async, capture_event_with, capture_exception, capture_message,
    configure_scope, init, init_with_client, is_enabled, push_scope, shutdown, Sdk,
};
