/*!
 * SDK Facade
 * Init/shutdown plus the capture and configure entry points
 *
 * Every entry point checks the registry first. With no client registered
 * the SDK is disabled: captures return `EventId::SENTINEL` and caller
 * closures and factories are never run.
 *
 * The free functions operate on one process-wide `Sdk`. Separate `Sdk`
 * instances are independent registries sharing the same per-flow scope
 * stacks.
 */

pub mod registry;

pub use registry::{ClientSlot, Registration};

use crate::client::{Client, ClientExt, ClientOptions, Event, EventId, Level};
use crate::errors::{ClientResult, SdkResult};
use crate::scope::{self, flow, Scope, ScopeGuard};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct Sdk {
    slot: ClientSlot,
}

impl Sdk {
    pub const fn new() -> Self {
        Self {
            slot: ClientSlot::new(),
        }
    }

    /// Build a client from `options` and install it
    ///
    /// The previous client, if any, is replaced in one swap and closed once
    /// nothing uses it. If `build` fails, the previous client stays.
    pub fn init<C, B>(&self, options: ClientOptions, build: B) -> SdkResult<()>
    where
        C: Client + 'static,
        B: FnOnce(&ClientOptions) -> ClientResult<C>,
    {
        let client = build(&options)?;
        self.init_with_client(client, options);
        Ok(())
    }

    /// Install an already constructed client
    pub fn init_with_client<C: Client + 'static>(&self, client: C, options: ClientOptions) {
        let previous = self.slot.install(Box::new(client), options);
        debug!(
            generation = self.generation(),
            replaced = previous.as_ref().map(|r| r.generation()),
            "client installed"
        );
        drop(previous);
    }

    /// Remove the active client; no-op when already disabled
    pub fn shutdown(&self) {
        match self.slot.take() {
            Some(previous) => debug!(generation = previous.generation(), "sdk shut down"),
            None => trace!("shutdown while disabled"),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.slot.is_empty()
    }

    /// Generation of the active client, if any
    pub fn generation(&self) -> Option<u64> {
        self.slot.load().map(|r| r.generation())
    }

    /// Mutate the calling flow's top scope; `f` is skipped while disabled
    pub fn configure_scope<F: FnOnce(&mut Scope)>(&self, f: F) {
        if !self.is_enabled() {
            trace!("configure_scope skipped: disabled");
            return;
        }
        flow::configure(f);
    }

    /// Push a scope layer on the calling flow
    ///
    /// Works whether or not a client is registered.
    pub fn push_scope(&self) -> ScopeGuard {
        scope::push_scope()
    }

    pub fn capture_event(&self, event: Event) -> ClientResult<EventId> {
        let Some(registration) = self.active() else {
            return Ok(EventId::SENTINEL);
        };
        let scope = scope::current_scope();
        registration.client().capture_event(event, &scope)
    }

    pub fn capture_message(&self, message: &str, level: Level) -> ClientResult<EventId> {
        self.capture_event_with(|| Event::message(message, level))
    }

    /// Capture `error` as an exception event
    pub fn capture_exception<E>(&self, error: &E) -> ClientResult<EventId>
    where
        E: std::error::Error + ?Sized,
    {
        let Some(registration) = self.active() else {
            return Ok(EventId::SENTINEL);
        };
        let scope = scope::current_scope();
        registration.client().capture_exception(error, &scope)
    }

    /// Capture the event built by `factory`; `factory` is skipped while disabled
    pub fn capture_event_with<F>(&self, factory: F) -> ClientResult<EventId>
    where
        F: FnOnce() -> Event,
    {
        let Some(registration) = self.active() else {
            return Ok(EventId::SENTINEL);
        };
        let event = factory();
        let scope = scope::current_scope();
        registration.client().capture_event(event, &scope)
    }

    /// Suspending capture with an asynchronous event factory
    ///
    /// While disabled this completes on its first poll without running
    /// `factory`. Otherwise the calling flow's scope is read before the
    /// factory is awaited, then the client's async capture runs.
    pub async fn capture_event_async<F, Fut>(&self, factory: F) -> ClientResult<EventId>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Event>,
    {
        let Some(registration) = self.active() else {
            return Ok(EventId::SENTINEL);
        };
        let scope = scope::current_scope();
        let event = factory().await;
        registration.client().capture_event_async(event, &scope).await
    }

    fn active(&self) -> Option<Arc<Registration>> {
        let registration = self.slot.load();
        if registration.is_none() {
            trace!("capture skipped: disabled");
        }
        registration
    }
}

impl Default for Sdk {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Sdk = Sdk::new();

/// The process-wide SDK instance
pub fn global() -> &'static Sdk {
    &GLOBAL
}

/// See [`Sdk::init`]
pub fn init<C, B>(options: ClientOptions, build: B) -> SdkResult<()>
where
    C: Client + 'static,
    B: FnOnce(&ClientOptions) -> ClientResult<C>,
{
    global().init(options, build)
}

/// See [`Sdk::init_with_client`]
pub fn init_with_client<C: Client + 'static>(client: C, options: ClientOptions) {
    global().init_with_client(client, options)
}

pub fn shutdown() {
    global().shutdown()
}

pub fn is_enabled() -> bool {
    global().is_enabled()
}

pub fn configure_scope<F: FnOnce(&mut Scope)>(f: F) {
    global().configure_scope(f)
}

pub fn push_scope() -> ScopeGuard {
    global().push_scope()
}

pub fn capture_event(event: Event) -> ClientResult<EventId> {
    global().capture_event(event)
}

pub fn capture_message(message: &str, level: Level) -> ClientResult<EventId> {
    global().capture_message(message, level)
}

pub fn capture_exception<E>(error: &E) -> ClientResult<EventId>
where
    E: std::error::Error + ?Sized,
{
    global().capture_exception(error)
}

pub fn capture_event_with<F>(factory: F) -> ClientResult<EventId>
where
    F: FnOnce() -> Event,
{
    global().capture_event_with(factory)
}

pub async fn capture_event_async<F, Fut>(factory: F) -> ClientResult<EventId>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Event>,
{
    global().capture_event_async(factory).await
}
