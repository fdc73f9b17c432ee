/*!
 * Client Registry
 * Process-wide single slot holding at most one active client
 *
 * # Concurrency
 *
 * - **Reads**: atomic pointer load plus refcount bump, no lock
 * - **Writes**: one atomic swap; readers see either the old or the new
 *   registration, never a partial one
 *
 * An outgoing registration is closed when its last `Arc` drops. Captures
 * that loaded it before the swap keep it alive and finish against it.
 */

use crate::client::{Client, ClientOptions};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// An installed client together with the options it was built from
pub struct Registration {
    client: Box<dyn Client>,
    options: ClientOptions,
    generation: u64,
}

impl Registration {
    #[inline]
    pub fn client(&self) -> &dyn Client {
        self.client.as_ref()
    }

    /// Monotonic install counter, starting at 1
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let timeout = self.options.shutdown_timeout;
        match self.client.close(timeout) {
            Ok(()) => debug!(generation = self.generation, "client closed"),
            Err(e) => warn!(
                generation = self.generation,
                timeout_ms = timeout.as_millis() as u64,
                error = %e,
                "client close failed"
            ),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("generation", &self.generation)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Atomically swappable client slot
pub struct ClientSlot {
    inner: ArcSwapOption<Registration>,
    generation: AtomicU64,
}

impl ClientSlot {
    pub const fn new() -> Self {
        Self {
            inner: ArcSwapOption::const_empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Current registration, kept alive for as long as the caller holds it
    #[inline]
    pub fn load(&self) -> Option<Arc<Registration>> {
        self.inner.load_full()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_none()
    }

    /// Install `client`, returning the registration it replaced
    pub fn install(&self, client: Box<dyn Client>, options: ClientOptions) -> Option<Arc<Registration>> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let registration = Arc::new(Registration {
            client,
            options,
            generation,
        });
        self.inner.swap(Some(registration))
    }

    /// Empty the slot, returning the registration it held
    pub fn take(&self) -> Option<Arc<Registration>> {
        self.inner.swap(None)
    }
}

impl Default for ClientSlot {
    fn default() -> Self {
        Self::new()
    }
}
