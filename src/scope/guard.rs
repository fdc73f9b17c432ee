/*!
 * Scope Guard
 *
 * RAII token returned by `push_scope()`
 */

use super::flow;
use super::stack::{LayerId, ScopeStack};
use crate::guard::{Guard, GuardDrop, GuardError, GuardMetadata, GuardResult};
use tracing::warn;

/// Restores the pre-push stack of the flow that pushed it
///
/// # Misuse
///
/// - Releasing twice: `release()` returns `GuardError::AlreadyReleased`.
/// - Releasing after the layer was already discarded (an outer guard was
///   released first, or the guard is released in an unrelated flow):
///   `GuardError::OutOfOrder`, and the stack is left untouched.
///
/// Releasing while inner layers are still pushed discards them too.
/// `Drop` performs the same release and logs misuse instead of panicking.
#[must_use = "dropping the guard immediately pops the pushed scope"]
pub struct ScopeGuard {
    previous: Option<ScopeStack>,
    layer: LayerId,
    metadata: GuardMetadata,
}

impl ScopeGuard {
    pub(crate) fn new(previous: ScopeStack, layer: LayerId, depth: usize) -> Self {
        Self {
            previous: Some(previous),
            layer,
            metadata: GuardMetadata::new("scope").with_depth(depth),
        }
    }

    /// Layer pushed by this guard
    #[inline]
    pub fn layer(&self) -> LayerId {
        self.layer
    }
}

impl Guard for ScopeGuard {
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.previous.is_some()
    }

    fn release(&mut self) -> GuardResult<()> {
        let previous = self.previous.take().ok_or(GuardError::AlreadyReleased)?;
        flow::restore(self.layer, previous)
    }
}

impl GuardDrop for ScopeGuard {
    fn on_drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(e) = self.release() {
            warn!(
                layer = %self.layer,
                depth = self.metadata.depth,
                lifetime_us = self.metadata.lifetime_micros(),
                error = %e,
                "scope guard dropped out of order; stack left unchanged"
            );
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("layer", &self.layer)
            .field("depth", &self.metadata.depth)
            .field("active", &self.is_active())
            .finish()
    }
}
