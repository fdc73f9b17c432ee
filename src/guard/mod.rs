/*!
 * RAII Guards
 *
 * Scoped acquisition with guaranteed restoration on every exit path.
 *
 * ## Design Principles
 *
 * 1. **Explicit or implicit release**: `release()` reports misuse, `Drop` logs it
 * 2. **Observable**: Guards carry metadata for tracing
 * 3. **Never panics on drop**: Misuse is logged, not raised
 *
 * ## Example
 *
 * ```ignore
 * let mut guard = capture_scope::push_scope();
 * capture_scope::configure_scope(|scope| scope.add_tag("request"));
 * guard.release()?; // Or restored automatically on drop
 * ```
 */

mod traits;

pub use traits::{Guard, GuardDrop};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,

    #[error("Scope layer {layer} is not on the current stack (depth {depth}); guards released out of order")]
    OutOfOrder { layer: u64, depth: usize },
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
    pub depth: usize,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
            depth: 0,
        }
    }

    #[inline]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
