/*!
 * Scope Stack
 * Persistent (structurally shared) stack of scope layers
 *
 * # Sharing
 *
 * A `ScopeStack` is a single `Arc` to its top layer. Cloning it is a
 * refcount bump, and every "mutation" returns a new stack value that shares
 * all untouched layers with the old one. Two flows holding the same stack
 * therefore never observe each other's pushes, pops or tag changes.
 */

use super::Scope;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one pushed layer
///
/// Preserved across copy-on-write updates of the layer's scope, so a guard
/// can still find "its" layer after the flow has configured it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Layer {
    id: LayerId,
    scope: Arc<Scope>,
    parent: Option<Arc<Layer>>,
    depth: usize,
}

/// Immutable, never-empty stack of scopes
#[derive(Clone)]
pub struct ScopeStack {
    head: Arc<Layer>,
}

impl ScopeStack {
    /// Single-layer stack holding a fresh, empty root scope
    pub fn root() -> Self {
        Self::with_root(Scope::new())
    }

    pub fn with_root(scope: Scope) -> Self {
        Self {
            head: Arc::new(Layer {
                id: LayerId::next(),
                scope: Arc::new(scope),
                parent: None,
                depth: 1,
            }),
        }
    }

    /// Innermost scope
    #[inline]
    pub fn top(&self) -> &Arc<Scope> {
        &self.head.scope
    }

    #[inline]
    pub fn top_id(&self) -> LayerId {
        self.head.id
    }

    /// Number of layers, root included (always >= 1)
    #[inline]
    pub fn depth(&self) -> usize {
        self.head.depth
    }

    /// New stack with a deep copy of the current top pushed over it
    ///
    /// `self` is left untouched and keeps pointing at the old top.
    pub fn push(&self) -> Self {
        Self {
            head: Arc::new(Layer {
                id: LayerId::next(),
                scope: Arc::new(Scope::clone(&self.head.scope)),
                parent: Some(Arc::clone(&self.head)),
                depth: self.head.depth + 1,
            }),
        }
    }

    /// New stack whose top layer holds `scope` instead
    ///
    /// Layer identity and everything below the top are shared with `self`.
    pub fn with_top(&self, scope: Scope) -> Self {
        Self {
            head: Arc::new(Layer {
                id: self.head.id,
                scope: Arc::new(scope),
                parent: self.head.parent.clone(),
                depth: self.head.depth,
            }),
        }
    }

    /// Stack below the top layer, or `None` at the root
    pub fn parent(&self) -> Option<Self> {
        self.head
            .parent
            .as_ref()
            .map(|head| Self { head: Arc::clone(head) })
    }

    /// Whether the layer `id` is on this stack
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers().any(|layer| layer.id == id)
    }

    /// Scopes from innermost to root
    pub fn scopes(&self) -> impl Iterator<Item = &Arc<Scope>> {
        self.layers().map(|layer| &layer.scope)
    }

    /// Whether both values are the very same stack reference
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.head, &other.head)
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::successors(Some(&*self.head), |layer| layer.parent.as_deref())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for ScopeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStack")
            .field("depth", &self.depth())
            .field("top_id", &self.top_id())
            .field("top", &self.top().render())
            .finish()
    }
}

// Long stacks would otherwise drop recursively through `parent`.
impl Drop for Layer {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(layer) = next {
            match Arc::try_unwrap(layer) {
                Ok(mut layer) => next = layer.parent.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_single_empty_layer() {
        let stack = ScopeStack::root();
        assert_eq!(stack.depth(), 1);
        assert!(stack.top().is_empty());
        assert!(stack.parent().is_none());
    }

    #[test]
    fn test_push_deep_copies_top() {
        let base = ScopeStack::with_root(Scope::from_iter(["root"]));
        let pushed = base.push();

        assert_eq!(pushed.depth(), 2);
        assert_eq!(pushed.top().render(), "root");
        assert!(!Arc::ptr_eq(base.top(), pushed.top()));

        let mut scope = Scope::clone(pushed.top());
        scope.add_tag("inner");
        let configured = pushed.with_top(scope);

        assert_eq!(configured.top().render(), "root, inner");
        assert_eq!(pushed.top().render(), "root");
        assert_eq!(base.top().render(), "root");
    }

    #[test]
    fn test_with_top_keeps_layer_identity() {
        let stack = ScopeStack::root().push();
        let id = stack.top_id();
        let updated = stack.with_top(Scope::from_iter(["t"]));

        assert_eq!(updated.top_id(), id);
        assert_eq!(updated.depth(), stack.depth());
        assert!(!updated.ptr_eq(&stack));
    }

    #[test]
    fn test_contains_and_parent() {
        let root = ScopeStack::root();
        let one = root.push();
        let two = one.push();

        assert!(two.contains(one.top_id()));
        assert!(two.contains(root.top_id()));
        assert!(!one.contains(two.top_id()));
        assert!(two.parent().unwrap().ptr_eq(&one));
        assert_eq!(two.scopes().count(), 3);
    }

    #[test]
    fn test_deep_stack_drops_without_overflow() {
        let mut stack = ScopeStack::root();
        for _ in 0..200_000 {
            stack = stack.push();
        }
        assert_eq!(stack.depth(), 200_001);
        drop(stack);
    }
}
