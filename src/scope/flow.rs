/*!
 * Logical Flow Binding
 * Resolves "the current scope stack" for the calling flow
 *
 * # Resolution
 *
 * 1. Inside `FlowContext::scope(fut)` or `FlowContext::run(f)`: the stack
 *    bound by that call, carried in a tokio task-local. It travels with the
 *    future, so a task resumed on another worker still sees its own stack.
 * 2. Inside a tokio task that was not bound (plain `tokio::spawn`): a stack
 *    of its own, keyed by the task id. It starts from a fresh root, not from
 *    the spawner's stack; use `spawn` or `FlowContext::scope` to inherit.
 *    Until the task pushes or configures, it reads a shared empty root and
 *    keeps no entry. The entry is dropped once its guards restore that root.
 *    A task that configures its root layer without pushing keeps its entry
 *    after it finishes, so bind long-lived task families instead.
 * 3. Otherwise: a per-thread stack, lazily initialised with a fresh root on
 *    first observation.
 *
 * Forking is explicit: `FlowContext::fork()` snapshots the current stack
 * reference and the child binds it. Since stacks are persistent, parent and
 * child diverge on their first push or configure without any locking.
 */

use super::guard::ScopeGuard;
use super::stack::{LayerId, ScopeStack};
use super::Scope;
use crate::guard::{GuardError, GuardResult};
use dashmap::DashMap;
use std::cell::RefCell;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::task::Id as TaskId;
use tracing::{debug, trace, warn};

tokio::task_local! {
    static FLOW: RefCell<ScopeStack>;
}

thread_local! {
    static THREAD_FLOW: RefCell<ScopeStack> = RefCell::new(ScopeStack::root());
}

static TASK_FLOWS: OnceLock<DashMap<TaskId, ScopeStack>> = OnceLock::new();
static EMPTY_ROOT: OnceLock<ScopeStack> = OnceLock::new();

fn task_flows() -> &'static DashMap<TaskId, ScopeStack> {
    TASK_FLOWS.get_or_init(DashMap::new)
}

/// Root read by unbound tasks that have not written anything yet
fn empty_root() -> &'static ScopeStack {
    EMPTY_ROOT.get_or_init(ScopeStack::root)
}

#[inline]
fn is_bound() -> bool {
    FLOW.try_with(|_| ()).is_ok()
}

/// Current stack of the calling flow, without creating any state
fn load() -> ScopeStack {
    if is_bound() {
        return FLOW.with(|cell| cell.borrow().clone());
    }
    if let Some(id) = tokio::task::try_id() {
        return task_flows()
            .get(&id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| empty_root().clone());
    }
    THREAD_FLOW.with(|cell| cell.borrow().clone())
}

/// Replace the calling flow's stack through `f`
///
/// `f` must not call back into this module.
fn update<R>(f: impl FnOnce(&mut ScopeStack) -> R) -> R {
    if is_bound() {
        return FLOW.with(|cell| f(&mut cell.borrow_mut()));
    }
    if let Some(id) = tokio::task::try_id() {
        return update_task(id, f);
    }
    THREAD_FLOW.with(|cell| f(&mut cell.borrow_mut()))
}

fn update_task<R>(id: TaskId, f: impl FnOnce(&mut ScopeStack) -> R) -> R {
    let flows = task_flows();
    let mut entry = flows.entry(id).or_insert_with(|| {
        debug!(task = %id, "unbound task starts its own scope stack");
        empty_root().clone()
    });
    let result = f(entry.value_mut());
    let idle = entry.value().ptr_eq(empty_root());
    drop(entry);

    if idle {
        flows.remove_if(&id, |_, stack| stack.ptr_eq(empty_root()));
    }
    result
}

/// Snapshot of a flow's stack, handed across fork boundaries
///
/// # Example
///
/// ```ignore
/// let ctx = FlowContext::fork();
/// tokio::spawn(ctx.scope(async move {
///     let _guard = push_scope();
///     configure_scope(|s| s.add_tag("child-only"));
/// }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowContext {
    stack: ScopeStack,
}

impl FlowContext {
    /// Capture the calling flow's current stack reference
    pub fn fork() -> Self {
        Self {
            stack: current_stack(),
        }
    }

    /// Context starting from a fresh root scope
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_stack(stack: ScopeStack) -> Self {
        Self { stack }
    }

    #[inline]
    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    /// Run `future` as its own logical flow starting from this context
    pub fn scope<F: Future>(self, future: F) -> impl Future<Output = F::Output> {
        FLOW.scope(RefCell::new(self.stack), future)
    }

    /// Run `f` synchronously as its own logical flow starting from this context
    ///
    /// The caller's binding is untouched and back in effect once `f` returns.
    pub fn run<R>(self, f: impl FnOnce() -> R) -> R {
        FLOW.sync_scope(RefCell::new(self.stack), f)
    }
}

/// Spawn a tokio task that starts from a snapshot of the caller's stack
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(FlowContext::fork().scope(future))
}

/// Spawn an OS thread that starts from a snapshot of the caller's stack
pub fn spawn_thread<F, T>(f: F) -> std::thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let ctx = FlowContext::fork();
    std::thread::spawn(move || ctx.run(f))
}

/// Current stack reference of the calling flow
pub fn current_stack() -> ScopeStack {
    load()
}

/// Top scope of the calling flow
pub fn current_scope() -> Arc<Scope> {
    Arc::clone(load().top())
}

/// Push a deep copy of the current top scope
///
/// The returned guard restores the pre-push stack when released or dropped.
pub fn push_scope() -> ScopeGuard {
    update(|current| {
        let previous = current.clone();
        let next = previous.push();
        let layer = next.top_id();
        let depth = next.depth();
        *current = next;
        trace!(layer = %layer, depth, "scope pushed");
        ScopeGuard::new(previous, layer, depth)
    })
}

/// Copy-on-write mutation of the calling flow's top scope
///
/// `f` works on a copy and may read the stack. If the stack changes while
/// `f` runs (a nested configure, a push or a pop), the copy is stale and is
/// discarded with a warning; the nested change stays.
pub(crate) fn configure(f: impl FnOnce(&mut Scope)) {
    let stack = load();
    let mut scope = Scope::clone(stack.top());
    f(&mut scope);

    update(|current| {
        if current.ptr_eq(&stack) {
            *current = current.with_top(scope);
        } else {
            warn!(
                layer = %stack.top_id(),
                current = %current.top_id(),
                "scope stack changed while configuring; mutation discarded"
            );
        }
    });
}

/// Restore `previous` if `layer` is still on the calling flow's stack
pub(crate) fn restore(layer: LayerId, previous: ScopeStack) -> GuardResult<()> {
    update(|current| {
        if !current.contains(layer) {
            return Err(GuardError::OutOfOrder {
                layer: layer.as_u64(),
                depth: current.depth(),
            });
        }
        let discarded = current.depth().saturating_sub(previous.depth());
        *current = previous;
        trace!(layer = %layer, depth = current.depth(), discarded, "scope popped");
        Ok(())
    })
}
