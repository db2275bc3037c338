//! Resolver - drives a single future from `Pending` to `Done`.
//!
//! ## Algorithm
//!
//! `resolve(target, edge)` is the one recursive operation behind every result
//! access:
//!
//! 1. `Done(v)` returns `v` without touching the stack.
//! 2. `Running` means the target is re-entered: a cycle if it is on the stack,
//!    otherwise the target was left behind by an earlier failure.
//! 3. An unset promise blocks (deferrable batch path) or fails.
//! 4. An eager future reached by a plain `get_result` call is not chased.
//! 5. Otherwise the target is pushed, its declared dependencies are resolved
//!    in order, the body runs, and a delegate result is chased in turn.
//!
//! The [`Edge`] tells the resolver how the target was reached and whether an
//! unset promise on the path may be deferred to a later batch pass.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::trace;

use lateinit_core::{FutureError, FutureResult, ValueCell};

use crate::future::{Future, FutureRepr};
use crate::manager::ManagerCore;
use crate::registry::{Dependency, NodeMeta, Slot};

/// How the resolver reached a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Via {
    /// Attempted by the batch scheduler.
    Root,
    /// Declared `after` dependency of the future being computed.
    After,
    /// Future returned by a delegate body.
    Delegate,
    /// `get_result()` from client code or from inside a body.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub via: Via,
    /// An unset promise on this path blocks instead of failing.
    pub deferrable: bool,
}

impl Edge {
    pub fn root() -> Self {
        Self {
            via: Via::Root,
            deferrable: true,
        }
    }

    pub fn direct() -> Self {
        Self {
            via: Via::Direct,
            deferrable: false,
        }
    }

    fn after(deferrable: bool) -> Self {
        Self {
            via: Via::After,
            deferrable,
        }
    }

    fn delegate(deferrable: bool) -> Self {
        Self {
            via: Via::Delegate,
            deferrable,
        }
    }
}

/// Outcome of a resolution attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution<T> {
    Ready(T),
    /// Waiting on an unset promise; retry in a later pass.
    Blocked,
}

impl<T> Resolution<T> {
    pub fn erase(self) -> Resolution<()> {
        match self {
            Resolution::Ready(_) => Resolution::Ready(()),
            Resolution::Blocked => Resolution::Blocked,
        }
    }
}

pub(crate) type Body<T> = Box<dyn FnOnce() -> FutureResult<Future<T>>>;

/// What is left to do for a future.
pub(crate) enum Work<T> {
    /// Completed externally by `Promise::set_result`.
    Promise,
    /// Body not run yet.
    Body(Body<T>),
    /// Body ran as a delegate; its target was blocked.
    Redirect(Future<T>),
    /// Nothing left: done, failed, or discarded.
    Spent,
}

/// A registered future with its value cell.
pub(crate) struct Node<T> {
    meta: NodeMeta,
    core: Weak<ManagerCore>,
    cell: ValueCell<T>,
    deps: Vec<Dependency>,
    work: RefCell<Work<T>>,
}

impl<T: Clone + 'static> Node<T> {
    pub fn new(
        meta: NodeMeta,
        core: Weak<ManagerCore>,
        deps: Vec<Dependency>,
        work: Work<T>,
    ) -> Self {
        Self {
            meta,
            core,
            cell: ValueCell::new(),
            deps,
            work: RefCell::new(work),
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    pub fn core(&self) -> &Weak<ManagerCore> {
        &self.core
    }

    pub fn value(&self) -> Option<T> {
        self.cell.value()
    }

    pub fn is_done(&self) -> bool {
        self.cell.is_done()
    }

    fn is_promise(&self) -> bool {
        matches!(*self.work.borrow(), Work::Promise)
    }

    /// Complete a promise. Returns `false` if it already has a value.
    pub fn fulfil(&self, value: T) -> bool {
        debug_assert!(self.is_promise());
        if !self.cell.complete(value) {
            return false;
        }
        if let Some(core) = self.core.upgrade() {
            core.note_completed();
        }
        true
    }

    /// Result access from client code or from inside a body.
    pub fn get_result(&self) -> FutureResult<T> {
        if let Some(value) = self.cell.value() {
            return Ok(value);
        }
        let core = self.core.upgrade().ok_or_else(|| FutureError::Detached {
            name: self.meta.name(),
        })?;
        match self.resolve(&core, Edge::direct())? {
            Resolution::Ready(value) => Ok(value),
            // Direct edges are never deferrable.
            Resolution::Blocked => Err(FutureError::NoResult {
                name: self.meta.name(),
            }),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&self, core: &ManagerCore, edge: Edge) -> FutureResult<Resolution<T>> {
        if let Some(value) = self.cell.value() {
            return Ok(Resolution::Ready(value));
        }
        if self.cell.is_running() {
            return Err(core.reentered(&self.meta));
        }
        if self.is_promise() {
            return self.unset_promise(core, edge);
        }
        if edge.via == Via::Direct && self.meta.kind.is_eager() {
            return Err(FutureError::NoResult {
                name: self.meta.name(),
            });
        }

        core.enter(&self.meta)?;
        let started = self.cell.start();
        debug_assert!(started, "resolving a future that is not pending");
        trace!(future = %self.meta.name, via = ?edge.via, "resolving");

        let result = self.run(core, edge.deferrable);
        core.leave(&self.meta);

        match result {
            Ok(Resolution::Ready(value)) => {
                let completed = self.cell.complete(value.clone());
                debug_assert!(completed, "future completed twice");
                core.note_completed();
                trace!(future = %self.meta.name, "resolved");
                Ok(Resolution::Ready(value))
            }
            Ok(Resolution::Blocked) => {
                self.cell.rollback();
                trace!(future = %self.meta.name, "blocked");
                Ok(Resolution::Blocked)
            }
            Err(err) => {
                // A future whose body already ran stays `Running` for good,
                // unless it is still waiting on its delegate target.
                if matches!(*self.work.borrow(), Work::Body(_) | Work::Redirect(_)) {
                    self.cell.rollback();
                }
                trace!(future = %self.meta.name, code = %err.code(), "resolution failed");
                Err(err)
            }
        }
    }

    fn unset_promise(&self, core: &ManagerCore, edge: Edge) -> FutureResult<Resolution<T>> {
        match edge.via {
            Via::After | Via::Delegate if edge.deferrable => Ok(Resolution::Blocked),
            Via::After | Via::Delegate => {
                let name = core
                    .stack_top()
                    .map(|top| top.name())
                    .unwrap_or_else(|| self.meta.name());
                Err(FutureError::PromiseUnset { name })
            }
            Via::Root | Via::Direct => Err(FutureError::NoResult {
                name: self.meta.name(),
            }),
        }
    }

    fn run(&self, core: &ManagerCore, deferrable: bool) -> FutureResult<Resolution<T>> {
        let work = std::mem::replace(&mut *self.work.borrow_mut(), Work::Spent);
        let target = match work {
            Work::Body(body) => {
                for dep in &self.deps {
                    let outcome = dep.0.resolve_slot(core, Edge::after(deferrable));
                    if !matches!(outcome, Ok(Resolution::Ready(()))) {
                        *self.work.borrow_mut() = Work::Body(body);
                        return outcome.map(|_| Resolution::Blocked);
                    }
                }
                body()?
            }
            Work::Redirect(target) => target,
            Work::Promise | Work::Spent => {
                return Err(FutureError::Aborted {
                    name: self.meta.name(),
                });
            }
        };
        self.adopt(core, target, deferrable)
    }

    /// Take over the value of the future a delegate body returned.
    fn adopt(
        &self,
        core: &ManagerCore,
        target: Future<T>,
        deferrable: bool,
    ) -> FutureResult<Resolution<T>> {
        let resolution = match &target.repr {
            FutureRepr::Value(value) => Resolution::Ready(value.clone()),
            FutureRepr::Node(node) => {
                assert!(
                    node.core().ptr_eq(&self.core),
                    "delegate of `{}` returned a future owned by another manager",
                    self.meta.name
                );
                match node.resolve(core, Edge::delegate(deferrable)) {
                    Ok(resolution) => resolution,
                    Err(err @ FutureError::PromiseUnset { .. }) => {
                        *self.work.borrow_mut() = Work::Redirect(target.clone());
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                }
            }
        };
        if matches!(resolution, Resolution::Blocked) {
            *self.work.borrow_mut() = Work::Redirect(target);
        }
        Ok(resolution)
    }
}

impl<T: Clone + 'static> Slot for Node<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn is_promise(&self) -> bool {
        Node::is_promise(self)
    }

    fn is_pending(&self) -> bool {
        self.cell.is_pending()
    }

    fn is_done(&self) -> bool {
        self.cell.is_done()
    }

    fn belongs_to(&self, core: &Weak<ManagerCore>) -> bool {
        self.core.ptr_eq(core)
    }

    fn resolve_slot(&self, core: &ManagerCore, edge: Edge) -> FutureResult<Resolution<()>> {
        self.resolve(core, edge).map(Resolution::erase)
    }

    fn discard(&self) {
        let mut work = self.work.borrow_mut();
        if !matches!(*work, Work::Promise) {
            *work = Work::Spent;
        }
    }
}
