//! Manager - registry owner and batch scheduler.
//!
//! ## Batch passes
//!
//! `execute()` scans the registry in registration order and resolves every
//! eager future that is still pending. A future that waits on an unset promise
//! through its declared dependencies is left pending; if the pass also made
//! progress, another pass runs, until a pass changes nothing. Progress is any
//! future or promise completing during the pass, including dependencies
//! computed while chasing a future that ended up blocked:
//!
//! ```text
//! pass 1: a (blocked on p)  b (blocked on a)  c (sets p) ok  d ok
//! pass 2: a ok              b ok
//! pass 3: nothing pending -> fixed point
//! ```
//!
//! Futures still pending at the fixed point are not an error for `execute()`;
//! `finish()` requires every eager future to be done.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use lateinit_core::{
    FutureError, FutureId, FutureKind, FutureName, FutureResult, ManagerConfig,
};

use crate::builder::FutureBuilder;
use crate::promise::Promise;
use crate::registry::{Dependency, NodeMeta, Registry};
use crate::resolver::{Edge, Node, Resolution, Work};
use crate::stack::ResolutionStack;

/// Counters of one batch pass.
#[derive(Debug, Default, Clone, Copy)]
struct PassStats {
    resolved: usize,
    blocked: usize,
}

/// Shared state of a manager. Futures hold a weak reference to it.
pub(crate) struct ManagerCore {
    config: ManagerConfig,
    registry: Registry,
    stack: RefCell<ResolutionStack>,
    generated_names: Cell<u64>,
    /// Futures and promises completed so far, by any path.
    completed: Cell<u64>,
    executing: Cell<bool>,
    finished: Cell<bool>,
}

impl ManagerCore {
    fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            stack: RefCell::new(ResolutionStack::new()),
            generated_names: Cell::new(0),
            completed: Cell::new(0),
            executing: Cell::new(false),
            finished: Cell::new(false),
        }
    }

    fn generate_name(&self, prefix: &'static str) -> FutureName {
        let index = self.generated_names.get();
        self.generated_names.set(index + 1);
        FutureName::generated(prefix, index)
    }

    /// Create a node and register it with the manager behind `core`.
    ///
    /// If the manager is gone the node is created detached; resolving it
    /// reports `detached`.
    pub(crate) fn register<T: Clone + 'static>(
        core: &Weak<ManagerCore>,
        name: Option<FutureName>,
        kind: FutureKind,
        attachment: Option<Rc<dyn Any>>,
        deps: Vec<Dependency>,
        work: Work<T>,
    ) -> Rc<Node<T>> {
        let prefix = if matches!(work, Work::Promise) {
            "promise"
        } else {
            "future"
        };

        let Some(live) = core.upgrade() else {
            let name = name.unwrap_or_else(|| FutureName::fixed(format!("{prefix}-detached")));
            let meta = NodeMeta::new(FutureId::new(u32::MAX), name, kind, attachment);
            return Rc::new(Node::new(meta, Weak::new(), deps, work));
        };

        let id = live.registry.next_id();
        let name = name.unwrap_or_else(|| live.generate_name(prefix));
        let meta = NodeMeta::new(id, name, kind, attachment);
        let node = Rc::new(Node::new(meta, core.clone(), deps, work));
        live.registry.push(node.clone());
        trace!(future = %node.meta().name, %id, ?kind, "registered");
        node
    }

    /// Push a frame for a future about to be computed.
    pub(crate) fn enter(&self, meta: &NodeMeta) -> FutureResult<()> {
        let mut stack = self.stack.borrow_mut();
        if let Some(limit) = self.config.max_depth {
            if stack.depth() >= limit {
                return Err(FutureError::DepthLimit {
                    name: meta.name(),
                    limit,
                });
            }
        }
        if !stack.push(meta.clone()) {
            return Err(stack.cycle_error(meta));
        }
        Ok(())
    }

    pub(crate) fn leave(&self, meta: &NodeMeta) {
        self.stack.borrow_mut().pop(meta.id);
    }

    /// Error for reaching a future that is already `Running`.
    pub(crate) fn reentered(&self, meta: &NodeMeta) -> FutureError {
        let stack = self.stack.borrow();
        if stack.contains(meta.id) {
            stack.cycle_error(meta)
        } else {
            FutureError::Aborted { name: meta.name() }
        }
    }

    pub(crate) fn note_completed(&self) {
        self.completed.set(self.completed.get() + 1);
    }

    pub(crate) fn stack_top(&self) -> Option<NodeMeta> {
        self.stack.borrow().top().cloned()
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn execute(&self) -> FutureResult<()> {
        if self.finished.get() {
            return Err(FutureError::Finished);
        }
        self.run_passes()
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn finish(&self) -> FutureResult<()> {
        if self.finished.get() {
            return Err(FutureError::Finished);
        }
        self.finished.set(true);
        self.run_passes()?;

        if let Some(slot) = self.registry.first_unfinished_eager() {
            let name = slot.meta().name();
            warn!(future = %name, pending = self.registry.count_pending(), "finished with pending futures");
            return Err(FutureError::NoResult { name });
        }
        Ok(())
    }

    fn run_passes(&self) -> FutureResult<()> {
        let nested = self.executing.get() || !self.stack.borrow().is_empty();
        if nested && !self.config.allow_recursive_execution {
            return Err(FutureError::RecursiveExecution);
        }

        let was_executing = self.executing.replace(true);
        let result = self.run_to_fixed_point();
        self.executing.set(was_executing);
        result
    }

    fn run_to_fixed_point(&self) -> FutureResult<()> {
        let mut pass = 0usize;
        loop {
            pass += 1;
            let completed_before = self.completed.get();
            let stats = self.run_pass()?;
            let progress = self.completed.get() - completed_before;
            debug!(
                pass,
                resolved = stats.resolved,
                blocked = stats.blocked,
                progress,
                "batch pass complete"
            );
            if progress == 0 || stats.blocked == 0 {
                return Ok(());
            }
        }
    }

    /// One scan over the registry. Futures registered during the scan are
    /// visited by the same scan.
    fn run_pass(&self) -> FutureResult<PassStats> {
        let mut stats = PassStats::default();
        let mut index = 0;
        while let Some(slot) = self.registry.get(index) {
            index += 1;
            if slot.is_promise() || !slot.meta().kind.is_eager() || !slot.is_pending() {
                continue;
            }
            match slot.resolve_slot(self, Edge::root())? {
                Resolution::Ready(()) => stats.resolved += 1,
                Resolution::Blocked => {
                    stats.blocked += 1;
                    debug!(future = %slot.meta().name, "future blocked on a promise");
                }
            }
        }
        Ok(stats)
    }
}

/// Owner of a set of futures and promises.
///
/// Dropping the manager releases every body that has not run. Handles to
/// futures stay valid: completed futures keep their value, pending ones report
/// `detached`.
pub struct Manager {
    core: Rc<ManagerCore>,
}

impl Manager {
    /// Create a manager with the default configuration.
    pub fn create() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            core: Rc::new(ManagerCore::new(config)),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.core.config
    }

    /// A weak handle for use inside future bodies.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Start building a future.
    pub fn future(&self) -> FutureBuilder<()> {
        FutureBuilder::new(Rc::downgrade(&self.core))
    }

    /// Create and register a promise.
    pub fn promise<T: Clone + 'static>(&self) -> Promise<T> {
        new_promise(&Rc::downgrade(&self.core))
    }

    /// Run batch passes until no eager future can make progress.
    ///
    /// Can be called repeatedly to process newly added futures or futures
    /// unblocked by promises set in between.
    ///
    /// # Errors
    ///
    /// The first error raised by any future other than waiting on a promise.
    pub fn execute(&self) -> FutureResult<()> {
        self.core.execute()
    }

    /// Run batch passes and require every eager future to be done.
    ///
    /// # Errors
    ///
    /// Everything `execute()` reports, plus `no_result` naming the first eager
    /// future still pending.
    pub fn finish(&self) -> FutureResult<()> {
        self.core.finish()
    }

    pub fn is_finished(&self) -> bool {
        self.core.finished.get()
    }

    /// Number of registered futures and promises.
    pub fn future_count(&self) -> usize {
        self.core.registry.len()
    }

    /// Number of registered futures and promises without a value.
    pub fn pending_count(&self) -> usize {
        self.core.registry.count_pending()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::create()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.core.registry.discard_all();
    }
}

/// Weak handle to a [`Manager`], safe to capture in future bodies.
///
/// Futures built through a handle whose manager is gone are detached.
#[derive(Clone)]
pub struct ManagerHandle {
    core: Weak<ManagerCore>,
}

impl ManagerHandle {
    pub fn future(&self) -> FutureBuilder<()> {
        FutureBuilder::new(self.core.clone())
    }

    pub fn promise<T: Clone + 'static>(&self) -> Promise<T> {
        new_promise(&self.core)
    }

    /// Run batch passes from inside a body. Requires
    /// [`ManagerConfig::allow_recursive_execution`].
    pub fn execute(&self) -> FutureResult<()> {
        match self.core.upgrade() {
            Some(core) => core.execute(),
            None => Ok(()),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }
}

fn new_promise<T: Clone + 'static>(core: &Weak<ManagerCore>) -> Promise<T> {
    let node = ManagerCore::register(
        core,
        None,
        FutureKind::Eager,
        None,
        Vec::new(),
        Work::Promise,
    );
    Promise::new(node)
}
