//! Error type for future resolution.
//!
//! Every failure of the engine surfaces as a [`FutureError`]. Each variant has a
//! stable machine-readable code (see [`FutureError::code`]) made of a category
//! and the minimal identifying data, plus a human-readable message via `Display`.
//!
//! ## Codes
//!
//! ```text
//! cycle:<n1>,...,<nk>,<n1>          - circular dependency
//! no_result:<name>                  - eager future not computed yet
//! on_demand:promise_unset:<name>    - forced chain hit an unset promise
//! promise_set:<name>                - promise completed twice
//! aborted:<name>                    - future body failed earlier
//! detached:<name>                   - manager dropped before the future completed
//! depth_limit:<name>                - configured resolution depth exceeded
//! finished                          - manager used after finish()
//! recursive_execute                 - execute() called from inside a body
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// One member of a reported cycle.
#[derive(Clone)]
pub struct CycleNode {
    /// Diagnostic name of the future.
    pub name: String,
    /// Client data attached to the future when it was built.
    pub attachment: Option<Rc<dyn Any>>,
}

impl CycleNode {
    pub fn new(name: impl Into<String>, attachment: Option<Rc<dyn Any>>) -> Self {
        Self {
            name: name.into(),
            attachment,
        }
    }

    /// Downcast the attachment to a concrete type.
    pub fn attachment<A: 'static>(&self) -> Option<&A> {
        self.attachment.as_deref().and_then(|a| a.downcast_ref::<A>())
    }
}

impl fmt::Debug for CycleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleNode")
            .field("name", &self.name)
            .field("attachment", &self.attachment.is_some())
            .finish()
    }
}

/// Errors raised while building or resolving futures.
#[derive(Debug, Clone, Error)]
pub enum FutureError {
    /// A future was reached again while it was already being computed.
    #[error("Cyclic future dependency: {}", join_names(.nodes, ", "))]
    Cycle { nodes: Vec<CycleNode> },

    /// An eager future's result was requested before the scheduler computed it.
    #[error("Future has not been computed yet (compute-on-demand is disabled): {name}")]
    NoResult { name: String },

    /// Forcing a future reached a promise that has not been set.
    #[error("Future depends on an unresolved promise: {name}")]
    PromiseUnset { name: String },

    /// `set_result` was called on a promise that already has a value.
    #[error("Promise result already set: {name}")]
    PromiseAlreadySet { name: String },

    /// The future's body ran and its resolution failed; it can never complete.
    #[error("Future computation was aborted by an earlier error: {name}")]
    Aborted { name: String },

    /// The owning manager was dropped while the future was still pending.
    #[error("Future manager has been dropped: {name}")]
    Detached { name: String },

    /// The resolution stack grew past the configured limit.
    #[error("Resolution depth limit ({limit}) exceeded at: {name}")]
    DepthLimit { name: String, limit: usize },

    /// The manager was used after `finish()`.
    #[error("Future manager is already finished")]
    Finished,

    /// `execute()` was called while a batch pass was already running.
    #[error("Recursive execution is not allowed")]
    RecursiveExecution,
}

impl FutureError {
    /// Build a cycle error from the stack suffix starting at the re-entered
    /// future, closing it with `repeated` once more.
    pub fn cycle(members: impl IntoIterator<Item = CycleNode>, repeated: CycleNode) -> Self {
        let mut nodes: Vec<CycleNode> = members.into_iter().collect();
        nodes.push(repeated);
        FutureError::Cycle { nodes }
    }

    /// Stable machine-readable code of this error.
    pub fn code(&self) -> String {
        match self {
            FutureError::Cycle { nodes } => format!("cycle:{}", join_names(nodes, ",")),
            FutureError::NoResult { name } => format!("no_result:{name}"),
            FutureError::PromiseUnset { name } => format!("on_demand:promise_unset:{name}"),
            FutureError::PromiseAlreadySet { name } => format!("promise_set:{name}"),
            FutureError::Aborted { name } => format!("aborted:{name}"),
            FutureError::Detached { name } => format!("detached:{name}"),
            FutureError::DepthLimit { name, .. } => format!("depth_limit:{name}"),
            FutureError::Finished => "finished".to_string(),
            FutureError::RecursiveExecution => "recursive_execute".to_string(),
        }
    }

    /// Check if this is a cycle error.
    pub fn is_cycle(&self) -> bool {
        matches!(self, FutureError::Cycle { .. })
    }

    /// Members of the cycle, if this is a cycle error.
    pub fn cycle_nodes(&self) -> Option<&[CycleNode]> {
        match self {
            FutureError::Cycle { nodes } => Some(nodes),
            _ => None,
        }
    }
}

fn join_names(nodes: &[CycleNode], sep: &str) -> String {
    nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Result alias used throughout the engine.
pub type FutureResult<T> = Result<T, FutureError>;
