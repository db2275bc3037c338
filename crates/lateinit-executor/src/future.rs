//! Future handles.

use std::fmt;
use std::rc::Rc;

use lateinit_core::{FutureId, FutureKind, FutureResult};

use crate::resolver::Node;

/// Handle to a deferred, memoized computation.
///
/// Handles are cheap to clone and may be captured by other futures' bodies.
/// A future is either registered with a manager, or an already-computed
/// value created with [`Future::value`].
pub struct Future<T> {
    pub(crate) repr: FutureRepr<T>,
}

pub(crate) enum FutureRepr<T> {
    Value(T),
    Node(Rc<Node<T>>),
}

impl<T: Clone + 'static> Future<T> {
    /// A future that is already done and belongs to no manager.
    pub fn value(value: T) -> Self {
        Self {
            repr: FutureRepr::Value(value),
        }
    }

    pub(crate) fn from_node(node: Rc<Node<T>>) -> Self {
        Self {
            repr: FutureRepr::Node(node),
        }
    }

    /// Get the result, computing it if this future is on-demand.
    ///
    /// # Errors
    ///
    /// - `no_result` if the future is eager and has not been computed yet
    /// - `cycle` if computing it re-enters a future already being computed
    /// - `on_demand:promise_unset` if it depends on a promise that is not set
    /// - any error raised by a body along the way
    pub fn get_result(&self) -> FutureResult<T> {
        match &self.repr {
            FutureRepr::Value(value) => Ok(value.clone()),
            FutureRepr::Node(node) => node.get_result(),
        }
    }

    /// The result if it has already been computed.
    pub fn peek(&self) -> Option<T> {
        match &self.repr {
            FutureRepr::Value(value) => Some(value.clone()),
            FutureRepr::Node(node) => node.value(),
        }
    }

    pub fn is_done(&self) -> bool {
        match &self.repr {
            FutureRepr::Value(_) => true,
            FutureRepr::Node(node) => node.is_done(),
        }
    }

    /// Diagnostic name; `<value>` for ready futures.
    pub fn name(&self) -> String {
        match &self.repr {
            FutureRepr::Value(_) => "<value>".to_string(),
            FutureRepr::Node(node) => node.meta().name(),
        }
    }

    /// Registration id, `None` for ready futures.
    pub fn id(&self) -> Option<FutureId> {
        match &self.repr {
            FutureRepr::Value(_) => None,
            FutureRepr::Node(node) => Some(node.meta().id),
        }
    }

    pub fn kind(&self) -> FutureKind {
        match &self.repr {
            FutureRepr::Value(_) => FutureKind::Eager,
            FutureRepr::Node(node) => node.meta().kind,
        }
    }
}

impl<T: Clone> Clone for Future<T> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            FutureRepr::Value(value) => FutureRepr::Value(value.clone()),
            FutureRepr::Node(node) => FutureRepr::Node(Rc::clone(node)),
        };
        Self { repr }
    }
}

impl<T: Clone + 'static> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("name", &self.name())
            .field("done", &self.is_done())
            .finish()
    }
}
