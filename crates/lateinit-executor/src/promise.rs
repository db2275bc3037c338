//! Promises - futures completed by an external caller.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use lateinit_core::{FutureError, FutureResult};

use crate::future::Future;
use crate::resolver::Node;

/// A future with no body whose value is set exactly once from outside.
///
/// Futures that declare the promise as a dependency wait for it during batch
/// passes; forcing them before the promise is set is an error.
pub struct Promise<T> {
    node: Rc<Node<T>>,
}

impl<T: Clone + 'static> Promise<T> {
    pub(crate) fn new(node: Rc<Node<T>>) -> Self {
        Self { node }
    }

    /// The future completed by this promise.
    pub fn future(&self) -> Future<T> {
        Future::from_node(Rc::clone(&self.node))
    }

    /// Set the promised value.
    ///
    /// # Errors
    ///
    /// `promise_set` if the promise already has a value.
    pub fn set_result(&self, value: T) -> FutureResult<()> {
        if !self.node.fulfil(value) {
            return Err(FutureError::PromiseAlreadySet {
                name: self.node.meta().name(),
            });
        }
        trace!(promise = %self.node.meta().name, "promise set");
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.node.is_done()
    }

    pub fn name(&self) -> String {
        self.node.meta().name()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: Clone + 'static> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("name", &self.name())
            .field("set", &self.is_set())
            .finish()
    }
}
