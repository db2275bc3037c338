//! Unit tests for resolution and scheduling.

mod scheduler_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Once;

use crate::{Future, FutureResult};

static INIT_LOGGING: Once = Once::new();

/// Route engine logs to the test writer. Safe to call from every test.
pub(crate) fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Assert that `result` failed with the given error code.
pub(crate) fn chk_err<T: Debug>(expected: &str, result: FutureResult<T>) {
    match result {
        Ok(value) => panic!("no error, but expected: {expected} (got {value:?})"),
        Err(err) => assert_eq!(err.code(), expected, "unexpected error: {err}"),
    }
}

/// Futures looked up by name from inside bodies, so bodies can refer to
/// futures registered after them.
#[derive(Clone, Default)]
pub(crate) struct FutureMap {
    futures: Rc<RefCell<BTreeMap<&'static str, Future<i32>>>>,
}

impl FutureMap {
    pub fn insert(&self, name: &'static str, future: Future<i32>) {
        self.futures.borrow_mut().insert(name, future);
    }

    /// Clone the handle out so no borrow is held while it resolves.
    pub fn get(&self, name: &str) -> Future<i32> {
        self.futures
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("future {name} not registered"))
    }

    pub fn result(&self, name: &str) -> FutureResult<i32> {
        self.get(name).get_result()
    }
}

/// Ordered record of body executions.
#[derive(Clone, Default)]
pub(crate) struct ExecLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl ExecLog {
    pub fn add(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.borrow().iter().filter(|e| *e == entry).count()
    }
}
