//! Value cell - lifecycle state and result of one deferred computation.
//!
//! ```text
//! Pending ──start()──> Running ──complete(v)──> Done(v)
//!    ^                    │
//!    └─────rollback()─────┘   (resolution blocked before the body ran)
//! ```
//!
//! A promise cell skips `Running` and goes straight to `Done` via `complete`.

use std::cell::RefCell;

/// Lifecycle state of a [`ValueCell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState<T> {
    Pending,
    Running,
    Done(T),
}

impl<T> CellState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, CellState::Pending)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CellState::Running)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, CellState::Done(_))
    }
}

/// Interior-mutable holder for a future's state.
///
/// Borrows are never held across calls into client code, so bodies may freely
/// inspect other cells while one is being computed.
#[derive(Debug)]
pub struct ValueCell<T> {
    state: RefCell<CellState<T>>,
}

impl<T: Clone> ValueCell<T> {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(CellState::Pending),
        }
    }

    /// A cell that is already done.
    pub fn done(value: T) -> Self {
        Self {
            state: RefCell::new(CellState::Done(value)),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CellState<T> {
        self.state.borrow().clone()
    }

    /// The value, if done.
    pub fn value(&self) -> Option<T> {
        match &*self.state.borrow() {
            CellState::Done(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    pub fn is_done(&self) -> bool {
        self.state.borrow().is_done()
    }

    /// Transition `Pending -> Running`. Returns `false` in any other state.
    pub fn start(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.is_pending() {
            *state = CellState::Running;
            true
        } else {
            false
        }
    }

    /// Transition `Running -> Pending`.
    pub fn rollback(&self) {
        let mut state = self.state.borrow_mut();
        debug_assert!(state.is_running(), "rollback of a cell that is not running");
        if state.is_running() {
            *state = CellState::Pending;
        }
    }

    /// Store the final value. Returns `false` if the cell was already done.
    pub fn complete(&self, value: T) -> bool {
        let mut state = self.state.borrow_mut();
        if state.is_done() {
            return false;
        }
        *state = CellState::Done(value);
        true
    }
}

impl<T: Clone> Default for ValueCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
