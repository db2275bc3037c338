//! Identifiers and kinds of registered futures.

use std::fmt;

/// Registration index of a future within its manager.
///
/// Ids are dense and assigned in registration order, which is also the order
/// the batch scheduler visits eager futures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FutureId(u32);

impl FutureId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the batch scheduler computes a future by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FutureKind {
    /// Computed by `execute()`/`finish()`.
    #[default]
    Eager,
    /// Computed only when its result is requested.
    OnDemand,
}

impl FutureKind {
    pub fn from_on_demand(on_demand: bool) -> Self {
        if on_demand {
            FutureKind::OnDemand
        } else {
            FutureKind::Eager
        }
    }

    pub fn is_eager(self) -> bool {
        self == FutureKind::Eager
    }
}
