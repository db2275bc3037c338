//! lateinit executor
//!
//! Resolution of interdependent deferred values whose dependency graph is
//! discovered while they are computed.
//!
//! ## Architecture
//!
//! - **Futures** are registered with a [`Manager`] through a [`FutureBuilder`],
//!   declaring a name, a kind (eager or on-demand), `after` dependencies and a
//!   body (compute or delegate).
//! - **Promises** are futures without a body, completed by [`Promise::set_result`].
//! - **The resolver** drives a future to completion, chasing dependencies
//!   recursively and detecting cycles through an explicit resolution stack.
//! - **The scheduler** (`execute`/`finish`) runs batch passes over eager
//!   futures, deferring those blocked on unset promises to later passes.
//!
//! ## Modules
//!
//! - [`builder`]: future builder
//! - [`deps`]: dependency sources and argument tuples
//! - `future`, `promise`: client handles
//! - `manager`: registry owner and batch scheduler
//! - `resolver`: the recursive resolution algorithm
//! - `registry`, `stack`: registration order and the resolution stack

pub mod builder;
pub mod deps;
mod future;
mod manager;
mod promise;
mod registry;
mod resolver;
mod stack;

pub use builder::FutureBuilder;
pub use deps::{Append, Dependencies, Source};
pub use future::Future;
pub use manager::{Manager, ManagerHandle};
pub use promise::Promise;
pub use registry::Dependency;

pub use lateinit_core::{
    CellState, CycleNode, FutureError, FutureId, FutureKind, FutureName, FutureResult,
    ManagerConfig,
};

#[cfg(test)]
mod tests;
