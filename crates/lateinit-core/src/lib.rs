//! Core types for the lateinit resolution engine.
//!
//! This crate holds the pieces that do not depend on how futures are stored or
//! scheduled:
//!
//! - [`FutureError`] and [`CycleNode`] - the error protocol
//! - [`FutureName`] - lazily computed diagnostic names
//! - [`FutureId`], [`FutureKind`] - registry identity and scheduling kind
//! - [`ValueCell`], [`CellState`] - per-future lifecycle state
//! - [`ManagerConfig`] - manager settings

mod cell;
mod config;
mod error;
mod ids;
mod name;

pub use cell::{CellState, ValueCell};
pub use config::ManagerConfig;
pub use error::{CycleNode, FutureError, FutureResult};
pub use ids::{FutureId, FutureKind};
pub use name::FutureName;
