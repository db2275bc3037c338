//! lateinit - forward-reference resolution for language toolchains.
//!
//! Values that refer to each other (named declarations, lazily computed
//! constants, cross-referencing definitions) are registered as futures with a
//! [`Manager`]. The manager computes every eager future exactly once, in an
//! order consistent with their dependencies; on-demand futures are computed
//! when first requested; promises are completed from outside. Circular
//! dependencies are reported as `cycle:` errors naming every member.
//!
//! ```
//! use lateinit::prelude::*;
//!
//! let mgr = Manager::create();
//! let width = mgr.future().name("width").compute(|()| Ok(4));
//! let height = mgr.promise::<i32>();
//! let area = mgr
//!     .future()
//!     .name("area")
//!     .after(width.clone())
//!     .after(height.future())
//!     .compute(|(w, h)| Ok(w * h));
//!
//! mgr.execute().unwrap();
//! assert!(!area.is_done());
//!
//! height.set_result(5).unwrap();
//! mgr.finish().unwrap();
//! assert_eq!(area.get_result().unwrap(), 20);
//! ```

pub use lateinit_core::{
    CellState, CycleNode, FutureError, FutureId, FutureKind, FutureName, FutureResult,
    ManagerConfig, ValueCell,
};
pub use lateinit_executor::{
    Append, Dependencies, Dependency, Future, FutureBuilder, Manager, ManagerHandle, Promise,
    Source,
};

pub mod prelude {
    pub use crate::{Future, FutureError, FutureResult, Manager, ManagerConfig, Promise};
}
