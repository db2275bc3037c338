//! Future builder.
//!
//! ```ignore
//! let sum = manager
//!     .future()
//!     .name("sum")
//!     .after(a.clone())
//!     .after(b.clone())
//!     .compute(|(a, b)| Ok(a + b));
//! ```
//!
//! The builder is finalized by exactly one of [`FutureBuilder::compute`] or
//! [`FutureBuilder::delegate`]; both consume it and register the future.

use std::any::Any;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashSet;

use lateinit_core::{FutureKind, FutureName, FutureResult};

use crate::deps::{Append, Dependencies, Source};
use crate::future::Future;
use crate::manager::ManagerCore;
use crate::registry::Dependency;
use crate::resolver::{Body, Work};

#[derive(Default)]
struct FutureSettings {
    name: Option<FutureName>,
    attachment: Option<Rc<dyn Any>>,
    kind: FutureKind,
}

/// Configuration of a future under construction.
#[must_use = "a future is only registered by compute() or delegate()"]
pub struct FutureBuilder<D = ()> {
    core: Weak<ManagerCore>,
    settings: FutureSettings,
    deps: D,
}

impl FutureBuilder<()> {
    pub(crate) fn new(core: Weak<ManagerCore>) -> Self {
        Self {
            core,
            settings: FutureSettings::default(),
            deps: (),
        }
    }
}

impl<D: Dependencies> FutureBuilder<D> {
    /// Set the diagnostic name.
    ///
    /// # Panics
    ///
    /// Panics if a name was already set.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.with_name(FutureName::fixed(name))
    }

    /// Set a diagnostic name computed on first use.
    ///
    /// # Panics
    ///
    /// Panics if a name was already set.
    pub fn name_with(self, make: impl Fn() -> String + 'static) -> Self {
        self.with_name(FutureName::lazy(make))
    }

    fn with_name(mut self, name: FutureName) -> Self {
        assert!(self.settings.name.is_none(), "future name already set");
        self.settings.name = Some(name);
        self
    }

    /// Attach client data, reported with the future in cycle errors.
    ///
    /// # Panics
    ///
    /// Panics if an attachment was already set.
    pub fn attachment<A: Any>(mut self, data: A) -> Self {
        assert!(
            self.settings.attachment.is_none(),
            "future attachment already set"
        );
        self.settings.attachment = Some(Rc::new(data));
        self
    }

    /// Compute only when the result is requested, not in batch passes.
    pub fn compute_on_demand(mut self, on_demand: bool) -> Self {
        self.settings.kind = FutureKind::from_on_demand(on_demand);
        self
    }

    /// Declare a dependency. Its result is appended to the body's argument tuple.
    pub fn after<S>(self, source: S) -> FutureBuilder<<D as Append<S>>::Appended>
    where
        S: Source,
        D: Append<S>,
    {
        FutureBuilder {
            core: self.core,
            settings: self.settings,
            deps: self.deps.append(source),
        }
    }

    /// Register a future whose body yields the value directly.
    pub fn compute<T, F>(self, block: F) -> Future<T>
    where
        T: Clone + 'static,
        F: FnOnce(D::Output) -> FutureResult<T> + 'static,
    {
        self.delegate(move |args| block(args).map(Future::value))
    }

    /// Register a future whose body yields another future; that future's
    /// eventual value becomes this future's value.
    ///
    /// # Panics
    ///
    /// Panics if a dependency belongs to another manager or is listed twice.
    pub fn delegate<T, F>(self, block: F) -> Future<T>
    where
        T: Clone + 'static,
        F: FnOnce(D::Output) -> FutureResult<Future<T>> + 'static,
    {
        let FutureBuilder {
            core,
            settings,
            deps,
        } = self;

        let mut dependencies = Vec::new();
        deps.dependencies(&mut dependencies);
        check_dependencies(&core, &dependencies);

        let body: Body<T> = Box::new(move || {
            let args = deps.collect()?;
            block(args)
        });

        let node = ManagerCore::register(
            &core,
            settings.name,
            settings.kind,
            settings.attachment,
            dependencies,
            Work::Body(body),
        );
        Future::from_node(node)
    }
}

fn check_dependencies(core: &Weak<ManagerCore>, dependencies: &[Dependency]) {
    let mut seen = FxHashSet::default();
    for dep in dependencies {
        assert!(
            dep.0.belongs_to(core),
            "dependency `{}` belongs to another manager",
            dep.name()
        );
        assert!(
            seen.insert(dep.id()),
            "dependency `{}` declared more than once",
            dep.name()
        );
    }
}
