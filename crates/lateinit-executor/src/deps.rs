//! Dependency sources for `FutureBuilder::after`.
//!
//! Each `after(source)` call appends one element to the builder's dependency
//! tuple. When the body runs it receives a tuple with one result per source,
//! in declaration order:
//!
//! ```text
//! after(a: Future<i32>).after(bs: Vec<Future<String>>)
//!     -> body argument: (i32, Vec<String>)
//! ```

use std::collections::BTreeMap;

use lateinit_core::{FutureError, FutureResult};

use crate::future::{Future, FutureRepr};
use crate::registry::Dependency;

/// Something a future can wait for.
pub trait Source: 'static {
    /// Value handed to the body for this source.
    type Output;

    /// Registered futures behind this source, in order.
    fn dependencies(&self, out: &mut Vec<Dependency>);

    /// Read the results. Only called after every dependency is done.
    fn collect(&self) -> FutureResult<Self::Output>;
}

impl<T: Clone + 'static> Source for Future<T> {
    type Output = T;

    fn dependencies(&self, out: &mut Vec<Dependency>) {
        if let FutureRepr::Node(node) = &self.repr {
            out.push(Dependency(node.clone()));
        }
    }

    fn collect(&self) -> FutureResult<T> {
        self.peek().ok_or_else(|| FutureError::NoResult { name: self.name() })
    }
}

impl<T: Clone + 'static> Source for Vec<Future<T>> {
    type Output = Vec<T>;

    fn dependencies(&self, out: &mut Vec<Dependency>) {
        for future in self {
            future.dependencies(out);
        }
    }

    fn collect(&self) -> FutureResult<Vec<T>> {
        self.iter().map(Source::collect).collect()
    }
}

impl<K, T> Source for BTreeMap<K, Future<T>>
where
    K: Ord + Clone + 'static,
    T: Clone + 'static,
{
    type Output = BTreeMap<K, T>;

    fn dependencies(&self, out: &mut Vec<Dependency>) {
        for future in self.values() {
            future.dependencies(out);
        }
    }

    fn collect(&self) -> FutureResult<BTreeMap<K, T>> {
        self.iter()
            .map(|(k, f)| Ok((k.clone(), f.collect()?)))
            .collect()
    }
}

/// Ordered tuple of sources accumulated by the builder.
pub trait Dependencies: 'static {
    type Output;

    fn dependencies(&self, out: &mut Vec<Dependency>);

    fn collect(&self) -> FutureResult<Self::Output>;
}

/// Extend a dependency tuple by one source.
pub trait Append<S: Source>: Dependencies {
    type Appended: Dependencies;

    fn append(self, source: S) -> Self::Appended;
}

macro_rules! impl_dependencies {
    ($($name:ident),*) => {
        impl<$($name: Source),*> Dependencies for ($($name,)*) {
            type Output = ($($name::Output,)*);

            #[allow(non_snake_case, unused_variables)]
            fn dependencies(&self, out: &mut Vec<Dependency>) {
                let ($($name,)*) = self;
                $($name.dependencies(out);)*
            }

            #[allow(non_snake_case, clippy::unused_unit)]
            fn collect(&self) -> FutureResult<Self::Output> {
                let ($($name,)*) = self;
                Ok(($($name.collect()?,)*))
            }
        }
    };
}

macro_rules! impl_append {
    ($($name:ident),*) => {
        impl<$($name: Source,)* Z: Source> Append<Z> for ($($name,)*) {
            type Appended = ($($name,)* Z,);

            #[allow(non_snake_case)]
            fn append(self, source: Z) -> Self::Appended {
                let ($($name,)*) = self;
                ($($name,)* source,)
            }
        }
    };
}

impl_dependencies!();
impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);

impl_append!();
impl_append!(A);
impl_append!(A, B);
impl_append!(A, B, C);
impl_append!(A, B, C, D);
impl_append!(A, B, C, D, E);
impl_append!(A, B, C, D, E, F);
impl_append!(A, B, C, D, E, F, G);
