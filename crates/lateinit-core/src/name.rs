//! Diagnostic names for futures.
//!
//! Names are only used in error codes and log output, so they can be supplied
//! lazily. Unnamed futures get a generated `<kind>-<n>` identity that is stable
//! for a given registration order.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Name of a future or promise.
#[derive(Clone)]
pub struct FutureName {
    repr: Rc<NameRepr>,
}

enum NameRepr {
    Fixed(String),
    Lazy {
        make: Box<dyn Fn() -> String>,
        value: OnceCell<String>,
    },
    Generated {
        prefix: &'static str,
        index: u64,
        value: OnceCell<String>,
    },
}

impl FutureName {
    /// A fixed name.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            repr: Rc::new(NameRepr::Fixed(name.into())),
        }
    }

    /// A name computed on first use.
    pub fn lazy(make: impl Fn() -> String + 'static) -> Self {
        Self {
            repr: Rc::new(NameRepr::Lazy {
                make: Box::new(make),
                value: OnceCell::new(),
            }),
        }
    }

    /// A generated `<prefix>-<index>` name.
    pub fn generated(prefix: &'static str, index: u64) -> Self {
        Self {
            repr: Rc::new(NameRepr::Generated {
                prefix,
                index,
                value: OnceCell::new(),
            }),
        }
    }

    /// Check if this name was generated rather than supplied by the client.
    pub fn is_generated(&self) -> bool {
        matches!(*self.repr, NameRepr::Generated { .. })
    }

    /// The name text.
    pub fn as_str(&self) -> &str {
        match &*self.repr {
            NameRepr::Fixed(name) => name,
            NameRepr::Lazy { make, value } => value.get_or_init(|| make()),
            NameRepr::Generated {
                prefix,
                index,
                value,
            } => value.get_or_init(|| format!("{prefix}-{index}")),
        }
    }
}

impl fmt::Display for FutureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FutureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FutureName({:?})", self.as_str())
    }
}

impl From<&str> for FutureName {
    fn from(name: &str) -> Self {
        FutureName::fixed(name)
    }
}

impl From<String> for FutureName {
    fn from(name: String) -> Self {
        FutureName::fixed(name)
    }
}
