//! Manager configuration.

/// Settings for a future manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManagerConfig {
    /// Allow `execute()` to be called from inside a future body.
    pub allow_recursive_execution: bool,
    /// Maximum resolution stack depth. `None` means unlimited (bounded only by
    /// the native stack).
    pub max_depth: Option<usize>,
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_recursive_execution(mut self, allow: bool) -> Self {
        self.allow_recursive_execution = allow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
