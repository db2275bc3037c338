//! Resolution stack - the chain of futures currently being computed.
//!
//! The stack never holds the same future twice; a failed push is exactly the
//! cycle condition, so cycle detection is a set membership check.

use rustc_hash::FxHashSet;

use lateinit_core::{FutureError, FutureId};

use crate::registry::NodeMeta;

#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    frames: Vec<NodeMeta>,
    members: FxHashSet<FutureId>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, id: FutureId) -> bool {
        self.members.contains(&id)
    }

    /// Topmost frame, i.e. the future whose dependencies are being chased.
    pub fn top(&self) -> Option<&NodeMeta> {
        self.frames.last()
    }

    /// Push a frame. Returns `false` if the future is already on the stack.
    pub fn push(&mut self, meta: NodeMeta) -> bool {
        if !self.members.insert(meta.id) {
            return false;
        }
        self.frames.push(meta);
        true
    }

    /// Pop the topmost frame, which must be `id`.
    pub fn pop(&mut self, id: FutureId) {
        let last = self.frames.pop();
        debug_assert_eq!(last.as_ref().map(|m| m.id), Some(id), "unbalanced stack pop");
        self.members.remove(&id);
    }

    /// Cycle error for re-entering `meta`, which must be on the stack.
    pub fn cycle_error(&self, meta: &NodeMeta) -> FutureError {
        let start = self
            .frames
            .iter()
            .position(|f| f.id == meta.id)
            .unwrap_or(0);
        FutureError::cycle(
            self.frames[start..].iter().map(NodeMeta::cycle_node),
            meta.cycle_node(),
        )
    }
}
