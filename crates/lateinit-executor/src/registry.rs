//! Future registry - insertion-ordered storage of every registered future.
//!
//! Futures are stored type-erased behind [`Slot`] so the scheduler can walk
//! them without knowing their value types. Registration order is significant:
//! it is the order the batch scheduler attempts eager futures in.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lateinit_core::{CycleNode, FutureId, FutureKind, FutureName, FutureResult};

use crate::manager::ManagerCore;
use crate::resolver::{Edge, Resolution};

/// Identity and settings of a registered future.
#[derive(Debug, Clone)]
pub(crate) struct NodeMeta {
    pub id: FutureId,
    pub name: FutureName,
    pub kind: FutureKind,
    pub attachment: Option<Rc<dyn Any>>,
}

impl NodeMeta {
    pub fn new(
        id: FutureId,
        name: FutureName,
        kind: FutureKind,
        attachment: Option<Rc<dyn Any>>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            attachment,
        }
    }

    pub fn name(&self) -> String {
        self.name.as_str().to_string()
    }

    pub fn cycle_node(&self) -> CycleNode {
        CycleNode::new(self.name(), self.attachment.clone())
    }
}

/// Type-erased view of a registered future.
pub(crate) trait Slot {
    fn meta(&self) -> &NodeMeta;

    fn is_promise(&self) -> bool;

    fn is_pending(&self) -> bool;

    fn is_done(&self) -> bool;

    /// Check if this future was registered with the given manager.
    fn belongs_to(&self, core: &Weak<ManagerCore>) -> bool;

    /// Drive the future towards `Done` without producing its value.
    fn resolve_slot(&self, core: &ManagerCore, edge: Edge) -> FutureResult<Resolution<()>>;

    /// Drop the body and any pending delegate target.
    fn discard(&self);
}

/// Opaque handle to a declared dependency.
#[derive(Clone)]
pub struct Dependency(pub(crate) Rc<dyn Slot>);

impl Dependency {
    pub fn id(&self) -> FutureId {
        self.0.meta().id
    }

    pub fn name(&self) -> String {
        self.0.meta().name()
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Dependency").field(&self.0.meta().name).finish()
    }
}

/// Insertion-ordered list of registered futures.
#[derive(Default)]
pub(crate) struct Registry {
    slots: RefCell<Vec<Rc<dyn Slot>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Id the next registered future will receive.
    pub fn next_id(&self) -> FutureId {
        FutureId::new(self.len() as u32)
    }

    pub fn push(&self, slot: Rc<dyn Slot>) {
        let mut slots = self.slots.borrow_mut();
        debug_assert_eq!(slot.meta().id.index(), slots.len(), "registry ids must be dense");
        slots.push(slot);
    }

    /// Slot at `index`. The borrow is released before returning, so the
    /// caller may register new futures while holding the result.
    pub fn get(&self, index: usize) -> Option<Rc<dyn Slot>> {
        self.slots.borrow().get(index).cloned()
    }

    /// First eager future that is not done, in registration order.
    pub fn first_unfinished_eager(&self) -> Option<Rc<dyn Slot>> {
        self.slots
            .borrow()
            .iter()
            .find(|s| !s.is_promise() && s.meta().kind.is_eager() && !s.is_done())
            .cloned()
    }

    pub fn count_pending(&self) -> usize {
        self.slots.borrow().iter().filter(|s| !s.is_done()).count()
    }

    /// Release every body. Breaks reference cycles formed by bodies that
    /// capture handles to other futures.
    pub fn discard_all(&self) {
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        for slot in &slots {
            slot.discard();
        }
    }
}
