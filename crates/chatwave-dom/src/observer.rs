//! # Mutation observers
//!
//! Observers register against a node with a [`MutationObserverInit`] and are
//! called back with the records that matched. Delivery is synchronous and
//! non-reentrant: a mutation made from inside a callback is queued and
//! delivered once the running callback returns.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::Node;

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes { name: String },
}

/// One observed change.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// The node whose children, data or attributes changed.
    pub target: Rc<Node>,
}

/// Which changes an observer is interested in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub character_data: bool,
    pub attributes: bool,
    /// Also report changes anywhere below the observed node.
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Every kind of change, including the subtree.
    pub fn all() -> Self {
        Self {
            child_list: true,
            character_data: true,
            attributes: true,
            subtree: true,
        }
    }

    fn wants(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes { .. } => self.attributes,
        }
    }
}

/// Observer callback.
pub type MutationCallback = Rc<dyn Fn(&[MutationRecord])>;

/// Handle returned by `Document::observe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Registration {
    id: ObserverId,
    target: Weak<Node>,
    init: MutationObserverInit,
    callback: MutationCallback,
}

#[derive(Default)]
pub(crate) struct MutationObservers {
    registrations: RefCell<Vec<Registration>>,
    pending: RefCell<Vec<(ObserverId, MutationRecord)>>,
    delivering: Cell<bool>,
    next_id: Cell<u64>,
}

impl MutationObservers {
    pub(crate) fn observe(
        &self,
        target: &Rc<Node>,
        init: MutationObserverInit,
        callback: MutationCallback,
    ) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.registrations.borrow_mut().push(Registration {
            id,
            target: Rc::downgrade(target),
            init,
            callback,
        });
        id
    }

    pub(crate) fn disconnect(&self, id: ObserverId) {
        self.registrations.borrow_mut().retain(|r| r.id != id);
        self.pending.borrow_mut().retain(|(owner, _)| *owner != id);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.registrations.borrow().is_empty()
    }

    /// Record a mutation for every interested observer.
    pub(crate) fn queue(&self, kind: MutationKind, target: &Rc<Node>) {
        let interested: Vec<ObserverId> = self
            .registrations
            .borrow()
            .iter()
            .filter(|reg| reg.init.wants(&kind))
            .filter(|reg| {
                reg.target.upgrade().is_some_and(|observed| {
                    Rc::ptr_eq(&observed, target)
                        || (reg.init.subtree && target.is_descendant_of(&observed))
                })
            })
            .map(|reg| reg.id)
            .collect();

        if interested.is_empty() {
            return;
        }

        let mut pending = self.pending.borrow_mut();
        for id in interested {
            pending.push((
                id,
                MutationRecord {
                    kind: kind.clone(),
                    target: target.clone(),
                },
            ));
        }
    }

    /// Deliver queued records. Re-entrant calls return immediately.
    pub(crate) fn deliver(&self) {
        if self.delivering.get() {
            return;
        }
        self.delivering.set(true);

        loop {
            let batch = std::mem::take(&mut *self.pending.borrow_mut());
            if batch.is_empty() {
                break;
            }

            let callbacks: Vec<(ObserverId, MutationCallback)> = self
                .registrations
                .borrow()
                .iter()
                .map(|reg| (reg.id, reg.callback.clone()))
                .collect();

            for (id, callback) in callbacks {
                let records: Vec<MutationRecord> = batch
                    .iter()
                    .filter(|(owner, _)| *owner == id)
                    .map(|(_, record)| record.clone())
                    .collect();
                if !records.is_empty() {
                    trace!(observer = id.0, count = records.len(), "Delivering mutations");
                    callback(&records);
                }
            }
        }

        self.delivering.set(false);
    }
}
