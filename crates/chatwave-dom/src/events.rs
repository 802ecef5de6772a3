//! # DOM Events
//!
//! Synthetic input from the bridge (clicks, press/release gestures) is
//! dispatched through capture, target and bubble phases so that listeners
//! registered by page behaviour see it the way they would see real input.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// An event in flight. Propagation state is interior so listeners can stop it.
#[derive(Debug)]
pub struct DomEvent {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    phase: Cell<EventPhase>,
    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
    stopped: Cell<bool>,
    canceled: Cell<bool>,
}

impl DomEvent {
    pub fn new(event_type: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles,
            cancelable,
            phase: Cell::new(EventPhase::None),
            target: Cell::new(None),
            current_target: Cell::new(None),
            stopped: Cell::new(false),
            canceled: Cell::new(false),
        }
    }

    /// Bubbling, cancelable mouse event, like `initEvent(type, true, true)`.
    pub fn mouse(event_type: &str) -> Self {
        Self::new(event_type, true, true)
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    /// Node the event was dispatched at.
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    /// Node whose listeners are running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// No effect on non-cancelable events.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.canceled.set(true);
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.get()
    }
}

pub type EventListener = Rc<dyn Fn(&DomEvent)>;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    /// Run during capture instead of bubble.
    pub capture: bool,
    /// Unregister after the first call.
    pub once: bool,
}

struct Registered {
    id: u64,
    event_type: String,
    options: ListenerOptions,
    listener: EventListener,
}

/// Listeners attached to one node.
#[derive(Default)]
pub struct EventTarget {
    registered: RefCell<Vec<Registered>>,
    next_id: Cell<u64>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_listener(
        &self,
        event_type: &str,
        listener: EventListener,
        options: ListenerOptions,
    ) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.registered.borrow_mut().push(Registered {
            id,
            event_type: event_type.to_string(),
            options,
            listener,
        });
    }

    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.registered
            .borrow()
            .iter()
            .any(|r| r.event_type == event_type)
    }

    /// Run the listeners that apply to the event's current phase.
    ///
    /// The matching set is copied out first, so listeners may register new
    /// listeners or mutate the tree.
    fn run(&self, event: &DomEvent) {
        let phase = event.phase();
        let matching: Vec<(u64, bool, EventListener)> = self
            .registered
            .borrow()
            .iter()
            .filter(|r| r.event_type == event.event_type)
            .filter(|r| match phase {
                EventPhase::Capturing => r.options.capture,
                EventPhase::AtTarget => true,
                EventPhase::Bubbling => !r.options.capture,
                EventPhase::None => false,
            })
            .map(|r| (r.id, r.options.once, r.listener.clone()))
            .collect();

        for (id, once, listener) in matching {
            if once {
                self.registered.borrow_mut().retain(|r| r.id != id);
            }
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.registered.borrow().len())
            .finish()
    }
}

/// Dispatch `event` at `target`; `ancestors` run from the root down to the parent.
///
/// Returns false when a listener prevented the default action.
pub(crate) fn dispatch(event: &DomEvent, target: &Rc<Node>, ancestors: &[Rc<Node>]) -> bool {
    event.target.set(Some(target.id));

    let visit = |node: &Rc<Node>, phase: EventPhase| {
        event.phase.set(phase);
        event.current_target.set(Some(node.id));
        node.event_target.run(event);
    };

    for node in ancestors {
        if event.is_propagation_stopped() {
            break;
        }
        visit(node, EventPhase::Capturing);
    }
    if !event.is_propagation_stopped() {
        visit(target, EventPhase::AtTarget);
    }
    if event.bubbles {
        for node in ancestors.iter().rev() {
            if event.is_propagation_stopped() {
                break;
            }
            visit(node, EventPhase::Bubbling);
        }
    }

    event.phase.set(EventPhase::None);
    event.current_target.set(None);
    !event.is_canceled()
}
