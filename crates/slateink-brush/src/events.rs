//! Notification bus for brush lifecycle events.
//!
//! Delivery is synchronous and single-threaded; subscribers run in
//! registration order on the thread that fires the event.

use std::cell::RefCell;
use std::rc::Rc;

use slateink_core::object::ObjectId;
use slateink_core::path::InkPath;

/// Summary of one completed erase gesture: the sets of directly-affected
/// top-level objects, nested sub-targets and affected drawables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErasureSummary {
    pub targets: Vec<ObjectId>,
    pub subtargets: Vec<ObjectId>,
    pub drawables: Vec<ObjectId>,
}

/// Events fired by the pencil and eraser brushes.
#[derive(Debug, Clone)]
pub enum CanvasEvent {
    /// Fired before a finalized pencil path is inserted into the scene.
    BeforePathCreated { path: InkPath },
    /// Fired after insertion.
    PathCreated { path_id: uuid::Uuid },
    /// An erase gesture started.
    ErasingStart,
    /// One object received an erase-path attachment.
    ObjectErased { id: ObjectId },
    /// The whole erase fan-out settled.
    ErasingEnd { summary: ErasureSummary },
}

type Subscriber = Box<dyn FnMut(&CanvasEvent)>;

/// Single-threaded subscriber registry.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F: FnMut(&CanvasEvent) + 'static>(&self, subscriber: F) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    /// Deliver `event` to every subscriber. The registry is moved out for
    /// the duration of delivery so subscribers may call [`subscribe`] or
    /// [`fire`] re-entrantly; subscribers registered during delivery are
    /// appended behind the existing list and see only later events.
    ///
    /// [`subscribe`]: EventBus::subscribe
    /// [`fire`]: EventBus::fire
    pub fn fire(&self, event: &CanvasEvent) {
        let mut subscribers = self.subscribers.take();
        for subscriber in subscribers.iter_mut() {
            subscriber(event);
        }
        let added = self.subscribers.take();
        subscribers.extend(added);
        self.subscribers.replace(subscribers);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}
