//! In-process notification channel owned by a list instance.
//!
//! Listeners run synchronously, in registration order, on the thread that
//! triggered the event.

use crate::geometry::{ScrollOffset, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent<I> {
    ItemAdded(I),
    ItemRemoved(I),
    Resize(Size),
    /// Scroll driven by the user through the host, never by the list itself.
    UserScroll(ScrollOffset),
    Scroll(ScrollOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ItemAdded,
    ItemRemoved,
    Resize,
    UserScroll,
    Scroll,
}

impl<I> ListEvent<I> {
    pub fn kind(&self) -> EventKind {
        match self {
            ListEvent::ItemAdded(_) => EventKind::ItemAdded,
            ListEvent::ItemRemoved(_) => EventKind::ItemRemoved,
            ListEvent::Resize(_) => EventKind::Resize,
            ListEvent::UserScroll(_) => EventKind::UserScroll,
            ListEvent::Scroll(_) => EventKind::Scroll,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<I> = Box<dyn FnMut(&ListEvent<I>)>;

struct Registration<I> {
    id: ListenerId,
    filter: Option<EventKind>,
    listener: Listener<I>,
}

pub struct EventBus<I> {
    listeners: Vec<Registration<I>>,
    next_id: u64,
}

impl<I> Default for EventBus<I> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<I> std::fmt::Debug for EventBus<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<I> EventBus<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every event.
    pub fn subscribe(&mut self, listener: impl FnMut(&ListEvent<I>) + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    /// Registers a listener for one kind of event.
    pub fn subscribe_to(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&ListEvent<I>) + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Box::new(listener))
    }

    fn register(&mut self, filter: Option<EventKind>, listener: Listener<I>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            filter,
            listener,
        });
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|registration| registration.id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &ListEvent<I>) {
        let kind = event.kind();
        for registration in &mut self.listeners {
            if registration.filter.is_none_or(|filter| filter == kind) {
                (registration.listener)(event);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn delivers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();
        for tag in ["first", "second", "third"] {
            let log = log.clone();
            bus.subscribe(move |_| log.borrow_mut().push(tag));
        }

        bus.emit(&ListEvent::ItemAdded(1));

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn filtered_listener_only_sees_its_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();
        let sink = seen.clone();
        bus.subscribe_to(EventKind::ItemRemoved, move |event| {
            sink.borrow_mut().push(event.clone())
        });

        bus.emit(&ListEvent::ItemAdded(1));
        bus.emit(&ListEvent::ItemRemoved(2));
        bus.emit(&ListEvent::Scroll(ScrollOffset::default()));

        assert_eq!(*seen.borrow(), vec![ListEvent::ItemRemoved(2)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut bus: EventBus<u32> = EventBus::new();
        let counter = count.clone();
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.emit(&ListEvent::Resize(Size::new(1, 1)));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&ListEvent::Resize(Size::new(1, 1)));

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}
