//! Editor events and the synchronous event bus.
//!
//! Subscribers are plain closures. `publish` calls every live subscriber,
//! in subscription order, before it returns; nothing is queued. Each
//! handler receives the event and a shared view of the document as it is
//! after the change.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use crate::document::Document;
use crate::position::{Position, Selection};

/// Something observers may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Paragraphs in `paragraphs` (indices in the current document) were
    /// rewritten. Paragraphs after the range may have shifted.
    DocumentChanged { paragraphs: Range<usize> },
    CursorMoved { position: Position },
    /// The selection changed. `None` means selection mode ended.
    SelectionChanged { selection: Option<Selection> },
    DocumentSaved { path: PathBuf },
    /// A new document replaced the current one; `path` is where it came
    /// from, if anywhere.
    DocumentOpened { path: Option<PathBuf> },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// A subscriber callback.
pub type Handler = Box<dyn FnMut(&Event, &Document)>;

/// Synchronous publish/subscribe.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Handler)>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it sees every event published from now on.
    pub fn subscribe(&mut self, handler: impl FnMut(&Event, &Document) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn publish(&mut self, event: &Event, document: &Document) {
        log::trace!("publish {event:?} to {} subscriber(s)", self.subscribers.len());
        for (_, handler) in &mut self.subscribers {
            handler(event, document);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut EventBus, tag: &'static str, log: &Rc<RefCell<Vec<String>>>) -> SubscriberId {
        let log = Rc::clone(log);
        bus.subscribe(move |event, _| log.borrow_mut().push(format!("{tag}:{event:?}")))
    }

    #[test]
    fn delivers_in_subscription_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&mut bus, "a", &log);
        recorder(&mut bus, "b", &log);

        let doc = Document::new();
        bus.publish(&Event::CursorMoved { position: Position::ZERO }, &doc);
        assert_eq!(
            *log.borrow(),
            ["a:CursorMoved { position: Pos(0:0) }", "b:CursorMoved { position: Pos(0:0) }"]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&mut bus, "a", &log);
        recorder(&mut bus, "b", &log);

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(&Event::DocumentSaved { path: "x.txt".into() }, &Document::new());
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].starts_with("b:"));
    }

    #[test]
    fn handlers_see_the_document() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |_, doc| *sink.borrow_mut() = doc.text());

        let doc = Document::from_text("hi");
        bus.publish(&Event::DocumentChanged { paragraphs: 0..1 }, &doc);
        assert_eq!(*seen.borrow(), "hi");
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let mut bus = EventBus::new();
        bus.publish(&Event::DocumentOpened { path: None }, &Document::new());
        assert_eq!(format!("{bus:?}"), "EventBus { subscribers: 0 }");
    }
}
