//! Scoped document-level event subscriptions.
//!
//! A listener is registered by [`DocumentEvents::subscribe`] and lives exactly as
//! long as the returned [`Subscription`]. Dropping the guard removes it, so a
//! controller that goes out of scope can never leave a dangling handler on the
//! document.

use super::{Key, PromptEvent, Visibility};

/// Document events the prompt listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEventKind {
    KeyDown,
    VisibilityChange,
}

/// A document event, already read out of the platform event object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    KeyDown { key: String },
    VisibilityChange { visibility: Visibility },
}

impl DocumentEvent {
    #[must_use]
    pub const fn kind(&self) -> DocumentEventKind {
        match self {
            Self::KeyDown { .. } => DocumentEventKind::KeyDown,
            Self::VisibilityChange { .. } => DocumentEventKind::VisibilityChange,
        }
    }

    /// Translate into the overlay's event vocabulary.
    #[must_use]
    pub fn to_prompt_event(&self) -> PromptEvent {
        match self {
            Self::KeyDown { key } => PromptEvent::KeyPressed(Key::from_dom_key(key)),
            Self::VisibilityChange { visibility } => PromptEvent::VisibilityChanged(*visibility),
        }
    }
}

/// Source of document-level events (the browser `document`, or a fake in tests).
pub trait DocumentEvents {
    /// Opaque registration handle.
    type Handle;

    /// Register `handler` for `kind`.
    fn listen(
        &self,
        kind: DocumentEventKind,
        handler: Box<dyn FnMut(&DocumentEvent)>,
    ) -> Self::Handle;

    /// Remove a handler previously returned by [`listen`](Self::listen).
    fn unlisten(&self, handle: Self::Handle);

    /// Register `handler` and tie its lifetime to the returned guard.
    fn subscribe(
        &self,
        kind: DocumentEventKind,
        handler: Box<dyn FnMut(&DocumentEvent)>,
    ) -> Subscription<'_, Self>
    where
        Self: Sized,
    {
        let handle = self.listen(kind, handler);
        Subscription {
            source: self,
            handle: Some(handle),
        }
    }
}

/// Guard for one registered listener. Removes it on drop.
#[must_use = "dropping a subscription removes the listener immediately"]
pub struct Subscription<'a, D: DocumentEvents> {
    source: &'a D,
    handle: Option<D::Handle>,
}

impl<D: DocumentEvents> Subscription<'_, D> {
    /// Remove the listener now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.source.unlisten(handle);
        }
    }
}

impl<D: DocumentEvents> Drop for Subscription<'_, D> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl<D: DocumentEvents> std::fmt::Debug for Subscription<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;

    use super::*;

    type Handler = Box<dyn FnMut(&DocumentEvent)>;

    /// In-memory document used by the controller tests.
    #[derive(Default)]
    pub struct FakeDocument {
        next_id: RefCell<u32>,
        listeners: RefCell<Vec<(u32, DocumentEventKind, Handler)>>,
    }

    impl FakeDocument {
        pub fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }

        pub fn fire(&self, event: &DocumentEvent) {
            // Handlers are taken out while running so they may not re-enter
            let mut taken = std::mem::take(&mut *self.listeners.borrow_mut());
            for (_, kind, handler) in &mut taken {
                if *kind == event.kind() {
                    handler(event);
                }
            }
            self.listeners.borrow_mut().extend(taken);
        }
    }

    impl DocumentEvents for FakeDocument {
        type Handle = u32;

        fn listen(&self, kind: DocumentEventKind, handler: Handler) -> u32 {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            self.listeners.borrow_mut().push((*next_id, kind, handler));
            *next_id
        }

        fn unlisten(&self, handle: u32) {
            self.listeners.borrow_mut().retain(|(id, _, _)| *id != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::fake::FakeDocument;
    use super::*;

    #[test]
    fn test_subscription_removed_on_drop() {
        let doc = FakeDocument::default();
        let hits = Rc::new(Cell::new(0));

        {
            let hits = Rc::clone(&hits);
            let _sub = doc.subscribe(
                DocumentEventKind::KeyDown,
                Box::new(move |_| hits.set(hits.get() + 1)),
            );
            assert_eq!(doc.listener_count(), 1);
            doc.fire(&DocumentEvent::KeyDown {
                key: "Escape".to_string(),
            });
        }

        assert_eq!(doc.listener_count(), 0);
        doc.fire(&DocumentEvent::KeyDown {
            key: "Escape".to_string(),
        });
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_release_is_explicit_and_single() {
        let doc = FakeDocument::default();
        let sub = doc.subscribe(DocumentEventKind::VisibilityChange, Box::new(|_| {}));
        let other = doc.subscribe(DocumentEventKind::KeyDown, Box::new(|_| {}));
        assert_eq!(doc.listener_count(), 2);

        sub.release();
        assert_eq!(doc.listener_count(), 1);
        drop(other);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_events_only_reach_matching_kind() {
        let doc = FakeDocument::default();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = doc.subscribe(
            DocumentEventKind::VisibilityChange,
            Box::new(move |_| counter.set(counter.get() + 1)),
        );

        doc.fire(&DocumentEvent::KeyDown {
            key: "Escape".to_string(),
        });
        assert_eq!(hits.get(), 0);
        doc.fire(&DocumentEvent::VisibilityChange {
            visibility: Visibility::Hidden,
        });
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_translation_to_prompt_events() {
        let key = DocumentEvent::KeyDown {
            key: "Escape".to_string(),
        };
        assert_eq!(key.to_prompt_event(), PromptEvent::KeyPressed(Key::Escape));

        let hidden = DocumentEvent::VisibilityChange {
            visibility: Visibility::Hidden,
        };
        assert_eq!(
            hidden.to_prompt_event(),
            PromptEvent::VisibilityChanged(Visibility::Hidden)
        );
    }
}
