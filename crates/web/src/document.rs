//! DOM listeners for the prompt controller.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, Event, EventTarget, KeyboardEvent, VisibilityState};

use tetribass_core::prompt::{DocumentEvent, DocumentEventKind, DocumentEvents, Visibility};

/// A listener attached to a DOM node. Detached on drop.
pub struct DomListener {
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    /// Attach `callback` to `target` for `event_type`.
    ///
    /// # Errors
    ///
    /// Returns the browser's exception if the listener cannot be added.
    pub fn attach(
        target: &EventTarget,
        event_type: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        target.add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())?;

        Ok(Self {
            target: target.clone(),
            event_type,
            callback,
        })
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        if let Err(error) = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.callback.as_ref().unchecked_ref())
        {
            tracing::warn!(?error, event_type = self.event_type, "Failed to detach listener");
        }
    }
}

/// DOM event type for a document event kind.
#[must_use]
pub const fn event_type(kind: DocumentEventKind) -> &'static str {
    match kind {
        DocumentEventKind::KeyDown => "keydown",
        DocumentEventKind::VisibilityChange => "visibilitychange",
    }
}

/// Map `document.visibilityState`. Anything but `visible` counts as hidden.
#[must_use]
pub const fn visibility(state: VisibilityState) -> Visibility {
    match state {
        VisibilityState::Visible => Visibility::Visible,
        _ => Visibility::Hidden,
    }
}

fn read_event(document: &Document, kind: DocumentEventKind, event: &Event) -> Option<DocumentEvent> {
    match kind {
        DocumentEventKind::KeyDown => event
            .dyn_ref::<KeyboardEvent>()
            .map(|key| DocumentEvent::KeyDown { key: key.key() }),
        DocumentEventKind::VisibilityChange => Some(DocumentEvent::VisibilityChange {
            visibility: visibility(document.visibility_state()),
        }),
    }
}

/// The page `document` as a source of prompt events.
pub struct BrowserDocument {
    document: Document,
    next_id: Cell<u32>,
    listeners: RefCell<HashMap<u32, DomListener>>,
}

impl BrowserDocument {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Number of listeners currently attached through this document.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl DocumentEvents for BrowserDocument {
    type Handle = u32;

    fn listen(
        &self,
        kind: DocumentEventKind,
        mut handler: Box<dyn FnMut(&DocumentEvent)>,
    ) -> Self::Handle {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));

        let document = self.document.clone();
        let attached = DomListener::attach(&self.document, event_type(kind), move |event| {
            if let Some(event) = read_event(&document, kind, &event) {
                handler(&event);
            }
        });

        match attached {
            Ok(listener) => {
                self.listeners.borrow_mut().insert(id, listener);
            }
            Err(error) => {
                tracing::warn!(?error, event_type = event_type(kind), "Failed to attach listener");
            }
        }

        id
    }

    fn unlisten(&self, handle: Self::Handle) {
        // Dropped outside the borrow; detaching runs browser code
        let removed = self.listeners.borrow_mut().remove(&handle);
        drop(removed);
    }
}
