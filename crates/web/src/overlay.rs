//! Keeps the server-rendered `#prompt` overlay in step with the controller.
//!
//! The markup matches `templates/partials/prompt.html` so the first client
//! render replaces the server render without a visible change.

use std::fmt::Write as _;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event};

use tetribass_core::prompt::{AuthAffordance, PromptState, PromptView};

/// Id of the overlay container.
pub const PROMPT_ID: &str = "prompt";

/// Handle on the overlay element.
#[derive(Debug, Clone)]
pub struct Overlay {
    element: Element,
    auth: AuthAffordance,
}

impl Overlay {
    /// Find the overlay on the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page has no `#prompt` element.
    pub fn find(document: &Document, auth: AuthAffordance) -> Result<Self, JsValue> {
        let element = document
            .get_element_by_id(PROMPT_ID)
            .ok_or_else(|| JsValue::from_str("missing #prompt element"))?;

        Ok(Self { element, auth })
    }

    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    pub fn render(&self, state: &PromptState) {
        let view = PromptView::new(state, self.auth);
        self.element.set_class_name(&class_name(&view));
        self.element.set_inner_html(&markup(&view));
    }
}

/// Class attribute of the overlay container.
#[must_use]
pub fn class_name(view: &PromptView) -> String {
    format!("game-control {}", view.css_class())
}

/// Inner markup of the overlay container.
#[must_use]
pub fn markup(view: &PromptView) -> String {
    let mut html = String::new();

    if let Some(heading) = view.heading {
        let _ = write!(html, r#"<h2 class="game-control-heading">{heading}</h2>"#);
    }

    html.push_str(r#"<div class="game-control-buttons">"#);
    for button in &view.buttons {
        let label = button.label();
        match (button.href(), button.action()) {
            (Some(href), _) => {
                let _ = write!(html, r#"<a class="button" href="{href}">{label}</a>"#);
            }
            (None, action) => {
                let primary = if button.is_primary() { " button-primary" } else { "" };
                let action = action.unwrap_or_default();
                let _ = write!(
                    html,
                    r#"<button type="button" class="button{primary}" data-action="{action}">{label}</button>"#
                );
            }
        }
    }
    html.push_str("</div>");

    html
}

/// `data-action` of the overlay button a click landed on, if any.
#[must_use]
pub fn clicked_action(event: &Event) -> Option<String> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest("[data-action]")
        .ok()
        .flatten()?
        .get_attribute("data-action")
}
