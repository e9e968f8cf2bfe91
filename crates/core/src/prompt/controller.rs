//! Glue between the reducer, the engine controls and the document listeners.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscription::{DocumentEventKind, DocumentEvents, Subscription};
use super::{EngineSignal, Phase, PromptEvent, PromptState, reduce};

/// Imperative controls exposed by the external game engine.
///
/// Implementations must not call back into the controller synchronously;
/// engine state changes come back through [`PromptController::report_engine`].
pub trait EngineControls {
    fn start_first_game(&mut self);
    fn toggle_pause(&mut self);
    fn restart(&mut self);
    fn toggle_grid(&mut self);
}

type Observer = Box<dyn FnMut(&PromptState)>;

/// Owns the overlay state and forwards reducer signals to the engine.
pub struct PromptController<E> {
    state: PromptState,
    engine: E,
    observer: Option<Observer>,
}

impl<E: std::fmt::Debug> std::fmt::Debug for PromptController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptController")
            .field("state", &self.state)
            .field("engine", &self.engine)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl<E: EngineControls> PromptController<E> {
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            state: PromptState::default(),
            engine,
            observer: None,
        }
    }

    /// Call `observer` with the new state after every change.
    ///
    /// The observer runs while the controller is borrowed and must not reach
    /// back into it.
    pub fn on_change(&mut self, observer: impl FnMut(&PromptState) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    #[must_use]
    pub const fn state(&self) -> &PromptState {
        &self.state
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Apply one event and run the resulting engine control, if any.
    pub fn dispatch(&mut self, event: PromptEvent) -> Phase {
        let transition = reduce(self.state, event);
        let changed = transition.state != self.state;
        self.state = transition.state;

        match transition.signal {
            Some(EngineSignal::StartFirstGame) => self.engine.start_first_game(),
            Some(EngineSignal::TogglePause) => self.engine.toggle_pause(),
            Some(EngineSignal::Restart) => self.engine.restart(),
            Some(EngineSignal::ToggleGrid) => self.engine.toggle_grid(),
            None => {}
        }

        if changed && let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }

        self.state.phase()
    }

    /// Feed the engine's current game-over flag.
    pub fn report_engine(&mut self, is_over: bool) -> Phase {
        self.dispatch(PromptEvent::EngineReported { is_over })
    }
}

impl<E: EngineControls + 'static> PromptController<E> {
    /// Attach keydown and visibilitychange listeners to `document`.
    ///
    /// The listeners stay registered while the returned [`ActiveController`]
    /// is alive and are removed when it is dropped.
    pub fn activate<'d, D: DocumentEvents>(
        controller: &Rc<RefCell<Self>>,
        document: &'d D,
    ) -> ActiveController<'d, D> {
        let on_key = Rc::clone(controller);
        let keydown = document.subscribe(
            DocumentEventKind::KeyDown,
            Box::new(move |event| {
                on_key.borrow_mut().dispatch(event.to_prompt_event());
            }),
        );

        let on_visibility = Rc::clone(controller);
        let visibility = document.subscribe(
            DocumentEventKind::VisibilityChange,
            Box::new(move |event| {
                on_visibility.borrow_mut().dispatch(event.to_prompt_event());
            }),
        );

        ActiveController {
            _keydown: keydown,
            _visibility: visibility,
        }
    }
}

/// Listener guards for an activated controller.
#[must_use = "dropping the guard detaches the controller from the document"]
#[derive(Debug)]
pub struct ActiveController<'a, D: DocumentEvents> {
    _keydown: Subscription<'a, D>,
    _visibility: Subscription<'a, D>,
}

#[cfg(test)]
mod tests {
    use super::super::subscription::fake::FakeDocument;
    use super::super::{DocumentEvent, Visibility};
    use super::*;

    #[derive(Debug, Default)]
    struct CountingEngine {
        first_starts: u32,
        pause_toggles: u32,
        restarts: u32,
        grid_toggles: u32,
    }

    impl EngineControls for CountingEngine {
        fn start_first_game(&mut self) {
            self.first_starts += 1;
        }

        fn toggle_pause(&mut self) {
            self.pause_toggles += 1;
        }

        fn restart(&mut self) {
            self.restarts += 1;
        }

        fn toggle_grid(&mut self) {
            self.grid_toggles += 1;
        }
    }

    fn escape() -> DocumentEvent {
        DocumentEvent::KeyDown {
            key: "Escape".to_string(),
        }
    }

    fn visibility(visibility: Visibility) -> DocumentEvent {
        DocumentEvent::VisibilityChange { visibility }
    }

    fn started() -> Rc<RefCell<PromptController<CountingEngine>>> {
        let controller = Rc::new(RefCell::new(PromptController::new(CountingEngine::default())));
        controller.borrow_mut().dispatch(PromptEvent::PlayPressed);
        controller.borrow_mut().report_engine(false);
        controller
    }

    #[test]
    fn test_escape_scenario_pauses_and_resumes_once_each() {
        let doc = FakeDocument::default();
        let controller = started();
        let _active = PromptController::activate(&controller, &doc);

        doc.fire(&escape());
        {
            let c = controller.borrow();
            assert!(c.state().is_prompt_visible);
            assert_eq!(c.engine().pause_toggles, 1);
        }

        doc.fire(&escape());
        let c = controller.borrow();
        assert!(!c.state().is_prompt_visible);
        assert_eq!(c.engine().pause_toggles, 2);
    }

    #[test]
    fn test_hidden_tab_scenario() {
        let doc = FakeDocument::default();
        let controller = started();
        let _active = PromptController::activate(&controller, &doc);

        doc.fire(&visibility(Visibility::Hidden));
        doc.fire(&visibility(Visibility::Visible));

        let c = controller.borrow();
        assert!(c.state().is_prompt_visible);
        assert_eq!(c.engine().pause_toggles, 1);
    }

    #[test]
    fn test_dropping_active_controller_detaches_listeners() {
        let doc = FakeDocument::default();
        let controller = started();

        let active = PromptController::activate(&controller, &doc);
        assert_eq!(doc.listener_count(), 2);
        drop(active);
        assert_eq!(doc.listener_count(), 0);

        doc.fire(&escape());
        assert_eq!(controller.borrow().engine().pause_toggles, 0);
        assert_eq!(Rc::strong_count(&controller), 1);
    }

    #[test]
    fn test_buttons_drive_engine_controls() {
        let mut controller = PromptController::new(CountingEngine::default());
        assert_eq!(controller.dispatch(PromptEvent::PlayPressed), Phase::Playing);
        assert_eq!(controller.report_engine(true), Phase::GameOver);
        assert_eq!(controller.dispatch(PromptEvent::GridTogglePressed), Phase::GameOver);
        assert_eq!(controller.dispatch(PromptEvent::RestartPressed), Phase::Playing);
        assert_eq!(controller.report_engine(false), Phase::Playing);

        let engine = controller.engine();
        assert_eq!(engine.first_starts, 1);
        assert_eq!(engine.restarts, 1);
        assert_eq!(engine.grid_toggles, 1);
        assert_eq!(engine.pause_toggles, 0);
        assert!(controller.state().is_grid_visible);
    }

    #[test]
    fn test_observer_sees_every_change_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut controller = PromptController::new(CountingEngine::default());
        let sink = Rc::clone(&seen);
        controller.on_change(move |state| sink.borrow_mut().push(state.phase()));

        controller.dispatch(PromptEvent::PlayPressed);
        controller.report_engine(false);
        controller.report_engine(false);
        controller.dispatch(PromptEvent::KeyPressed(super::super::Key::Escape));
        controller.report_engine(true);

        assert_eq!(
            *seen.borrow(),
            vec![Phase::Playing, Phase::Prompt, Phase::GameOver]
        );
    }
}
