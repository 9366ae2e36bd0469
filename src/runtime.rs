//! In-process picker state machine.
//!
//! This is the canonical implementation of the two-step selection flow that
//! the injected bundle mirrors in the page. Driving it against a
//! [`Document`] keeps every transition, refusal, and teardown rule testable
//! without a browser.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use crate::classifier::{self, Category, Confidence, ElementInfo};
use crate::dom::{Document, NodeId};
use crate::overlay::Overlay;
use crate::script::PollPayload;
use crate::selector;

/// Where the session currently is in the two-step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerStep {
    AwaitingInput,
    AwaitingButton,
    Done,
    Cancelled,
}

impl PickerStep {
    fn is_active(self) -> bool {
        matches!(self, PickerStep::AwaitingInput | PickerStep::AwaitingButton)
    }
}

/// Banner color for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepColor {
    Blue,
    Amber,
    Green,
    Purple,
}

/// What the step banner should render right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIndicator {
    pub number: u8,
    pub total: u8,
    pub color: StepColor,
    pub label: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionState {
    step: PickerStep,
    input_selector: Option<String>,
    button_selector: Option<String>,
}

/// One picking session over a document.
///
/// Holds the document, overlay bookkeeping, and the result slot the host
/// polls. Listener attachment is modeled as a flag so teardown idempotence
/// can be asserted.
pub struct PickerRuntime {
    doc: Document,
    state: SessionState,
    overlay: Overlay,
    translations: HashMap<String, String>,
    result: Option<PollPayload>,
    listeners_attached: bool,
    last_hovered: Option<ElementInfo>,
}

impl PickerRuntime {
    pub fn new(doc: Document, translations: HashMap<String, String>) -> Self {
        PickerRuntime {
            doc,
            state: SessionState {
                step: PickerStep::AwaitingInput,
                input_selector: None,
                button_selector: None,
            },
            overlay: Overlay::new(),
            translations,
            result: None,
            listeners_attached: true,
            last_hovered: None,
        }
    }

    pub fn step(&self) -> PickerStep {
        self.state.step
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn input_selector(&self) -> Option<&str> {
        self.state.input_selector.as_deref()
    }

    pub fn button_selector(&self) -> Option<&str> {
        self.state.button_selector.as_deref()
    }

    pub fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    /// Current value of the result slot. `None` while the session is pending
    /// or after cleanup cleared it.
    pub fn poll(&self) -> Option<PollPayload> {
        self.result.clone()
    }

    /// Pointer moved over `node`. Classifies it fresh and moves the hover
    /// affordance. Inert after the session has ended.
    pub fn pointer_move(&mut self, node: NodeId) -> Option<ElementInfo> {
        if !self.state.step.is_active() {
            return None;
        }
        let info = classifier::classify(&self.doc, node);
        self.overlay
            .apply_hover(&mut self.doc, node, info.confidence);
        self.last_hovered = Some(info.clone());
        Some(info)
    }

    /// Click on `node`. A low-confidence element is refused outright; the
    /// session stays in its current step. A confirmed pick advances the step
    /// and, after the second pick, publishes the result and tears down.
    ///
    /// Returns whether the click was accepted as a pick.
    pub fn click(&mut self, node: NodeId) -> bool {
        if !self.state.step.is_active() {
            return false;
        }
        let info = classifier::classify(&self.doc, node);
        if info.confidence == Confidence::Low {
            return false;
        }

        let selector = selector::generate(&self.doc, node);
        self.overlay.mark_selected(&mut self.doc, node);

        match self.state.step {
            PickerStep::AwaitingInput => {
                self.state.input_selector = Some(selector);
                self.state.step = PickerStep::AwaitingButton;
                self.last_hovered = None;
            }
            PickerStep::AwaitingButton => {
                self.state.button_selector = Some(selector);
                self.state.step = PickerStep::Done;
                let data = json!({
                    "input": self.state.input_selector,
                    "button": self.state.button_selector,
                })
                .to_string();
                self.teardown();
                self.result = Some(PollPayload::Result { data });
            }
            PickerStep::Done | PickerStep::Cancelled => unreachable!("guarded by is_active"),
        }
        true
    }

    /// User-initiated cancellation (Escape). Publishes the cancelled payload
    /// and tears the session down. Inert once the session has ended.
    pub fn cancel(&mut self) {
        if !self.state.step.is_active() {
            return;
        }
        self.state.step = PickerStep::Cancelled;
        self.teardown();
        self.result = Some(PollPayload::Cancelled);
    }

    /// Host-initiated cleanup. Cancels a still-active session, removes all
    /// styling and listeners, and clears the result slot. Idempotent.
    pub fn cleanup(&mut self) {
        if self.state.step.is_active() {
            self.state.step = PickerStep::Cancelled;
        }
        self.teardown();
        self.result = None;
    }

    fn teardown(&mut self) {
        self.overlay.clear_all(&mut self.doc);
        self.listeners_attached = false;
        self.last_hovered = None;
    }

    /// What the banner shows for the current state.
    ///
    /// Step two turns green once the hovered element actually classifies as a
    /// button, signaling the pick is about to succeed.
    pub fn step_indicator(&self) -> StepIndicator {
        let (number, color) = match self.state.step {
            PickerStep::AwaitingInput => (1, StepColor::Blue),
            PickerStep::AwaitingButton => {
                let on_button = self
                    .last_hovered
                    .as_ref()
                    .map(|info| info.category == Category::Button)
                    .unwrap_or(false);
                (2, if on_button { StepColor::Green } else { StepColor::Amber })
            }
            PickerStep::Done | PickerStep::Cancelled => (3, StepColor::Purple),
        };

        let (label, hint) = match &self.last_hovered {
            Some(info) => (
                self.translate(info.label_key, &info.label_en),
                self.translate(info.hint_key, &info.hint_en),
            ),
            None => match self.state.step {
                PickerStep::AwaitingInput => (
                    self.translate(Some("hint_pick_input"), "Click the chat message input"),
                    String::new(),
                ),
                PickerStep::AwaitingButton => (
                    self.translate(Some("hint_pick_button"), "Click the send button"),
                    String::new(),
                ),
                PickerStep::Done | PickerStep::Cancelled => (String::new(), String::new()),
            },
        };

        StepIndicator {
            number,
            total: 3,
            color,
            label,
            hint,
        }
    }

    fn translate(&self, key: Option<&str>, fallback: &str) -> String {
        key.and_then(|k| self.translations.get(k))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}
