//! Hover/selection visual affordances applied inside the target page.
//!
//! The class names are a wire contract: the injected stylesheet matches them
//! verbatim, so they must stay stable strings. Exactly one hover class exists
//! at a time; `selected` is additive and survives later hovers elsewhere.

use crate::classifier::Confidence;
use crate::dom::{Document, NodeId};

/// High confidence — solid green outline plus glow.
pub const HOVER_GOOD: &str = "_ai-picker-hover-good";
/// Medium confidence — amber outline, lighter glow.
pub const HOVER_MEDIUM: &str = "_ai-picker-hover-medium";
/// Low confidence — dashed red outline, not-allowed cursor.
pub const HOVER_LOW: &str = "_ai-picker-hover-low";
/// Confirmed pick for the current step — blue outline plus glow.
pub const SELECTED: &str = "_ai-picker-selected";

const HOVER_CLASSES: [&str; 3] = [HOVER_GOOD, HOVER_MEDIUM, HOVER_LOW];

/// Map a classification confidence to its hover affordance class.
pub fn hover_class(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => HOVER_GOOD,
        Confidence::Medium => HOVER_MEDIUM,
        Confidence::Low => HOVER_LOW,
    }
}

/// Tracks which element currently carries a hover class.
#[derive(Debug, Default)]
pub struct Overlay {
    hovered: Option<NodeId>,
}

impl Overlay {
    pub fn new() -> Self {
        Overlay::default()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Apply the hover class for `confidence` to `node`, clearing any hover
    /// class from the previously hovered element first.
    pub fn apply_hover(&mut self, doc: &mut Document, node: NodeId, confidence: Confidence) {
        if let Some(previous) = self.hovered.take() {
            for class in HOVER_CLASSES {
                doc.remove_class(previous, class);
            }
        }
        for class in HOVER_CLASSES {
            doc.remove_class(node, class);
        }
        doc.add_class(node, hover_class(confidence));
        self.hovered = Some(node);
    }

    /// Mark a confirmed pick. Additive: does not disturb hover classes on
    /// other elements, persists until teardown.
    pub fn mark_selected(&self, doc: &mut Document, node: NodeId) {
        doc.add_class(node, SELECTED);
    }

    /// Remove every picker class from the document. Idempotent.
    pub fn clear_all(&mut self, doc: &mut Document) {
        self.hovered = None;
        for id in doc.all_nodes() {
            for class in HOVER_CLASSES {
                doc.remove_class(id, class);
            }
            doc.remove_class(id, SELECTED);
        }
    }
}
