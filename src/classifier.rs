//! Heuristic classification of DOM elements into semantic picker roles.
//!
//! The classifier is a total, deterministic function: any element yields an
//! [`ElementInfo`], falling back to the unknown/low-confidence path rather
//! than failing, so a single unusual node can never abort a picking session.
//! The rule order is load-bearing — e.g. a content-editable `<div>` must win
//! over the generic clickable-`<div>` probe — and is pinned by tests.

use serde::Serialize;

use crate::dom::{Document, NodeId};

/// Semantic role inferred for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Input,
    Button,
    Container,
    Icon,
    Text,
    Unknown,
}

/// How safe it is to bind the element to the inferred role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Classification result produced fresh on every hover or click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub category: Category,
    pub label_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_key: Option<&'static str>,
    pub confidence: Confidence,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_key: Option<&'static str>,
    pub hint_en: String,
}

const HINT_USE_INPUT: &str = "Click to bind this as the message input";
const HINT_USE_BUTTON: &str = "Click to bind this as the send button";

fn info(
    doc: &Document,
    id: NodeId,
    category: Category,
    confidence: Confidence,
    label_en: &str,
    label_key: Option<&'static str>,
    hint_en: &str,
    hint_key: Option<&'static str>,
) -> ElementInfo {
    ElementInfo {
        category,
        label_en: label_en.to_string(),
        label_key,
        confidence,
        tag: doc.tag(id).to_string(),
        hint_key,
        hint_en: hint_en.to_string(),
    }
}

/// Classify an element. First matching rule wins.
pub fn classify(doc: &Document, id: NodeId) -> ElementInfo {
    let tag = doc.tag(id);

    match tag {
        "input" => {
            let input_type = doc.attr(id, "type").unwrap_or("text").to_ascii_lowercase();
            match input_type.as_str() {
                "text" | "search" | "" => info(
                    doc,
                    id,
                    Category::Input,
                    Confidence::High,
                    "Text input",
                    Some("label_text_input"),
                    HINT_USE_INPUT,
                    Some("hint_use_input"),
                ),
                "submit" | "button" => info(
                    doc,
                    id,
                    Category::Button,
                    Confidence::High,
                    "Submit button",
                    Some("label_submit_button"),
                    HINT_USE_BUTTON,
                    Some("hint_use_button"),
                ),
                // Other input types stay inputs but deliberately carry no
                // translation key; the UI falls back to English.
                other => info(
                    doc,
                    id,
                    Category::Input,
                    Confidence::Medium,
                    &format!("Input field ({other})"),
                    None,
                    HINT_USE_INPUT,
                    None,
                ),
            }
        }
        "textarea" => info(
            doc,
            id,
            Category::Input,
            Confidence::High,
            "Text area",
            Some("label_textarea"),
            HINT_USE_INPUT,
            Some("hint_use_input"),
        ),
        "button" => button_info(doc, id),
        _ if has_button_role(doc, id) => button_info(doc, id),
        "div" if doc.is_content_editable(id) => info(
            doc,
            id,
            Category::Input,
            Confidence::High,
            "Rich text input",
            Some("label_rich_input"),
            HINT_USE_INPUT,
            Some("hint_use_input"),
        ),
        "div" => {
            if is_clickable(doc, id) {
                info(
                    doc,
                    id,
                    Category::Button,
                    Confidence::Medium,
                    "Clickable region",
                    Some("label_clickable"),
                    "May act as a button",
                    Some("hint_clickable"),
                )
            } else {
                info(
                    doc,
                    id,
                    Category::Container,
                    Confidence::Low,
                    "Container",
                    Some("label_container"),
                    "Not directly bindable",
                    None,
                )
            }
        }
        "svg" | "path" | "img" | "i" => info(
            doc,
            id,
            Category::Icon,
            Confidence::Low,
            "Icon",
            Some("label_icon"),
            "Icons are rarely the real control",
            None,
        ),
        // Ambiguous between navigation and action, so no hint.
        "a" => info(
            doc,
            id,
            Category::Button,
            Confidence::Medium,
            "Link",
            Some("label_link"),
            "",
            None,
        ),
        "span" => info(
            doc,
            id,
            Category::Text,
            Confidence::Low,
            "Text",
            Some("label_text"),
            "",
            None,
        ),
        "form" => info(
            doc,
            id,
            Category::Container,
            Confidence::Low,
            "Form",
            Some("label_form"),
            "",
            None,
        ),
        _ => info(
            doc,
            id,
            Category::Unknown,
            Confidence::Low,
            "Unknown",
            None,
            "",
            None,
        ),
    }
}

fn button_info(doc: &Document, id: NodeId) -> ElementInfo {
    info(
        doc,
        id,
        Category::Button,
        Confidence::High,
        "Button",
        Some("label_button"),
        HINT_USE_BUTTON,
        Some("hint_use_button"),
    )
}

fn has_button_role(doc: &Document, id: NodeId) -> bool {
    doc.attr(id, "role")
        .map(|role| role.eq_ignore_ascii_case("button"))
        .unwrap_or(false)
}

fn is_clickable(doc: &Document, id: NodeId) -> bool {
    doc.has_click_listener(id) || doc.attr(id, "onclick").is_some() || doc.cursor_pointer(id)
}
