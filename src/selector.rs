//! Robust CSS selector generation.
//!
//! Prefers attributes that survive re-renders (explicit ids, test ids,
//! semantic attributes) before falling back to a fragile positional path.
//! Ids that look machine-generated (framework hashes, numeric suffixes) are
//! rejected because they are not stable across reloads.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Document, NodeId};

/// Semantic attributes tried, in order, when no id or test id is usable.
const SEMANTIC_ATTRS: [&str; 3] = ["name", "placeholder", "aria-label"];

/// Semantic attribute values at or above this length are too volatile to key on.
const SEMANTIC_ATTR_MAX_LEN: usize = 50;

/// Maximum number of `:nth-child` segments in the positional fallback.
const MAX_PATH_SEGMENTS: usize = 5;

static LONG_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{5,}").expect("valid regex"));
static DOUBLE_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"--").expect("valid regex"));
static LONG_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]{15,}").expect("valid regex"));

/// Whether an id value looks auto-generated (e.g. React hashes, numeric ids).
pub fn looks_generated(id: &str) -> bool {
    LONG_DIGIT_RUN.is_match(id) || DOUBLE_HYPHEN.is_match(id) || LONG_ALNUM_RUN.is_match(id)
}

/// Generate a selector intended to re-identify `node` after minor re-renders.
///
/// Strict preference order, first success wins: stable-looking `#id`,
/// `data-testid`, short semantic attribute, positional `:nth-child` path
/// anchored at `body`. Always succeeds for a live node; the "null in, null
/// out" contract of the source API is expressed here by taking a required
/// `NodeId` — callers with an optional element use [`try_generate`].
pub fn generate(doc: &Document, node: NodeId) -> String {
    if let Some(id) = doc.attr(node, "id") {
        if !id.is_empty() && !looks_generated(id) {
            return format!("#{}", escape_ident(id));
        }
    }

    let tag = doc.tag(node);

    if let Some(test_id) = doc.attr(node, "data-testid") {
        return format!("{tag}[data-testid=\"{}\"]", escape_attr_value(test_id));
    }

    for attr in SEMANTIC_ATTRS {
        if let Some(value) = doc.attr(node, attr) {
            if value.len() < SEMANTIC_ATTR_MAX_LEN {
                return format!("{tag}[{attr}=\"{}\"]", escape_attr_value(value));
            }
        }
    }

    positional_path(doc, node)
}

/// `None` only for a missing element, mirroring the source API's null check.
pub fn try_generate(doc: &Document, node: Option<NodeId>) -> Option<String> {
    node.map(|id| generate(doc, id))
}

fn positional_path(doc: &Document, node: NodeId) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = node;

    loop {
        let tag = doc.tag(current);
        if tag == "body" || tag == "html" {
            break;
        }
        if segments.len() == MAX_PATH_SEGMENTS {
            break;
        }
        let index = doc.nth_child_index(current).unwrap_or(1);
        segments.push(format!("{tag}:nth-child({index})"));
        match doc.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    if segments.is_empty() {
        return "body".to_string();
    }
    segments.reverse();
    format!("body > {}", segments.join(" > "))
}

/// Escape a string for use as a CSS identifier (after `#`).
///
/// Follows the `CSS.escape` algorithm closely enough for round-tripping:
/// alphanumerics, `-`, `_`, and non-ASCII pass through; a leading digit is
/// hex-escaped; everything else is backslash-escaped.
pub fn escape_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Escape a string for use inside a double-quoted attribute selector.
pub fn escape_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
