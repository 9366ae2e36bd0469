//! Lightweight in-memory DOM element model.
//!
//! The classifier, selector generator, and picker runtime are pure functions
//! over page structure; this module gives them something concrete to operate
//! on without a browser. It models only what the picker heuristics inspect:
//! tag names, attributes, class lists, and the two signals that cannot be
//! read from attributes alone (an attached click listener and a computed
//! `cursor: pointer` style).
//!
//! [`Document::select_first`] implements a matcher for exactly the selector
//! grammar [`selector::generate`](crate::selector::generate) emits, so
//! selector round-trips are verifiable in-process.

use std::collections::BTreeMap;

/// Index of a node within its [`Document`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    click_listener: bool,
    cursor_pointer: bool,
    content_editable: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An element tree rooted at `html > body`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
}

impl Document {
    /// Create a document containing only the `html` and `body` elements.
    pub fn new() -> Self {
        let html = Node {
            tag: "html".to_string(),
            ..Node::default()
        };
        let body = Node {
            tag: "body".to_string(),
            parent: Some(0),
            ..Node::default()
        };
        let mut nodes = vec![html, body];
        nodes[0].children.push(1);
        Document { nodes, body: 1 }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Append a child element under `parent` and return its id.
    pub fn append(&mut self, parent: NodeId, tag: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: tag.into().to_ascii_lowercase(),
            parent: Some(parent),
            ..Node::default()
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id].tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.nodes[id].attrs.insert(name.into(), value.into());
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes[id].classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.nodes[id].classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id].classes.retain(|c| c != class);
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        &self.nodes[id].classes
    }

    /// Mark the element as having a programmatically attached click handler.
    pub fn set_click_listener(&mut self, id: NodeId, value: bool) {
        self.nodes[id].click_listener = value;
    }

    pub fn has_click_listener(&self, id: NodeId) -> bool {
        self.nodes[id].click_listener
    }

    /// Mark the element's computed style as `cursor: pointer`.
    pub fn set_cursor_pointer(&mut self, id: NodeId, value: bool) {
        self.nodes[id].cursor_pointer = value;
    }

    pub fn cursor_pointer(&self, id: NodeId) -> bool {
        self.nodes[id].cursor_pointer
    }

    /// Mark the element as content-editable (the `isContentEditable` signal).
    pub fn set_content_editable(&mut self, id: NodeId, value: bool) {
        self.nodes[id].content_editable = value;
    }

    pub fn is_content_editable(&self, id: NodeId) -> bool {
        self.nodes[id].content_editable
            || self
                .attr(id, "contenteditable")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }

    /// 1-based position of the element among all of its parent's children.
    pub fn nth_child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .position(|&child| child == id)
            .map(|pos| pos + 1)
    }

    /// All node ids in document order (depth-first from `html`).
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Resolve a selector produced by the generator to the first matching
    /// element in document order, or `None` when nothing matches.
    pub fn select_first(&self, selector: &str) -> Option<NodeId> {
        let segments: Vec<Segment> = selector
            .split(" > ")
            .map(Segment::parse)
            .collect::<Option<Vec<_>>>()?;
        let (first, rest) = segments.split_first()?;

        for id in self.all_nodes() {
            if !self.matches_segment(id, first) {
                continue;
            }
            if let Some(found) = self.descend(id, rest) {
                return Some(found);
            }
        }
        None
    }

    fn descend(&self, id: NodeId, rest: &[Segment]) -> Option<NodeId> {
        let Some((next, tail)) = rest.split_first() else {
            return Some(id);
        };
        for &child in self.children(id) {
            if self.matches_segment(child, next) {
                if let Some(found) = self.descend(child, tail) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn matches_segment(&self, id: NodeId, segment: &Segment) -> bool {
        match segment {
            Segment::Id(escaped) => self
                .attr(id, "id")
                .map(|actual| crate::selector::escape_ident(actual) == *escaped)
                .unwrap_or(false),
            Segment::Element {
                tag,
                attr,
                nth_child,
            } => {
                if self.tag(id) != tag {
                    return false;
                }
                if let Some((name, escaped_value)) = attr {
                    let matches = self
                        .attr(id, name)
                        .map(|actual| crate::selector::escape_attr_value(actual) == *escaped_value)
                        .unwrap_or(false);
                    if !matches {
                        return false;
                    }
                }
                if let Some(n) = nth_child {
                    if self.nth_child_index(id) != Some(*n) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

/// One step of a parsed selector, kept in the generator's escaped form so
/// matching compares escaped-to-escaped without a CSS unescaper.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Id(String),
    Element {
        tag: String,
        attr: Option<(String, String)>,
        nth_child: Option<usize>,
    },
}

impl Segment {
    fn parse(raw: &str) -> Option<Segment> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(id) = raw.strip_prefix('#') {
            return Some(Segment::Id(id.to_string()));
        }

        let mut tag_end = raw.len();
        let mut attr = None;
        let mut nth_child = None;

        let remainder = if let Some(bracket) = raw.find('[') {
            tag_end = bracket;
            let after = &raw[bracket + 1..];
            let eq = after.find("=\"")?;
            let name = after[..eq].to_string();
            let value_part = &after[eq + 2..];
            let close = find_closing_quote(value_part)?;
            attr = Some((name, value_part[..close].to_string()));
            // Skip `"]`.
            value_part[close..].strip_prefix('"')?.strip_prefix(']')?
        } else if let Some(colon) = raw.find(':') {
            tag_end = colon;
            &raw[colon..]
        } else {
            ""
        };

        if let Some(args) = remainder.strip_prefix(":nth-child(") {
            let close = args.find(')')?;
            nth_child = args[..close].parse::<usize>().ok();
            nth_child?;
        } else if !remainder.is_empty() {
            return None;
        }

        let tag = raw[..tag_end].to_ascii_lowercase();
        if tag.is_empty() {
            return None;
        }
        Some(Segment::Element {
            tag,
            attr,
            nth_child,
        })
    }
}

/// Index of the first unescaped `"` in an attribute-value body.
fn find_closing_quote(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_tracks_parent_and_children() {
        let mut doc = Document::new();
        let div = doc.append(doc.body(), "div");
        let input = doc.append(div, "input");

        assert_eq!(doc.tag(div), "div");
        assert_eq!(doc.parent(input), Some(div));
        assert_eq!(doc.children(div), &[input]);
        assert_eq!(doc.nth_child_index(div), Some(1));
    }

    #[test]
    fn class_list_is_deduplicated() {
        let mut doc = Document::new();
        let div = doc.append(doc.body(), "div");
        doc.add_class(div, "highlight");
        doc.add_class(div, "highlight");
        assert_eq!(doc.classes(div).len(), 1);

        doc.remove_class(div, "highlight");
        assert!(!doc.has_class(div, "highlight"));
    }

    #[test]
    fn content_editable_reads_flag_or_attribute() {
        let mut doc = Document::new();
        let a = doc.append(doc.body(), "div");
        let b = doc.append(doc.body(), "div");

        doc.set_content_editable(a, true);
        doc.set_attr(b, "contenteditable", "true");

        assert!(doc.is_content_editable(a));
        assert!(doc.is_content_editable(b));
    }

    #[test]
    fn select_first_resolves_id_selector() {
        let mut doc = Document::new();
        let div = doc.append(doc.body(), "div");
        doc.set_attr(div, "id", "chat-box");

        assert_eq!(doc.select_first("#chat-box"), Some(div));
        assert_eq!(doc.select_first("#missing"), None);
    }

    #[test]
    fn select_first_resolves_attribute_selector() {
        let mut doc = Document::new();
        let input = doc.append(doc.body(), "input");
        doc.set_attr(input, "placeholder", "Ask anything");

        assert_eq!(
            doc.select_first("input[placeholder=\"Ask anything\"]"),
            Some(input)
        );
    }

    #[test]
    fn select_first_resolves_nth_child_path() {
        let mut doc = Document::new();
        let wrapper = doc.append(doc.body(), "div");
        let _first = doc.append(wrapper, "span");
        let second = doc.append(wrapper, "span");

        assert_eq!(
            doc.select_first("body > div:nth-child(1) > span:nth-child(2)"),
            Some(second)
        );
        assert_eq!(
            doc.select_first("body > div:nth-child(1) > span:nth-child(3)"),
            None
        );
    }

    #[test]
    fn select_first_handles_escaped_quotes_in_values() {
        let mut doc = Document::new();
        let button = doc.append(doc.body(), "button");
        doc.set_attr(button, "data-testid", "foo\"bar");

        assert_eq!(
            doc.select_first("button[data-testid=\"foo\\\"bar\"]"),
            Some(button)
        );
    }

    #[test]
    fn malformed_selector_matches_nothing() {
        let doc = Document::new();
        assert_eq!(doc.select_first(""), None);
        assert_eq!(doc.select_first("div:nth-child(x)"), None);
        assert_eq!(doc.select_first("div[placeholder=unquoted]"), None);
    }
}
