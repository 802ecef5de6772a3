//! # Chatwave DOM
//!
//! In-process DOM for the messaging page hosted by Chatwave.
//! Uses html5ever for HTML parsing and constructs a traversable, mutable tree.
//!
//! - [`selector`]: the selector subset the bridge queries with
//! - [`observer`]: mutation observers, delivered synchronously
//! - [`events`]: synthetic input with capture and bubble phases
//! - [`window`]: the page window and its notification constructor slot

pub mod events;
pub mod observer;
pub mod selector;
pub mod style;
pub mod window;

pub use events::{DomEvent, EventListener, EventPhase, EventTarget, ListenerOptions};
pub use observer::{
    MutationCallback, MutationKind, MutationObserverInit, MutationRecord, ObserverId,
};
pub use selector::{SelectorError, SelectorList};
pub use window::{
    NotificationConstructor, NotificationHandle, NotificationOptions, NotificationRequest,
    NotificationText, Window,
};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use observer::MutationObservers;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur in DOM operations.
#[derive(Error, Debug)]
pub enum DomError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    #[error("Node not found")]
    NodeNotFound,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Unique identifier for a DOM node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// Node kinds. Mutable payloads (attributes, character data) live on [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    DocumentType { name: String },
    Element { tag_name: String, namespace: String },
    Text,
    Comment,
    ProcessingInstruction { target: String },
}

/// A DOM node.
pub struct Node {
    pub id: NodeId,
    kind: NodeKind,
    attributes: RefCell<Vec<(String, String)>>,
    data: RefCell<String>,
    parent: RefCell<Option<Weak<Node>>>,
    children: RefCell<Vec<Rc<Node>>>,
    pub event_target: EventTarget,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes.borrow())
            .finish()
    }
}

impl Node {
    fn new(id: NodeId, kind: NodeKind) -> Rc<Self> {
        Rc::new(Self {
            id,
            kind,
            attributes: RefCell::new(Vec::new()),
            data: RefCell::new(String::new()),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            event_target: EventTarget::new(),
        })
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Lowercase tag name for elements.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().iter().any(|(k, _)| k == name)
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.attributes.borrow().clone()
    }

    pub fn class_list(&self) -> Vec<String> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|name| name == class))
    }

    /// Inline style value for `property`, if set.
    pub fn style_property(&self, property: &str) -> Option<String> {
        style::get_property(&self.get_attribute("style")?, property)
    }

    /// Character data of text and comment nodes.
    pub fn data(&self) -> String {
        self.data.borrow().clone()
    }

    /// Get text content (concatenated descendant text).
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, result: &mut String) {
        match self.kind {
            NodeKind::Text => result.push_str(&self.data.borrow()),
            NodeKind::Comment | NodeKind::ProcessingInstruction { .. } => {}
            _ => {
                for child in self.children.borrow().iter() {
                    child.collect_text(result);
                }
            }
        }
    }

    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().as_ref().and_then(|p| p.upgrade())
    }

    pub fn parent_element(&self) -> Option<Rc<Node>> {
        self.parent().filter(|p| p.is_element())
    }

    /// The `n`th ancestor element; `nth_ancestor_element(1)` is the parent.
    pub fn nth_ancestor_element(&self, n: usize) -> Option<Rc<Node>> {
        let mut current = self.parent_element()?;
        for _ in 1..n {
            current = current.parent_element()?;
        }
        Some(current)
    }

    /// Ancestors ordered from the root down to the parent.
    pub fn ancestors(&self) -> Vec<Rc<Node>> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            out.push(node);
        }
        out.reverse();
        out
    }

    pub fn is_descendant_of(&self, ancestor: &Node) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if std::ptr::eq(Rc::as_ptr(&node), ancestor) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn children(&self) -> Vec<Rc<Node>> {
        self.children.borrow().clone()
    }

    pub fn element_children(&self) -> Vec<Rc<Node>> {
        self.children
            .borrow()
            .iter()
            .filter(|c| c.is_element())
            .cloned()
            .collect()
    }

    pub fn first_child(&self) -> Option<Rc<Node>> {
        self.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<Rc<Node>> {
        self.children.borrow().last().cloned()
    }

    fn sibling_at(&self, offset: isize, elements_only: bool) -> Option<Rc<Node>> {
        let parent = self.parent()?;
        let siblings = if elements_only {
            parent.element_children()
        } else {
            parent.children()
        };
        let index = siblings
            .iter()
            .position(|n| std::ptr::eq(Rc::as_ptr(n), self))?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).cloned()
    }

    pub fn previous_sibling(&self) -> Option<Rc<Node>> {
        self.sibling_at(-1, false)
    }

    pub fn next_sibling(&self) -> Option<Rc<Node>> {
        self.sibling_at(1, false)
    }

    pub fn previous_element_sibling(&self) -> Option<Rc<Node>> {
        self.sibling_at(-1, true)
    }

    pub fn next_element_sibling(&self) -> Option<Rc<Node>> {
        self.sibling_at(1, true)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text)
    }

    fn append_child_raw(self: &Rc<Self>, child: Rc<Node>) {
        child.detach_raw();
        *child.parent.borrow_mut() = Some(Rc::downgrade(self));
        self.children.borrow_mut().push(child);
    }

    fn detach_raw(&self) -> Option<Rc<Node>> {
        let parent = self.parent()?;
        parent
            .children
            .borrow_mut()
            .retain(|c| !std::ptr::eq(Rc::as_ptr(c), self));
        *self.parent.borrow_mut() = None;
        Some(parent)
    }

    fn set_attribute_raw(&self, name: &str, value: &str) {
        let mut attributes = self.attributes.borrow_mut();
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }
}

/// A DOM document.
pub struct Document {
    root: Rc<Node>,
    next_id: Cell<usize>,
    observers: MutationObservers,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeId::new(0), NodeKind::Document),
            next_id: Cell::new(1),
            observers: MutationObservers::default(),
        }
    }

    /// Parse HTML and create a document.
    pub fn parse_html(html: &str) -> Result<Self, DomError> {
        debug!(len = html.len(), "Parsing HTML");

        let dom = parse_markup(html)?;
        let doc = Document::new();
        doc.convert_rcdom(&dom.document, &doc.root);

        debug!(node_count = doc.next_id.get(), "HTML parsed");
        Ok(doc)
    }

    fn alloc(&self, kind: NodeKind) -> Rc<Node> {
        let id = NodeId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        Node::new(id, kind)
    }

    fn convert_rcdom(&self, handle: &Handle, parent: &Rc<Node>) -> Vec<Rc<Node>> {
        let mut converted = Vec::new();

        for child_handle in handle.children.borrow().iter() {
            let (kind, data) = match &child_handle.data {
                NodeData::Document => continue,
                NodeData::Doctype { name, .. } => (
                    NodeKind::DocumentType {
                        name: name.to_string(),
                    },
                    String::new(),
                ),
                NodeData::Element { name, .. } => (
                    NodeKind::Element {
                        tag_name: name.local.to_string(),
                        namespace: name.ns.to_string(),
                    },
                    String::new(),
                ),
                NodeData::Text { contents } => (NodeKind::Text, contents.borrow().to_string()),
                NodeData::Comment { contents } => (NodeKind::Comment, contents.to_string()),
                NodeData::ProcessingInstruction { target, contents } => (
                    NodeKind::ProcessingInstruction {
                        target: target.to_string(),
                    },
                    contents.to_string(),
                ),
            };

            let node = self.alloc(kind);
            *node.data.borrow_mut() = data;
            if let NodeData::Element { attrs, .. } = &child_handle.data {
                for attr in attrs.borrow().iter() {
                    node.set_attribute_raw(&attr.name.local, &attr.value);
                }
            }
            parent.append_child_raw(node.clone());

            self.convert_rcdom(child_handle, &node);
            converted.push(node);
        }

        converted
    }

    /// Parse `html` as body content and append the result to `parent`.
    ///
    /// Returns the top-level nodes that were inserted.
    pub fn insert_html(&self, parent: &Rc<Node>, html: &str) -> Result<Vec<Rc<Node>>, DomError> {
        let dom = parse_markup(&format!("<html><body>{}</body></html>", html))?;
        let body = find_rcdom_element(&dom.document, "body")
            .ok_or_else(|| DomError::ParseError("fragment produced no body".to_string()))?;

        let inserted = self.convert_rcdom(&body, parent);
        if !inserted.is_empty() {
            self.record(MutationKind::ChildList, parent);
        }
        Ok(inserted)
    }

    pub fn create_element(&self, tag_name: &str) -> Rc<Node> {
        self.alloc(NodeKind::Element {
            tag_name: tag_name.to_ascii_lowercase(),
            namespace: "http://www.w3.org/1999/xhtml".to_string(),
        })
    }

    pub fn create_text_node(&self, text: &str) -> Rc<Node> {
        let node = self.alloc(NodeKind::Text);
        *node.data.borrow_mut() = text.to_string();
        node
    }

    /// Append `child` to `parent`, moving it if it is already in the tree.
    pub fn append_child(&self, parent: &Rc<Node>, child: Rc<Node>) -> Result<(), DomError> {
        if Rc::ptr_eq(parent, &child) || parent.is_descendant_of(&child) {
            return Err(DomError::InvalidOperation(
                "cannot append a node to itself or its descendant".to_string(),
            ));
        }

        let old_parent = child.parent();
        parent.append_child_raw(child);
        if let Some(old_parent) = old_parent {
            self.observers.queue(MutationKind::ChildList, &old_parent);
        }
        self.record(MutationKind::ChildList, parent);
        Ok(())
    }

    /// Detach `node` from its parent.
    pub fn remove(&self, node: &Rc<Node>) -> Result<(), DomError> {
        let parent = node.detach_raw().ok_or(DomError::NodeNotFound)?;
        self.record(MutationKind::ChildList, &parent);
        Ok(())
    }

    pub fn set_attribute(&self, node: &Rc<Node>, name: &str, value: &str) {
        node.set_attribute_raw(name, value);
        self.record(
            MutationKind::Attributes {
                name: name.to_string(),
            },
            node,
        );
    }

    pub fn remove_attribute(&self, node: &Rc<Node>, name: &str) {
        let removed = {
            let mut attributes = node.attributes.borrow_mut();
            let before = attributes.len();
            attributes.retain(|(k, _)| k != name);
            attributes.len() != before
        };
        if removed {
            self.record(
                MutationKind::Attributes {
                    name: name.to_string(),
                },
                node,
            );
        }
    }

    /// Add `class` to the element's class list. No-op if already present.
    pub fn add_class(&self, node: &Rc<Node>, class: &str) {
        if node.has_class(class) {
            return;
        }
        let mut classes = node.class_list();
        classes.push(class.to_string());
        self.set_attribute(node, "class", &classes.join(" "));
    }

    /// Set an inline style property, as `element.style[property] = value` would.
    pub fn set_style_property(&self, node: &Rc<Node>, property: &str, value: &str) {
        let current = node.get_attribute("style").unwrap_or_default();
        self.set_attribute(node, "style", &style::set_property(&current, property, value));
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&self, node: &Rc<Node>, text: &str) {
        for child in node.children() {
            child.detach_raw();
        }
        if !text.is_empty() {
            node.append_child_raw(self.create_text_node(text));
        }
        self.record(MutationKind::ChildList, node);
    }

    /// Replace the data of a text or comment node.
    pub fn set_character_data(&self, node: &Rc<Node>, data: &str) -> Result<(), DomError> {
        if !matches!(node.kind, NodeKind::Text | NodeKind::Comment) {
            return Err(DomError::InvalidOperation(
                "character data can only be set on text or comment nodes".to_string(),
            ));
        }
        *node.data.borrow_mut() = data.to_string();
        self.record(MutationKind::CharacterData, node);
        Ok(())
    }

    fn record(&self, kind: MutationKind, target: &Rc<Node>) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.queue(kind, target);
        self.observers.deliver();
    }

    /// Get the document root.
    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// Get the document element (<html>).
    pub fn document_element(&self) -> Option<Rc<Node>> {
        self.root.element_children().into_iter().next()
    }

    pub fn head(&self) -> Option<Rc<Node>> {
        self.document_element()?
            .element_children()
            .into_iter()
            .find(|n| n.tag_name() == Some("head"))
    }

    pub fn body(&self) -> Option<Rc<Node>> {
        self.document_element()?
            .element_children()
            .into_iter()
            .find(|n| n.tag_name() == Some("body"))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Rc<Node>> {
        self.descendants(&self.root)
            .into_iter()
            .find(|n| n.is_element() && n.get_attribute("id").as_deref() == Some(id))
    }

    /// The first `<title>` element in the document.
    pub fn title_element(&self) -> Option<Rc<Node>> {
        self.descendants(&self.root)
            .into_iter()
            .find(|n| n.tag_name() == Some("title"))
    }

    /// Document title with whitespace collapsed, or empty when there is none.
    pub fn title(&self) -> String {
        self.title_element()
            .map(|t| t.text_content().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    /// Set the title text, creating a `<title>` in the head if needed.
    pub fn set_title(&self, title: &str) -> Result<(), DomError> {
        let element = match self.title_element() {
            Some(element) => element,
            None => {
                let container = self
                    .head()
                    .or_else(|| self.document_element())
                    .ok_or(DomError::NodeNotFound)?;
                let element = self.create_element("title");
                self.append_child(&container, element.clone())?;
                element
            }
        };
        self.set_text_content(&element, title);
        Ok(())
    }

    /// First element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Rc<Node>>, DomError> {
        self.query_selector_in(&self.root, selector)
    }

    /// All elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Rc<Node>>, DomError> {
        self.query_selector_all_in(&self.root, selector)
    }

    /// Scoped query. Candidates are descendants of `scope`, but the
    /// selector may still match through ancestors outside it.
    pub fn query_selector_in(
        &self,
        scope: &Rc<Node>,
        selector: &str,
    ) -> Result<Option<Rc<Node>>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .skip(1)
            .find(|n| list.matches(n)))
    }

    pub fn query_selector_all_in(
        &self,
        scope: &Rc<Node>,
        selector: &str,
    ) -> Result<Vec<Rc<Node>>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|n| list.matches(n))
            .collect())
    }

    /// `node` and everything below it, in document order.
    fn descendants(&self, node: &Rc<Node>) -> Vec<Rc<Node>> {
        let mut out = Vec::new();
        self.traverse_node(node, &mut |n| out.push(n.clone()));
        out
    }

    /// Traverse all nodes depth-first.
    pub fn traverse<F>(&self, mut callback: F)
    where
        F: FnMut(&Rc<Node>),
    {
        self.traverse_node(&self.root, &mut callback);
    }

    #[allow(clippy::only_used_in_recursion)]
    fn traverse_node<F>(&self, node: &Rc<Node>, callback: &mut F)
    where
        F: FnMut(&Rc<Node>),
    {
        callback(node);
        for child in node.children() {
            self.traverse_node(&child, callback);
        }
    }

    /// Dispatch `event` at `target`. Returns false if the default was prevented.
    pub fn dispatch_event(&self, target: &Rc<Node>, event: &DomEvent) -> bool {
        events::dispatch(event, target, &target.ancestors())
    }

    /// Synthetic activation, as `element.click()` performs it.
    pub fn click(&self, target: &Rc<Node>) -> bool {
        self.dispatch_event(target, &DomEvent::mouse("click"))
    }

    pub fn observe(
        &self,
        target: &Rc<Node>,
        init: MutationObserverInit,
        callback: MutationCallback,
    ) -> ObserverId {
        self.observers.observe(target, init, callback)
    }

    pub fn disconnect(&self, id: ObserverId) {
        self.observers.disconnect(id);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_markup(html: &str) -> Result<RcDom, DomError> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| DomError::ParseError(e.to_string()))
}

fn find_rcdom_element(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if &*name.local == tag {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_rcdom_element(child, tag) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let html = r#"<!DOCTYPE html>
<html>
<head><title>Test</title></head>
<body><p id="main">Hello, world!</p></body>
</html>"#;

        let doc = Document::parse_html(html).unwrap();

        assert!(doc.document_element().is_some());
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());

        assert_eq!(doc.title(), "Test");

        let main = doc.get_element_by_id("main").unwrap();
        assert_eq!(main.tag_name(), Some("p"));
        assert_eq!(main.text_content(), "Hello, world!");
    }

    #[test]
    fn test_element_siblings_skip_text() {
        let html = "<html><body><p>A</p> <p>B</p> <p>C</p></body></html>";
        let doc = Document::parse_html(html).unwrap();

        let paragraphs = doc.body().unwrap().element_children();
        assert_eq!(paragraphs.len(), 3);

        let second = &paragraphs[1];
        assert!(second.previous_sibling().unwrap().is_text());
        assert_eq!(second.previous_element_sibling().unwrap().text_content(), "A");
        assert_eq!(second.next_element_sibling().unwrap().text_content(), "C");
        assert!(paragraphs[2].next_element_sibling().is_none());
    }

    #[test]
    fn test_nth_ancestor() {
        let doc =
            Document::parse_html("<html><body><div id='a'><div><span id='s'></span></div></div></body></html>")
                .unwrap();
        let span = doc.get_element_by_id("s").unwrap();
        assert_eq!(
            span.nth_ancestor_element(2).unwrap().get_attribute("id").as_deref(),
            Some("a")
        );
        assert_eq!(span.nth_ancestor_element(3).unwrap().tag_name(), Some("body"));
        assert!(span.nth_ancestor_element(10).is_none());
    }

    #[test]
    fn test_insert_html_and_scoped_query() {
        let doc = Document::parse_html("<html><body><div id='host'></div></body></html>").unwrap();
        let host = doc.get_element_by_id("host").unwrap();

        let inserted = doc
            .insert_html(&host, "<ul class='menu'><li>a</li><li>b</li></ul>")
            .unwrap();
        assert_eq!(inserted.len(), 1);

        let menu = doc.query_selector(".menu").unwrap().unwrap();
        let items = doc.query_selector_all_in(&menu, "li").unwrap();
        assert_eq!(items.len(), 2);

        // Ancestors outside the scope still take part in matching.
        assert!(doc.query_selector_in(&menu, "#host li").unwrap().is_some());
        assert!(doc.query_selector_in(&menu, ".menu").unwrap().is_none());
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse_html("<html><body></body></html>").unwrap();
        assert!(matches!(
            doc.query_selector("div >"),
            Err(DomError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_title_roundtrip() {
        let doc = Document::parse_html("<html><head></head><body></body></html>").unwrap();
        assert_eq!(doc.title(), "");

        doc.set_title("  (3)   Messenger ").unwrap();
        assert_eq!(doc.title(), "(3) Messenger");
        assert_eq!(doc.head().unwrap().element_children().len(), 1);
    }

    #[test]
    fn test_style_and_class_mutation() {
        let doc = Document::parse_html("<html><body><div id='d' class='a'></div></body></html>")
            .unwrap();
        let d = doc.get_element_by_id("d").unwrap();

        doc.set_style_property(&d, "visibility", "hidden");
        assert_eq!(d.style_property("visibility").as_deref(), Some("hidden"));

        doc.add_class(&d, "b");
        doc.add_class(&d, "b");
        assert_eq!(d.get_attribute("class").as_deref(), Some("a b"));
    }

    #[test]
    fn test_observer_subtree_and_reentrancy() {
        let doc = Rc::new(
            Document::parse_html(
                "<html><head><title>Messenger</title></head><body></body></html>",
            )
            .unwrap(),
        );
        let title = doc.title_element().unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let inner = Rc::downgrade(&doc);
        doc.observe(
            &title,
            MutationObserverInit::all(),
            Rc::new(move |records: &[MutationRecord]| {
                let Some(doc) = inner.upgrade() else { return };
                log.borrow_mut().push((records.len(), doc.title()));
                // A mutation from inside the callback is delivered afterwards.
                if doc.title() == "(1) Messenger" {
                    let _ = doc.set_title("(2) Messenger");
                }
            }),
        );

        doc.set_title("(1) Messenger").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                (1, "(1) Messenger".to_string()),
                (1, "(2) Messenger".to_string())
            ]
        );

        let text = title.first_child().unwrap();
        doc.set_character_data(&text, "Messenger").unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_disconnect() {
        let doc = Document::parse_html("<html><body><div id='d'></div></body></html>").unwrap();
        let d = doc.get_element_by_id("d").unwrap();

        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let id = doc.observe(
            &d,
            MutationObserverInit {
                attributes: true,
                ..Default::default()
            },
            Rc::new(move |_| counter.set(counter.get() + 1)),
        );

        doc.set_attribute(&d, "data-x", "1");
        doc.disconnect(id);
        doc.set_attribute(&d, "data-x", "2");
        assert_eq!(count.get(), 1);
    }
}
