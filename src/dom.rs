//! In-memory DOM used by the template engine.
//!
//! Documents are parsed with html5ever into an `RcDom` and converted into an
//! owned `Rc`/`RefCell` tree: children are strong references, parents are weak,
//! so a subtree detached from its parent stays alive only as long as someone
//! (e.g. a list operator's item template cache) holds it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, parse_fragment, LocalName, Namespace, QualName};
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde_json::Value;

use crate::element::{DocumentHandle, ElementCache, ElementHandle, MapTemplates};
use crate::error::DomError;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

lazy_static! {
    /// Elements serialized without closing tag or children.
    static ref VOID_ELEMENTS: HashSet<&'static str> = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect();

    /// Elements whose text content is serialized verbatim.
    static ref RAW_TEXT_ELEMENTS: HashSet<&'static str> =
        ["script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext"]
            .into_iter()
            .collect();
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// Shared handle to an element. Equality is identity.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

struct ElementData {
    tag: String,
    attrs: RefCell<Vec<(String, String)>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<ElementData>>,
    cache: RefCell<ElementCache<Element>>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self::with_attrs(tag, Vec::new())
    }

    pub fn with_attrs(tag: &str, attrs: Vec<(String, String)>) -> Self {
        Element(Rc::new(ElementData {
            tag: tag.to_string(),
            attrs: RefCell::new(attrs),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            cache: RefCell::new(ElementCache::default()),
        }))
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    /// All child nodes, text and comments included.
    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn append_text(&self, text: &str) {
        self.push_node(Node::Text(text.to_string()));
    }

    /// First element with the given id in this subtree, `self` included.
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        if self.get_attr("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children()
            .into_iter()
            .find_map(|child| child.find_by_id(id))
    }

    /// Elements with the given tag in this subtree, document order, `self` included.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        let mut found = Vec::new();
        self.collect_by_tag(tag, &mut found);
        found
    }

    fn collect_by_tag(&self, tag: &str, found: &mut Vec<Element>) {
        if self.0.tag.eq_ignore_ascii_case(tag) {
            found.push(self.clone());
        }
        for child in self.children() {
            child.collect_by_tag(tag, found);
        }
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    fn push_node(&self, node: Node) {
        if let Node::Element(child) = &node {
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
        self.0.children.borrow_mut().push(node);
    }

    fn label(&self) -> String {
        match self.get_attr("id") {
            Some(id) => format!("{}#{}", self.0.tag, id),
            None => self.0.tag.clone(),
        }
    }

    fn collect_text(&self, out: &mut String) {
        for node in self.0.children.borrow().iter() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(child) => child.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.0.tag)
            .field("attrs", &self.0.attrs.borrow())
            .finish()
    }
}

impl ElementHandle for Element {
    fn tag(&self) -> String {
        self.0.tag.clone()
    }

    fn attrs(&self) -> Vec<(String, String)> {
        self.0.attrs.borrow().clone()
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        self.0
            .attrs
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attr(&self, name: &str, value: &str) {
        let mut attrs = self.0.attrs.borrow_mut();
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(attr) => attr.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&self, name: &str) {
        self.0.attrs.borrow_mut().retain(|(n, _)| n != name);
    }

    fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn set_text(&self, text: &str) {
        self.remove_children();
        if !text.is_empty() {
            self.append_text(text);
        }
    }

    fn remove_text(&self) {
        self.0
            .children
            .borrow_mut()
            .retain(|node| !matches!(node, Node::Text(_)));
    }

    fn inner_html(&self) -> String {
        let mut out = String::new();
        write_children(self, &mut out);
        out
    }

    fn set_html(&self, html: &str) {
        self.remove_children();
        self.append_html(html);
    }

    fn append_html(&self, html: &str) {
        for node in parse_markup(&self.0.tag, html) {
            self.push_node(node);
        }
    }

    fn children(&self) -> Vec<Element> {
        self.0
            .children
            .borrow()
            .iter()
            .filter_map(|node| match node {
                Node::Element(el) => Some(el.clone()),
                _ => None,
            })
            .collect()
    }

    fn clone_deep(&self) -> Element {
        let copy = Element::with_attrs(&self.0.tag, self.0.attrs.borrow().clone());
        for node in self.0.children.borrow().iter() {
            let cloned = match node {
                Node::Element(child) => Node::Element(child.clone_deep()),
                other => other.clone(),
            };
            copy.push_node(cloned);
        }
        copy
    }

    fn detach(&self) {
        let parent = self.0.parent.replace(Weak::new()).upgrade();
        if let Some(parent) = parent {
            parent
                .children
                .borrow_mut()
                .retain(|node| !matches!(node, Node::Element(el) if Rc::ptr_eq(&el.0, &self.0)));
        }
    }

    fn append_child(&self, child: &Element) {
        child.detach();
        self.push_node(Node::Element(child.clone()));
    }

    fn remove_children(&self) {
        let nodes = std::mem::take(&mut *self.0.children.borrow_mut());
        for node in nodes {
            if let Node::Element(child) = node {
                *child.0.parent.borrow_mut() = Weak::new();
            }
        }
    }

    fn item_template(&self) -> Option<Element> {
        self.0.cache.borrow().item_template.clone()
    }

    fn set_item_template(&self, template: Element) {
        self.0.cache.borrow_mut().item_template = Some(template);
    }

    fn map_templates(&self) -> Option<MapTemplates<Element>> {
        self.0.cache.borrow().map_templates.clone()
    }

    fn set_map_templates(&self, templates: MapTemplates<Element>) {
        self.0.cache.borrow_mut().map_templates = Some(templates);
    }

    fn item_value(&self) -> Option<Value> {
        self.0.cache.borrow().item_value.clone()
    }

    fn set_item_value(&self, value: Value) {
        self.0.cache.borrow_mut().item_value = Some(value);
    }

    fn trace(&self) -> String {
        let mut labels = vec![self.label()];
        let mut current = self.parent();
        while let Some(el) = current {
            labels.push(el.label());
            current = el.parent();
        }
        labels.reverse();
        labels.join(" > ")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Document {
    root: Element,
    doctype: Option<String>,
}

impl Document {
    /// Parse a full HTML document. Missing `<html>`, `<head>` and `<body>` are synthesized.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut doctype = None;
        let mut root = None;
        for child in dom.document.children.borrow().iter() {
            match &child.data {
                NodeData::Doctype { name, .. } => doctype = Some(name.to_string()),
                NodeData::Element { .. } => {
                    if let Some(Node::Element(el)) = convert_node(child) {
                        root = Some(el);
                    }
                }
                _ => {}
            }
        }

        Ok(Document {
            root: root.ok_or(DomError::MissingRoot)?,
            doctype,
        })
    }

    pub fn from_root(root: Element) -> Self {
        root.detach();
        Document {
            root,
            doctype: None,
        }
    }

    pub fn root_element(&self) -> &Element {
        &self.root
    }

    pub fn body(&self) -> Option<Element> {
        self.root.children().into_iter().find(|el| el.0.tag == "body")
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.root.find_by_id(id)
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        self.root.elements_by_tag(tag)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.doctype {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        write_element(&self.root, &mut out);
        out
    }
}

impl DocumentHandle for Document {
    type Element = Element;

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn get_by_id(&self, id: &str) -> Option<Element> {
        self.get_element_by_id(id)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("doctype", &self.doctype)
            .field("root", &self.root)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HTML5EVER CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

fn convert_node(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let element = Element::with_attrs(&name.local.to_string(), attributes);
            // `<template>` content lives in a separate fragment, not in the children.
            let contents = template_contents.borrow();
            let children = match contents.as_ref() {
                Some(fragment) => fragment.children.borrow(),
                None => handle.children.borrow(),
            };
            for child in children.iter() {
                if let Some(node) = convert_node(child) {
                    element.push_node(node);
                }
            }
            Some(Node::Element(element))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
            None
        }
    }
}

/// Parse markup as the content of a `context` element.
fn parse_markup(context: &str, html: &str) -> Vec<Node> {
    let context_name = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(context),
    );
    let dom = parse_fragment(RcDom::default(), Default::default(), context_name, vec![]).one(html);

    // The fragment parser wraps the result in a synthetic <html> element.
    let mut nodes = Vec::new();
    for wrapper in dom.document.children.borrow().iter() {
        for child in wrapper.children.borrow().iter() {
            if let Some(node) = convert_node(child) {
                nodes.push(node);
            }
        }
    }
    nodes
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERIALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

fn write_element(element: &Element, out: &mut String) {
    let tag = element.0.tag.as_str();
    out.push('<');
    out.push_str(tag);
    for (name, value) in element.0.attrs.borrow().iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(tag) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_children(element: &Element, out: &mut String) {
    let raw_text = RAW_TEXT_ELEMENTS.contains(element.0.tag.as_str());
    for node in element.0.children.borrow().iter() {
        match node {
            Node::Element(child) => write_element(child, out),
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
