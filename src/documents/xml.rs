//! Small owned XML tree over quick-xml events.
//!
//! Office parts are read into a tree, edited in place and written back.
//! Declarations, comments and processing instructions are carried through
//! untouched; text is held unescaped and re-escaped on write.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Parse(String),
    #[error("failed to write XML: {0}")]
    Write(String),
}

fn parse_err(e: impl Display) -> XmlError {
    XmlError::Parse(e.to_string())
}

fn write_err(e: impl Display) -> XmlError {
    XmlError::Write(e.to_string())
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Other(Event<'static>),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Qualified name as written, e.g. `w:t`.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(name);
        el.children.push(Node::Text(text.into()));
        el
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(parse_err)?
            .to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(parse_err)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(parse_err)?
                .to_string();
            let value = attr.unescape_value().map_err(parse_err)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn is(&self, qualified: &str) -> bool {
        self.name == qualified
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, qualified: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(qualified))
    }

    pub fn child_mut(&mut self, qualified: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(qualified))
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Number of descendant elements named `qualified` (self included).
    pub fn count(&self, qualified: &str) -> usize {
        let own = usize::from(self.is(qualified));
        own + self.elements().map(|e| e.count(qualified)).sum::<usize>()
    }

    /// Visits every descendant element named `qualified` in document order,
    /// including matches nested inside an earlier match.
    pub fn visit_all_mut<F>(&mut self, qualified: &str, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for child in self.elements_mut() {
            if child.is(qualified) {
                f(child);
            }
            child.visit_all_mut(qualified, f);
        }
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attrs {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_err);
        }
        writer.write_event(Event::Start(start)).map_err(write_err)?;
        for child in &self.children {
            write_node(child, writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_err)
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            Node::Other(_) => {}
        }
    }
}

fn write_node(node: &Node, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
    match node {
        Node::Element(e) => e.write_to(writer),
        Node::Text(t) => writer
            .write_event(Event::Text(BytesText::new(t)))
            .map_err(write_err),
        Node::Other(ev) => writer.write_event(ev.clone()).map_err(write_err),
    }
}

/// A parsed part: a single root element with whatever surrounds it.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut top: Vec<Node> = Vec::new();

        fn attach(stack: &mut [Element], top: &mut Vec<Node>, node: Node) {
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top.push(node),
            }
        }

        loop {
            match reader.read_event().map_err(parse_err)? {
                Event::Start(e) => stack.push(Element::from_start(&e)?),
                Event::Empty(e) => {
                    let el = Element::from_start(&e)?;
                    attach(&mut stack, &mut top, Node::Element(el));
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| XmlError::Parse("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut top, Node::Element(el));
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(parse_err)?.into_owned();
                    attach(&mut stack, &mut top, Node::Text(text));
                }
                Event::Eof => break,
                other => attach(&mut stack, &mut top, Node::Other(other.into_owned())),
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Parse("unexpected end of document".to_string()));
        }

        let mut prolog = Vec::new();
        let mut root = None;
        let mut epilog = Vec::new();
        for node in top {
            match (node, root.is_some()) {
                (Node::Element(e), false) => root = Some(e),
                (node, false) => prolog.push(node),
                (node, true) => epilog.push(node),
            }
        }
        let root =
            root.ok_or_else(|| XmlError::Parse("document has no root element".to_string()))?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, XmlError> {
        let text = std::str::from_utf8(bytes).map_err(parse_err)?;
        Self::parse(text.trim_start_matches('\u{feff}'))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(node, &mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            write_node(node, &mut writer)?;
        }
        Ok(writer.into_inner())
    }
}
