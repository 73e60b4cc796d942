//! SVG Abstract Syntax Tree

use std::collections::HashMap;

/// Namespace URI every map element lives in.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A complete SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// XML declaration (e.g., `<?xml version="1.0" encoding="UTF-8"?>`)
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE declaration
    pub doctype: Option<String>,
    /// Comments and processing instructions ahead of the root
    pub prolog: Vec<Node>,
    /// The root SVG element
    pub root: Element,
}

/// XML declaration attributes.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// An SVG/XML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element name with optional prefix (e.g., "svg", "svg:rect")
    pub name: QName,
    /// Attributes on this element, in document order
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        if let Some((prefix, local)) = s.split_once(':') {
            Self::with_prefix(prefix, local)
        } else {
            Self::new(s)
        }
    }

    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::parse(&name.into()),
            value: value.into(),
        }
    }
}

/// A node in the SVG tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction { target: String, content: Option<String> },
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: QName::parse(&name.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by local name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|a| a.name.prefix.is_none() && a.name.local == name)
        {
            attr.value = value.into();
        } else {
            self.attributes.push(Attribute::new(name, value));
        }
    }

    /// The inline `style` attribute, if any.
    pub fn style(&self) -> Option<&str> {
        self.get_attr("style")
    }

    /// Get all namespace declarations on this element.
    pub fn namespaces(&self) -> HashMap<Option<&str>, &str> {
        let mut ns = HashMap::new();
        for attr in &self.attributes {
            if attr.name.local == "xmlns" && attr.name.prefix.is_none() {
                ns.insert(None, attr.value.as_str());
            } else if attr.name.prefix.as_deref() == Some("xmlns") {
                ns.insert(Some(attr.name.local.as_str()), attr.value.as_str());
            }
        }
        ns
    }

    /// Iterate over child elements only (skip text, comments, etc.).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over child elements mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Drop every child element for which `keep` returns false.
    ///
    /// `keep` may edit the elements it keeps. Non-element children are always
    /// kept. Returns the number of elements removed.
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&mut Element) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain_mut(|node| match node {
            Node::Element(e) => keep(e),
            _ => true,
        });
        before - self.children.len()
    }
}

/// The set of element prefixes bound to [`SVG_NAMESPACE`] on a document root.
///
/// Element lookups by tag go through this so that foreign-namespace elements
/// which happen to be called `g` or `path` are never classified.
#[derive(Debug, Clone, Default)]
pub struct SvgNames {
    prefixes: Vec<Option<String>>,
}

impl SvgNames {
    pub fn of(root: &Element) -> Self {
        let prefixes = root
            .namespaces()
            .into_iter()
            .filter(|(_, uri)| *uri == SVG_NAMESPACE)
            .map(|(prefix, _)| prefix.map(str::to_string))
            .collect();
        Self { prefixes }
    }

    /// Whether `elem` is the SVG element `local`.
    pub fn is(&self, elem: &Element, local: &str) -> bool {
        elem.name.local == local && self.prefixes.contains(&elem.name.prefix)
    }

    /// Whether `elem` is a drawable shape (`path` or `rect`).
    pub fn is_drawable(&self, elem: &Element) -> bool {
        self.is(elem, "path") || self.is(elem, "rect")
    }
}
