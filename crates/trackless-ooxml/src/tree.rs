//! Owned XML content tree for document parts
//!
//! Each part of a package (document body, headers, footnotes, ...) is parsed
//! into an [`XmlDocument`]: a root [`Element`] whose children are ordered
//! [`Node`]s. Element names are namespace-resolved so that callers can match
//! on `(namespace, local name)` regardless of the prefix a producer chose,
//! while the original prefix is kept for serialization.

use crate::namespaces;

/// A namespace-resolved element name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XName {
    /// Resolved namespace URI (None when the name is unbound)
    pub namespace: Option<String>,
    /// Prefix used in the source document
    pub prefix: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl XName {
    /// Create a name from its parts
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// A WordprocessingML name using the conventional `w` prefix
    pub fn wml(local: &str) -> Self {
        Self::new(Some(namespaces::W), Some("w"), local)
    }

    /// The qualified name as written in XML (`prefix:local`)
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    /// Check namespace and local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Check for a WordprocessingML element with the given local name
    pub fn is_wml(&self, local: &str) -> bool {
        self.local == local && self.in_wml()
    }

    /// Whether the name lives in a WordprocessingML main namespace
    pub fn in_wml(&self) -> bool {
        self.namespace
            .as_deref()
            .is_some_and(namespaces::is_wordprocessingml)
    }

    /// A name in the same namespace, written with the same prefix
    pub fn sibling(&self, local: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            prefix: self.prefix.clone(),
            local: local.to_string(),
        }
    }
}

/// An attribute, kept with its qualified key as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified key (e.g. `w:val`, `xmlns:w`)
    pub key: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Create an attribute
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Local part of the key (after the prefix)
    pub fn local_name(&self) -> &str {
        match self.key.split_once(':') {
            Some((_, local)) => local,
            None => &self.key,
        }
    }

    /// Whether this attribute is a namespace declaration
    pub fn is_namespace_declaration(&self) -> bool {
        self.key == "xmlns" || self.key.starts_with("xmlns:")
    }
}

/// An XML element with its attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element name
    pub name: XName,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    /// Child nodes in source order
    pub children: Vec<Node>,
}

/// A node in the content tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A child element
    Element(Element),
    /// Character data (unescaped)
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment
    Comment(String),
    /// A processing instruction (target and data, as written)
    ProcessingInstruction(String),
}

impl Node {
    /// Borrow the element, if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Mutably borrow the element, if this node is one
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Check for a WordprocessingML element with the given local name
    pub fn is_wml(&self, local: &str) -> bool {
        self.as_element().is_some_and(|e| e.name.is_wml(local))
    }

    /// Nodes that carry no document content: whitespace between elements and comments
    pub fn is_insignificant(&self) -> bool {
        match self {
            Node::Text(text) => text.chars().all(char::is_whitespace),
            Node::Comment(_) | Node::ProcessingInstruction(_) => true,
            Node::Element(_) | Node::CData(_) => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    /// Create an empty element
    pub fn new(name: XName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child appender
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Check for a WordprocessingML element with the given local name
    pub fn is_wml(&self, local: &str) -> bool {
        self.name.is_wml(local)
    }

    /// Look up an attribute by local name, ignoring namespace declarations
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|a| !a.is_namespace_declaration())
            .find(|a| a.local_name() == local)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute by qualified key, replacing an existing value
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(key, value)),
        }
    }

    /// Iterate over element children
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Mutably iterate over element children
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First WordprocessingML child element with the given local name
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is_wml(local))
    }

    /// Mutable access to the first WordprocessingML child with the given local name
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is_wml(local))
    }

    /// Whether any child is an element
    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|n| matches!(n, Node::Element(_)))
    }

    /// Concatenated character data of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Depth-first iterator over this element and all descendant elements
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Structural equality that ignores attribute order and insignificant
    /// whitespace between child elements
    pub fn equivalent(&self, other: &Element) -> bool {
        if self.name.namespace != other.name.namespace || self.name.local != other.name.local {
            return false;
        }
        let mut left: Vec<_> = self
            .attributes
            .iter()
            .filter(|a| !a.is_namespace_declaration())
            .map(|a| (a.local_name(), a.value.as_str()))
            .collect();
        let mut right: Vec<_> = other
            .attributes
            .iter()
            .filter(|a| !a.is_namespace_declaration())
            .map(|a| (a.local_name(), a.value.as_str()))
            .collect();
        left.sort_unstable();
        right.sort_unstable();
        if left != right {
            return false;
        }

        let mut a = self.children.iter().filter(|n| !n.is_insignificant());
        let mut b = other.children.iter().filter(|n| !n.is_insignificant());
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(Node::Element(x)), Some(Node::Element(y))) => {
                    if !x.equivalent(y) {
                        return false;
                    }
                }
                (Some(x), Some(y)) => {
                    if x != y {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        }
    }
}

/// Depth-first pre-order iterator over elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.elements().collect::<Vec<_>>().into_iter().rev());
        Some(element)
    }
}

/// The `<?xml ...?>` declaration of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// XML version (normally "1.0")
    pub version: String,
    /// Declared encoding
    pub encoding: Option<String>,
    /// Standalone flag as written ("yes"/"no")
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: Some("yes".to_string()),
        }
    }
}

/// A parsed XML part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// XML declaration, if the source had one
    pub declaration: Option<XmlDeclaration>,
    /// Comments and processing instructions before the root element
    pub prolog: Vec<Node>,
    /// The root element
    pub root: Element,
    /// Comments and processing instructions after the root element
    pub epilog: Vec<Node>,
}

impl XmlDocument {
    /// Wrap a root element with a default declaration
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(XmlDeclaration::default()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}
