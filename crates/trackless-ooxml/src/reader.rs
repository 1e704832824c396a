//! Parsing part XML into an [`XmlDocument`]
//!
//! Uses the namespace-aware reader from `quick-xml` so that element names are
//! resolved against the declarations in scope. Whitespace text is kept as-is;
//! a part parsed and written back without modification keeps its content.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{OoxmlError, Result};
use crate::tree::{Attribute, Element, Node, XName, XmlDeclaration, XmlDocument};

impl XmlDocument {
    /// Parse a part from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(xml);
        // Don't trim text - whitespace inside w:t is content
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        // Open elements, innermost last
        let mut stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            match event {
                Event::Decl(ref d) => {
                    declaration = Some(XmlDeclaration {
                        version: lossy(d.version()?),
                        encoding: d.encoding().transpose()?.map(lossy),
                        standalone: d.standalone().transpose()?.map(lossy),
                    });
                }
                Event::Start(ref e) => {
                    let element = start_element(resolved, e)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = start_element(resolved, e)?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        OoxmlError::Malformed("unbalanced end tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?.into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Text(text)),
                        // Text outside the root element is only allowed as whitespace
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(OoxmlError::Malformed(
                                "text outside the root element".to_string(),
                            ))
                        }
                    }
                }
                Event::CData(e) => {
                    let text = lossy(e.into_inner());
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(text));
                    }
                }
                Event::Comment(ref e) => {
                    let node = Node::Comment(String::from_utf8_lossy(e).into_owned());
                    push_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Event::PI(ref e) => {
                    let node = Node::ProcessingInstruction(String::from_utf8_lossy(e).into_owned());
                    push_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(OoxmlError::Malformed(format!(
                "unclosed element <{}>",
                stack[stack.len() - 1].name.qualified()
            )));
        }

        let root =
            root.ok_or_else(|| OoxmlError::Malformed("no root element".to_string()))?;

        Ok(XmlDocument {
            declaration,
            prolog,
            root,
            epilog,
        })
    }
}

fn lossy(bytes: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn start_element(resolved: ResolveResult<'_>, e: &BytesStart<'_>) -> Result<Element> {
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    };
    let qname = e.name();
    let name = XName {
        namespace,
        prefix: qname
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned()),
        local: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
    };

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        attributes.push(Attribute {
            key: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Attach a finished node to its parent, or make it the root
fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        Node::Element(element) => Err(OoxmlError::Malformed(format!(
            "second root element <{}>",
            element.name.qualified()
        ))),
        _ => Ok(()),
    }
}

fn push_misc(
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
    node: Node,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}
