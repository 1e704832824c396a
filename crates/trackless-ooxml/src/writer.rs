//! Serializing an [`XmlDocument`] back to part XML
//!
//! Elements are written with the qualified names and attributes they were
//! parsed with; elements without children are written as empty tags.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::tree::{Element, Node, XmlDocument};

impl XmlDocument {
    /// Serialize the part to XML bytes
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
            // Word expects the root on its own line after the declaration
            writer.write_event(Event::Text(BytesText::from_escaped("\r\n")))?;
        }

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        Ok(writer.into_inner())
    }

    /// Serialize the part to an XML string
    pub fn to_xml_string(&self) -> Result<String> {
        let bytes = self.to_xml_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let qualified = element.name.qualified();
    let mut start = BytesStart::new(qualified.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.key.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(e) => write_element(writer, e)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        Node::ProcessingInstruction(content) => {
            writer.write_event(Event::PI(BytesPI::new(content.as_str())))?
        }
    }
    Ok(())
}
