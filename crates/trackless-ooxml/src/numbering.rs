//! Numbering definitions parsing (word/numbering.xml)
//!
//! Paragraphs reference list numbering through `w:numPr/w:numId`; each
//! `w:num` instance points at a `w:abstractNum`. Only the ID graph is kept.

use std::collections::{HashMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// The numbering instances and abstract definitions of a document
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    /// `w:num/@w:numId` → `w:abstractNumId/@w:val`
    instances: HashMap<String, Option<String>>,
    /// `w:abstractNum/@w:abstractNumId`
    abstract_ids: HashSet<String>,
}

impl NumberingDefinitions {
    /// The reserved numbering ID that removes numbering from a paragraph
    pub const NO_NUMBERING: &'static str = "0";

    /// Parse numbering definitions from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut defs = NumberingDefinitions::default();
        let mut buf = Vec::new();
        let mut current_num: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"abstractNum" => {
                            if let Some(id) = get_attr(e, b"abstractNumId") {
                                defs.abstract_ids.insert(id);
                            }
                        }
                        b"num" => {
                            if let Some(id) = get_attr(e, b"numId") {
                                defs.instances.insert(id.clone(), None);
                                current_num = Some(id);
                            }
                        }
                        b"abstractNumId" => {
                            if let (Some(num), Some(val)) = (&current_num, get_attr(e, b"val")) {
                                defs.instances.insert(num.clone(), Some(val));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"num" {
                        current_num = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(defs)
    }

    /// Whether a paragraph may reference this numbering ID
    ///
    /// `0` is always valid: it explicitly removes numbering.
    pub fn contains(&self, num_id: &str) -> bool {
        num_id == Self::NO_NUMBERING || self.instances.contains_key(num_id)
    }

    /// The abstract definition behind a numbering instance
    pub fn abstract_for(&self, num_id: &str) -> Option<&str> {
        self.instances.get(num_id)?.as_deref()
    }

    /// Whether the instance points at an abstract definition that exists
    pub fn is_resolvable(&self, num_id: &str) -> bool {
        self.abstract_for(num_id)
            .is_some_and(|abs| self.abstract_ids.contains(abs))
    }

    /// Number of numbering instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no numbering instances are defined
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Attribute value by local name, whatever prefix the producer used
fn get_attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="3">
    <w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="3"/></w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="9"/></w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_numbering() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert_eq!(defs.len(), 2);
        assert!(defs.contains("1"));
        assert!(defs.contains("2"));
        assert!(!defs.contains("7"));
        assert_eq!(defs.abstract_for("1"), Some("3"));
    }

    #[test]
    fn test_zero_is_always_valid() {
        let defs = NumberingDefinitions::default();
        assert!(defs.is_empty());
        assert!(defs.contains("0"));
        assert!(!defs.contains("1"));
    }

    #[test]
    fn test_resolvable_instances() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert!(defs.is_resolvable("1"));
        assert!(!defs.is_resolvable("2"));
        assert!(!defs.is_resolvable("5"));
    }
}
