//! Word-processing documents as a set of independently processable parts
//!
//! A [`WmlDocument`] owns the unpacked package and the parsed XML of every
//! part that can carry document content: the main document, headers,
//! footers, footnotes, endnotes, comments, and the styles and numbering
//! definitions. Parts are discovered through the package relationships.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};
use crate::numbering::NumberingDefinitions;
use crate::relationships::{rels_path_for, resolve_target, Relationship, Relationships};
use crate::styles::StyleSheet;
use crate::tree::XmlDocument;

/// Default location of the main document part
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// The role a part plays in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    /// Main document body
    Document,
    /// Page header
    Header,
    /// Page footer
    Footer,
    /// Footnotes
    Footnotes,
    /// Endnotes
    Endnotes,
    /// Comments
    Comments,
    /// Style definitions
    Styles,
    /// Numbering definitions
    Numbering,
}

impl PartKind {
    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Document => "document",
            PartKind::Header => "header",
            PartKind::Footer => "footer",
            PartKind::Footnotes => "footnotes",
            PartKind::Endnotes => "endnotes",
            PartKind::Comments => "comments",
            PartKind::Styles => "styles",
            PartKind::Numbering => "numbering",
        }
    }

    /// Kind of the part a relationship points at, if it is a content part
    fn from_relationship(rel: &Relationship) -> Option<Self> {
        [
            (Relationships::TYPE_HEADER, PartKind::Header),
            (Relationships::TYPE_FOOTER, PartKind::Footer),
            (Relationships::TYPE_FOOTNOTES, PartKind::Footnotes),
            (Relationships::TYPE_ENDNOTES, PartKind::Endnotes),
            (Relationships::TYPE_COMMENTS, PartKind::Comments),
            (Relationships::TYPE_STYLES, PartKind::Styles),
            (Relationships::TYPE_NUMBERING, PartKind::Numbering),
        ]
        .into_iter()
        .find(|(uri, _)| rel.has_type(uri))
        .map(|(_, kind)| kind)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One XML part of the package, parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Path inside the package (e.g. `word/header1.xml`)
    pub path: String,
    /// What the part holds
    pub kind: PartKind,
    /// Parsed content
    pub content: XmlDocument,
}

impl Part {
    /// Wrap already-parsed content
    pub fn new(path: impl Into<String>, kind: PartKind, content: XmlDocument) -> Self {
        Self {
            path: path.into(),
            kind,
            content,
        }
    }

    /// Parse a part from XML bytes
    pub fn parse(path: impl Into<String>, kind: PartKind, xml: &[u8]) -> Result<Self> {
        Ok(Self::new(path, kind, XmlDocument::parse(xml)?))
    }
}

/// A word-processing package with its content parts parsed
#[derive(Debug, Clone, Default)]
pub struct WmlDocument {
    archive: OoxmlArchive,
    parts: Vec<Part>,
    /// Paths of parts replaced since the package was read
    modified: BTreeSet<String>,
}

impl WmlDocument {
    /// Open and parse a DOCX/DOTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Parse a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Discover and parse the content parts of an unpacked package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let main_path = main_part_path(&archive)?;
        let main_xml = archive
            .get(&main_path)
            .ok_or_else(|| OoxmlError::MissingPart(main_path.clone()))?;

        let mut parts = vec![Part::parse(main_path.as_str(), PartKind::Document, main_xml)?];

        if let Some(rels_xml) = archive.get(&rels_path_for(&main_path)) {
            let rels = Relationships::parse(rels_xml)?;
            for rel in rels.iter() {
                let Some(kind) = PartKind::from_relationship(rel) else {
                    continue;
                };
                if rel.is_external() {
                    continue;
                }
                let path = resolve_target(&main_path, &rel.target);
                if parts.iter().any(|p| p.path == path) {
                    continue;
                }
                match archive.get(&path) {
                    Some(xml) => {
                        debug!(path = %path, kind = %kind, "discovered part");
                        parts.push(Part::parse(path, kind, xml)?);
                    }
                    None => warn!(path = %path, kind = %kind, "relationship target missing from package"),
                }
            }
        }

        Ok(Self {
            archive,
            parts,
            modified: BTreeSet::new(),
        })
    }

    /// Build a document from parts alone, without a backing package
    ///
    /// Every part counts as modified, so all of them are serialized.
    pub fn from_parts(parts: Vec<Part>) -> Self {
        let modified = parts.iter().map(|p| p.path.clone()).collect();
        Self {
            archive: OoxmlArchive::new(),
            parts,
            modified,
        }
    }

    /// All content parts, main document first
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Look up a part by package path
    pub fn part(&self, path: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.path == path)
    }

    /// The main document part
    pub fn main_document(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.kind == PartKind::Document)
    }

    /// Replace the part with the same path, returning the previous one
    ///
    /// A part with a new path is appended. Either way the part is marked
    /// modified.
    pub fn replace_part(&mut self, part: Part) -> Option<Part> {
        self.modified.insert(part.path.clone());
        match self.parts.iter_mut().find(|p| p.path == part.path) {
            Some(existing) => Some(std::mem::replace(existing, part)),
            None => {
                self.parts.push(part);
                None
            }
        }
    }

    /// Whether the part at `path` was replaced since the package was read
    pub fn is_modified(&self, path: &str) -> bool {
        self.modified.contains(path)
    }

    /// The underlying package (holds the original bytes of every part)
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Style definitions, if the document has a styles part
    pub fn style_sheet(&self) -> Result<Option<StyleSheet>> {
        self.parse_reference_part(PartKind::Styles, StyleSheet::parse)
    }

    /// Numbering definitions, if the document has a numbering part
    pub fn numbering(&self) -> Result<Option<NumberingDefinitions>> {
        self.parse_reference_part(PartKind::Numbering, NumberingDefinitions::parse)
    }

    /// Parse a definitions part, preferring the original package bytes
    fn parse_reference_part<T>(
        &self,
        kind: PartKind,
        parse: impl Fn(&[u8]) -> Result<T>,
    ) -> Result<Option<T>> {
        let Some(part) = self.parts.iter().find(|p| p.kind == kind) else {
            return Ok(None);
        };
        match self.archive.get(&part.path) {
            Some(bytes) => parse(bytes).map(Some),
            None => parse(&part.content.to_xml_bytes()?).map(Some),
        }
    }

    /// Package with modified parts serialized from their current content
    ///
    /// Untouched parts keep their original bytes.
    pub fn to_archive(&self) -> Result<OoxmlArchive> {
        let mut archive = self.archive.clone();
        for part in self.parts.iter().filter(|p| self.modified.contains(&p.path)) {
            debug!(path = %part.path, "serializing modified part");
            archive.set(part.path.as_str(), part.content.to_xml_bytes()?);
        }
        Ok(archive)
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_archive()?.to_bytes()
    }

    /// Write the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_archive()?.write_to_file(path)
    }
}

/// Locate the main document part through the package relationships
fn main_part_path(archive: &OoxmlArchive) -> Result<String> {
    if let Some(xml) = archive.get(&rels_path_for("")) {
        let rels = Relationships::parse(xml)?;
        let main = rels
            .of_type(Relationships::TYPE_OFFICE_DOCUMENT)
            .next()
            .map(|rel| resolve_target("", &rel.target));
        if let Some(path) = main {
            return Ok(path);
        }
    }
    if archive.contains(DEFAULT_MAIN_PART) {
        Ok(DEFAULT_MAIN_PART.to_string())
    } else {
        Err(OoxmlError::MissingPart(DEFAULT_MAIN_PART.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DocxBuilder;

    #[test]
    fn test_discovers_related_parts() {
        let bytes = DocxBuilder::new("<w:p><w:r><w:t>Body</w:t></w:r></w:p>")
            .header("<w:p><w:r><w:t>Head</w:t></w:r></w:p>")
            .footnotes("<w:footnote w:id=\"1\"><w:p/></w:footnote>")
            .styles(r#"<w:style w:type="paragraph" w:styleId="Normal"/>"#)
            .build()
            .unwrap();

        let doc = WmlDocument::from_bytes(&bytes).unwrap();
        let kinds: Vec<_> = doc.parts().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PartKind::Document,
                PartKind::Header,
                PartKind::Footnotes,
                PartKind::Styles
            ]
        );
        assert_eq!(doc.main_document().unwrap().path, "word/document.xml");
        assert_eq!(doc.part("word/header1.xml").unwrap().content.root.text(), "Head");
        assert!(doc.style_sheet().unwrap().unwrap().contains("Normal"));
        assert!(doc.numbering().unwrap().is_none());
    }

    #[test]
    fn test_missing_main_part() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", "<Types/>");
        let err = WmlDocument::from_archive(archive).unwrap_err();
        assert!(matches!(err, OoxmlError::MissingPart(_)));
    }

    #[test]
    fn test_replace_part_and_serialize() {
        let bytes = DocxBuilder::new("<w:p><w:r><w:t>Old</w:t></w:r></w:p>")
            .build()
            .unwrap();
        let mut doc = WmlDocument::from_bytes(&bytes).unwrap();

        let replacement = Part::parse(
            "word/document.xml",
            PartKind::Document,
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>New</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        assert!(!doc.is_modified("word/document.xml"));
        let previous = doc.replace_part(replacement).unwrap();
        assert_eq!(previous.content.root.text(), "Old");
        assert!(doc.is_modified("word/document.xml"));

        let reopened = WmlDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.main_document().unwrap().content.root.text(), "New");
        assert!(reopened.archive().contains("[Content_Types].xml"));
    }

    #[test]
    fn test_from_parts() {
        let part = Part::parse(
            "word/document.xml",
            PartKind::Document,
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#,
        )
        .unwrap();
        let doc = WmlDocument::from_parts(vec![part]);
        assert_eq!(doc.parts().len(), 1);
        assert!(doc.is_modified("word/document.xml"));
        assert!(doc.style_sheet().unwrap().is_none());
        assert_eq!(PartKind::Footnotes.to_string(), "footnotes");
    }
}
