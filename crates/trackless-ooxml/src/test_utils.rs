//! Shared test utilities for trackless crates
//!
//! Builds small but complete DOCX packages from WordprocessingML fragments,
//! so tests can state tracked-change markup inline.
//!
//! # Example
//! ```ignore
//! use trackless_ooxml::test_utils::DocxBuilder;
//! let docx = DocxBuilder::new(r#"<w:p><w:ins w:id="1"><w:r><w:t>new</w:t></w:r></w:ins></w:p>"#)
//!     .header("<w:p><w:r><w:t>Header</w:t></w:r></w:p>")
//!     .build()?;
//! ```

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::OoxmlArchive;
use crate::document::{Part, PartKind, WmlDocument};
use crate::error::Result;

/// Namespace declarations placed on every generated root element
pub const NS_DECLS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

/// Wrap body content in a complete `w:document`
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {NS_DECLS}><w:body>{body}</w:body></w:document>"#
    )
}

/// Wrap content in a root element of the given qualified name
pub fn part_xml(root: &str, content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<{root} {NS_DECLS}>{content}</{root}>"#
    )
}

/// Parse body content as the main document part
pub fn document_part(body: &str) -> Result<Part> {
    Part::parse("word/document.xml", PartKind::Document, document_xml(body).as_bytes())
}

/// Builder for DOCX packages with optional secondary parts
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    body: String,
    headers: Vec<String>,
    footers: Vec<String>,
    footnotes: Option<String>,
    endnotes: Option<String>,
    comments: Option<String>,
    styles: Option<String>,
    numbering: Option<String>,
}

impl DocxBuilder {
    /// Start a package whose main document body holds `body`
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Add a header part (`w:hdr` content)
    pub fn header(mut self, content: impl Into<String>) -> Self {
        self.headers.push(content.into());
        self
    }

    /// Add a footer part (`w:ftr` content)
    pub fn footer(mut self, content: impl Into<String>) -> Self {
        self.footers.push(content.into());
        self
    }

    /// Set the footnotes part (`w:footnotes` content)
    pub fn footnotes(mut self, content: impl Into<String>) -> Self {
        self.footnotes = Some(content.into());
        self
    }

    /// Set the endnotes part (`w:endnotes` content)
    pub fn endnotes(mut self, content: impl Into<String>) -> Self {
        self.endnotes = Some(content.into());
        self
    }

    /// Set the comments part (`w:comments` content)
    pub fn comments(mut self, content: impl Into<String>) -> Self {
        self.comments = Some(content.into());
        self
    }

    /// Set the styles part (`w:styles` content)
    pub fn styles(mut self, content: impl Into<String>) -> Self {
        self.styles = Some(content.into());
        self
    }

    /// Set the numbering part (`w:numbering` content)
    pub fn numbering(mut self, content: impl Into<String>) -> Self {
        self.numbering = Some(content.into());
        self
    }

    /// Every part as `(path, relationship type suffix, content type suffix, xml)`
    fn secondary_parts(&self) -> Vec<(String, &'static str, &'static str, String)> {
        let mut parts = Vec::new();
        for (i, content) in self.headers.iter().enumerate() {
            parts.push((
                format!("header{}.xml", i + 1),
                "header",
                "header",
                part_xml("w:hdr", content),
            ));
        }
        for (i, content) in self.footers.iter().enumerate() {
            parts.push((
                format!("footer{}.xml", i + 1),
                "footer",
                "footer",
                part_xml("w:ftr", content),
            ));
        }
        let singles = [
            (&self.footnotes, "footnotes", "w:footnotes"),
            (&self.endnotes, "endnotes", "w:endnotes"),
            (&self.comments, "comments", "w:comments"),
            (&self.styles, "styles", "w:styles"),
            (&self.numbering, "numbering", "w:numbering"),
        ];
        for (content, name, root) in singles {
            if let Some(content) = content {
                parts.push((format!("{name}.xml"), name, name, part_xml(root, content)));
            }
        }
        parts
    }

    /// Write the package as DOCX bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let secondary = self.secondary_parts();

        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        // [Content_Types].xml
        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        for (path, _, content_type, _) in &secondary {
            overrides.push_str(&format!(
                r#"<Override PartName="/word/{path}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.{content_type}+xml"/>"#
            ));
        }
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
            )
            .as_bytes(),
        )?;

        // _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
        )?;

        // word/_rels/document.xml.rels
        let mut rels = String::new();
        for (i, (path, rel_type, _, _)) in secondary.iter().enumerate() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{rel_type}" Target="{path}"/>"#,
                i + 1
            ));
        }
        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            )
            .as_bytes(),
        )?;

        zip.start_file("word/document.xml", options)?;
        zip.write_all(document_xml(&self.body).as_bytes())?;

        for (path, _, _, xml) in &secondary {
            zip.start_file(format!("word/{path}"), options)?;
            zip.write_all(xml.as_bytes())?;
        }

        zip.finish()?;
        Ok(buffer.into_inner())
    }

    /// Build and unpack the package
    pub fn into_archive(self) -> Result<OoxmlArchive> {
        OoxmlArchive::from_bytes(&self.build()?)
    }

    /// Build and parse the package
    pub fn into_document(self) -> Result<WmlDocument> {
        WmlDocument::from_bytes(&self.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_package() {
        let archive = DocxBuilder::new("<w:p/>").into_archive().unwrap();

        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.contains("word/document.xml"));
        assert!(archive.contains("_rels/.rels"));
        assert!(archive.contains("word/_rels/document.xml.rels"));
    }

    #[test]
    fn test_secondary_parts_are_related() {
        let archive = DocxBuilder::new("<w:p/>")
            .header("<w:p/>")
            .header("<w:p/>")
            .footer("<w:p/>")
            .comments("")
            .into_archive()
            .unwrap();

        assert!(archive.contains("word/header1.xml"));
        assert!(archive.contains("word/header2.xml"));
        assert!(archive.contains("word/footer1.xml"));
        let rels = archive.get_string("word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="header2.xml""#));
        assert!(rels.contains("relationships/comments"));
        let types = archive.get_string("[Content_Types].xml").unwrap();
        assert!(types.contains("/word/footer1.xml"));
    }

    #[test]
    fn test_document_part() {
        let part = document_part("<w:p><w:r><w:t>x</w:t></w:r></w:p>").unwrap();
        assert_eq!(part.kind, PartKind::Document);
        assert_eq!(part.content.root.text(), "x");
    }
}
