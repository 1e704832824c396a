//! Package relationships (`_rels/*.rels`)
//!
//! Parts are linked through relationship files. The main document is found
//! from the package root (`_rels/.rels`); headers, footers, notes, comments,
//! styles and numbering hang off the main document's own relationships.
//!
//! ```ignore
//! use trackless_ooxml::relationships::Relationships;
//!
//! let rels = Relationships::parse(xml_bytes)?;
//! for rel in rels.of_type(Relationships::TYPE_HEADER) {
//!     println!("{} -> {}", rel.id, rel.target);
//! }
//! ```

use crate::error::Result;
use crate::tree::XmlDocument;

/// Namespace of relationship files
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Base of the relationship type URIs used by strict-conformance packages
const STRICT_TYPE_BASE: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/";

macro_rules! relationship_type {
    ($name:literal) => {
        concat!(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/",
            $name
        )
    };
}

/// One `Relationship` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    /// Type URI
    pub rel_type: String,
    /// Target path or URL as written
    pub target: String,
    /// `TargetMode="External"`
    pub external: bool,
}

impl Relationship {
    /// Whether the target lives outside the package
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Match a transitional type URI, also accepting its strict counterpart
    pub fn has_type(&self, rel_type: &str) -> bool {
        if self.rel_type == rel_type {
            return true;
        }
        let Some(name) = self.rel_type.strip_prefix(STRICT_TYPE_BASE) else {
            return false;
        };
        rel_type.rsplit_once('/').is_some_and(|(_, wanted)| wanted == name)
    }
}

/// The relationships of one part, in file order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str = relationship_type!("officeDocument");
    pub const TYPE_HEADER: &'static str = relationship_type!("header");
    pub const TYPE_FOOTER: &'static str = relationship_type!("footer");
    pub const TYPE_FOOTNOTES: &'static str = relationship_type!("footnotes");
    pub const TYPE_ENDNOTES: &'static str = relationship_type!("endnotes");
    pub const TYPE_COMMENTS: &'static str = relationship_type!("comments");
    pub const TYPE_STYLES: &'static str = relationship_type!("styles");
    pub const TYPE_NUMBERING: &'static str = relationship_type!("numbering");

    /// Parse a .rels file
    ///
    /// Entries missing an `Id` or `Target` are dropped.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let document = XmlDocument::parse(xml)?;
        let entries = document
            .root
            .elements()
            .filter(|e| e.name.local == "Relationship")
            .filter_map(|e| {
                Some(Relationship {
                    id: e.attr("Id")?.to_string(),
                    rel_type: e.attr("Type").unwrap_or_default().to_string(),
                    target: e.attr("Target")?.to_string(),
                    external: e.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self { entries })
    }

    /// Look up a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All relationships in file order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Internal relationships of one type, in file order
    pub fn of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.entries
            .iter()
            .filter(move |r| r.has_type(rel_type) && !r.is_external())
    }
}

/// Path of the .rels file that belongs to a part
///
/// `word/document.xml` gives `word/_rels/document.xml.rels`; the package
/// root (empty path) gives `_rels/.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    let (dir, file) = part_path.rsplit_once('/').unwrap_or(("", part_path));
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

/// Resolve a relationship target to a package path
///
/// Relative targets start from the source part's directory; a leading `/`
/// makes the target package-absolute. `.` and `..` are collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let base = match target.strip_prefix('/') {
        Some(_) => "",
        None => source_part.rsplit_once('/').map_or("", |(dir, _)| dir),
    };

    let mut resolved: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(target.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            s => resolved.push(s),
        }
    }
    resolved.join("/")
}
