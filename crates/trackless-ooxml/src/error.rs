//! Errors raised while reading or writing a package

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The file is not a readable ZIP package
    #[error("Package error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A part the package refers to is not in the archive
    #[error("Part not found in package: {0}")]
    MissingPart(String),

    /// XML that parses but cannot form a single-rooted tree
    #[error("Malformed part: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, OoxmlError>;
