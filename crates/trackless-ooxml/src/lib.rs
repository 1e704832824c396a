//! # trackless-ooxml
//!
//! OOXML (Office Open XML) package handling for trackless.
//!
//! This crate provides functionality to:
//! - Read and write DOCX/DOTX packages
//! - Discover the content parts of a document through its relationships
//! - Parse each part into a mutable, namespace-aware XML tree and write it back
//! - Read the style and numbering definitions that parts refer to
//!
//! ## Example: Listing the Parts of a Document
//!
//! ```no_run
//! use trackless_ooxml::WmlDocument;
//!
//! let document = WmlDocument::open("document.docx")?;
//! for part in document.parts() {
//!     println!("{} ({})", part.path, part.kind);
//! }
//! # Ok::<(), trackless_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod namespaces;
pub mod numbering;
pub mod reader;
pub mod relationships;
pub mod styles;
pub mod test_utils;
pub mod tree;
pub mod writer;

pub use archive::OoxmlArchive;
pub use document::{Part, PartKind, WmlDocument};
pub use error::{OoxmlError, Result};
pub use numbering::NumberingDefinitions;
pub use relationships::{Relationship, Relationships};
pub use styles::{Style, StyleSheet, StyleType};
pub use tree::{Attribute, Element, Node, XName, XmlDeclaration, XmlDocument};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
