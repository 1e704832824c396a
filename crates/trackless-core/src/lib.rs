//! trackless-core - Accept all tracked changes in WordprocessingML documents
//!
//! The engine resolves every tracked revision of a document as if "Accept
//! All" had been clicked: insertions become permanent, deletions vanish,
//! moves settle at their destination and formatting or table-structure
//! changes collapse to their current state.
//!
//! Work happens per part, on owned content trees parsed by
//! [`trackless_ooxml`]:
//!
//! - [`classifier`] decides what a node is,
//! - [`detector`] finds out whether a part needs work at all,
//! - [`processor`] rewrites a part in two phases,
//! - [`normalizer`] tidies the result,
//! - [`accepter`] drives all of it over a document.
//!
//! # Example
//!
//! ```
//! use trackless_core::{accept_revisions, part_has_tracked_revisions};
//! use trackless_ooxml::test_utils::DocxBuilder;
//!
//! let document = DocxBuilder::new(concat!(
//!     r#"<w:p><w:pPr><w:rPr><w:del w:id="1"/></w:rPr></w:pPr><w:r><w:t>Hello</w:t></w:r></w:p>"#,
//!     r#"<w:p><w:r><w:t>World</w:t></w:r></w:p>"#,
//! ))
//! .into_document()?;
//!
//! let outcome = accept_revisions(&document);
//! let main = outcome.document.main_document().unwrap();
//! assert!(!part_has_tracked_revisions(main));
//! assert_eq!(main.content.root.text(), "HelloWorld");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accepter;
pub mod classifier;
pub mod context;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod kind;
pub mod normalizer;
pub mod processor;
pub mod settings;

// Re-export main types and functions
pub use accepter::{
    accept_revisions, document_has_tracked_revisions, part_has_tracked_revisions, AcceptOutcome,
    AcceptReport, PartAcceptance, PartReport, PartStatus, RevisionAccepter,
};
pub use classifier::{classify, Classification, Scope};
pub use context::AcceptContext;
pub use detector::{census, has_revisions, malformed_markup, MalformedMarkup, RevisionCensus};
pub use diagnostics::{Code, Diagnostic, Diagnostics, Severity};
pub use error::{AcceptError, Result};
pub use kind::{MarkChange, PropertyKind, RangeKind, RevisionKind};
pub use normalizer::normalize;
pub use processor::{AcceptStats, RevisionProcessor};
pub use settings::{AcceptSettings, PartSelection, SettingsError, DEFAULT_CONFIG_FILE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
