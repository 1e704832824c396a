//! Read-only reference data consulted while accepting revisions

use trackless_ooxml::{NumberingDefinitions, StyleSheet, WmlDocument};

use crate::error::Result;

/// Style and numbering definitions of the document being processed
///
/// Shared by all parts; never modified during acceptance. A missing table
/// disables the corresponding reference check.
#[derive(Debug, Clone, Default)]
pub struct AcceptContext {
    styles: Option<StyleSheet>,
    numbering: Option<NumberingDefinitions>,
}

impl AcceptContext {
    /// A context without reference data
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the definitions of a document
    pub fn from_document(document: &WmlDocument) -> Result<Self> {
        Ok(Self {
            styles: document.style_sheet()?,
            numbering: document.numbering()?,
        })
    }

    /// Use the given style definitions
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = Some(styles);
        self
    }

    /// Use the given numbering definitions
    pub fn with_numbering(mut self, numbering: NumberingDefinitions) -> Self {
        self.numbering = Some(numbering);
        self
    }

    /// Style definitions, if loaded
    pub fn styles(&self) -> Option<&StyleSheet> {
        self.styles.as_ref()
    }

    /// Numbering definitions, if loaded
    pub fn numbering(&self) -> Option<&NumberingDefinitions> {
        self.numbering.as_ref()
    }

    /// Whether a style reference can be resolved (always true without styles)
    pub fn style_known(&self, style_id: &str) -> bool {
        self.styles.as_ref().map_or(true, |s| s.contains(style_id))
    }

    /// Whether a numbering reference can be resolved (always true without numbering)
    pub fn numbering_known(&self, num_id: &str) -> bool {
        self.numbering.as_ref().map_or(true, |n| n.contains(num_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_accepts_everything() {
        let context = AcceptContext::new();
        assert!(context.style_known("Anything"));
        assert!(context.numbering_known("42"));
        assert!(context.styles().is_none());
    }

    #[test]
    fn test_loaded_tables_are_consulted() {
        let styles = StyleSheet::parse(
            br#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:styleId="Normal"/></w:styles>"#,
        )
        .unwrap();
        let context = AcceptContext::new()
            .with_styles(styles)
            .with_numbering(NumberingDefinitions::default());

        assert!(context.style_known("Normal"));
        assert!(!context.style_known("Heading1"));
        assert!(context.numbering_known("0"));
        assert!(!context.numbering_known("1"));
    }
}
