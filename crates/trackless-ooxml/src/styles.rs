//! Style definitions (word/styles.xml)
//!
//! Paragraphs and runs name their style by ID. The sheet keeps each
//! definition's ID, type and base style, which is enough to tell a dangling
//! reference from a valid one.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::tree::{Element, XmlDocument};

/// What a style can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    /// Parse `w:style/@w:type`; paragraph when absent or unknown
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("character") => StyleType::Character,
            Some("table") => StyleType::Table,
            Some("numbering") => StyleType::Numbering,
            _ => StyleType::Paragraph,
        }
    }
}

/// One `w:style` definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub id: String,
    pub style_type: StyleType,
    /// `w:basedOn/@w:val`
    pub based_on: Option<String>,
    /// Marked `w:default="1"`
    pub is_default: bool,
}

impl Style {
    fn from_element(element: &Element) -> Option<Self> {
        let id = element.attr("styleId")?.to_string();
        Some(Self {
            id,
            style_type: StyleType::from_attr(element.attr("type")),
            based_on: element
                .child("basedOn")
                .and_then(|b| b.attr("val"))
                .map(str::to_string),
            is_default: matches!(element.attr("default"), Some("1" | "true" | "on")),
        })
    }
}

/// The style definitions of a document, keyed by style ID
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: BTreeMap<String, Style>,
}

impl StyleSheet {
    /// Parse a styles part
    ///
    /// Definitions without a style ID are ignored. A later definition with
    /// the same ID replaces an earlier one.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let document = XmlDocument::parse(xml)?;
        let styles = document
            .root
            .elements()
            .filter(|e| e.is_wml("style"))
            .filter_map(Style::from_element)
            .map(|style| (style.id.clone(), style))
            .collect();
        Ok(Self { styles })
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Whether a style with this ID is defined
    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The default style of a type, if one is marked
    pub fn default_of(&self, style_type: StyleType) -> Option<&Style> {
        self.styles
            .values()
            .find(|s| s.is_default && s.style_type == style_type)
    }
}
