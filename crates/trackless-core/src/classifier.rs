//! Revision classification
//!
//! [`classify`] is the only place that looks at raw element names to decide
//! whether a node is a tracked change. The answer depends on the element
//! itself, its direct children, and the names of its parent and grandparent
//! (the same `w:ins` is an insertion in a paragraph, a paragraph-mark
//! annotation in `w:pPr/w:rPr` and a row insertion in `w:trPr`).

use trackless_ooxml::{Element, XName};

use crate::kind::{MarkChange, PropertyKind, RangeKind, RevisionKind};

/// Names of the enclosing elements, as far as classification needs them
///
/// Only WordprocessingML ancestors are recorded; a foreign parent counts as
/// no parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    /// Local name of the parent element
    pub parent: Option<&'a str>,
    /// Local name of the grandparent element
    pub grandparent: Option<&'a str>,
}

impl<'a> Scope<'a> {
    /// Scope of a part's root element
    pub fn root() -> Self {
        Self::default()
    }

    /// Scope of the children of an element named `name`
    pub fn enter(self, name: &'a XName) -> Scope<'a> {
        Scope {
            parent: name.in_wml().then_some(name.local.as_str()),
            grandparent: self.parent,
        }
    }

    fn parent_is(&self, local: &str) -> bool {
        self.parent == Some(local)
    }
}

/// Outcome of classifying one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A well-formed tracked change
    Revision(RevisionKind),
    /// Recognised revision markup whose shape does not fit its kind
    Malformed {
        /// The kind the element would have been
        kind: RevisionKind,
        /// Why it does not fit
        reason: String,
    },
    /// Anything else
    NotARevision,
}

impl Classification {
    /// The kind of a well-formed revision
    pub fn revision(&self) -> Option<RevisionKind> {
        match self {
            Classification::Revision(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Elements a content wrapper must never hold directly
const BLOCK_AND_PROPERTY_NAMES: &[&str] = &[
    "p", "tbl", "tr", "tc", "pPr", "rPr", "tblPr", "trPr", "tcPr", "sectPr", "body",
];

/// Property containers in which `w:ins`/`w:del` are never content wrappers
const PROPERTY_CONTAINERS: &[&str] = &[
    "rPr", "pPr", "tblPr", "tblPrEx", "trPr", "tcPr", "sectPr", "numPr", "tblGrid",
];

/// Classify an element in its scope
pub fn classify(element: &Element, scope: Scope<'_>) -> Classification {
    if !element.name.in_wml() {
        return Classification::NotARevision;
    }

    let local = element.name.local.as_str();
    match local {
        "ins" | "del" | "moveFrom" | "moveTo" => classify_ins_del(element, local, scope),
        "cellIns" => cell_annotation(element, RevisionKind::CellInsertion, scope),
        "cellDel" => cell_annotation(element, RevisionKind::CellDeletion, scope),
        "cellMerge" => cell_annotation(element, RevisionKind::CellMerge, scope),
        _ => {
            if let Some(kind) = PropertyKind::from_element_name(local) {
                classify_property_change(element, kind, scope)
            } else if let Some(kind) = RangeKind::from_element_name(local) {
                annotation(element, RevisionKind::RangeMarker(kind))
            } else {
                Classification::NotARevision
            }
        }
    }
}

fn classify_ins_del(element: &Element, local: &str, scope: Scope<'_>) -> Classification {
    if scope.parent_is("rPr") && scope.grandparent == Some("pPr") {
        let mark = match local {
            "ins" => MarkChange::Inserted,
            "del" => MarkChange::Deleted,
            "moveFrom" => MarkChange::MovedFrom,
            _ => MarkChange::MovedTo,
        };
        return annotation(element, RevisionKind::ParagraphMark(mark));
    }

    let wrapper = match local {
        "ins" => RevisionKind::Insertion,
        "del" => RevisionKind::Deletion,
        "moveFrom" => RevisionKind::MoveFrom,
        _ => RevisionKind::MoveTo,
    };

    if scope.parent_is("trPr") {
        return match wrapper {
            RevisionKind::Insertion => annotation(element, RevisionKind::RowInsertion),
            RevisionKind::Deletion => annotation(element, RevisionKind::RowDeletion),
            kind => malformed(kind, format!("w:{local} is not a row revision")),
        };
    }

    if scope.parent_is("numPr") && wrapper == RevisionKind::Insertion {
        return annotation(element, RevisionKind::NumberingInsertion);
    }

    if let Some(container) = scope
        .parent
        .filter(|parent| PROPERTY_CONTAINERS.contains(parent))
    {
        return malformed(wrapper, format!("w:{local} inside w:{container}"));
    }

    match element
        .elements()
        .find(|child| child.name.in_wml() && BLOCK_AND_PROPERTY_NAMES.contains(&child.name.local.as_str()))
    {
        Some(child) => malformed(wrapper, format!("w:{local} wraps w:{}", child.name.local)),
        None => Classification::Revision(wrapper),
    }
}

fn cell_annotation(element: &Element, kind: RevisionKind, scope: Scope<'_>) -> Classification {
    if !scope.parent_is("tcPr") {
        return malformed(kind, format!("w:{} outside w:tcPr", element.name.local));
    }
    annotation(element, kind)
}

fn classify_property_change(element: &Element, kind: PropertyKind, scope: Scope<'_>) -> Classification {
    let revision = RevisionKind::PropertyChange(kind);
    if !scope.parent_is(kind.container()) {
        return malformed(
            revision,
            format!("w:{} outside w:{}", kind.element_name(), kind.container()),
        );
    }
    let unexpected = element.elements().find(|child| match kind.previous() {
        Some(previous) => !child.name.is_wml(previous),
        None => true,
    });
    match unexpected {
        Some(child) => malformed(
            revision,
            format!("w:{} holds w:{}", kind.element_name(), child.name.local),
        ),
        None => Classification::Revision(revision),
    }
}

/// Annotations mark their parent and carry no element content
fn annotation(element: &Element, kind: RevisionKind) -> Classification {
    if element.has_element_children() {
        return malformed(
            kind,
            format!("w:{} has element content", element.name.local),
        );
    }
    Classification::Revision(kind)
}

fn malformed(kind: RevisionKind, reason: String) -> Classification {
    Classification::Malformed { kind, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackless_ooxml::{Node, XName};

    fn el(local: &str) -> Element {
        Element::new(XName::wml(local))
    }

    fn run(text: &str) -> Element {
        el("r").with_child(el("t").with_child(Node::Text(text.to_string())))
    }

    fn classify_in(element: &Element, parent: &str, grandparent: &str) -> Classification {
        let gp = XName::wml(grandparent);
        let p = XName::wml(parent);
        classify(element, Scope::root().enter(&gp).enter(&p))
    }

    #[test]
    fn test_content_wrappers() {
        let ins = el("ins").with_child(run("foo"));
        assert_eq!(
            classify_in(&ins, "p", "body"),
            Classification::Revision(RevisionKind::Insertion)
        );
        let mv = el("moveFrom").with_child(run("bar"));
        assert_eq!(
            classify_in(&mv, "p", "body"),
            Classification::Revision(RevisionKind::MoveFrom)
        );
    }

    #[test]
    fn test_wrapper_around_paragraph_is_malformed() {
        let ins = el("ins").with_child(el("p"));
        match classify_in(&ins, "body", "document") {
            Classification::Malformed { kind, reason } => {
                assert_eq!(kind, RevisionKind::Insertion);
                assert!(reason.contains("w:p"));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_paragraph_mark_and_row_annotations() {
        let del = el("del").with_attribute("w:id", "1");
        assert_eq!(
            classify_in(&del, "rPr", "pPr"),
            Classification::Revision(RevisionKind::ParagraphMark(MarkChange::Deleted))
        );
        assert_eq!(
            classify_in(&del, "trPr", "tr"),
            Classification::Revision(RevisionKind::RowDeletion)
        );
        assert!(matches!(
            classify_in(&el("moveTo"), "trPr", "tr"),
            Classification::Malformed { .. }
        ));
        // A run's own properties cannot carry insertions
        assert!(matches!(
            classify_in(&del, "rPr", "r"),
            Classification::Malformed { .. }
        ));
    }

    #[test]
    fn test_numbering_insertion() {
        let ins = el("ins").with_attribute("w:id", "1");
        assert_eq!(
            classify_in(&ins, "numPr", "pPr"),
            Classification::Revision(RevisionKind::NumberingInsertion)
        );
        // Numbering properties only track insertions
        assert!(matches!(
            classify_in(&el("del"), "numPr", "pPr"),
            Classification::Malformed { .. }
        ));
        assert!(matches!(
            classify_in(&el("ins").with_child(el("ilvl")), "numPr", "pPr"),
            Classification::Malformed {
                kind: RevisionKind::NumberingInsertion,
                ..
            }
        ));
    }

    #[test]
    fn test_annotation_with_content_is_malformed() {
        let del = el("del").with_child(run("x"));
        assert!(matches!(
            classify_in(&del, "rPr", "pPr"),
            Classification::Malformed {
                kind: RevisionKind::ParagraphMark(MarkChange::Deleted),
                ..
            }
        ));
    }

    #[test]
    fn test_cell_annotations() {
        assert_eq!(
            classify_in(&el("cellDel"), "tcPr", "tc"),
            Classification::Revision(RevisionKind::CellDeletion)
        );
        assert_eq!(
            classify_in(&el("cellMerge").with_attribute("w:vMerge", "rest"), "tcPr", "tc"),
            Classification::Revision(RevisionKind::CellMerge)
        );
        assert!(matches!(
            classify_in(&el("cellIns"), "trPr", "tr"),
            Classification::Malformed { .. }
        ));
    }

    #[test]
    fn test_property_changes() {
        let change = el("rPrChange").with_child(el("rPr").with_child(el("b")));
        assert_eq!(
            classify_in(&change, "rPr", "r"),
            Classification::Revision(RevisionKind::PropertyChange(PropertyKind::Run))
        );
        assert!(matches!(
            classify_in(&change, "pPr", "p"),
            Classification::Malformed { .. }
        ));

        let wrong_child = el("pPrChange").with_child(el("rPr"));
        assert!(matches!(
            classify_in(&wrong_child, "pPr", "p"),
            Classification::Malformed { .. }
        ));

        let numbering = el("numberingChange").with_attribute("w:original", "1");
        assert_eq!(
            classify_in(&numbering, "numPr", "pPr"),
            Classification::Revision(RevisionKind::PropertyChange(PropertyKind::Numbering))
        );
    }

    #[test]
    fn test_range_markers_and_unknowns() {
        let start = el("moveFromRangeStart").with_attribute("w:name", "move1");
        assert_eq!(
            classify_in(&start, "body", "document"),
            Classification::Revision(RevisionKind::RangeMarker(RangeKind::MoveFromStart))
        );
        assert_eq!(
            classify_in(&el("bookmarkStart"), "p", "body"),
            Classification::NotARevision
        );
        let foreign = Element::new(XName::new(Some("urn:x"), Some("x"), "ins"));
        assert_eq!(classify_in(&foreign, "p", "body"), Classification::NotARevision);
    }

    #[test]
    fn test_foreign_parent_breaks_scope() {
        let foreign = XName::new(Some("urn:x"), Some("x"), "rPr");
        let p_pr = XName::wml("pPr");
        let scope = Scope::root().enter(&p_pr).enter(&foreign);
        assert_eq!(scope.parent, None);
        assert_eq!(
            classify(&el("del"), scope),
            Classification::Revision(RevisionKind::Deletion)
        );
    }
}
