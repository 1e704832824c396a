//! Revision detection
//!
//! [`has_revisions`] answers "does this part carry tracked changes?" and
//! stops at the first one. [`census`] walks the whole part and counts them by
//! category. Malformed revision markup is counted separately and never makes
//! a part count as revised: the engine would leave it in place anyway.
//! [`malformed_markup`] locates it so it can still be reported.

use std::collections::HashMap;

use serde::Serialize;
use trackless_ooxml::{Element, XmlDocument};

use crate::classifier::{classify, Classification, Scope};
use crate::diagnostics::{Code, Diagnostic};
use crate::kind::RevisionKind;

/// Check whether a part contains at least one well-formed revision
pub fn has_revisions(document: &XmlDocument) -> bool {
    element_has_revisions(&document.root, Scope::root())
}

fn element_has_revisions(element: &Element, scope: Scope<'_>) -> bool {
    if matches!(classify(element, scope), Classification::Revision(_)) {
        return true;
    }
    let inner = scope.enter(&element.name);
    element
        .elements()
        .any(|child| element_has_revisions(child, inner))
}

/// Revision counts for one part or a whole document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevisionCensus {
    /// `w:ins` content wrappers
    pub insertions: usize,
    /// `w:del` content wrappers
    pub deletions: usize,
    /// `w:moveFrom` and `w:moveTo` wrappers
    pub moves: usize,
    /// Paragraph-mark annotations
    pub paragraph_marks: usize,
    /// Property changes of any kind, including numbering insertions
    pub property_changes: usize,
    /// Row and cell insertions, deletions and merges
    pub table_changes: usize,
    /// Move and custom XML range markers
    pub range_markers: usize,
    /// Revision markup that does not fit its kind
    pub malformed: usize,
}

impl RevisionCensus {
    /// Number of well-formed revisions
    pub fn total(&self) -> usize {
        self.insertions
            + self.deletions
            + self.moves
            + self.paragraph_marks
            + self.property_changes
            + self.table_changes
            + self.range_markers
    }

    /// Whether no well-formed revisions were found
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Add another census to this one
    pub fn add(&mut self, other: &RevisionCensus) {
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.moves += other.moves;
        self.paragraph_marks += other.paragraph_marks;
        self.property_changes += other.property_changes;
        self.table_changes += other.table_changes;
        self.range_markers += other.range_markers;
        self.malformed += other.malformed;
    }

    fn record(&mut self, kind: RevisionKind) {
        match kind {
            RevisionKind::Insertion => self.insertions += 1,
            RevisionKind::Deletion => self.deletions += 1,
            RevisionKind::MoveFrom | RevisionKind::MoveTo => self.moves += 1,
            RevisionKind::ParagraphMark(_) => self.paragraph_marks += 1,
            RevisionKind::PropertyChange(_) | RevisionKind::NumberingInsertion => {
                self.property_changes += 1
            }
            RevisionKind::RowInsertion
            | RevisionKind::RowDeletion
            | RevisionKind::CellInsertion
            | RevisionKind::CellDeletion
            | RevisionKind::CellMerge => self.table_changes += 1,
            RevisionKind::RangeMarker(_) => self.range_markers += 1,
        }
    }
}

/// Count every revision in a part
pub fn census(document: &XmlDocument) -> RevisionCensus {
    let mut counts = RevisionCensus::default();
    count_element(&document.root, Scope::root(), &mut counts);
    counts
}

fn count_element(element: &Element, scope: Scope<'_>, counts: &mut RevisionCensus) {
    match classify(element, scope) {
        Classification::Revision(kind) => counts.record(kind),
        Classification::Malformed { .. } => counts.malformed += 1,
        Classification::NotARevision => {}
    }
    let inner = scope.enter(&element.name);
    for child in element.elements() {
        count_element(child, inner, counts);
    }
}

/// Revision markup whose shape does not fit its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMarkup {
    /// Element breadcrumb (e.g. `document/body/ins`)
    pub location: String,
    /// Why it does not fit
    pub reason: String,
}

impl MalformedMarkup {
    /// The W001 warning for markup left in place
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::coded(
            Code::MalformedRevision,
            format!("malformed revision markup left in place: {}", self.reason),
        )
        .at(self.location.as_str())
    }
}

/// Locate every piece of malformed revision markup in a part, in document order
pub fn malformed_markup(document: &XmlDocument) -> Vec<MalformedMarkup> {
    let mut found = Vec::new();
    let mut path = vec![document.root.name.local.clone()];
    collect_malformed(&document.root, Scope::root(), &mut path, &mut found);
    found
}

fn collect_malformed(
    element: &Element,
    scope: Scope<'_>,
    path: &mut Vec<String>,
    found: &mut Vec<MalformedMarkup>,
) {
    let inner = scope.enter(&element.name);
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for child in element.elements() {
        *totals.entry(child.name.local.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for child in element.elements() {
        let local = child.name.local.as_str();
        let index = seen.entry(local).or_default();
        *index += 1;
        let segment = if totals.get(local).copied().unwrap_or(0) > 1 {
            format!("{local}[{index}]")
        } else {
            local.to_string()
        };

        path.push(segment);
        if let Classification::Malformed { reason, .. } = classify(child, inner) {
            found.push(MalformedMarkup {
                location: path.join("/"),
                reason,
            });
        }
        collect_malformed(child, inner, path, found);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackless_ooxml::test_utils::document_part;

    #[test]
    fn test_clean_part() {
        let part = document_part("<w:p><w:r><w:t>plain</w:t></w:r></w:p>").unwrap();
        assert!(!has_revisions(&part.content));
        assert!(census(&part.content).is_clean());
    }

    #[test]
    fn test_nested_revision_is_found() {
        let part = document_part(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:rPr><w:rPrChange w:id="1"><w:rPr/></w:rPrChange></w:rPr><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        )
        .unwrap();
        assert!(has_revisions(&part.content));
        assert_eq!(census(&part.content).property_changes, 1);
    }

    #[test]
    fn test_malformed_only_is_not_a_revision() {
        let part = document_part(r#"<w:ins w:id="1"><w:p/></w:ins>"#).unwrap();
        assert!(!has_revisions(&part.content));
        let counts = census(&part.content);
        assert_eq!(counts.malformed, 1);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_numbering_insertion_counts_as_revision() {
        let part = document_part(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/><w:ins w:id="1" w:author="A"/></w:numPr></w:pPr></w:p>"#,
        )
        .unwrap();
        assert!(has_revisions(&part.content));
        let counts = census(&part.content);
        assert_eq!(counts.property_changes, 1);
        assert_eq!(counts.malformed, 0);
    }

    #[test]
    fn test_malformed_markup_is_located() {
        let part = document_part(
            r#"<w:p/><w:ins w:id="1"><w:p/></w:ins><w:p><w:r><w:rPr><w:del w:id="2"/></w:rPr></w:r></w:p>"#,
        )
        .unwrap();
        let found = malformed_markup(&part.content);
        let locations: Vec<_> = found.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["document/body/ins", "document/body/p[2]/r/rPr/del"]
        );
        assert!(found[0].reason.contains("w:p"));

        let diagnostic = found[1].diagnostic();
        assert!(diagnostic.has_code(Code::MalformedRevision));
        assert_eq!(diagnostic.location.as_deref(), Some("document/body/p[2]/r/rPr/del"));
    }

    #[test]
    fn test_census_categories() {
        let part = document_part(
            r#"<w:p><w:pPr><w:rPr><w:del w:id="1"/></w:rPr></w:pPr><w:ins w:id="2"><w:r><w:t>a</w:t></w:r></w:ins><w:del w:id="3"><w:r><w:delText>b</w:delText></w:r></w:del></w:p><w:p><w:moveToRangeStart w:id="4" w:name="m"/><w:moveTo w:id="5"><w:r><w:t>c</w:t></w:r></w:moveTo><w:moveToRangeEnd w:id="4"/></w:p>"#,
        )
        .unwrap();
        let counts = census(&part.content);
        assert_eq!(counts.paragraph_marks, 1);
        assert_eq!(counts.insertions, 1);
        assert_eq!(counts.deletions, 1);
        assert_eq!(counts.moves, 1);
        assert_eq!(counts.range_markers, 2);
        assert_eq!(counts.total(), 6);

        let mut sum = RevisionCensus::default();
        sum.add(&counts);
        sum.add(&counts);
        assert_eq!(sum.total(), 12);
    }
}
