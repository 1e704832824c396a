//! Revision processing: the core of acceptance
//!
//! Accepting all revisions of a part runs in two phases over an owned tree:
//!
//! 1. **Paragraph-mark merge.** A paragraph whose mark is deleted (or moved
//!    away) hands its content to the next paragraph and disappears. This
//!    has to happen before anything else is resolved because it changes
//!    which paragraph the surviving content ends up in.
//! 2. **Bottom-up resolution.** Every remaining node is classified and
//!    rewritten: insertions are unwrapped, deletions dropped, property
//!    changes and annotations removed, deleted rows and cells taken out of
//!    their tables with the table grid kept consistent.
//!
//! Malformed revision markup is passed through with a warning.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;
use trackless_ooxml::{Element, Node, XmlDocument};

use crate::classifier::{classify, Classification, Scope};
use crate::context::AcceptContext;
use crate::detector::MalformedMarkup;
use crate::diagnostics::{Code, Diagnostic, Diagnostics};
use crate::error::{AcceptError, Result};
use crate::grid::{self, attribute_key, insert_property};
use crate::kind::{PropertyKind, RangeKind, RevisionKind};

/// What acceptance did to a part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AcceptStats {
    /// Insertions made permanent
    pub insertions: usize,
    /// Deletions removed with their content
    pub deletions: usize,
    /// Move sources removed
    pub moved_from: usize,
    /// Move destinations made permanent
    pub moved_to: usize,
    /// Paragraph-mark annotations removed
    pub paragraph_marks: usize,
    /// Paragraphs merged into their successor
    pub merged_paragraphs: usize,
    /// Property changes and numbering insertions discarded
    pub property_changes: usize,
    /// Inserted rows kept
    pub rows_inserted: usize,
    /// Deleted rows removed
    pub rows_deleted: usize,
    /// Inserted cells kept
    pub cells_inserted: usize,
    /// Deleted cells removed
    pub cells_deleted: usize,
    /// Cell merges converted to vertical merges
    pub cells_merged: usize,
    /// Range markers removed
    pub range_markers: usize,
    /// Malformed revision nodes left in place
    pub malformed: usize,
}

impl AcceptStats {
    /// Number of revisions resolved
    pub fn resolved(&self) -> usize {
        self.insertions
            + self.deletions
            + self.moved_from
            + self.moved_to
            + self.paragraph_marks
            + self.property_changes
            + self.rows_inserted
            + self.rows_deleted
            + self.cells_inserted
            + self.cells_deleted
            + self.cells_merged
            + self.range_markers
    }

    /// Add another part's statistics to this one
    pub fn add(&mut self, other: &AcceptStats) {
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.moved_from += other.moved_from;
        self.moved_to += other.moved_to;
        self.paragraph_marks += other.paragraph_marks;
        self.merged_paragraphs += other.merged_paragraphs;
        self.property_changes += other.property_changes;
        self.rows_inserted += other.rows_inserted;
        self.rows_deleted += other.rows_deleted;
        self.cells_inserted += other.cells_inserted;
        self.cells_deleted += other.cells_deleted;
        self.cells_merged += other.cells_merged;
        self.range_markers += other.range_markers;
        self.malformed += other.malformed;
    }
}

/// Move range names seen on either side of a move
#[derive(Debug, Default)]
struct MoveLedger {
    sources: BTreeSet<String>,
    destinations: BTreeSet<String>,
}

/// Accepts every revision in a part
///
/// # Example
///
/// ```
/// use trackless_core::{AcceptContext, RevisionProcessor};
/// use trackless_ooxml::test_utils::document_part;
///
/// let mut part = document_part(
///     r#"<w:p><w:ins w:id="1"><w:r><w:t>foo</w:t></w:r></w:ins></w:p>"#,
/// )?;
/// let context = AcceptContext::new();
/// let mut processor = RevisionProcessor::new(&context);
/// let stats = processor.accept(&mut part.content)?;
/// assert_eq!(stats.insertions, 1);
/// assert_eq!(part.content.root.text(), "foo");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RevisionProcessor<'a> {
    context: &'a AcceptContext,
    diagnostics: Diagnostics,
    stats: AcceptStats,
    /// Breadcrumb segments of the element being processed
    path: Vec<String>,
    /// Declared grid width of each enclosing table, innermost last
    grids: Vec<Option<usize>>,
    moves: MoveLedger,
}

impl<'a> RevisionProcessor<'a> {
    /// Create a processor that checks references against `context`
    pub fn new(context: &'a AcceptContext) -> Self {
        Self {
            context,
            diagnostics: Diagnostics::new(),
            stats: AcceptStats::default(),
            path: Vec::new(),
            grids: Vec::new(),
            moves: MoveLedger::default(),
        }
    }

    /// Accept all revisions in a part, in place
    ///
    /// On error the part content is unspecified; callers that need the
    /// original should work on a clone.
    pub fn accept(&mut self, document: &mut XmlDocument) -> Result<AcceptStats> {
        let placeholder = Element::new(document.root.name.clone());
        let mut root = std::mem::replace(&mut document.root, placeholder);

        self.merge_paragraph_marks(&mut root);

        self.path.push(root.name.local.clone());
        let result = self.accept_children(root, Scope::root());
        self.path.pop();
        document.root = result?;

        self.report_unpaired_moves();
        debug!(resolved = self.stats.resolved(), "revisions accepted");
        Ok(self.stats)
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consume the processor, keeping its diagnostics
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    fn location(&self) -> String {
        self.path.join("/")
    }

    fn warn(&mut self, code: Code, message: String) {
        let diagnostic = Diagnostic::coded(code, message).at(self.location());
        self.diagnostics.push(diagnostic);
    }

    // ------------------------------------------------------------------
    // Phase 1: paragraph-mark merge
    // ------------------------------------------------------------------

    fn merge_paragraph_marks(&mut self, element: &mut Element) {
        for child in element.elements_mut() {
            self.merge_paragraph_marks(child);
        }
        if !element.children.iter().any(|n| n.is_wml("p")) {
            return;
        }

        let children = std::mem::take(&mut element.children);
        let mut merged = Vec::with_capacity(children.len());
        let mut carried: Vec<Node> = Vec::new();
        let mut rest = children.into_iter().peekable();

        while let Some(node) = rest.next() {
            let Node::Element(mut paragraph) = node else {
                merged.push(node);
                continue;
            };
            if !paragraph.is_wml("p") {
                merged.push(Node::Element(paragraph));
                continue;
            }

            if !carried.is_empty() {
                let at = content_start(&paragraph);
                paragraph.children.splice(at..at, carried.drain(..));
            }

            if !mark_is_removed(&paragraph) {
                merged.push(Node::Element(paragraph));
                continue;
            }

            let mut between = Vec::new();
            while let Some(next) = rest.next_if(is_between_paragraphs) {
                between.push(next);
            }
            let next_is_paragraph = rest.peek().is_some_and(|n| n.is_wml("p"));

            if next_is_paragraph {
                // Range boundaries travel with the content, in document order
                let at = content_start(&paragraph);
                carried.extend(paragraph.children.drain(at..));
                carried.append(&mut between);
                self.stats.merged_paragraphs += 1;
            } else {
                self.diagnostics.push(
                    Diagnostic::coded(
                        Code::UnmergedParagraphMark,
                        "deleted paragraph mark has no following paragraph to merge into",
                    )
                    .at(format!("{}/p", element.name.local)),
                );
                merged.push(Node::Element(paragraph));
            }
            merged.extend(between);
        }

        element.children = merged;
    }

    // ------------------------------------------------------------------
    // Phase 2: bottom-up resolution
    // ------------------------------------------------------------------

    /// Process an element's children in the element's scope
    fn accept_children(&mut self, mut element: Element, scope: Scope<'_>) -> Result<Element> {
        let inner = scope.enter(&element.name);
        let children = std::mem::take(&mut element.children);
        element.children = self.accept_nodes(children, inner)?;
        Ok(element)
    }

    fn accept_nodes(&mut self, nodes: Vec<Node>, scope: Scope<'_>) -> Result<Vec<Node>> {
        let mut totals: HashMap<String, usize> = HashMap::new();
        for element in nodes.iter().filter_map(Node::as_element) {
            *totals.entry(element.name.local.clone()).or_default() += 1;
        }
        let mut seen: HashMap<String, usize> = HashMap::new();

        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            let Node::Element(element) = node else {
                out.push(node);
                continue;
            };
            let local = element.name.local.clone();
            let index = seen.entry(local.clone()).or_default();
            *index += 1;
            let segment = if totals.get(&local).copied().unwrap_or(0) > 1 {
                format!("{}[{}]", local, index)
            } else {
                local
            };

            self.path.push(segment);
            let result = self.accept_element(element, scope, &mut out);
            self.path.pop();
            result?;
        }
        Ok(out)
    }

    fn accept_element(
        &mut self,
        element: Element,
        scope: Scope<'_>,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        match classify(&element, scope) {
            Classification::Revision(kind) => self.resolve(kind, element, scope, out),
            Classification::Malformed { reason, .. } => {
                let element = self.accept_children(element, scope)?;
                match classify(&element, scope) {
                    // Processing the content can repair the shape
                    Classification::Revision(kind) if kind.is_content_wrapper() => {
                        self.unwrap_processed(kind, element, scope, out);
                        Ok(())
                    }
                    Classification::Revision(kind) => self.resolve(kind, element, scope, out),
                    _ => {
                        self.keep_malformed(reason);
                        out.push(Node::Element(element));
                        Ok(())
                    }
                }
            }
            Classification::NotARevision => {
                if let Some(element) = self.accept_structure(element, scope)? {
                    out.push(Node::Element(element));
                }
                Ok(())
            }
        }
    }

    fn keep_malformed(&mut self, reason: String) {
        self.stats.malformed += 1;
        let markup = MalformedMarkup {
            location: self.location(),
            reason,
        };
        self.diagnostics.push(markup.diagnostic());
    }

    fn resolve(
        &mut self,
        kind: RevisionKind,
        element: Element,
        scope: Scope<'_>,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        match kind {
            RevisionKind::Insertion | RevisionKind::MoveTo => {
                let element = self.accept_children(element, scope)?;
                self.unwrap_processed(kind, element, scope, out);
            }
            RevisionKind::Deletion => self.stats.deletions += 1,
            RevisionKind::MoveFrom => self.stats.moved_from += 1,
            RevisionKind::ParagraphMark(_) => self.stats.paragraph_marks += 1,
            RevisionKind::PropertyChange(_) | RevisionKind::NumberingInsertion => {
                self.stats.property_changes += 1
            }
            RevisionKind::RowInsertion => self.stats.rows_inserted += 1,
            RevisionKind::CellInsertion => self.stats.cells_inserted += 1,
            // Row and cell deletions are applied by the enclosing row
            RevisionKind::RowDeletion | RevisionKind::CellDeletion => {
                return Err(AcceptError::structural(
                    self.location(),
                    format!("w:{} is not inside a table row", element.name.local),
                ));
            }
            // Converted to w:vMerge by the enclosing w:tcPr
            RevisionKind::CellMerge => {}
            RevisionKind::RangeMarker(range) => {
                self.stats.range_markers += 1;
                self.record_move_range(range, &element);
            }
        }
        Ok(())
    }

    /// Settle a content wrapper whose children are already accepted
    fn unwrap_processed(
        &mut self,
        kind: RevisionKind,
        element: Element,
        scope: Scope<'_>,
        out: &mut Vec<Node>,
    ) {
        if let Classification::Malformed { reason, .. } = classify(&element, scope) {
            self.keep_malformed(reason);
            out.push(Node::Element(element));
            return;
        }
        match kind {
            RevisionKind::Insertion => {
                self.stats.insertions += 1;
                out.extend(element.children);
            }
            RevisionKind::MoveTo => {
                self.stats.moved_to += 1;
                out.extend(element.children);
            }
            RevisionKind::Deletion => self.stats.deletions += 1,
            _ => self.stats.moved_from += 1,
        }
    }

    /// Elements that are not revisions but own revision semantics
    fn accept_structure(&mut self, element: Element, scope: Scope<'_>) -> Result<Option<Element>> {
        if !element.name.in_wml() {
            return self.accept_children(element, scope).map(Some);
        }
        match element.name.local.as_str() {
            "tbl" => {
                self.grids.push(grid::grid_columns(&element));
                let result = self.accept_children(element, scope);
                self.grids.pop();
                result.map(Some)
            }
            "tr" => self.accept_row(element, scope),
            "tcPr" => {
                let element = self.convert_cell_merge(element, scope);
                self.accept_children(element, scope).map(Some)
            }
            "pPr" => {
                self.check_committed_paragraph_properties(&element, scope);
                self.accept_children(element, scope).map(Some)
            }
            _ => self.accept_children(element, scope).map(Some),
        }
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    fn accept_row(&mut self, row: Element, scope: Scope<'_>) -> Result<Option<Element>> {
        if row_is_deleted(&row) {
            self.stats.rows_deleted += 1;
            return Ok(None);
        }
        let row = self.delete_cells(row)?;
        self.accept_children(row, scope).map(Some)
    }

    /// Remove deleted cells, giving their span to a surviving neighbour
    fn delete_cells(&mut self, mut row: Element) -> Result<Element> {
        let cells: Vec<(usize, bool)> = grid::row_cells(&row)
            .into_iter()
            .map(|tc| (grid::cell_span(tc), cell_is_deleted(tc)))
            .collect();
        if !cells.iter().any(|(_, deleted)| *deleted) {
            return Ok(row);
        }

        let declared = self.grids.last().copied().flatten();
        let before = grid::row_total(&row);

        let mut extra = vec![0usize; cells.len()];
        for (k, (span, deleted)) in cells.iter().enumerate() {
            if !deleted {
                continue;
            }
            let survivor = (0..k)
                .rev()
                .find(|&j| !cells[j].1)
                .or_else(|| (k + 1..cells.len()).find(|&j| !cells[j].1));
            match survivor {
                Some(j) => extra[j] += span,
                None => {
                    return Err(AcceptError::structural(
                        self.location(),
                        "every cell of the row is deleted; no cell can absorb the deleted span",
                    ))
                }
            }
            self.stats.cells_deleted += 1;
        }

        let mut next = 0;
        rebuild_cells(&mut row, &cells, &extra, &mut next);

        if let Some(columns) = declared {
            let after = grid::row_total(&row);
            if before == columns && after != columns {
                return Err(AcceptError::structural(
                    self.location(),
                    format!("row covers {after} grid columns after cell deletion, table declares {columns}"),
                ));
            }
        }
        Ok(row)
    }

    /// Replace a well-formed `w:cellMerge` with the equivalent `w:vMerge`
    fn convert_cell_merge(&mut self, mut properties: Element, scope: Scope<'_>) -> Element {
        let merge = {
            let inner = scope.enter(&properties.name);
            properties
                .elements()
                .find(|c| {
                    classify(c, inner).revision() == Some(RevisionKind::CellMerge)
                })
                .map(|c| c.attr("vMerge").map(str::to_string))
        };
        let Some(merge) = merge else {
            return properties;
        };
        self.stats.cells_merged += 1;

        let name = properties.name.sibling("vMerge");
        let replacement = match merge.as_deref() {
            Some("rest") => {
                let key = attribute_key(&name, "val");
                Element::new(name).with_attribute(key, "restart")
            }
            Some("cont") => Element::new(name),
            _ => return properties,
        };

        match properties.children.iter().position(|n| n.is_wml("vMerge")) {
            Some(position) => {
                properties.children.retain(|n| !n.is_wml("vMerge"));
                properties.children.insert(position, replacement.into());
            }
            None => insert_property(
                &mut properties,
                replacement,
                &["cnfStyle", "tcW", "gridSpan", "hMerge"],
            ),
        }
        properties
    }

    // ------------------------------------------------------------------
    // References and moves
    // ------------------------------------------------------------------

    /// When a paragraph property change is committed, the current style and
    /// numbering must exist in the document
    fn check_committed_paragraph_properties(&mut self, properties: &Element, scope: Scope<'_>) {
        let inner = scope.enter(&properties.name);
        let committed = properties.elements().any(|c| {
            classify(c, inner).revision()
                == Some(RevisionKind::PropertyChange(PropertyKind::Paragraph))
        });
        if !committed {
            return;
        }

        if let Some(style) = properties.child("pStyle").and_then(|s| s.attr("val")) {
            if !self.context.style_known(style) {
                self.warn(
                    Code::UnknownStyle,
                    format!("paragraph style '{style}' is not defined in the document"),
                );
            }
        }
        if let Some(num_id) = properties
            .child("numPr")
            .and_then(|n| n.child("numId"))
            .and_then(|n| n.attr("val"))
        {
            if !self.context.numbering_known(num_id) {
                self.warn(
                    Code::UnknownNumbering,
                    format!("numbering instance '{num_id}' is not defined in the document"),
                );
            }
        }
    }

    fn record_move_range(&mut self, range: RangeKind, marker: &Element) {
        let Some(name) = marker.attr("name") else {
            return;
        };
        match range {
            RangeKind::MoveFromStart => {
                self.moves.sources.insert(name.to_string());
            }
            RangeKind::MoveToStart => {
                self.moves.destinations.insert(name.to_string());
            }
            _ => {}
        }
    }

    fn report_unpaired_moves(&mut self) {
        let ledger = std::mem::take(&mut self.moves);
        for name in ledger.sources.difference(&ledger.destinations) {
            self.diagnostics.push(
                Diagnostic::coded(
                    Code::UnpairedMove,
                    format!("move '{name}' has a source but no destination"),
                ),
            );
        }
        for name in ledger.destinations.difference(&ledger.sources) {
            self.diagnostics.push(
                Diagnostic::coded(
                    Code::UnpairedMove,
                    format!("move '{name}' has a destination but no source"),
                ),
            );
        }
    }
}

/// Drop deleted cells and widen the cells absorbing their span
///
/// `cells` and `extra` are indexed in the order [`grid::row_cells`] reports
/// cells; a wrapper left without cells is dropped with them.
fn rebuild_cells(container: &mut Element, cells: &[(usize, bool)], extra: &[usize], next: &mut usize) {
    let mut kept = Vec::with_capacity(container.children.len());
    for node in std::mem::take(&mut container.children) {
        match node {
            Node::Element(mut tc) if tc.is_wml("tc") => {
                let index = *next;
                *next += 1;
                let Some(&(span, deleted)) = cells.get(index) else {
                    kept.push(Node::Element(tc));
                    continue;
                };
                if deleted {
                    continue;
                }
                let widen = extra.get(index).copied().unwrap_or(0);
                if widen > 0 {
                    grid::set_cell_span(&mut tc, span + widen);
                }
                kept.push(Node::Element(tc));
            }
            Node::Element(mut wrapper) if grid::is_cell_wrapper(&wrapper) => {
                let first = *next;
                rebuild_cells(&mut wrapper, cells, extra, next);
                let emptied = *next > first && grid::row_cells(&wrapper).is_empty();
                if !emptied {
                    kept.push(Node::Element(wrapper));
                }
            }
            other => kept.push(other),
        }
    }
    container.children = kept;
}

/// Range boundaries that may sit between block-level siblings
const RANGE_MARKUP: &[&str] = &[
    "bookmarkStart",
    "bookmarkEnd",
    "commentRangeStart",
    "commentRangeEnd",
    "permStart",
    "permEnd",
    "proofErr",
    "moveFromRangeStart",
    "moveFromRangeEnd",
    "moveToRangeStart",
    "moveToRangeEnd",
    "customXmlInsRangeStart",
    "customXmlInsRangeEnd",
    "customXmlDelRangeStart",
    "customXmlDelRangeEnd",
    "customXmlMoveFromRangeStart",
    "customXmlMoveFromRangeEnd",
    "customXmlMoveToRangeStart",
    "customXmlMoveToRangeEnd",
];

/// Nodes a deleted paragraph mark can merge across
fn is_between_paragraphs(node: &Node) -> bool {
    node.is_insignificant()
        || node
            .as_element()
            .is_some_and(|e| e.name.in_wml() && RANGE_MARKUP.contains(&e.name.local.as_str()))
}

/// Index of the first child after the paragraph properties
fn content_start(paragraph: &Element) -> usize {
    paragraph
        .children
        .iter()
        .position(|n| n.is_wml("pPr"))
        .map_or(0, |i| i + 1)
}

/// Whether the paragraph mark carries a deletion or move-away annotation
fn mark_is_removed(paragraph: &Element) -> bool {
    let Some(properties) = paragraph.child("pPr") else {
        return false;
    };
    let Some(mark) = properties.child("rPr") else {
        return false;
    };
    let scope = Scope::root()
        .enter(&paragraph.name)
        .enter(&properties.name)
        .enter(&mark.name);
    mark.elements().any(|annotation| {
        matches!(
            classify(annotation, scope).revision(),
            Some(RevisionKind::ParagraphMark(change)) if change.removes_mark()
        )
    })
}

fn row_is_deleted(row: &Element) -> bool {
    let Some(properties) = row.child("trPr") else {
        return false;
    };
    let scope = Scope::root().enter(&row.name).enter(&properties.name);
    properties
        .elements()
        .any(|c| classify(c, scope).revision() == Some(RevisionKind::RowDeletion))
}

fn cell_is_deleted(cell: &Element) -> bool {
    let Some(properties) = cell.child("tcPr") else {
        return false;
    };
    let scope = Scope::root().enter(&cell.name).enter(&properties.name);
    properties
        .elements()
        .any(|c| classify(c, scope).revision() == Some(RevisionKind::CellDeletion))
}
