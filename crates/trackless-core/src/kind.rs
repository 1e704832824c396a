//! The closed set of revision kinds the engine resolves

use serde::Serialize;

/// A tracked change, identified by element name and position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RevisionKind {
    /// `w:ins` around run-level content
    Insertion,
    /// `w:del` around run-level content
    Deletion,
    /// `w:moveFrom` around run-level content (move source)
    MoveFrom,
    /// `w:moveTo` around run-level content (move destination)
    MoveTo,
    /// Annotation on a paragraph mark (`w:pPr/w:rPr/w:ins` and friends)
    ParagraphMark(MarkChange),
    /// `w:*PrChange` holding the previous properties
    PropertyChange(PropertyKind),
    /// `w:numPr/w:ins`: the paragraph's numbering was applied as a change
    NumberingInsertion,
    /// `w:trPr/w:ins`
    RowInsertion,
    /// `w:trPr/w:del`
    RowDeletion,
    /// `w:tcPr/w:cellIns`
    CellInsertion,
    /// `w:tcPr/w:cellDel`
    CellDeletion,
    /// `w:tcPr/w:cellMerge`
    CellMerge,
    /// Start or end of a move or custom XML revision range
    RangeMarker(RangeKind),
}

impl RevisionKind {
    /// Whether the kind wraps content (as opposed to annotating its parent)
    pub fn is_content_wrapper(&self) -> bool {
        matches!(
            self,
            RevisionKind::Insertion
                | RevisionKind::Deletion
                | RevisionKind::MoveFrom
                | RevisionKind::MoveTo
        )
    }
}

/// What happened to a paragraph mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkChange {
    /// The mark was inserted (paragraph split)
    Inserted,
    /// The mark was deleted (paragraph joins the next one)
    Deleted,
    /// The mark was moved away
    MovedFrom,
    /// The mark was moved here
    MovedTo,
}

impl MarkChange {
    /// Accepting this change removes the paragraph mark
    pub fn removes_mark(&self) -> bool {
        matches!(self, MarkChange::Deleted | MarkChange::MovedFrom)
    }
}

/// Which property set a property change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    /// `w:rPrChange`
    Run,
    /// `w:pPrChange`
    Paragraph,
    /// `w:tblPrChange`
    Table,
    /// `w:tblPrExChange`
    TableException,
    /// `w:trPrChange`
    Row,
    /// `w:tcPrChange`
    Cell,
    /// `w:sectPrChange`
    Section,
    /// `w:tblGridChange`
    TableGrid,
    /// `w:numberingChange`
    Numbering,
}

impl PropertyKind {
    /// All property change kinds
    pub const ALL: [PropertyKind; 9] = [
        PropertyKind::Run,
        PropertyKind::Paragraph,
        PropertyKind::Table,
        PropertyKind::TableException,
        PropertyKind::Row,
        PropertyKind::Cell,
        PropertyKind::Section,
        PropertyKind::TableGrid,
        PropertyKind::Numbering,
    ];

    /// Local name of the change element
    pub fn element_name(&self) -> &'static str {
        match self {
            PropertyKind::Run => "rPrChange",
            PropertyKind::Paragraph => "pPrChange",
            PropertyKind::Table => "tblPrChange",
            PropertyKind::TableException => "tblPrExChange",
            PropertyKind::Row => "trPrChange",
            PropertyKind::Cell => "tcPrChange",
            PropertyKind::Section => "sectPrChange",
            PropertyKind::TableGrid => "tblGridChange",
            PropertyKind::Numbering => "numberingChange",
        }
    }

    /// Local name of the container the change must sit in
    pub fn container(&self) -> &'static str {
        match self {
            PropertyKind::Run => "rPr",
            PropertyKind::Paragraph => "pPr",
            PropertyKind::Table => "tblPr",
            PropertyKind::TableException => "tblPrEx",
            PropertyKind::Row => "trPr",
            PropertyKind::Cell => "tcPr",
            PropertyKind::Section => "sectPr",
            PropertyKind::TableGrid => "tblGrid",
            PropertyKind::Numbering => "numPr",
        }
    }

    /// Local name of the previous-properties element it may hold
    ///
    /// `numberingChange` records the previous numbering in attributes.
    pub fn previous(&self) -> Option<&'static str> {
        match self {
            PropertyKind::Numbering => None,
            other => Some(other.container()),
        }
    }

    /// Look up the kind from a change element name
    pub fn from_element_name(local: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.element_name() == local)
    }
}

/// Which range marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RangeKind {
    /// `w:moveFromRangeStart`
    MoveFromStart,
    /// `w:moveFromRangeEnd`
    MoveFromEnd,
    /// `w:moveToRangeStart`
    MoveToStart,
    /// `w:moveToRangeEnd`
    MoveToEnd,
    /// `w:customXmlInsRangeStart`
    CustomXmlInsStart,
    /// `w:customXmlInsRangeEnd`
    CustomXmlInsEnd,
    /// `w:customXmlDelRangeStart`
    CustomXmlDelStart,
    /// `w:customXmlDelRangeEnd`
    CustomXmlDelEnd,
    /// `w:customXmlMoveFromRangeStart`
    CustomXmlMoveFromStart,
    /// `w:customXmlMoveFromRangeEnd`
    CustomXmlMoveFromEnd,
    /// `w:customXmlMoveToRangeStart`
    CustomXmlMoveToStart,
    /// `w:customXmlMoveToRangeEnd`
    CustomXmlMoveToEnd,
}

impl RangeKind {
    /// Look up the kind from a marker element name
    pub fn from_element_name(local: &str) -> Option<Self> {
        Some(match local {
            "moveFromRangeStart" => RangeKind::MoveFromStart,
            "moveFromRangeEnd" => RangeKind::MoveFromEnd,
            "moveToRangeStart" => RangeKind::MoveToStart,
            "moveToRangeEnd" => RangeKind::MoveToEnd,
            "customXmlInsRangeStart" => RangeKind::CustomXmlInsStart,
            "customXmlInsRangeEnd" => RangeKind::CustomXmlInsEnd,
            "customXmlDelRangeStart" => RangeKind::CustomXmlDelStart,
            "customXmlDelRangeEnd" => RangeKind::CustomXmlDelEnd,
            "customXmlMoveFromRangeStart" => RangeKind::CustomXmlMoveFromStart,
            "customXmlMoveFromRangeEnd" => RangeKind::CustomXmlMoveFromEnd,
            "customXmlMoveToRangeStart" => RangeKind::CustomXmlMoveToStart,
            "customXmlMoveToRangeEnd" => RangeKind::CustomXmlMoveToEnd,
            _ => return None,
        })
    }
}
