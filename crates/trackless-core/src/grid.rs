//! Table grid arithmetic
//!
//! Every row of a table must cover exactly the columns declared in the
//! table's `w:tblGrid`: `gridBefore + Σ gridSpan + gridAfter == #gridCol`.

use trackless_ooxml::{Element, XName};

/// Number of `w:gridCol` entries, if the table declares a grid
pub fn grid_columns(table: &Element) -> Option<usize> {
    table
        .child("tblGrid")
        .map(|grid| grid.elements().filter(|c| c.is_wml("gridCol")).count())
}

/// Columns spanned by a cell (`w:tcPr/w:gridSpan`, default 1)
pub fn cell_span(cell: &Element) -> usize {
    cell.child("tcPr")
        .and_then(|pr| pr.child("gridSpan"))
        .and_then(|span| span.attr("val"))
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Row-level elements that can hold cells
const CELL_WRAPPERS: &[&str] = &["sdt", "sdtContent", "customXml"];

/// Whether an element inside a row can hold cells of that row
pub fn is_cell_wrapper(element: &Element) -> bool {
    element.name.in_wml() && CELL_WRAPPERS.contains(&element.name.local.as_str())
}

/// Cells of a row in document order, including those inside row-level
/// content controls and custom XML
pub fn row_cells(row: &Element) -> Vec<&Element> {
    let mut cells = Vec::new();
    collect_cells(row, &mut cells);
    cells
}

fn collect_cells<'a>(container: &'a Element, cells: &mut Vec<&'a Element>) {
    for child in container.elements() {
        if child.is_wml("tc") {
            cells.push(child);
        } else if is_cell_wrapper(child) {
            collect_cells(child, cells);
        }
    }
}

/// Columns covered by a row, including skipped leading and trailing columns
pub fn row_total(row: &Element) -> usize {
    let skipped = |local: &str| {
        row.child("trPr")
            .and_then(|pr| pr.child(local))
            .and_then(|e| e.attr("val"))
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(0)
    };
    let cells: usize = row_cells(row).into_iter().map(cell_span).sum();
    skipped("gridBefore") + cells + skipped("gridAfter")
}

/// Rows whose total differs from the declared grid, as `(row index, total)`
///
/// Tables without a `w:tblGrid` have nothing to check against.
pub fn mismatched_rows(table: &Element) -> Vec<(usize, usize)> {
    let Some(columns) = grid_columns(table) else {
        return Vec::new();
    };
    table
        .elements()
        .filter(|e| e.is_wml("tr"))
        .enumerate()
        .map(|(i, row)| (i, row_total(row)))
        .filter(|(_, total)| *total != columns)
        .collect()
}

/// Set a cell's span, creating `w:tcPr`/`w:gridSpan` as needed
pub fn set_cell_span(cell: &mut Element, span: usize) {
    if cell.child("tcPr").is_none() {
        cell.children
            .insert(0, Element::new(cell.name.sibling("tcPr")).into());
    }
    let Some(properties) = cell.child_mut("tcPr") else {
        return;
    };
    match properties.child_mut("gridSpan") {
        Some(grid_span) => {
            let key = attribute_key(&grid_span.name, "val");
            grid_span.set_attr(key, span.to_string());
        }
        None => {
            let name = properties.name.sibling("gridSpan");
            let key = attribute_key(&name, "val");
            let grid_span = Element::new(name).with_attribute(key, span.to_string());
            insert_property(properties, grid_span, &["cnfStyle", "tcW"]);
        }
    }
}

/// Qualified key for an attribute in the element's own namespace
pub(crate) fn attribute_key(name: &XName, local: &str) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

/// Insert a property element after the last of `after` present in the container
pub(crate) fn insert_property(container: &mut Element, property: Element, after: &[&str]) {
    let position = container
        .children
        .iter()
        .rposition(|n| {
            n.as_element()
                .is_some_and(|e| e.name.in_wml() && after.contains(&e.name.local.as_str()))
        })
        .map_or(0, |i| i + 1);
    container.children.insert(position, property.into());
}
