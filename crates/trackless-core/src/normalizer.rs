//! Structural cleanup after acceptance
//!
//! Accepting revisions tends to leave fragments behind: runs that lost all
//! their text, hyperlinks around nothing, neighbouring runs that only existed
//! because one of them used to be inserted. [`normalize`] tidies those up
//! without changing the document's content. It never removes a paragraph,
//! and running it twice gives the same tree as running it once.

use trackless_ooxml::{Element, Node, XmlDocument};

/// Inline wrappers that are dropped once they hold no elements
const INLINE_WRAPPERS: &[&str] = &["hyperlink", "smartTag"];

/// Parents in which `w:customXml` is an inline wrapper
const INLINE_PARENTS: &[&str] = &["p", "hyperlink", "smartTag", "fldSimple"];

/// Elements that count as block content of a table cell
const CELL_BLOCKS: &[&str] = &["p", "tbl", "sdt", "customXml", "altChunk"];

/// Tidy a part after its revisions were accepted
pub fn normalize(document: &mut XmlDocument) {
    normalize_element(&mut document.root);
}

fn normalize_element(element: &mut Element) {
    for child in element.elements_mut() {
        normalize_element(child);
    }

    let inline_parent = element.name.in_wml() && INLINE_PARENTS.contains(&element.name.local.as_str());
    element
        .children
        .retain(|node| !is_empty_run(node) && !is_empty_wrapper(node, inline_parent) && !is_empty_table(node));

    merge_runs(element);

    if element.is_wml("tc") && !element.elements().any(|e| is_cell_block(e)) {
        let paragraph = Element::new(element.name.sibling("p"));
        element.children.push(paragraph.into());
    }
}

fn is_empty_run(node: &Node) -> bool {
    let Some(run) = node.as_element().filter(|e| e.is_wml("r")) else {
        return false;
    };
    run.children.iter().all(|child| match child {
        Node::Element(e) => e.is_wml("rPr") || (e.is_wml("t") && e.text().is_empty()),
        other => is_layout_whitespace(other),
    })
}

/// Whitespace between elements; comments and processing instructions are
/// content the normalizer must not lose
fn is_layout_whitespace(node: &Node) -> bool {
    matches!(node, Node::Text(_)) && node.is_insignificant()
}

fn is_empty_wrapper(node: &Node, inline_parent: bool) -> bool {
    let Some(element) = node.as_element().filter(|e| e.name.in_wml()) else {
        return false;
    };
    let wrapper = INLINE_WRAPPERS.contains(&element.name.local.as_str())
        || (inline_parent && element.is_wml("customXml"));
    wrapper && !element.has_element_children()
}

fn is_empty_table(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|t| t.is_wml("tbl") && !t.elements().any(|e| e.is_wml("tr")))
}

fn is_cell_block(element: &Element) -> bool {
    element.name.in_wml() && CELL_BLOCKS.contains(&element.name.local.as_str())
}

// ----------------------------------------------------------------------------
// Run merging
// ----------------------------------------------------------------------------

/// A run holding nothing but optional properties and text
fn is_text_run(run: &Element) -> bool {
    if !run.is_wml("r") {
        return false;
    }
    let mut elements = run.elements().peekable();
    elements.next_if(|e| e.is_wml("rPr"));
    let mut has_text = false;
    for element in elements {
        if !element.is_wml("t") || element.has_element_children() {
            return false;
        }
        has_text = true;
    }
    has_text
        && run
            .children
            .iter()
            .all(|n| matches!(n, Node::Element(_)) || is_layout_whitespace(n))
}

/// Runs format alike when their properties are structurally equal; a missing
/// `w:rPr` equals an empty one
fn same_formatting(a: &Element, b: &Element) -> bool {
    match (a.child("rPr"), b.child("rPr")) {
        (None, None) => true,
        (Some(properties), None) | (None, Some(properties)) => !properties.has_element_children(),
        (Some(left), Some(right)) => left.equivalent(right),
    }
}

fn run_text(run: &Element) -> String {
    run.elements()
        .filter(|e| e.is_wml("t"))
        .map(Element::text)
        .collect()
}

/// Append the text of `run` to `target`, leaving a single `w:t`
fn absorb(target: &mut Element, run: &Element) {
    let text = run_text(target) + &run_text(run);
    let mut t = Element::new(target.name.sibling("t"));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t = t.with_attribute("xml:space", "preserve");
    }
    t = t.with_child(Node::Text(text));

    target.children.retain(|n| !n.is_wml("t"));
    target.children.push(t.into());
}

fn merge_runs(element: &mut Element) {
    if element.children.iter().filter(|n| n.is_wml("r")).nth(1).is_none() {
        return;
    }

    let children = std::mem::take(&mut element.children);
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    // Position in `merged` of the run that can absorb the next one
    let mut open: Option<usize> = None;
    let mut whitespace: Vec<Node> = Vec::new();

    for node in children {
        match node {
            Node::Text(text) if open.is_some() && text.trim().is_empty() => {
                whitespace.push(Node::Text(text));
            }
            Node::Element(run) if is_text_run(&run) => {
                if let Some(Node::Element(target)) = open.and_then(|i| merged.get_mut(i)) {
                    if same_formatting(target, &run) {
                        absorb(target, &run);
                        whitespace.clear();
                        continue;
                    }
                }
                merged.append(&mut whitespace);
                merged.push(Node::Element(run));
                open = Some(merged.len() - 1);
            }
            other => {
                merged.append(&mut whitespace);
                merged.push(other);
                open = None;
            }
        }
    }
    merged.append(&mut whitespace);
    element.children = merged;
}
