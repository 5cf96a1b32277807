use crate::doc::{Doc, DocNode};
use crate::geometry::Width;

/// Render with a simple but slow algorithm: candidate layouts are
/// materialized eagerly as strings and the fits decision is re-derived by
/// scanning them, so the cost can be exponential in the number of layout
/// choices. This always produces the same output as [`Doc::render`], which
/// makes it an oracle for automated testing of the streaming engine.
pub fn oracular_render(doc: &Doc, width: Width) -> String {
    let width = width.max(0);
    best(width, 0, vec![(0, doc.clone())])
}

fn best(width: Width, pos: Width, mut stack: Vec<(Width, Doc)>) -> String {
    let (indent, doc) = match stack.pop() {
        Some(top) => top,
        None => return String::new(),
    };
    match doc.node() {
        DocNode::Empty => best(width, pos, stack),
        DocNode::Concat(a, b) => {
            stack.push((indent, b.clone()));
            stack.push((indent, a.clone()));
            best(width, pos, stack)
        }
        DocNode::Nest(j, inner) => {
            stack.push((indent + j, inner.clone()));
            best(width, pos, stack)
        }
        DocNode::Text(s, w) => {
            let rest = best(width, pos.saturating_add(*w), stack);
            format!("{}{}", s, rest)
        }
        DocNode::Line => {
            let rest = best(width, indent, stack);
            format!("\n{}{}", " ".repeat(indent.max(0) as usize), rest)
        }
        DocNode::Union(flat, expanded) => {
            let mut flat_stack = stack.clone();
            flat_stack.push((indent, flat.clone()));
            let attempt = best(width, pos, flat_stack);
            if first_line_fits(width, pos, &attempt) {
                attempt
            } else {
                stack.push((indent, expanded.force().clone()));
                best(width, pos, stack)
            }
        }
    }
}

/// Scan a materialized layout: true iff the columns stay within `width` up
/// to and including the first newline (or the end of the string).
fn first_line_fits(width: Width, start: Width, rendered: &str) -> bool {
    let mut pos = start;
    if pos > width {
        return false;
    }
    for c in rendered.chars() {
        if c == '\n' {
            return true;
        }
        pos += 1;
        if pos > width {
            return false;
        }
    }
    true
}
