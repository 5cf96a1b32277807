use crate::doc::{Doc, DocNode};
use crate::geometry::Width;
use crate::render::{push, Frames};

/// The least width at which the pending layout fits up to its next hard
/// break: the column reached by walking to the first `Line`, resolving
/// every union met on the way to its expanded branch, which reaches a
/// newline no later than its flat form does.
pub(crate) fn min_fit_width(mut pos: Width, mut frames: Frames) -> Width {
    loop {
        let frame = match frames {
            Some(frame) => frame,
            None => return pos,
        };
        let indent = frame.indent;
        let rest = frame.rest.clone();
        match frame.doc.node() {
            DocNode::Empty => frames = rest,
            DocNode::Concat(a, b) => {
                frames = push(indent, a.clone(), push(indent, b.clone(), rest));
            }
            DocNode::Nest(j, inner) => frames = push(indent + j, inner.clone(), rest),
            DocNode::Text(_, w) => {
                pos = pos.saturating_add(*w);
                frames = rest;
            }
            DocNode::Line => return pos,
            DocNode::Union(_, expanded) => {
                frames = push(indent, expanded.force().clone(), rest);
            }
        }
    }
}

/// The smallest width beyond which rendering is invariant: the maximum,
/// over every union met on the widest-layout walk, of the width that union
/// needs before it commits to its flat branch. Documents without unions
/// report 0.
pub(crate) fn max_width(doc: &Doc) -> Width {
    let mut widest: Width = 0;
    let mut pos: Width = 0;
    let mut frames = push(0, doc.clone(), None);
    loop {
        let frame = match frames {
            Some(frame) => frame,
            None => return widest,
        };
        let indent = frame.indent;
        let rest = frame.rest.clone();
        match frame.doc.node() {
            DocNode::Empty => frames = rest,
            DocNode::Concat(a, b) => {
                frames = push(indent, a.clone(), push(indent, b.clone(), rest));
            }
            DocNode::Nest(j, inner) => frames = push(indent + j, inner.clone(), rest),
            DocNode::Text(_, w) => {
                pos = pos.saturating_add(*w);
                frames = rest;
            }
            DocNode::Line => {
                pos = indent;
                frames = rest;
            }
            DocNode::Union(flat, _) => {
                let probe = push(indent, flat.clone(), rest);
                widest = widest.max(min_fit_width(pos, probe.clone()));
                frames = probe;
            }
        }
    }
}
