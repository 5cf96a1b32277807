use crate::doc::{Doc, DocNode};
use crate::geometry::Width;
use crate::measure::min_fit_width;
use crate::render::{push, Chunk, Frames};
use std::rc::Rc;

/// A width-indexed decision tree: the lazy stream of chunks a document can
/// produce, with every union reified as a [`TreeStep::Branch`] between the
/// flat-side subtree and its fallback. This is the substrate for the
/// subdocument test, set difference, and the document ordering.
///
/// Tails and branch sides are recomputed on demand rather than memoized;
/// queries that stop early never pay for the rest of the tree.
#[derive(Clone)]
pub(crate) struct DocTree(Rc<dyn Fn() -> TreeStep>);

#[derive(Clone)]
pub(crate) enum TreeStep {
    Done,
    Chunk(Chunk, DocTree),
    /// The left subtree is taken when the width admits the flat
    /// alternative; the right is the fallback.
    Branch(DocTree, DocTree),
}

impl DocTree {
    pub(crate) fn new(thunk: impl Fn() -> TreeStep + 'static) -> DocTree {
        DocTree(Rc::new(thunk))
    }

    pub(crate) fn step(&self) -> TreeStep {
        (self.0)()
    }

    /// A tree whose stream starts with `chunk`.
    pub(crate) fn cons(chunk: Chunk, rest: DocTree) -> DocTree {
        DocTree::new(move || TreeStep::Chunk(chunk.clone(), rest.clone()))
    }

    pub(crate) fn branch(left: DocTree, right: DocTree) -> DocTree {
        DocTree::new(move || TreeStep::Branch(left.clone(), right.clone()))
    }
}

/// The half-open interval of widths `[min, max)` still consistent with the
/// branch decisions taken so far. `Width::MAX` stands in for no bound.
#[derive(Clone, Copy)]
struct Bounds {
    min: Width,
    max: Width,
}

impl Bounds {
    fn contains(self, width: Width) -> bool {
        self.min <= width && width < self.max
    }
}

pub(crate) fn to_doc_tree(doc: &Doc) -> DocTree {
    let frames = push(0, doc.clone(), None);
    tree(
        Bounds {
            min: 0,
            max: Width::MAX,
        },
        0,
        frames,
    )
}

fn tree(bounds: Bounds, pos: Width, frames: Frames) -> DocTree {
    DocTree::new(move || unfold(bounds, pos, frames.clone()))
}

/// Replay the layout walk under `bounds`. A union only becomes a branch
/// when the width it needs to go flat falls inside the bounds; otherwise
/// the decision is forced and the walk continues down the decided side.
fn unfold(bounds: Bounds, mut pos: Width, mut frames: Frames) -> TreeStep {
    loop {
        let frame = match frames {
            Some(frame) => frame,
            None => return TreeStep::Done,
        };
        let indent = frame.indent;
        let rest = frame.rest.clone();
        match frame.doc.node() {
            DocNode::Empty => frames = rest,
            DocNode::Concat(a, b) => {
                frames = push(indent, a.clone(), push(indent, b.clone(), rest));
            }
            DocNode::Nest(j, inner) => frames = push(indent + j, inner.clone(), rest),
            DocNode::Text(s, w) => {
                let after = pos.saturating_add(*w);
                return TreeStep::Chunk(Chunk::Str(s.clone()), tree(bounds, after, rest));
            }
            DocNode::Line => {
                return TreeStep::Chunk(Chunk::Break(indent), tree(bounds, indent, rest));
            }
            DocNode::Union(flat, expanded) => {
                let probe = push(indent, flat.clone(), rest.clone());
                let needed = min_fit_width(pos, probe.clone());
                if bounds.min >= needed {
                    // Every width in range takes the flat branch.
                    frames = probe;
                } else if !bounds.contains(needed) {
                    // No width in range reaches the flat branch.
                    frames = push(indent, expanded.force().clone(), rest);
                } else {
                    let left = tree(
                        Bounds {
                            min: needed,
                            max: bounds.max,
                        },
                        pos,
                        probe,
                    );
                    let right_bounds = Bounds {
                        min: bounds.min,
                        max: needed,
                    };
                    let expanded = expanded.clone();
                    let right = DocTree::new(move || {
                        let frames = push(indent, expanded.force().clone(), rest.clone());
                        unfold(right_bounds, pos, frames)
                    });
                    return TreeStep::Branch(left, right);
                }
            }
        }
    }
}
