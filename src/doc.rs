use crate::constructors;
use crate::doc_tree::to_doc_tree;
use crate::flatten;
use crate::geometry::{str_width, Width};
use crate::measure;
use crate::render::{self, Chunks, RenderStream};
use crate::tree_ops::{self, Deunioned};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Add, Div};
use std::sync::Arc;

/// An immutable document: a set of possible renderings, one per line width.
///
/// Documents are built with the constructors in the crate root ([`text`],
/// [`line`], [`spaces`], ...), combined with `+` (horizontal composition)
/// and `/` (vertical composition), and laid out with [`Doc::render`].
/// Cloning is cheap; the structure is shared.
///
/// [`text`]: crate::text
/// [`line`]: crate::line
/// [`spaces`]: crate::spaces
#[derive(Clone)]
pub struct Doc(pub(crate) Arc<DocNode>);

/// The document algebra. Kept private so the constructors can maintain
/// their invariants: `Text` is non-empty and newline-free, `Concat` is
/// right-associated, and the left side of a `Union` is the flattened form
/// of the right (`fill` alone weakens this, see [`crate::fill`]).
pub(crate) enum DocNode {
    Empty,
    /// A hard newline followed by the ambient indentation.
    Line,
    /// A literal fragment with its cached width.
    Text(Arc<str>, Width),
    /// Adds to the ambient indentation of every `Line` inside.
    Nest(Width, Doc),
    Concat(Doc, Doc),
    /// Two alternative renderings: the flat candidate, then the expanded
    /// fallback. The fallback is forced at most once.
    Union(Doc, LazyDoc),
}

type Thunk = Box<dyn FnOnce() -> Doc + Send>;

/// A memoizing thunk holding the expanded branch of a `Union`. Every clone
/// shares the same cell, so all observers see the same document, and the
/// first observation may safely race.
#[derive(Clone)]
pub(crate) struct LazyDoc(Arc<Lazy<Doc, Thunk>>);

impl LazyDoc {
    pub(crate) fn new(f: impl FnOnce() -> Doc + Send + 'static) -> LazyDoc {
        LazyDoc(Arc::new(Lazy::new(Box::new(f))))
    }

    pub(crate) fn force(&self) -> &Doc {
        Lazy::force(&self.0)
    }

    /// Steal the memoized document if this is the last handle and the thunk
    /// has already run. Used by the iterative drop below.
    fn take_forced(&mut self) -> Option<Doc> {
        let lazy = Arc::get_mut(&mut self.0)?;
        let doc = Lazy::get_mut(lazy)?;
        Some(mem::replace(doc, constructors::empty()))
    }
}

impl fmt::Debug for LazyDoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Lazy::get(&self.0) {
            Some(doc) => fmt::Debug::fmt(doc, f),
            None => f.write_str("<delayed>"),
        }
    }
}

impl Doc {
    pub(crate) fn new(node: DocNode) -> Doc {
        Doc(Arc::new(node))
    }

    pub(crate) fn node(&self) -> &DocNode {
        &self.0
    }

    /// A single-line, non-empty literal.
    pub(crate) fn fragment(s: &str) -> Doc {
        Doc::fragment_shared(Arc::from(s))
    }

    pub(crate) fn fragment_shared(s: Arc<str>) -> Doc {
        debug_assert!(!s.is_empty() && !s.contains('\n'));
        let width = str_width(&s);
        Doc::new(DocNode::Text(s, width))
    }

    pub(crate) fn is_empty_node(&self) -> bool {
        matches!(self.node(), DocNode::Empty)
    }

    /// True iff every rendering of this document is the empty string.
    pub fn is_empty(&self) -> bool {
        let mut stack = vec![self];
        while let Some(doc) = stack.pop() {
            match doc.node() {
                DocNode::Empty => {}
                DocNode::Line | DocNode::Text(..) => return false,
                DocNode::Nest(_, inner) => stack.push(inner),
                DocNode::Concat(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
                // Flattening preserves emptiness, so the flat branch decides
                // for both.
                DocNode::Union(a, _) => stack.push(a),
            }
        }
        true
    }

    /// Indent every `line` inside this document by `indent` further spaces.
    /// Non-positive amounts leave the document unchanged.
    pub fn nest(&self, indent: Width) -> Doc {
        if indent <= 0 {
            return self.clone();
        }
        match self.node() {
            DocNode::Nest(j, inner) => Doc::new(DocNode::Nest(indent + j, inner.clone())),
            _ => Doc::new(DocNode::Nest(indent, self.clone())),
        }
    }

    /// Offer the single-line form of this document as an alternative, to be
    /// taken when it fits in the available width. Documents that are already
    /// flat are returned unchanged.
    pub fn grouped(&self) -> Doc {
        match self.flatten_option() {
            Some(flat) => {
                let expanded = self.clone();
                Doc::new(DocNode::Union(flat, LazyDoc::new(move || expanded)))
            }
            None => self.clone(),
        }
    }

    /// `self`, a space, then `other`.
    pub fn space(&self, other: Doc) -> Doc {
        self.clone() + constructors::space() + other
    }

    /// `self` and `other` separated by a space when grouped flat, or by a
    /// newline otherwise.
    pub fn space_or_line(&self, other: Doc) -> Doc {
        self.clone() + constructors::space_or_line() + other
    }

    /// `count` copies of this document in a row. Non-positive counts give
    /// the empty document. Built by doubling, so the copies share structure.
    pub fn repeat(&self, count: Width) -> Doc {
        fn doubled(doc: &Doc, count: Width) -> Doc {
            if count == 1 {
                return doc.clone();
            }
            let half = doubled(doc, count / 2);
            let pair = half.clone() + half;
            if count % 2 == 1 {
                doc.clone() + pair
            } else {
                pair
            }
        }
        if count <= 0 {
            constructors::empty()
        } else {
            doubled(self, count)
        }
    }

    /// Surround with `left` and `right`, either on one line with spaces or
    /// broken across lines with the contents indented by `indent`.
    pub fn bracket_by(&self, left: Doc, right: Doc, indent: Width) -> Doc {
        (left + (constructors::line() + self.clone()).nest(indent) + (constructors::line() + right))
            .grouped()
    }

    /// The single-line form: newlines become spaces, indentation is
    /// stripped, and every union resolves to its flat branch.
    pub fn flatten(&self) -> Doc {
        flatten::flatten(self)
    }

    /// The single-line form, or `None` when this document is already flat.
    /// Collapsing a union counts as a change even when its flat branch is
    /// returned unmodified.
    pub fn flatten_option(&self) -> Option<Doc> {
        flatten::flatten_option(self)
    }

    /// Lay the document out at the given width.
    ///
    /// The layout never exceeds `width` unless a single fragment is itself
    /// too wide; such fragments are emitted unbroken. Negative widths render
    /// as width 0.
    pub fn render(&self, width: Width) -> String {
        render::render(self, width)
    }

    /// Stream the rendering into `out` instead of building a `String`.
    pub fn write_to<W: fmt::Write>(&self, width: Width, out: &mut W) -> fmt::Result {
        render::write_to(self, width, out)
    }

    /// A lazy sequence of rendered fragments whose concatenation equals
    /// [`Doc::render`] at the same width.
    pub fn render_stream(&self, width: Width) -> RenderStream {
        render::render_stream(self, width)
    }

    /// The raw output stream: text fragments and indented breaks.
    pub fn chunks(&self, width: Width) -> Chunks {
        render::chunks(self, width)
    }

    /// The smallest width beyond which rendering no longer changes:
    /// `render(w)` is the same for every `w >= max_width()`. Documents
    /// without layout choices report 0.
    pub fn max_width(&self) -> Width {
        measure::max_width(self)
    }

    /// True iff every rendering of `self` is also a rendering of `other`.
    pub fn is_sub_doc_of(&self, other: &Doc) -> bool {
        tree_ops::is_sub_doc(&to_doc_tree(self), &to_doc_tree(other))
    }

    /// All union-free documents with renderings drawn from this document's
    /// rendering set, widest layout first.
    pub fn deunioned(&self) -> Deunioned {
        tree_ops::deunioned(self)
    }
}

impl Add for Doc {
    type Output = Doc;

    /// Horizontal composition. `Concat` is kept right-associated, so the
    /// left operand's spine is unrolled onto the right operand.
    fn add(self, other: Doc) -> Doc {
        let mut spine = Vec::new();
        let mut head = self;
        loop {
            let tail = match head.node() {
                DocNode::Concat(a, b) => {
                    spine.push(a.clone());
                    b.clone()
                }
                _ => break,
            };
            head = tail;
        }
        spine.push(head);
        let mut doc = other;
        for part in spine.into_iter().rev() {
            doc = Doc::new(DocNode::Concat(part, doc));
        }
        doc
    }
}

impl Div for Doc {
    type Output = Doc;

    /// Vertical composition: `a / b` is `a + line() + b`.
    fn div(self, other: Doc) -> Doc {
        self + constructors::line() + other
    }
}

/// Concatenation that treats `Empty` as the identity. The left operand must
/// not be a `Concat`, so the result stays right-associated.
pub(crate) fn cat(a: Doc, b: Doc) -> Doc {
    debug_assert!(!matches!(a.node(), DocNode::Concat(..)));
    if a.is_empty_node() {
        b
    } else if b.is_empty_node() {
        a
    } else {
        Doc::new(DocNode::Concat(a, b))
    }
}

impl Default for Doc {
    fn default() -> Doc {
        constructors::empty()
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}

impl fmt::Debug for DocNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocNode::Empty => f.write_str("Empty"),
            DocNode::Line => f.write_str("Line"),
            DocNode::Text(s, _) => write!(f, "Text({:?})", s),
            DocNode::Nest(indent, inner) => write!(f, "Nest({}, {:?})", indent, inner),
            DocNode::Concat(a, b) => write!(f, "Concat({:?}, {:?})", a, b),
            DocNode::Union(a, b) => write!(f, "Union({:?}, {:?})", a, b),
        }
    }
}

impl PartialEq for Doc {
    /// Semantic equality: two documents are equal when their rendering sets
    /// are equal, regardless of structure.
    fn eq(&self, other: &Doc) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Doc {}

impl PartialOrd for Doc {
    fn partial_cmp(&self, other: &Doc) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Doc {
    /// A total order over rendering sets. Renderings are compared in
    /// widest-first order; within a rendering, a newline sorts after any
    /// text, which departs from the ASCII order of `'\n'`.
    fn cmp(&self, other: &Doc) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        tree_ops::compare_tree(&to_doc_tree(self), &to_doc_tree(other))
    }
}

impl Hash for Doc {
    /// Hashes the infinite-width rendering, so semantically equal documents
    /// hash alike.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(render::rendered_hash(self));
    }
}

impl Drop for DocNode {
    /// Frees long spines iteratively; the derived drop would recurse once
    /// per node and exhaust the stack on documents ~10^5 deep.
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut doc) = stack.pop() {
            if let Some(node) = Arc::get_mut(&mut doc.0) {
                node.take_children(&mut stack);
            }
        }
    }
}

impl DocNode {
    fn take_children(&mut self, stack: &mut Vec<Doc>) {
        match self {
            DocNode::Empty | DocNode::Line | DocNode::Text(..) => {}
            DocNode::Nest(_, inner) => stack.push(mem::replace(inner, constructors::empty())),
            DocNode::Concat(a, b) => {
                stack.push(mem::replace(a, constructors::empty()));
                stack.push(mem::replace(b, constructors::empty()));
            }
            DocNode::Union(a, b) => {
                stack.push(mem::replace(a, constructors::empty()));
                if let Some(forced) = b.take_forced() {
                    stack.push(forced);
                }
            }
        }
    }
}
