use crate::doc::{cat, Doc, DocNode, LazyDoc};
use crate::geometry::Width;
use once_cell::sync::Lazy;

static EMPTY: Lazy<Doc> = Lazy::new(|| Doc::new(DocNode::Empty));
static LINE: Lazy<Doc> = Lazy::new(|| Doc::new(DocNode::Line));
static COMMA: Lazy<Doc> = Lazy::new(|| Doc::fragment(","));
static SPACE_OR_LINE: Lazy<Doc> =
    Lazy::new(|| Doc::new(DocNode::Union(space(), LazyDoc::new(line))));

const SPACE_TABLE_SIZE: usize = 20;

/// Shared all-space fragments for the common small indentations.
static SPACE_TABLE: Lazy<Vec<Doc>> = Lazy::new(|| {
    (1..=SPACE_TABLE_SIZE)
        .map(|n| Doc::fragment(&" ".repeat(n)))
        .collect()
});

/// The zero-width, zero-line document.
pub fn empty() -> Doc {
    EMPTY.clone()
}

/// A hard newline, indented to the ambient indentation.
pub fn line() -> Doc {
    LINE.clone()
}

/// A single space.
pub fn space() -> Doc {
    spaces(1)
}

/// A literal comma.
pub fn comma() -> Doc {
    COMMA.clone()
}

/// A space, or a newline when the enclosing group does not fit flat.
pub fn space_or_line() -> Doc {
    SPACE_OR_LINE.clone()
}

/// `count` spaces; non-positive counts give the empty document.
pub fn spaces(count: Width) -> Doc {
    if count <= 0 {
        empty()
    } else if (count as usize) <= SPACE_TABLE_SIZE {
        SPACE_TABLE[count as usize - 1].clone()
    } else {
        Doc::fragment(&" ".repeat(count as usize))
    }
}

/// A literal document. Embedded newlines become hard [`line`]s; everything
/// else, including control characters, is kept verbatim.
pub fn text(s: &str) -> Doc {
    if s.is_empty() {
        return empty();
    }
    if s == " " {
        return space();
    }
    if !s.contains('\n') {
        return Doc::fragment(s);
    }
    // Parse right to left so the result is right-associated.
    let mut pieces = s.split('\n').rev();
    let mut doc = fragment_or_empty(pieces.next().unwrap());
    for piece in pieces {
        doc = cat(fragment_or_empty(piece), cat(line(), doc));
    }
    doc
}

fn fragment_or_empty(s: &str) -> Doc {
    if s.is_empty() {
        empty()
    } else {
        Doc::fragment(s)
    }
}

/// Right-fold a sequence of documents with `f`; the empty sequence gives
/// the empty document.
pub fn fold_docs<I, F>(docs: I, f: F) -> Doc
where
    I: IntoIterator<Item = Doc>,
    F: Fn(Doc, Doc) -> Doc,
{
    let mut docs: Vec<Doc> = docs.into_iter().collect();
    let last = match docs.pop() {
        Some(last) => last,
        None => return empty(),
    };
    docs.into_iter().rev().fold(last, |acc, doc| f(doc, acc))
}

/// Join documents with `sep` between each adjacent pair.
pub fn intercalate<I>(sep: Doc, docs: I) -> Doc
where
    I: IntoIterator<Item = Doc>,
{
    fold_docs(docs, |a, b| a + sep.clone() + b)
}

/// Join documents with single spaces.
pub fn spread<I: IntoIterator<Item = Doc>>(docs: I) -> Doc {
    intercalate(space(), docs)
}

/// Join documents with hard newlines.
pub fn stack<I: IntoIterator<Item = Doc>>(docs: I) -> Doc {
    intercalate(line(), docs)
}

/// Join documents with `sep` and a space-or-newline, deciding each gap
/// independently: a gap rendered as a space keeps the following items
/// eligible for flat placement, while a gap rendered as a newline commits
/// to a break at that point.
///
/// The alternatives built here satisfy only the weak form of the union
/// invariant (both branches share a flattening), so [`Doc::is_sub_doc_of`]
/// and the document ordering may be less precise on `fill`ed documents than
/// on [`Doc::grouped`] ones. Rendering is unaffected.
pub fn fill<I>(sep: Doc, docs: I) -> Doc
where
    I: IntoIterator<Item = Doc>,
{
    let mut docs: Vec<Doc> = docs.into_iter().collect();
    let last = match docs.pop() {
        Some(last) => last,
        None => return empty(),
    };
    // Built back to front, carrying the joined suffix in two forms: as-is,
    // and with its first element flattened. Sharing the suffixes keeps the
    // construction linear where the textbook recursion is exponential.
    let mut joined = last.clone();
    let mut flat_joined = last.flatten();
    for head in docs.into_iter().rev() {
        let flat_head = head.flatten();
        let next = fill_step(&sep, head, joined.clone(), flat_joined.clone());
        let flat_next = fill_step(&sep, flat_head, joined, flat_joined);
        joined = next;
        flat_joined = flat_next;
    }
    joined
}

/// One `fill` gap: either `head + sep`, a space, and the flat-headed
/// suffix, or `head + sep`, a newline, and the suffix unchanged.
fn fill_step(sep: &Doc, head: Doc, joined: Doc, flat_joined: Doc) -> Doc {
    let lead = head + sep.clone();
    let first_head = lead.flatten_option().unwrap_or_else(|| lead.clone());
    let first = first_head.space(flat_joined);
    let second = LazyDoc::new(move || lead / joined);
    Doc::new(DocNode::Union(first, second))
}
