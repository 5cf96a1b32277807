use crate::doc::{Doc, DocNode};
use crate::geometry::Width;
use once_cell::sync::Lazy;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// An atomic unit of rendered output.
///
/// Concatenating the canonical form of every chunk — `Str(s)` contributes
/// `s`, `Break(k)` contributes a newline and `k` spaces — reproduces
/// [`Doc::render`] exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// A text fragment placed on the current line.
    Str(Arc<str>),
    /// A newline followed by the given number of spaces of indentation.
    Break(Width),
}

const INDENT_TABLE_SIZE: usize = 16;

/// Shared indentation strings for the common small depths.
static INDENT_TABLE: Lazy<Vec<String>> =
    Lazy::new(|| (0..=INDENT_TABLE_SIZE).map(|n| " ".repeat(n)).collect());

impl Chunk {
    /// Write this chunk's canonical form into `out`.
    pub fn write_into<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Chunk::Str(s) => out.write_str(s),
            Chunk::Break(indent) => {
                out.write_char('\n')?;
                let mut remaining = (*indent).max(0) as usize;
                while remaining > INDENT_TABLE_SIZE {
                    out.write_str(&INDENT_TABLE[INDENT_TABLE_SIZE])?;
                    remaining -= INDENT_TABLE_SIZE;
                }
                out.write_str(&INDENT_TABLE[remaining])
            }
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_into(f)
    }
}

/// The engine's work stack: a persistent list of pending documents with
/// their indentation, shared between the committed walk and `fits` probes.
pub(crate) type Frames = Option<Rc<Frame>>;

pub(crate) struct Frame {
    pub(crate) indent: Width,
    pub(crate) doc: Doc,
    pub(crate) rest: Frames,
}

pub(crate) fn push(indent: Width, doc: Doc, rest: Frames) -> Frames {
    Some(Rc::new(Frame { indent, doc, rest }))
}

/// The streaming best-layout engine: a lazy sequence of [`Chunk`]s for one
/// width. Nothing past the demanded chunk is computed.
pub struct Chunks {
    width: Width,
    pos: Width,
    frames: Frames,
}

pub(crate) fn chunks(doc: &Doc, width: Width) -> Chunks {
    Chunks {
        // A negative width admits nothing, exactly like width 0.
        width: width.max(0),
        pos: 0,
        frames: push(0, doc.clone(), None),
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        loop {
            let frame = self.frames.take()?;
            let indent = frame.indent;
            let rest = frame.rest.clone();
            match frame.doc.node() {
                DocNode::Empty => self.frames = rest,
                DocNode::Concat(a, b) => {
                    self.frames = push(indent, a.clone(), push(indent, b.clone(), rest));
                }
                DocNode::Nest(j, inner) => {
                    self.frames = push(indent + j, inner.clone(), rest);
                }
                DocNode::Text(s, w) => {
                    self.pos = self.pos.saturating_add(*w);
                    self.frames = rest;
                    return Some(Chunk::Str(s.clone()));
                }
                DocNode::Line => {
                    self.pos = indent;
                    self.frames = rest;
                    return Some(Chunk::Break(indent));
                }
                DocNode::Union(flat, expanded) => {
                    let probe = push(indent, flat.clone(), rest.clone());
                    if fits(self.width, self.pos, probe.clone()) {
                        self.frames = probe;
                    } else {
                        self.frames = push(indent, expanded.force().clone(), rest);
                    }
                }
            }
        }
    }
}

/// The one-line lookahead: true iff the pending layout stays within `width`
/// up to and including its next hard break. A union met on the way resolves
/// to its expanded branch, which reaches a newline no later than its flat
/// form, so the whole predicate is one loop; recursing per union instead
/// would grow the native stack with every pending gap of a long `fill`.
fn fits(width: Width, mut pos: Width, mut frames: Frames) -> bool {
    loop {
        if pos > width {
            return false;
        }
        let frame = match frames {
            Some(frame) => frame,
            None => return true,
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
            DocNode::Line => return true,
            DocNode::Union(_, expanded) => {
                frames = push(indent, expanded.force().clone(), rest);
            }
        }
    }
}

pub(crate) fn render(doc: &Doc, width: Width) -> String {
    let mut out = String::new();
    for chunk in chunks(doc, width) {
        match &chunk {
            Chunk::Str(s) => out.push_str(s),
            Chunk::Break(indent) => {
                out.push('\n');
                for _ in 0..*indent {
                    out.push(' ');
                }
            }
        }
    }
    out
}

pub(crate) fn write_to<W: fmt::Write>(doc: &Doc, width: Width, out: &mut W) -> fmt::Result {
    for chunk in chunks(doc, width) {
        chunk.write_into(out)?;
    }
    Ok(())
}

/// A lazy sequence of rendered fragments; its concatenation equals
/// [`Doc::render`] at the same width.
pub struct RenderStream(Chunks);

pub(crate) fn render_stream(doc: &Doc, width: Width) -> RenderStream {
    RenderStream(chunks(doc, width))
}

impl Iterator for RenderStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.0.next().map(|chunk| chunk.to_string())
    }
}

const HASH_SEED: u32 = 0xdead_60d5;
const HASH_MULTIPLIER: u32 = 1_500_450_271;

/// A stable 32-bit hash of the infinite-width rendering. Computed from the
/// chunk stream rather than the structure, so structurally distinct but
/// semantically equal documents hash alike.
pub(crate) fn rendered_hash(doc: &Doc) -> u32 {
    let mut hash = HASH_SEED;
    let mut mix = |c: char| hash = hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(c as u32);
    for chunk in chunks(doc, Width::MAX) {
        match chunk {
            Chunk::Str(s) => s.chars().for_each(&mut mix),
            Chunk::Break(indent) => {
                mix('\n');
                for _ in 0..indent {
                    mix(' ');
                }
            }
        }
    }
    hash
}
