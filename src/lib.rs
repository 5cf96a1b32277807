//! A pretty printing library built on a small algebraic document language,
//! in the lineage of Wadler's
//! [prettier printer](http://homepages.inf.ed.ac.uk/wadler/papers/prettier/prettier.pdf)
//! and Leijen's extensions.
//!
//! You build a [`Doc`] out of constants and combinators. A `Doc` does not
//! describe one layout but a whole set of them: wherever you call
//! [`Doc::grouped`] (or use [`fill`]), the document records both a
//! single-line and a multi-line alternative. [`Doc::render`] then picks the
//! best layout for a target line width, committing to a flat alternative
//! exactly when everything up to the next newline fits. The choice space
//! can be exponential, but rendering stays near-linear because each choice
//! looks ahead only one line.
//!
//! # Quick Reference
//!
//! - Build: [`text`], [`line`], [`space`], [`spaces`], [`comma`],
//!   [`space_or_line`], the `+` and `/` operators, [`Doc::nest`],
//!   [`Doc::grouped`], [`Doc::bracket_by`], [`Doc::repeat`].
//! - Join sequences: [`intercalate`], [`spread`], [`stack`], [`fill`],
//!   [`fold_docs`].
//! - Lay out: [`Doc::render`], [`Doc::write_to`], [`Doc::render_stream`],
//!   [`Doc::chunks`].
//! - Inspect: [`Doc::is_empty`], [`Doc::max_width`], [`Doc::flatten`],
//!   [`Doc::flatten_option`], [`Doc::is_sub_doc_of`], [`Doc::deunioned`],
//!   and the `Ord` instance on `Doc`.
//!
//! # Usage
//!
//! ```
//! use pretty_doc::{line, text};
//!
//! let doc = (text("lorem") + line() + text("ipsum")).grouped();
//! assert_eq!(doc.render(80), "lorem ipsum");
//! assert_eq!(doc.render(6), "lorem\nipsum");
//! ```
//!
//! Indentation applies to the newlines inside a [`Doc::nest`]:
//!
//! ```
//! use pretty_doc::{intercalate, comma, line, text};
//!
//! let items = vec![text("1"), text("2"), text("3")];
//! let list = (text("[") + (line() + intercalate(comma() + line(), items)).nest(2))
//!     + (line() + text("]"));
//! assert_eq!(list.render(80), "[\n  1,\n  2,\n  3\n]");
//! ```
//!
//! # Semantics
//!
//! The meaning of a document is its *rendering set*: the set of strings it
//! renders to across all widths. `PartialEq`, `Ord`, and `Hash` on [`Doc`]
//! all follow that meaning, not the structure, so two documents that render
//! alike at every width are equal, and equal documents hash alike.
//!
//! One caveat: the alternatives built by [`fill`] pair layouts that only
//! agree after flattening, and the semantic queries ([`Doc::is_sub_doc_of`]
//! and the ordering) may be less precise on such documents. Rendering is
//! unaffected; see [`fill`] for details.
//!
//! Width is measured in code units (Unicode scalar values), not display
//! columns, and a single fragment wider than the target width is emitted
//! unbroken. Every operation in the crate is total: negative widths,
//! counts, and indents are treated as zero, and `text` accepts any string.

mod constructors;
mod doc;
mod doc_tree;
mod flatten;
mod geometry;
mod measure;
mod oracle;
mod render;
mod tree_ops;

pub use constructors::{
    comma, empty, fill, fold_docs, intercalate, line, space, space_or_line, spaces, spread, stack,
    text,
};
pub use doc::Doc;
pub use geometry::Width;
pub use render::{Chunk, Chunks, RenderStream};
pub use tree_ops::Deunioned;

pub mod testing {
    //! A slow reference renderer for cross-checking the streaming engine.
    pub use crate::oracle::oracular_render;
}
