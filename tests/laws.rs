mod common;

use common::DocGen;
use pretty_doc::{empty, text, Chunk, Doc, Width};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const WIDTHS: [Width; 7] = [0, 1, 2, 3, 6, 12, 80];

fn sample_docs() -> Vec<Doc> {
    let mut gen = DocGen::new([17; 32]);
    let mut docs = gen.docs(150, 6);
    docs.extend(gen.docs(100, 12));
    docs.extend(gen.docs(40, 25));
    docs
}

fn hash_of(doc: &Doc) -> u64 {
    let mut hasher = DefaultHasher::new();
    doc.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn concat_is_right_associated() {
    // Force the shared space-or-line thunk up front; its debug form changes
    // once forced, and other tests may force it concurrently.
    pretty_doc::space_or_line().render(0);
    let mut gen = DocGen::new([3; 32]);
    for _ in 0..200 {
        let a = gen.doc(4);
        let b = gen.doc(4);
        let c = gen.doc(4);
        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);
        assert_eq!(format!("{:?}", left), format!("{:?}", right));
    }
}

#[test]
fn empty_is_the_identity_of_concat() {
    for doc in sample_docs() {
        for width in WIDTHS {
            let expected = doc.render(width);
            assert_eq!((empty() + doc.clone()).render(width), expected);
            assert_eq!((doc.clone() + empty()).render(width), expected);
        }
    }
}

#[test]
fn break_count_never_increases_with_width() {
    // Holds for hierarchically nested groups and uniform fills; independent
    // side-by-side groups can trade an early break for later ones under the
    // one-line lookahead.
    let inner = (text("aa") + pretty_doc::line() + text("bb")).grouped();
    let nested = (text("x") + pretty_doc::line() + inner).grouped();
    let filled = pretty_doc::fill(
        pretty_doc::comma(),
        vec![text("1"), text("2"), text("3"), text("4")],
    );
    let bracketed = (text("x") + pretty_doc::line() + text("y")).bracket_by(
        text("{"),
        text("}"),
        2,
    );
    for doc in [nested, filled, bracketed] {
        let mut previous = usize::MAX;
        for width in 0..=20 {
            let breaks = doc
                .chunks(width)
                .filter(|chunk| matches!(chunk, Chunk::Break(_)))
                .count();
            assert!(
                breaks <= previous,
                "break count grew from {} to {} at width {} for {:?}",
                previous,
                breaks,
                width,
                doc
            );
            previous = breaks;
        }
    }
}

#[test]
fn flatten_is_a_fixpoint_without_breaks() {
    for doc in sample_docs() {
        let flat = doc.flatten();
        assert_eq!(
            format!("{:?}", flat),
            format!("{:?}", flat.flatten()),
            "flattening twice must equal flattening once"
        );
        assert!(flat.flatten_option().is_none());
        // The flat form renders on one line, identically at every width.
        let at_zero = flat.render(0);
        assert!(!at_zero.contains('\n'));
        for width in WIDTHS {
            assert_eq!(flat.render(width), at_zero);
        }
        assert!(!flat
            .chunks(0)
            .any(|chunk| matches!(chunk, Chunk::Break(_))));
    }
}

#[test]
fn renderings_are_stable_beyond_max_width() {
    for doc in sample_docs() {
        let max = doc.max_width();
        assert!(max >= 0);
        let settled = doc.render(max);
        for width in [max, max + 1, max + 2, max + 17, Width::MAX] {
            assert_eq!(doc.render(width), settled, "width {} for {:?}", width, doc);
        }
    }
}

#[test]
fn nesting_is_additive() {
    for doc in sample_docs().into_iter().take(120) {
        let twice = doc.nest(2).nest(3);
        let once = doc.nest(5);
        for width in WIDTHS {
            assert_eq!(twice.render(width), once.render(width));
        }
    }
}

#[test]
fn is_empty_agrees_with_rendering() {
    for doc in sample_docs() {
        let blank = doc.is_empty();
        for width in WIDTHS {
            assert_eq!(blank, doc.render(width).is_empty(), "for {:?}", doc);
        }
    }
}

#[test]
fn grouping_is_idempotent() {
    for doc in sample_docs().into_iter().take(100) {
        let once = doc.grouped();
        let twice = once.grouped();
        for width in WIDTHS {
            assert_eq!(once.render(width), twice.render(width));
        }
        assert_eq!(once, twice);
    }
}

#[test]
fn subdocument_is_reflexive() {
    for doc in sample_docs().into_iter().take(100) {
        assert!(doc.is_sub_doc_of(&doc));
    }
}

#[test]
fn flat_form_is_a_subdocument_of_the_group() {
    for doc in sample_docs().into_iter().take(100) {
        let flat = doc.flatten();
        let grouped = doc.grouped();
        assert!(flat.is_sub_doc_of(&grouped), "for {:?}", doc);
        // And subdocument-ness survives regrouping, giving a transitive
        // chain flat <= grouped <= grouped.grouped().
        assert!(grouped.is_sub_doc_of(&grouped.grouped()));
        assert!(flat.is_sub_doc_of(&grouped.grouped()), "for {:?}", doc);
    }
}

#[test]
fn ordering_agrees_with_mutual_subdocuments() {
    let mut gen = DocGen::new([41; 32]);
    for _ in 0..60 {
        let a = gen.doc(8);
        let b = gen.doc(8);
        let equal = a.cmp(&b) == std::cmp::Ordering::Equal;
        let mutual = a.is_sub_doc_of(&b) && b.is_sub_doc_of(&a);
        assert_eq!(equal, mutual, "for {:?} and {:?}", a, b);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }
}

#[test]
fn semantically_equal_documents_are_equal_and_hash_alike() {
    for doc in sample_docs().into_iter().take(100) {
        let padded = doc.clone() + empty();
        assert_eq!(doc, padded);
        assert_eq!(hash_of(&doc), hash_of(&padded));
        let renested = doc.nest(0);
        assert_eq!(doc, renested);
        assert_eq!(hash_of(&doc), hash_of(&renested));
    }
}

#[test]
fn sorting_by_the_ordering_is_consistent() {
    let mut gen = DocGen::new([99; 32]);
    let mut docs = gen.docs(24, 7);
    docs.sort();
    for window in docs.windows(2) {
        assert_ne!(window[0].cmp(&window[1]), std::cmp::Ordering::Greater);
    }
    // Spot-check transitivity across the sorted sequence.
    for i in 0..docs.len() {
        for j in i..docs.len() {
            assert_ne!(docs[i].cmp(&docs[j]), std::cmp::Ordering::Greater);
        }
    }
}

#[test]
fn wide_enough_groups_render_flat() {
    for doc in sample_docs().into_iter().take(100) {
        let grouped = doc.grouped();
        let flat = doc.flatten();
        let max = grouped.max_width();
        for width in [max, max + 1, max + 40] {
            assert_eq!(grouped.render(width), flat.render(width), "for {:?}", doc);
        }
    }
}

#[test]
fn documents_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Doc>();
}

#[test]
fn deep_concat_spines_do_not_exhaust_the_stack() {
    const DEPTH: usize = 100_000;
    let mut doc = empty();
    for _ in 0..DEPTH {
        doc = text("a") + doc;
    }
    assert_eq!(doc.render(80).len(), DEPTH);
    assert!(!doc.is_empty());
    assert_eq!(doc.max_width(), 0);
    let flat = doc.flatten();
    assert_eq!(flat.render(0).len(), DEPTH);
    drop(flat);
    drop(doc);
}

#[test]
fn long_fills_render_without_exhausting_the_stack() {
    // One layout choice per gap; both the probes and the commits must stay
    // on the heap.
    const ITEMS: usize = 100_000;
    let items: Vec<Doc> = (0..ITEMS).map(|_| text("it")).collect();
    let doc = pretty_doc::fill(pretty_doc::comma(), items);
    let narrow = doc.render(0);
    assert_eq!(narrow.lines().count(), ITEMS);
    let wide = doc.render(Width::MAX);
    assert_eq!(wide, narrow.replace('\n', " "));
}

#[test]
fn deep_layout_choice_chains_do_not_exhaust_the_stack() {
    // A fill this long puts one choice point behind every gap; ordering and
    // the subdocument test must keep their pending work on the heap.
    const ITEMS: usize = 100_000;
    let filled = |last: &str| -> Doc {
        let mut items: Vec<Doc> = (0..ITEMS - 1).map(|_| text("it")).collect();
        items.push(text(last));
        pretty_doc::fill(pretty_doc::comma(), items)
    };
    let doc = filled("it");
    let other = filled("xx");
    // The first difference sits at the far end of the widest layout.
    assert_eq!(doc.cmp(&other), std::cmp::Ordering::Less);
    drop(other);

    let flat = doc.flatten();
    assert!(flat.is_sub_doc_of(&doc));
    let items: Vec<Doc> = (0..ITEMS).map(|_| text("it")).collect();
    let broken = pretty_doc::intercalate(pretty_doc::comma() + pretty_doc::line(), items);
    assert!(broken.is_sub_doc_of(&doc));
}
