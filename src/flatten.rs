use crate::constructors;
use crate::doc::{Doc, DocNode};

/// The single-line form of `doc`: no `Line`, `Nest`, or `Union` remains.
pub(crate) fn flatten(doc: &Doc) -> Doc {
    flatten_option(doc).unwrap_or_else(|| doc.clone())
}

/// `Some` iff flattening changes the document. Collapsing a union reports a
/// change even when its flat branch comes back untouched, and stripping a
/// `Nest` always counts as a change.
pub(crate) fn flatten_option(doc: &Doc) -> Option<Doc> {
    // An explicit task stack: recursion would overflow on the deep
    // right-associated spines the `+` constructor produces.
    enum Task<'a> {
        Visit(&'a Doc),
        JoinConcat(&'a Doc, &'a Doc),
        /// Replace the parent node with its (flattened) child: the child of
        /// a `Nest`, or the flat branch of a `Union`.
        Hoist(&'a Doc),
    }

    let mut tasks = vec![Task::Visit(doc)];
    let mut results: Vec<Option<Doc>> = Vec::new();
    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(d) => match d.node() {
                DocNode::Empty | DocNode::Text(..) => results.push(None),
                DocNode::Line => results.push(Some(constructors::space())),
                DocNode::Nest(_, inner) => {
                    tasks.push(Task::Hoist(inner));
                    tasks.push(Task::Visit(inner));
                }
                DocNode::Union(flat, _) => {
                    tasks.push(Task::Hoist(flat));
                    tasks.push(Task::Visit(flat));
                }
                DocNode::Concat(a, b) => {
                    tasks.push(Task::JoinConcat(a, b));
                    tasks.push(Task::Visit(b));
                    tasks.push(Task::Visit(a));
                }
            },
            Task::JoinConcat(a, b) => {
                let flat_b = results.pop().unwrap();
                let flat_a = results.pop().unwrap();
                results.push(match (flat_a, flat_b) {
                    (None, None) => None,
                    (flat_a, flat_b) => Some(
                        flat_a.unwrap_or_else(|| a.clone()) + flat_b.unwrap_or_else(|| b.clone()),
                    ),
                });
            }
            Task::Hoist(child) => {
                let flat = results.pop().unwrap();
                results.push(Some(flat.unwrap_or_else(|| child.clone())));
            }
        }
    }
    results.pop().unwrap()
}
