use crate::constructors;
use crate::doc::{cat, Doc};
use crate::doc_tree::{to_doc_tree, DocTree, TreeStep};
use crate::geometry::Width;
use crate::render::Chunk;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::Arc;

// The three set-style operations share one case skeleton: scan two chunk
// streams in lockstep, splitting text chunks on shared prefixes and pulling
// surplus leading spaces out of the deeper of two breaks. Branches are not
// entered by native recursion: a `fill` carries one layout choice per item,
// so each operation keeps its pending work on an explicit heap stack (a
// goal list with recorded backtrack points for the subdocument search, task
// lists for the difference and the ordering) and the native stack stays
// constant no matter how many choices a document holds.

fn space_chunk(count: Width) -> Chunk {
    Chunk::Str(Arc::from(" ".repeat(count.max(0) as usize)))
}

/// Advance two chunk-headed streams past a shared head. Returns the shared
/// chunk and both streams with any unshared remainder pushed back, or
/// `None` when the heads cannot begin the same rendering.
fn align(c1: Chunk, t1: DocTree, c2: Chunk, t2: DocTree) -> Option<(Chunk, DocTree, DocTree)> {
    match (c1, c2) {
        (Chunk::Str(s1), Chunk::Str(s2)) => {
            if s1 == s2 {
                Some((Chunk::Str(s1), t1, t2))
            } else if s2.starts_with(&*s1) {
                let rest = Chunk::Str(Arc::from(&s2[s1.len()..]));
                Some((Chunk::Str(s1), t1, DocTree::cons(rest, t2)))
            } else if s1.starts_with(&*s2) {
                let rest = Chunk::Str(Arc::from(&s1[s2.len()..]));
                Some((Chunk::Str(s2), DocTree::cons(rest, t1), t2))
            } else {
                None
            }
        }
        (Chunk::Break(k1), Chunk::Break(k2)) => {
            if k1 == k2 {
                Some((Chunk::Break(k1), t1, t2))
            } else if k1 < k2 {
                let rest = space_chunk(k2 - k1);
                Some((Chunk::Break(k1), t1, DocTree::cons(rest, t2)))
            } else {
                let rest = space_chunk(k1 - k2);
                Some((Chunk::Break(k2), DocTree::cons(rest, t1), t2))
            }
        }
        // Text never contains a newline, so a break and a fragment always
        // diverge at their first character.
        _ => None,
    }
}

/// A conjunction of pending subdocument obligations. The list is persistent
/// so a recorded backtrack point is one pointer, not a copy of the state.
type Goals = Option<Rc<GoalNode>>;

struct GoalNode {
    x: DocTree,
    y: DocTree,
    rest: Goals,
}

fn push_goal(x: DocTree, y: DocTree, rest: Goals) -> Goals {
    Some(Rc::new(GoalNode { x, y, rest }))
}

impl Drop for GoalNode {
    /// Unlinks the tail iteratively; goal lists grow with the number of
    /// layout choices and the derived drop would recurse once per node.
    fn drop(&mut self) {
        let mut rest = self.rest.take();
        while let Some(node) = rest {
            match Rc::try_unwrap(node) {
                Ok(mut node) => rest = node.rest.take(),
                Err(_) => break,
            }
        }
    }
}

/// True iff every rendering of `a` is also a rendering of `b`. A branch on
/// the left must hold for both of its sides; a branch on the right may be
/// satisfied by either, tried flat side first. The search is depth-first
/// over the goal list, rewinding to the latest recorded choice on failure.
pub(crate) fn is_sub_doc(a: &DocTree, b: &DocTree) -> bool {
    let mut goals = push_goal(a.clone(), b.clone(), None);
    let mut retries: Vec<Goals> = Vec::new();
    'prove: loop {
        let goal = match goals.take() {
            Some(goal) => goal,
            None => return true,
        };
        let mut x = goal.x.clone();
        let mut y = goal.y.clone();
        let rest = goal.rest.clone();
        drop(goal);
        loop {
            match (x.step(), y.step()) {
                (TreeStep::Branch(l, r), _) => {
                    goals = push_goal(l, y.clone(), push_goal(r, y, rest));
                    continue 'prove;
                }
                (_, TreeStep::Branch(l, r)) => {
                    retries.push(push_goal(x.clone(), r, rest.clone()));
                    goals = push_goal(x, l, rest);
                    continue 'prove;
                }
                (TreeStep::Done, TreeStep::Done) => {
                    goals = rest;
                    continue 'prove;
                }
                (TreeStep::Done, TreeStep::Chunk(..)) | (TreeStep::Chunk(..), TreeStep::Done) => {
                    match retries.pop() {
                        Some(saved) => goals = saved,
                        None => return false,
                    }
                    continue 'prove;
                }
                (TreeStep::Chunk(c1, t1), TreeStep::Chunk(c2, t2)) => match align(c1, t1, c2, t2) {
                    Some((_, nx, ny)) => {
                        x = nx;
                        y = ny;
                    }
                    None => {
                        match retries.pop() {
                            Some(saved) => goals = saved,
                            None => return false,
                        }
                        continue 'prove;
                    }
                },
            }
        }
    }
}

enum DiffTask {
    /// Scan a pair of streams to their first structural event.
    Scan {
        x: DocTree,
        y: DocTree,
        prefix: Vec<Chunk>,
    },
    /// Combine the two sides of a branch on the left: the union of their
    /// differences, under the prefix scanned before the branch.
    Merge(Vec<Chunk>),
    /// After subtracting the flat side of a branch on the right, subtract
    /// its fallback from whatever remained.
    Subtract(DocTree),
    /// Re-attach a scanned prefix to a finished difference.
    Wrap(Vec<Chunk>),
}

/// The renderings of `a` that are not renderings of `b`, or `None` when
/// there are none. Runs as a task machine with an explicit result stack;
/// each scan pushes exactly one `Option` and the combiners consume them.
pub(crate) fn set_diff(a: &DocTree, b: &DocTree) -> Option<DocTree> {
    let mut tasks = vec![DiffTask::Scan {
        x: a.clone(),
        y: b.clone(),
        prefix: Vec::new(),
    }];
    let mut results: Vec<Option<DocTree>> = Vec::new();
    while let Some(task) = tasks.pop() {
        match task {
            DiffTask::Scan {
                mut x,
                mut y,
                mut prefix,
            } => loop {
                match (x.step(), y.step()) {
                    (TreeStep::Branch(l, r), _) => {
                        tasks.push(DiffTask::Merge(prefix));
                        tasks.push(DiffTask::Scan {
                            x: r,
                            y: y.clone(),
                            prefix: Vec::new(),
                        });
                        tasks.push(DiffTask::Scan {
                            x: l,
                            y,
                            prefix: Vec::new(),
                        });
                        break;
                    }
                    (_, TreeStep::Branch(l, r)) => {
                        // x - (l | r) = (x - l) - r
                        tasks.push(DiffTask::Wrap(prefix));
                        tasks.push(DiffTask::Subtract(r));
                        tasks.push(DiffTask::Scan {
                            x,
                            y: l,
                            prefix: Vec::new(),
                        });
                        break;
                    }
                    (TreeStep::Done, TreeStep::Done) => {
                        results.push(None);
                        break;
                    }
                    (TreeStep::Done, TreeStep::Chunk(..)) | (TreeStep::Chunk(..), TreeStep::Done) => {
                        results.push(Some(replay(prefix, x)));
                        break;
                    }
                    (TreeStep::Chunk(c1, t1), TreeStep::Chunk(c2, t2)) => {
                        match align(c1, t1, c2, t2) {
                            Some((shared, nx, ny)) => {
                                prefix.push(shared);
                                x = nx;
                                y = ny;
                            }
                            None => {
                                results.push(Some(replay(prefix, x)));
                                break;
                            }
                        }
                    }
                }
            },
            DiffTask::Merge(prefix) => {
                let right = results.pop().unwrap();
                let left = results.pop().unwrap();
                let merged = match (left, right) {
                    (None, None) => None,
                    (Some(d), None) | (None, Some(d)) => Some(d),
                    (Some(dl), Some(dr)) => Some(DocTree::branch(dl, dr)),
                };
                results.push(merged.map(|diff| replay(prefix, diff)));
            }
            DiffTask::Subtract(r) => match results.pop().unwrap() {
                None => results.push(None),
                Some(d) => tasks.push(DiffTask::Scan {
                    x: d,
                    y: r,
                    prefix: Vec::new(),
                }),
            },
            DiffTask::Wrap(prefix) => {
                let inner = results.pop().unwrap();
                results.push(inner.map(|diff| replay(prefix, diff)));
            }
        }
    }
    results.pop().unwrap()
}

fn replay(prefix: Vec<Chunk>, tree: DocTree) -> DocTree {
    prefix
        .into_iter()
        .rev()
        .fold(tree, |tree, chunk| DocTree::cons(chunk, tree))
}

enum CmpTask {
    Pair(DocTree, DocTree),
    /// A branch met a branch and their flat sides tied: order by what each
    /// fallback adds beyond its flat side.
    Diffs {
        xb: DocTree,
        xa: DocTree,
        yb: DocTree,
        ya: DocTree,
    },
    /// A branch met a plain stream and the flat side tied: the branch side
    /// is `sign` iff its fallback adds anything.
    Extra {
        b: DocTree,
        a: DocTree,
        sign: Ordering,
    },
}

/// A total order over rendering sets. Renderings compare in widest-first
/// order; within a rendering a break sorts after any text, deliberately
/// departing from the ASCII position of `'\n'`. Checks that only apply
/// when everything so far tied are queued as tasks, not entered natively,
/// and the first decisive one answers.
pub(crate) fn compare_tree(a: &DocTree, b: &DocTree) -> Ordering {
    let mut tasks = vec![CmpTask::Pair(a.clone(), b.clone())];
    while let Some(task) = tasks.pop() {
        let decided = match task {
            CmpTask::Pair(x, y) => compare_pair(x, y, &mut tasks),
            CmpTask::Diffs { xb, xa, yb, ya } => {
                match (set_diff(&xb, &xa), set_diff(&yb, &ya)) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (Some(dx), Some(dy)) => {
                        tasks.push(CmpTask::Pair(dx, dy));
                        Ordering::Equal
                    }
                }
            }
            CmpTask::Extra { b, a, sign } => {
                if set_diff(&b, &a).is_some() {
                    sign
                } else {
                    Ordering::Equal
                }
            }
        };
        if decided != Ordering::Equal {
            return decided;
        }
    }
    Ordering::Equal
}

/// Scan two streams to their first decision. Branches queue the tie-break
/// that follows them and continue with their flat sides.
fn compare_pair(mut x: DocTree, mut y: DocTree, tasks: &mut Vec<CmpTask>) -> Ordering {
    loop {
        match (x.step(), y.step()) {
            (TreeStep::Branch(xa, xb), TreeStep::Branch(ya, yb)) => {
                tasks.push(CmpTask::Diffs {
                    xb,
                    xa: xa.clone(),
                    yb,
                    ya: ya.clone(),
                });
                tasks.push(CmpTask::Pair(xa, ya));
                return Ordering::Equal;
            }
            (TreeStep::Branch(xa, xb), _) => {
                tasks.push(CmpTask::Extra {
                    b: xb,
                    a: xa.clone(),
                    sign: Ordering::Greater,
                });
                tasks.push(CmpTask::Pair(xa, y));
                return Ordering::Equal;
            }
            (_, TreeStep::Branch(ya, yb)) => {
                tasks.push(CmpTask::Extra {
                    b: yb,
                    a: ya.clone(),
                    sign: Ordering::Less,
                });
                tasks.push(CmpTask::Pair(x, ya));
                return Ordering::Equal;
            }
            (TreeStep::Done, TreeStep::Done) => return Ordering::Equal,
            (TreeStep::Done, TreeStep::Chunk(..)) => return Ordering::Less,
            (TreeStep::Chunk(..), TreeStep::Done) => return Ordering::Greater,
            (TreeStep::Chunk(c1, t1), TreeStep::Chunk(c2, t2)) => match (c1, c2) {
                (Chunk::Str(s1), Chunk::Str(s2)) => {
                    if s1 == s2 {
                        x = t1;
                        y = t2;
                    } else if s2.starts_with(&*s1) {
                        let rest = Chunk::Str(Arc::from(&s2[s1.len()..]));
                        x = t1;
                        y = DocTree::cons(rest, t2);
                    } else if s1.starts_with(&*s2) {
                        let rest = Chunk::Str(Arc::from(&s1[s2.len()..]));
                        x = DocTree::cons(rest, t1);
                        y = t2;
                    } else {
                        return s1.cmp(&s2);
                    }
                }
                (Chunk::Break(k1), Chunk::Break(k2)) => {
                    if k1 == k2 {
                        x = t1;
                        y = t2;
                    } else if k1 < k2 {
                        x = t1;
                        y = DocTree::cons(space_chunk(k2 - k1), t2);
                    } else {
                        x = DocTree::cons(space_chunk(k1 - k2), t1);
                        y = t2;
                    }
                }
                (Chunk::Str(..), Chunk::Break(..)) => return Ordering::Less,
                (Chunk::Break(..), Chunk::Str(..)) => return Ordering::Greater,
            },
        }
    }
}

/// All union-free documents whose renderings together make up the source
/// document's rendering set, produced lazily, widest layout first.
pub struct Deunioned {
    pending: Vec<(Vec<Chunk>, DocTree)>,
}

pub(crate) fn deunioned(doc: &Doc) -> Deunioned {
    Deunioned {
        pending: vec![(Vec::new(), to_doc_tree(doc))],
    }
}

impl Iterator for Deunioned {
    type Item = Doc;

    fn next(&mut self) -> Option<Doc> {
        loop {
            let (mut prefix, tree) = self.pending.pop()?;
            match tree.step() {
                TreeStep::Done => return Some(doc_of_chunks(&prefix)),
                TreeStep::Chunk(chunk, rest) => {
                    prefix.push(chunk);
                    self.pending.push((prefix, rest));
                }
                TreeStep::Branch(left, right) => {
                    self.pending.push((prefix.clone(), right));
                    self.pending.push((prefix, left));
                }
            }
        }
    }
}

/// Rebuild one resolved rendering as a document. Breaks become a hard line
/// plus literal spaces, so the result renders the same at every width.
fn doc_of_chunks(chunks: &[Chunk]) -> Doc {
    let mut doc = constructors::empty();
    for chunk in chunks.iter().rev() {
        doc = match chunk {
            Chunk::Str(s) => cat(Doc::fragment_shared(s.clone()), doc),
            Chunk::Break(indent) => {
                cat(constructors::line(), cat(constructors::spaces(*indent), doc))
            }
        };
    }
    doc
}
