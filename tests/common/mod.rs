use pretty_doc::testing::oracular_render;
use pretty_doc::{empty, line, space_or_line, text, Doc, Width};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[track_caller]
#[allow(unused)]
pub fn assert_render(doc: &Doc, width: Width, expected: &str) {
    let oracle = oracular_render(doc, width);
    compare_lines(
        &format!(
            "ORACLE DISAGREES WITH TEST CASE AT WIDTH {}, SO TEST CASE MUST BE WRONG",
            width
        ),
        expected,
        &oracle,
    );
    assert_matches_oracle(doc, width);
}

/// Check the streaming engine, the fragment stream, and the sink writer
/// against the oracle at one width.
#[track_caller]
#[allow(unused)]
pub fn assert_matches_oracle(doc: &Doc, width: Width) {
    let oracle = oracular_render(doc, width);
    let rendered = doc.render(width);
    compare_lines(
        &format!("IN RENDERING AT WIDTH {}", width),
        &oracle,
        &rendered,
    );
    let streamed: String = doc.render_stream(width).collect();
    compare_lines(
        &format!("IN STREAMING AT WIDTH {}", width),
        &rendered,
        &streamed,
    );
    let mut written = String::new();
    doc.write_to(width, &mut written)
        .expect("writing into a String cannot fail");
    compare_lines(&format!("IN WRITING AT WIDTH {}", width), &rendered, &written);
}

#[track_caller]
#[allow(unused)]
fn compare_lines(message: &str, expected: &str, actual: &str) {
    if actual != expected {
        eprintln!(
            "{}\nEXPECTED:\n{}\nACTUAL:\n{}\n=========",
            message, expected, actual,
        );
        assert_eq!(actual, expected);
    }
}

/// A deterministic source of random documents. Only strong-invariant
/// choices are generated (`grouped` and the space-or-newline constant), so
/// the generated documents are fair inputs for the semantic queries as well
/// as for rendering.
#[allow(unused)]
pub struct DocGen {
    rng: StdRng,
}

#[allow(unused)]
impl DocGen {
    pub fn new(seed: [u8; 32]) -> DocGen {
        DocGen {
            rng: StdRng::from_seed(seed),
        }
    }

    /// A document of roughly `size` constructors.
    pub fn doc(&mut self, size: u32) -> Doc {
        if size <= 1 {
            match self.rng.gen_range(0..6) {
                0 => empty(),
                1 => text("a"),
                2 => text("bb"),
                3 => text("cccc"),
                4 => line(),
                5 => space_or_line(),
                _ => unreachable!(),
            }
        } else {
            match self.rng.gen_range(0..4) {
                0 => {
                    let left_size = self.rng.gen_range(1..size);
                    let left = self.doc(left_size);
                    let right = self.doc(size - left_size);
                    left + right
                }
                1 => {
                    let left_size = self.rng.gen_range(1..size);
                    let left = self.doc(left_size);
                    let right = self.doc(size - left_size);
                    left / right
                }
                2 => self.doc(size - 1).nest(self.rng.gen_range(1..4)),
                3 => self.doc(size - 1).grouped(),
                _ => unreachable!(),
            }
        }
    }

    pub fn docs(&mut self, count: usize, size: u32) -> Vec<Doc> {
        (0..count).map(|_| self.doc(size)).collect()
    }
}
