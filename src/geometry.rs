/// Width, measured in code units (Unicode scalar values).
///
/// This is not a display-column measurement: combining characters, wide
/// glyphs, and bidirectional text all count one unit per scalar value.
pub type Width = i32;

/// The width of a text fragment.
pub(crate) fn str_width(s: &str) -> Width {
    s.chars().count() as Width
}
