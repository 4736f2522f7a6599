//! Grade 1 (uncontracted) transcoding: one table lookup per character.
//!
//! Case is folded to lowercase before lookup — Braille cells do not encode
//! case, so case information is lost by design. Every input character
//! produces at least one output cell: defined entries produce their cell
//! sequence, everything else passes through verbatim. The function is pure
//! and never fails.

use super::table::CodeTable;

/// Result of an uncontracted transcoding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodedText {
    /// The Braille output.
    pub cells: String,
    /// Characters that had no table entry and passed through verbatim.
    pub unmapped: usize,
}

/// Transcode `text` character by character under `language`.
///
/// Expects already-normalised input; callers go through
/// [`crate::braille::Transcoder`] which normalises first.
pub fn transcode(text: &str, language: &str, table: &CodeTable) -> TranscodedText {
    let mut cells = String::with_capacity(text.len() * 3);
    let mut unmapped = 0;
    for ch in text.chars().flat_map(char::to_lowercase) {
        let lookup = table.lookup(ch, language);
        if !lookup.is_mapped() {
            unmapped += 1;
        }
        lookup.write_to(&mut cells);
    }
    TranscodedText { cells, unmapped }
}
