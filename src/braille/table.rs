//! The Braille code table: source characters → Unicode Braille cells.
//!
//! ## Resolution order
//!
//! A lookup tries, in order:
//!
//! 1. the exact `(char, language)` entry,
//! 2. the `(char, default-language)` entry,
//! 3. the pass-through policy — the original character is emitted verbatim
//!    and flagged as unmapped for statistics.
//!
//! Pass-through means transcoding **never fails** on a character the table
//! does not know; unmapped counts are reported so callers can judge coverage.
//!
//! ## Reverse lookup
//!
//! `reverse_lookup` must be a true inverse for every defined entry within one
//! language, so inserts reject any cell sequence already claimed by another
//! source character in the same language. Digits are stored with the number
//! sign prefix (`⠼` + letter cell) rather than the bare letter-row cells,
//! which keeps them distinct from punctuation and exercises multi-cell
//! entries.

use crate::error::TableError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Language tag used for the language-neutral fallback table.
pub const DEFAULT_LANGUAGE: &str = "default";

/// Result of a single-character lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The table defines cells for this character.
    Mapped(&'a str),
    /// No entry exists; the original character passes through verbatim.
    PassThrough(char),
}

impl Lookup<'_> {
    /// Whether the character had a defined entry.
    pub fn is_mapped(&self) -> bool {
        matches!(self, Lookup::Mapped(_))
    }

    /// Append this lookup's output cells to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Lookup::Mapped(cells) => out.push_str(cells),
            Lookup::PassThrough(ch) => out.push(*ch),
        }
    }
}

/// An immutable mapping from source characters to Braille cell sequences,
/// with per-language overrides over a language-neutral default table.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    /// language tag → (source char → cells). The default table lives under
    /// [`DEFAULT_LANGUAGE`].
    forward: HashMap<String, HashMap<char, String>>,
    /// language tag → (cells → source char), maintained alongside `forward`
    /// so reverse lookups stay O(1).
    reverse: HashMap<String, HashMap<String, char>>,
}

impl CodeTable {
    /// An empty table. Use [`CodeTable::standard`] for the built-in mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in language-neutral table: ASCII letters, digits with the
    /// number sign prefix, space, and common punctuation.
    pub fn standard() -> Self {
        STANDARD_TABLE.clone()
    }

    /// Insert an entry for `(source, language)`.
    ///
    /// Rejects duplicate source characters and cell-sequence collisions
    /// within the same language, so reverse lookup stays a true inverse.
    pub fn insert(
        &mut self,
        language: &str,
        source: char,
        cells: impl Into<String>,
    ) -> Result<(), TableError> {
        let cells = cells.into();
        let fwd = self.forward.entry(language.to_string()).or_default();
        if fwd.contains_key(&source) {
            return Err(TableError::DuplicateSource {
                source,
                language: language.to_string(),
            });
        }
        let rev = self.reverse.entry(language.to_string()).or_default();
        if rev.contains_key(&cells) {
            return Err(TableError::CellCollision {
                source,
                cells,
                language: language.to_string(),
            });
        }
        rev.insert(cells.clone(), source);
        fwd.insert(source, cells);
        Ok(())
    }

    /// Look up the cells for `source` under `language`.
    ///
    /// Falls back to the default-language table, then to pass-through.
    /// Never fails.
    pub fn lookup(&self, source: char, language: &str) -> Lookup<'_> {
        if language != DEFAULT_LANGUAGE {
            if let Some(cells) = self.forward.get(language).and_then(|m| m.get(&source)) {
                return Lookup::Mapped(cells);
            }
        }
        match self.forward.get(DEFAULT_LANGUAGE).and_then(|m| m.get(&source)) {
            Some(cells) => Lookup::Mapped(cells),
            None => Lookup::PassThrough(source),
        }
    }

    /// Recover the source character for a defined cell sequence.
    ///
    /// Tries the language-specific reverse map, then the default one.
    /// Returns `None` for sequences the table never produced.
    pub fn reverse_lookup(&self, cells: &str, language: &str) -> Option<char> {
        if language != DEFAULT_LANGUAGE {
            if let Some(ch) = self.reverse.get(language).and_then(|m| m.get(cells)) {
                return Some(*ch);
            }
        }
        self.reverse
            .get(DEFAULT_LANGUAGE)
            .and_then(|m| m.get(cells))
            .copied()
    }

    /// Whether `(source, language)` has a defined entry, counting the
    /// default-language fallback.
    pub fn contains(&self, source: char, language: &str) -> bool {
        self.lookup(source, language).is_mapped()
    }
}

// ── Built-in table ───────────────────────────────────────────────────────

/// Braille number sign; prefixes every digit cell.
const NUMBER_SIGN: char = '⠼';

/// Letters a–z in the standard dot pattern order.
const LETTER_CELLS: [(char, char); 26] = [
    ('a', '⠁'),
    ('b', '⠃'),
    ('c', '⠉'),
    ('d', '⠙'),
    ('e', '⠑'),
    ('f', '⠋'),
    ('g', '⠛'),
    ('h', '⠓'),
    ('i', '⠊'),
    ('j', '⠚'),
    ('k', '⠅'),
    ('l', '⠇'),
    ('m', '⠍'),
    ('n', '⠝'),
    ('o', '⠕'),
    ('p', '⠏'),
    ('q', '⠟'),
    ('r', '⠗'),
    ('s', '⠎'),
    ('t', '⠞'),
    ('u', '⠥'),
    ('v', '⠧'),
    ('w', '⠺'),
    ('x', '⠭'),
    ('y', '⠽'),
    ('z', '⠵'),
];

/// Punctuation cells. `(` and `)` are two-cell sequences.
const PUNCTUATION_CELLS: [(char, &str); 10] = [
    (' ', " "),
    ('.', "⠲"),
    (',', "⠂"),
    ('!', "⠖"),
    ('?', "⠦"),
    (':', "⠒"),
    (';', "⠆"),
    ('-', "⠤"),
    ('(', "⠐⠣"),
    (')', "⠐⠜"),
];

static STANDARD_TABLE: Lazy<CodeTable> = Lazy::new(|| {
    let mut table = CodeTable::new();
    for (ch, cell) in LETTER_CELLS {
        table
            .insert(DEFAULT_LANGUAGE, ch, cell.to_string())
            .expect("built-in letter entries are collision-free");
    }
    for (ch, cells) in PUNCTUATION_CELLS {
        table
            .insert(DEFAULT_LANGUAGE, ch, cells)
            .expect("built-in punctuation entries are collision-free");
    }
    // Digits: number sign + the first-row letter cell. 1–9 map to a–i, 0 to j.
    for (i, digit) in ('1'..='9').chain(['0']).enumerate() {
        let (_, letter_cell) = LETTER_CELLS[i];
        let mut cells = String::with_capacity(8);
        cells.push(NUMBER_SIGN);
        cells.push(letter_cell);
        table
            .insert(DEFAULT_LANGUAGE, digit, cells)
            .expect("built-in digit entries are collision-free");
    }
    table
});
