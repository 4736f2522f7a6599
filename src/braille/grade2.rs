//! Grade 2 (contracted) transcoding: an ordered contraction-rule engine
//! layered over the Grade 1 character lookup.
//!
//! ## Matching policy
//!
//! The engine splits input into word tokens (runs of word characters) and
//! separators (everything else), preserving order for reassembly. For each
//! token:
//!
//! 1. a whole-word rule matching the entire token (case-insensitively)
//!    replaces the token outright;
//! 2. otherwise the token is scanned left to right, taking at each position
//!    the highest-priority, then longest, any-position rule that matches
//!    there, and falling back to a single-character Grade 1 lookup when no
//!    rule applies.
//!
//! Separators go through the Grade 1 lookup unchanged in position, so
//! punctuation and spaces still transcode.
//!
//! Rules are held sorted by priority descending, then pattern length
//! descending, and a `(pattern, scope)` pair may exist only once — output
//! is a pure function of input text, language, and rule set. The contraction
//! content itself is pluggable per language; [`RuleSet::ueb_core`] ships a
//! deliberately small English set, not an exhaustive contraction table.

use super::grade1::TranscodedText;
use super::table::CodeTable;
use crate::error::RuleError;
use serde::{Deserialize, Serialize};

/// Where a contraction rule may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleScope {
    /// The pattern must match an entire word token.
    WholeWord,
    /// The pattern may match anywhere inside a token.
    AnyPosition,
}

/// One contraction: a literal pattern replaced by a Braille cell sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractionRule {
    pattern: String,
    cells: String,
    scope: RuleScope,
    priority: i32,
}

impl ContractionRule {
    /// Build a rule. The pattern is folded to lowercase; matching is always
    /// case-insensitive.
    pub fn new(
        pattern: &str,
        cells: impl Into<String>,
        scope: RuleScope,
        priority: i32,
    ) -> Result<Self, RuleError> {
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        Ok(Self {
            pattern: pattern.chars().flat_map(char::to_lowercase).collect(),
            cells: cells.into(),
            scope,
            priority,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn cells(&self) -> &str {
        &self.cells
    }

    pub fn scope(&self) -> RuleScope {
        self.scope
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// The active contraction rules for one language, kept in deterministic
/// match order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    whole_word: Vec<ContractionRule>,
    any_position: Vec<ContractionRule>,
}

impl RuleSet {
    /// An empty rule set; equivalent to Grade 1 behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    /// A minimal English (UEB) set: the five strong word signs as whole-word
    /// rules and the common group signs as any-position rules.
    pub fn ueb_core() -> Self {
        let mut set = Self::new();
        let whole_word: [(&str, &str); 5] = [
            ("and", "⠯"),
            ("for", "⠿"),
            ("of", "⠷"),
            ("the", "⠮"),
            ("with", "⠾"),
        ];
        let group_signs: [(&str, &str); 11] = [
            ("ing", "⠬"),
            ("ch", "⠡"),
            ("sh", "⠩"),
            ("th", "⠹"),
            ("wh", "⠱"),
            ("ou", "⠳"),
            ("ow", "⠪"),
            ("st", "⠌"),
            ("ed", "⠫"),
            ("er", "⠻"),
            ("ar", "⠜"),
        ];
        for (pattern, cells) in whole_word {
            let rule = ContractionRule::new(pattern, cells, RuleScope::WholeWord, 10)
                .expect("built-in patterns are non-empty");
            set.insert(rule).expect("built-in rules have no duplicates");
        }
        for (pattern, cells) in group_signs {
            let rule = ContractionRule::new(pattern, cells, RuleScope::AnyPosition, 5)
                .expect("built-in patterns are non-empty");
            set.insert(rule).expect("built-in rules have no duplicates");
        }
        set
    }

    /// Add a rule, rejecting a second rule with the same pattern and scope.
    pub fn insert(&mut self, rule: ContractionRule) -> Result<(), RuleError> {
        let bucket = match rule.scope {
            RuleScope::WholeWord => &mut self.whole_word,
            RuleScope::AnyPosition => &mut self.any_position,
        };
        if bucket.iter().any(|r| r.pattern == rule.pattern) {
            return Err(RuleError::DuplicateRule {
                pattern: rule.pattern,
            });
        }
        bucket.push(rule);
        // Priority descending, then pattern length descending: the first
        // match during a scan is always the winning rule.
        bucket.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.pattern.chars().count().cmp(&a.pattern.chars().count()))
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.whole_word.len() + self.any_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn whole_word_match(&self, lowered_token: &str) -> Option<&ContractionRule> {
        self.whole_word.iter().find(|r| r.pattern == lowered_token)
    }

    fn any_position_match(&self, rest: &str) -> Option<&ContractionRule> {
        self.any_position
            .iter()
            .find(|r| rest.starts_with(r.pattern.as_str()))
    }
}

/// Transcode `text` with contractions under `language`.
///
/// Expects already-normalised input. Deterministic for a fixed rule set.
pub fn transcode(
    text: &str,
    language: &str,
    table: &CodeTable,
    rules: &RuleSet,
) -> TranscodedText {
    let mut cells = String::with_capacity(text.len() * 3);
    let mut unmapped = 0;

    for segment in segments(text) {
        match segment {
            Segment::Word(token) => {
                transcode_token(token, language, table, rules, &mut cells, &mut unmapped);
            }
            Segment::Separator(sep) => {
                emit_chars(sep, language, table, &mut cells, &mut unmapped);
            }
        }
    }

    TranscodedText { cells, unmapped }
}

fn transcode_token(
    token: &str,
    language: &str,
    table: &CodeTable,
    rules: &RuleSet,
    cells: &mut String,
    unmapped: &mut usize,
) {
    let lowered: String = token.chars().flat_map(char::to_lowercase).collect();

    if let Some(rule) = rules.whole_word_match(&lowered) {
        cells.push_str(rule.cells());
        return;
    }

    let mut idx = 0;
    while idx < lowered.len() {
        let rest = &lowered[idx..];
        if let Some(rule) = rules.any_position_match(rest) {
            cells.push_str(rule.cells());
            idx += rule.pattern().len();
        } else {
            // idx < len guarantees at least one char remains.
            let ch = match rest.chars().next() {
                Some(c) => c,
                None => break,
            };
            let lookup = table.lookup(ch, language);
            if !lookup.is_mapped() {
                *unmapped += 1;
            }
            lookup.write_to(cells);
            idx += ch.len_utf8();
        }
    }
}

fn emit_chars(
    run: &str,
    language: &str,
    table: &CodeTable,
    cells: &mut String,
    unmapped: &mut usize,
) {
    for ch in run.chars().flat_map(char::to_lowercase) {
        let lookup = table.lookup(ch, language);
        if !lookup.is_mapped() {
            *unmapped += 1;
        }
        lookup.write_to(cells);
    }
}

// ── Tokenisation ─────────────────────────────────────────────────────────

enum Segment<'a> {
    Word(&'a str),
    Separator(&'a str),
}

/// Split into alternating word / separator runs, preserving every byte of
/// the input in original order.
fn segments(text: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_is_word = rest.chars().next().map(is_word_char).unwrap_or(false);
        let end = rest
            .char_indices()
            .find(|(_, c)| is_word_char(*c) != first_is_word)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(if first_is_word {
            Segment::Word(run)
        } else {
            Segment::Separator(run)
        })
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
