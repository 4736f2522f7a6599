//! Text normalisation applied before transcoding.
//!
//! Raw OCR output is noisy: hard line breaks mid-sentence, runs of spaces
//! from column layouts, stray control characters from the extraction
//! library. Normalisation reduces all of that to a single predictable form
//! so the transcoders only ever see clean input.
//!
//! Three passes, in a fixed order:
//!
//! 1. strip everything outside word characters, whitespace, and the
//!    punctuation allow-set,
//! 2. collapse whitespace runs (including newlines) to a single space,
//! 3. trim leading and trailing whitespace.
//!
//! Stripping runs *before* collapsing: removing a disallowed character
//! between two spaces would otherwise leave a double space behind and break
//! idempotence. `normalize(normalize(x)) == normalize(x)` holds for every
//! input, and an output that ends up empty is a valid result, not an error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Punctuation kept by the default normalizer, matching the cells the
/// standard code table defines.
pub const DEFAULT_PUNCTUATION: &str = ".,!?;:()-";

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Cleans raw extracted text before transcoding. Infallible and idempotent.
#[derive(Debug, Clone)]
pub struct Normalizer {
    strip: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_punctuation(DEFAULT_PUNCTUATION)
    }
}

impl Normalizer {
    /// A normalizer keeping the default punctuation allow-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer keeping word characters, whitespace, and exactly the
    /// characters in `allowed`.
    pub fn with_punctuation(allowed: &str) -> Self {
        let escaped: String = allowed.chars().map(|c| regex::escape(&c.to_string())).collect();
        let pattern = format!(r"[^\w\s{escaped}]");
        Self {
            strip: Regex::new(&pattern).expect("escaped allow-set yields a valid character class"),
        }
    }

    /// Normalise `text`: strip disallowed characters, collapse whitespace,
    /// trim. Never fails; an empty result is valid.
    pub fn normalize(&self, text: &str) -> String {
        let stripped = self.strip.replace_all(text, "");
        let collapsed = RE_WHITESPACE.replace_all(&stripped, " ");
        collapsed.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("hello   world"), "hello world");
        assert_eq!(n.normalize("line one\n\nline two\ttabbed"), "line one line two tabbed");
    }

    #[test]
    fn trims_edges() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("  padded  "), "padded");
    }

    #[test]
    fn strips_control_characters() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("a\u{0000}b\u{0007}c"), "abc");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("wait, really?! (yes)"), "wait, really?! (yes)");
    }

    #[test]
    fn strips_disallowed_symbols() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("price: $5 #sale"), "price: 5 sale");
    }

    #[test]
    fn stripping_does_not_leave_double_spaces() {
        let n = Normalizer::new();
        // '@' sits between two spaces; removing it must not widen the gap.
        assert_eq!(n.normalize("a @ b"), "a b");
    }

    #[test]
    fn idempotent() {
        let n = Normalizer::new();
        for input in [
            "",
            "   ",
            "plain",
            "  multi   space\nand\tnewline  ",
            "sym#bols & such",
            "a @ b",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn empty_result_is_valid() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("###"), "");
        assert_eq!(n.normalize(""), "");
    }

    #[test]
    fn custom_allow_set() {
        let n = Normalizer::with_punctuation(".");
        assert_eq!(n.normalize("end. stop, now"), "end. stop now");
    }
}
