//! Text normalisation for news articles.
//!
//! Converts raw article text into the canonical form the vectorizer was fit
//! on. The passes run in a fixed order and each one operates on the output
//! of the previous pass:
//!
//! 1. Lowercase
//! 2. Drop bracketed annotations: `[...]` (non-greedy)
//! 3. Non-word characters → space (anything but a letter, digit or `_`)
//! 4. Drop `http://`, `https://` and `www.` tokens
//! 5. Drop tag-like spans: `<...>` (non-greedy)
//! 6. Drop ASCII punctuation
//! 7. Newlines → space
//! 8. Drop every word containing a digit
//! 9. Trim
//!
//! Passes 4 and 5 rarely fire on real input because pass 3 has already
//! turned `:`, `/`, `.`, `<` and `>` into spaces. They stay in the sequence
//! so the output matches the preprocessing the artifacts were trained with.

use std::sync::LazyLock;

use regex::Regex;

static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("bracketed regex"));

// Word characters are letters, digits and underscore. Regex `\w` would also
// keep combining marks and joiners.
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_]").expect("non-word regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("url regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>+").expect("tag regex"));

static DIGIT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]*\d[\p{L}\p{N}_]*").expect("digit word regex"));

/// Normalise raw article text into the canonical form used for vectorisation.
///
/// Total and side-effect-free: every input, including the empty string,
/// produces a string. Applying it twice gives the same result as applying
/// it once.
///
/// ```
/// use newscheck_core::normalize;
///
/// assert_eq!(normalize("  Hello, WORLD!  "), "hello  world");
/// assert_eq!(normalize("[Reuters] covid19 cases"), "cases");
/// ```
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();
    let text = BRACKETED_RE.replace_all(&text, "");
    // Each non-word character becomes one space, so whitespace already in
    // the output survives a second pass unchanged.
    let text = NON_WORD_RE.replace_all(&text, " ");
    let text = URL_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let text = text.replace('\n', " ");
    let text = DIGIT_WORD_RE.replace_all(&text, "");
    text.trim().to_string()
}
