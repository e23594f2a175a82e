//! Case, accent and punctuation folding.

use unicode_normalization::UnicodeNormalization;

/// Articles, prepositions and conjunctions dropped before comparing texts.
///
/// `x` is included because "2 x milanesa" is the common informal multiplier.
pub const STOPWORDS: &[&str] = &[
    "de", "la", "el", "los", "las", "un", "una", "unos", "unas", "al", "del", "para", "por",
    "y", "en", "a", "x",
];

/// Lowercase, trim and strip diacritics (`"Miércoles"` → `"miercoles"`).
pub fn fold(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Lowercase, trim and collapse runs of whitespace, keeping accents and punctuation.
pub fn squash(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full normalization used for similarity: `fold`, punctuation to spaces,
/// whole-word stopword removal, whitespace collapse.
///
/// Total: empty or blank input yields an empty string.
pub fn normalize(text: &str) -> String {
    let folded: String = fold(text)
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    folded
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
