//! Canonical token vocabulary shared by catalog names and customer text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::normalize;

/// Ordered whole-word substitutions. Specific patterns come before generic ones.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bmedianas?\b", "med"),
        (r"\bgrandes?\b", "grande"),
        (r"\bmilanesas?\b", "milanesa"),
        (r"\bpicadas?\b", "picada"),
        (r"\b(?:cajas?|cjs)\b", "cj"),
        (r"\b(?:kil(?:os?)?|kgrs?|kgs)\b", "kg"),
    ]
    .into_iter()
    .map(|(pattern, canonical)| {
        (
            Regex::new(pattern).expect("canonical substitution pattern is valid"),
            canonical,
        )
    })
    .collect()
});

/// Normalize `text` and collapse variants into canonical tokens.
///
/// `"2 Cajas de Milanesas"` and `"2 cj milanesa"` both yield `["2", "cj", "milanesa"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut current = normalize(text);
    for (pattern, canonical) in SUBSTITUTIONS.iter() {
        if let Cow::Owned(replaced) = pattern.replace_all(&current, *canonical) {
            current = replaced;
        }
    }

    current
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
