//! Token-set similarity matching of free text against the catalog.
//!
//! Model:
//! - Project both the query and every entry name through `chatorder_text::tokenize`.
//! - Score with Jaccard similarity over token **sets**.
//! - Keep the first highest-scoring entry (catalog order breaks ties).
//! - Accept it only at `ACCEPTANCE_THRESHOLD` or above and when at least one
//!   query token appears verbatim in the entry's tokens.

use std::collections::HashSet;

use chatorder_text::tokenize;

use crate::entry::CatalogEntry;

/// Minimum Jaccard score for a match to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.30;

/// Jaccard similarity |A ∩ B| / |A ∪ B| over the distinct tokens of `a` and `b`.
///
/// Two empty inputs score 0.
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count().max(1);
    intersection as f64 / union as f64
}

/// Best-scoring candidate for a description, before acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored<'a> {
    pub entry: &'a CatalogEntry,
    pub score: f64,
    /// Whether some query token appears verbatim among the entry's tokens.
    pub shares_token: bool,
}

impl Scored<'_> {
    pub fn is_accepted(&self) -> bool {
        self.score >= ACCEPTANCE_THRESHOLD && self.shares_token
    }
}

/// Matcher over one catalog snapshot; entry names are tokenized once up front.
#[derive(Debug, Clone)]
pub struct CatalogMatcher<'a> {
    entries: Vec<(&'a CatalogEntry, Vec<String>)>,
}

impl<'a> CatalogMatcher<'a> {
    pub fn new(catalog: &'a [CatalogEntry]) -> Self {
        let entries = catalog
            .iter()
            .map(|entry| (entry, tokenize(entry.name())))
            .collect();
        Self { entries }
    }

    /// Highest-scoring entry for `description`, accepted or not.
    ///
    /// Returns `None` when no entry shares anything with the description.
    pub fn best_candidate(&self, description: &str) -> Option<Scored<'a>> {
        let query = tokenize(description);

        let mut best: Option<(&'a CatalogEntry, &[String])> = None;
        let mut best_score = 0.0;
        for (entry, tokens) in &self.entries {
            let score = jaccard(&query, tokens);
            if score > best_score {
                best_score = score;
                best = Some((*entry, tokens.as_slice()));
            }
        }

        best.map(|(entry, tokens)| Scored {
            entry,
            score: best_score,
            shares_token: query.iter().any(|t| tokens.contains(t)),
        })
    }

    /// Accepted match for `description`, or `None` (the description is unknown).
    pub fn best_match(&self, description: &str) -> Option<&'a CatalogEntry> {
        self.best_candidate(description)
            .filter(Scored::is_accepted)
            .map(|scored| scored.entry)
    }
}
