//! Keyword intents.
//!
//! Every check runs on squashed text (lowercase, single spaces, accents kept).
//! `\b` is Unicode-aware, so `sí` and `esperá` are whole words.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use chatorder_catalog::{Unit, UNIT_PATTERN};
use chatorder_orders::extract::parse_quantity;

static CONFIRM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:s[íi]|ok|dale|confirmo|listo)\b").expect("confirm pattern is valid")
});

// "para" is deliberately absent: it is the common preposition, not "stop".
static CANCEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:no|cancel\w*|esper[aá]|par[áo])\b").expect("cancel pattern is valid")
});

static REMOVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:sac|quit)[aá](?:s|me)?\s+(\d+(?:[.,]\d+)?)\s*(?:({UNIT_PATTERN})(?:\s+|$))?(?:de\s+)?(.+)$"
    ))
    .expect("remove pattern is valid")
});

static ADD_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:agreg[aá](?:me)?|sum[aá](?:me)?|\+)\s+(.+)$")
        .expect("add prefix pattern is valid")
});

static GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hola|buenas|buen d[ií]a").expect("greeting pattern is valid"));

/// A parsed "sacá N [unit] [de] description" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub quantity: Decimal,
    pub unit: Option<Unit>,
    pub description: String,
}

pub fn is_confirmation(text: &str) -> bool {
    CONFIRM.is_match(text)
}

pub fn is_cancellation(text: &str) -> bool {
    CANCEL.is_match(text)
}

/// Welcome-worthy greeting when there is no order yet.
pub fn is_greeting(text: &str) -> bool {
    GREETING.is_match(text)
}

/// Whether a closed-window reply should open with the warm "¡Hola …!" form.
pub fn is_warm_greeting(text: &str) -> bool {
    text.contains("hola") || text.contains("buen")
}

pub fn parse_removal(text: &str) -> Option<Removal> {
    let caps = REMOVE.captures(text)?;
    let quantity = parse_quantity(caps.get(1)?.as_str())?;
    let description = caps.get(3)?.as_str().trim().to_string();
    if description.is_empty() {
        return None;
    }

    Some(Removal {
        quantity,
        unit: caps.get(2).and_then(|m| Unit::from_token(m.as_str())),
        description,
    })
}

/// Text after an explicit add prefix (`agregame`, `sumá`, `+`), if there is one.
pub fn strip_add_prefix(text: &str) -> Option<&str> {
    ADD_PREFIX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
