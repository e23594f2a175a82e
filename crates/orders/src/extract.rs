//! Line-item extraction from one free-text message.
//!
//! Grammar per item: `QUANTITY [UNIT] DESCRIPTION`. A quantity head is a decimal
//! number at the start of the text or after whitespace, optionally glued to a unit
//! word (`20kg`, `2 cj`), and followed by whitespace or the end of the text. The
//! description runs up to the next head, so several items can share a line:
//! `"20kg picada especial 2 cj milanesas"`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use chatorder_catalog::{Unit, UNIT_PATTERN};
use chatorder_text::squash;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d+(?:[.,]\d+)?)").expect("number pattern is valid"));

/// Unit word right after a number, itself followed by whitespace or the end.
static UNIT_AFTER_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({UNIT_PATTERN})(?:\s|$)")).expect("unit pattern is valid")
});

static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:de|la|el|los|las)\s+").expect("article pattern is valid"));

/// One (quantity, unit, description) triple found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub quantity: Decimal,
    /// Unit typed by the customer, if any.
    pub unit: Option<Unit>,
    /// Lowercased description as typed (accents kept), article stripped.
    pub description: String,
}

/// Split `text` into line items.
///
/// Text before the first quantity is ignored. Segments with an unparseable or
/// non-positive quantity, or an empty description, are dropped silently: they are
/// not item-shaped at all.
pub fn extract(text: &str) -> Vec<LineItem> {
    let text = squash(text);
    let heads = quantity_heads(&text);

    let mut items = Vec::with_capacity(heads.len());
    for (idx, head) in heads.iter().enumerate() {
        let end = heads.get(idx + 1).map_or(text.len(), |next| next.start);

        let Some(quantity) = parse_quantity(head.quantity) else {
            continue;
        };

        let description = clean_description(&text[head.end..end]);
        if description.is_empty() {
            continue;
        }

        items.push(LineItem {
            quantity,
            unit: head.unit,
            description,
        });
    }

    items
}

/// Where one item starts: the number, its unit if any, and the byte span.
struct QuantityHead<'t> {
    start: usize,
    end: usize,
    quantity: &'t str,
    unit: Option<Unit>,
}

/// Find every quantity head in already squashed text.
///
/// The boundary after a head is checked on the remaining text without being
/// consumed, so `"5 2 kg picada"` yields both `5` and `2 kg`.
fn quantity_heads(text: &str) -> Vec<QuantityHead<'_>> {
    NUMBER
        .captures_iter(text)
        .filter_map(|caps| {
            let (whole, number) = (caps.get(0)?, caps.get(1)?);
            let rest = &text[number.end()..];

            if let Some(unit) = UNIT_AFTER_NUMBER.captures(rest) {
                return Some(QuantityHead {
                    start: whole.start(),
                    end: number.end() + unit.get(0)?.end(),
                    quantity: number.as_str(),
                    unit: unit.get(1).and_then(|m| Unit::from_token(m.as_str())),
                });
            }

            (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| QuantityHead {
                start: whole.start(),
                end: number.end(),
                quantity: number.as_str(),
                unit: None,
            })
        })
        .collect()
}

/// Parse `"2"`, `"2.5"` or `"2,5"`; `None` unless strictly positive.
pub fn parse_quantity(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "."))
        .ok()
        .filter(|q| *q > Decimal::ZERO)
}

fn clean_description(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches([',', ';']).trim_end();
    LEADING_ARTICLE.replace(trimmed, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: &str, unit: Option<Unit>, description: &str) -> LineItem {
        LineItem {
            quantity: Decimal::from_str(qty).unwrap(),
            unit,
            description: description.to_string(),
        }
    }

    #[test]
    fn extracts_two_items_from_one_line() {
        let items = extract("20kg picada especial 2 cj milanesas medianas");
        assert_eq!(
            items,
            vec![
                item("20", Some(Unit::Weight), "picada especial"),
                item("2", Some(Unit::Case), "milanesas medianas"),
            ]
        );
    }

    #[test]
    fn unit_is_optional() {
        let items = extract("3 pechugas");
        assert_eq!(items, vec![item("3", None, "pechugas")]);
    }

    #[test]
    fn comma_decimal_is_normalized() {
        let items = extract("2,5 kilos de nalga");
        assert_eq!(items, vec![item("2.5", Some(Unit::Weight), "nalga")]);
    }

    #[test]
    fn leading_article_is_stripped_and_case_folded() {
        let items = extract("10 Unidades LAS Bondiolas");
        assert_eq!(items, vec![item("10", Some(Unit::Unit), "bondiolas")]);
    }

    #[test]
    fn unit_prefix_inside_a_word_is_not_a_unit() {
        // "u" followed by more letters is the start of the description.
        let items = extract("4 uvas");
        assert_eq!(items, vec![item("4", None, "uvas")]);
    }

    #[test]
    fn text_before_first_quantity_is_ignored() {
        let items = extract("hola! mandame 5 kg de vacío, 1 cj pechuga");
        assert_eq!(
            items,
            vec![
                item("5", Some(Unit::Weight), "vacío"),
                item("1", Some(Unit::Case), "pechuga"),
            ]
        );
    }

    #[test]
    fn malformed_segments_are_dropped() {
        assert!(extract("0 kg picada").is_empty());
        assert!(extract("milanesa 2").is_empty());
        assert!(extract("2 kg").is_empty());
        assert!(extract("").is_empty());
        assert!(extract("sin numeros").is_empty());
    }

    #[test]
    fn bare_number_does_not_hide_the_next_head() {
        assert_eq!(extract("5 2 kg picada"), vec![item("2", Some(Unit::Weight), "picada")]);
        assert_eq!(
            extract("3 4 cj milanesas 1 kg nalga"),
            vec![
                item("4", Some(Unit::Case), "milanesas"),
                item("1", Some(Unit::Weight), "nalga"),
            ]
        );
    }

    #[test]
    fn digits_glued_to_words_are_not_heads() {
        let items = extract("2 cj coca 2x1");
        assert_eq!(items, vec![item("2", Some(Unit::Case), "coca 2x1")]);
    }

    #[test]
    fn quantity_parsing_requires_positive_numbers() {
        assert_eq!(parse_quantity("1,25"), Some(Decimal::new(125, 2)));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("0.0"), None);
    }
}
