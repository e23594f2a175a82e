use chatorder_catalog::{CatalogEntry, CatalogMatcher, Unit};

use crate::extract::LineItem;
use crate::line::OrderLine;

/// Outcome of resolving extracted items against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assembly {
    /// Priced lines, in message order (not merged).
    pub items: Vec<OrderLine>,
    /// Descriptions that looked like items but matched no catalog entry.
    pub unknown: Vec<String>,
}

impl Assembly {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.unknown.is_empty()
    }
}

/// Unit precedence: what the customer typed, then the catalog's own unit, then per-unit.
pub fn resolve_unit(explicit: Option<Unit>, entry: &CatalogEntry) -> Unit {
    explicit
        .or_else(|| entry.unit_hint().unit())
        .unwrap_or(Unit::Unit)
}

/// Match every extracted item and price it from the catalog.
pub fn assemble(matcher: &CatalogMatcher<'_>, extracted: &[LineItem]) -> Assembly {
    let mut assembly = Assembly::default();

    for item in extracted {
        let Some(entry) = matcher.best_match(&item.description) else {
            assembly.unknown.push(item.description.clone());
            continue;
        };

        let unit = resolve_unit(item.unit, entry);
        // Extraction only yields positive quantities and the catalog rejects
        // negative prices, so this only fails for hand-built items.
        if let Ok(line) = OrderLine::new(entry.name(), item.quantity, unit, entry.price()) {
            assembly.items.push(line);
        }
    }

    assembly
}
