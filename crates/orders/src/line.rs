use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chatorder_catalog::Unit;
use chatorder_core::{DomainError, DomainResult};
use chatorder_text::squash;

/// Order line: product, quantity, unit, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    /// Price copied from the catalog at the time the line was added.
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(
        product_name: impl Into<String>,
        quantity: Decimal,
        unit: Unit,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        let product_name = product_name.into();
        if product_name.trim().is_empty() {
            return Err(DomainError::validation("product_name cannot be empty"));
        }
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        Ok(Self {
            product_name,
            quantity,
            unit,
            unit_price,
        })
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(&self.product_name, self.unit)
    }
}

/// Merge identity of a line: normalized product name + unit.
///
/// Two fields rather than a joined string, so no name/unit pair can collide with
/// another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    name: String,
    unit: Unit,
}

impl LineKey {
    pub fn new(product_name: &str, unit: Unit) -> Self {
        Self {
            name: squash(product_name),
            unit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// Aggregate lines by `LineKey`, summing quantities.
///
/// The first line seen for a key keeps its position, display name and price.
/// A sum that does not fit in a `Decimal` is a validation error.
pub fn merge_lines<'a>(lines: impl IntoIterator<Item = &'a OrderLine>) -> DomainResult<Vec<OrderLine>> {
    let mut positions: HashMap<LineKey, usize> = HashMap::new();
    let mut merged: Vec<OrderLine> = Vec::new();

    for line in lines {
        match positions.get(&line.key()) {
            Some(&idx) => {
                let target = &mut merged[idx];
                target.quantity = target
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| DomainError::validation("quantity too large"))?;
            }
            None => {
                positions.insert(line.key(), merged.len());
                merged.push(line.clone());
            }
        }
    }

    Ok(merged)
}

/// Merge `incoming` into `existing`.
pub fn merge(existing: &[OrderLine], incoming: &[OrderLine]) -> DomainResult<Vec<OrderLine>> {
    merge_lines(existing.iter().chain(incoming))
}
