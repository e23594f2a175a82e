use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chatorder_core::{DomainError, DomainResult};

/// Regex alternation of every unit word customers type after a quantity.
///
/// Longer spellings come first so leftmost-first matching picks them.
pub const UNIT_PATTERN: &str =
    r"kgrs|kgr|kgs|kg\.|kg|kilos|kilo|cjs|cajas|caja|cj|unidades|unidad|unid|u";

/// Unit an order line is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Sold by weight (kilograms).
    #[serde(rename = "KG")]
    Weight,
    /// Sold by the case/box.
    #[serde(rename = "CJ")]
    Case,
    /// Sold per piece.
    #[serde(rename = "UN")]
    Unit,
}

impl Unit {
    /// Short label used in replies and by the data API.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Weight => "KG",
            Unit::Case => "CJ",
            Unit::Unit => "UN",
        }
    }

    /// Map a unit word typed by a customer (`kg`, `kilos`, `cajas`, `unid`, …).
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().trim_end_matches('.').to_lowercase();
        match token.as_str() {
            "kg" | "kgs" | "kgr" | "kgrs" | "kilo" | "kilos" => Some(Unit::Weight),
            "cj" | "cjs" | "caja" | "cajas" => Some(Unit::Case),
            "u" | "un" | "unid" | "unidad" | "unidades" => Some(Unit::Unit),
            _ => None,
        }
    }

    /// Parse a stored label (`KG`, `CJ`, `UN`; `UNI`/`U` accepted).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "KG" => Some(Unit::Weight),
            "CJ" => Some(Unit::Case),
            "UN" | "UNI" | "U" => Some(Unit::Unit),
            _ => None,
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a catalog entry declares for itself, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitHint {
    Weight,
    Case,
    Unit,
    #[default]
    Unspecified,
}

impl UnitHint {
    /// Read the free-form "medida" column of the catalog sheet.
    ///
    /// Anything mentioning KG, CJ or UNI wins in that order; the rest is unspecified.
    pub fn from_measure(measure: &str) -> Self {
        let measure = measure.to_uppercase();
        if measure.contains("KG") {
            UnitHint::Weight
        } else if measure.contains("CJ") {
            UnitHint::Case
        } else if measure.contains("UNI") {
            UnitHint::Unit
        } else {
            UnitHint::Unspecified
        }
    }

    pub fn unit(self) -> Option<Unit> {
        match self {
            UnitHint::Weight => Some(Unit::Weight),
            UnitHint::Case => Some(Unit::Case),
            UnitHint::Unit => Some(Unit::Unit),
            UnitHint::Unspecified => None,
        }
    }
}

/// A sellable product as listed in the catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    name: String,
    unit_hint: UnitHint,
    price: Decimal,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, unit_hint: UnitHint, price: Decimal) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("catalog entry name cannot be empty"));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::validation("catalog entry price cannot be negative"));
        }
        Ok(Self {
            name,
            unit_hint,
            price,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_hint(&self) -> UnitHint {
        self.unit_hint
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}
