//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Phone number of the customer a conversation belongs to.
///
/// Conversations and orders are keyed by the sender's phone as delivered by the
/// messaging channel. Only surrounding and inner whitespace is removed; the
/// channel's own formatting (`+54 9 11 …`, `whatsapp:+549…`) is otherwise kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerPhone(String);

impl CustomerPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CustomerPhone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CustomerPhone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DomainError::invalid_id("CustomerPhone: empty"));
        }
        Ok(Self(compact))
    }
}

impl TryFrom<String> for CustomerPhone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CustomerPhone> for String {
    fn from(value: CustomerPhone) -> Self {
        value.0
    }
}
