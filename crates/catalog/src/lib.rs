//! Product catalog module.
//!
//! Catalog entries are an immutable per-request snapshot owned by the external
//! store; this crate only describes them and matches free text against them
//! (no IO, no HTTP, no storage).

pub mod entry;
pub mod matcher;

pub use entry::{CatalogEntry, Unit, UnitHint, UNIT_PATTERN};
pub use matcher::{jaccard, CatalogMatcher, Scored, ACCEPTANCE_THRESHOLD};
