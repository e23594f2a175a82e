//! `chatorder-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every order-taking
//! module (no IO, no transport, no storage).

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::CustomerPhone;
