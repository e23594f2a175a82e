//! Domain events emitted by order-taking business operations.

pub mod event;

pub use event::Event;
