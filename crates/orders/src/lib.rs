//! Orders domain module.
//!
//! This crate turns extracted message text into priced order lines and holds the
//! business rules for a customer's order, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod assemble;
pub mod extract;
pub mod line;
pub mod order;

pub use assemble::{assemble, resolve_unit, Assembly};
pub use extract::{extract, LineItem};
pub use line::{merge, merge_lines, LineKey, OrderLine};
pub use order::{
    AddLines, ConfirmOrder, LinesAdded, Order, OrderCommand, OrderConfirmed, OrderEvent,
    OrderStarted, OrderStatus, QuantityRemoved, RemoveQuantity,
};
