//! Customers module.
//!
//! Customers are read-only records owned by the external store. This crate
//! models them together with the delivery-window policy that decides when
//! a customer may place an order.

pub mod customer;
pub mod delivery;

pub use customer::{parse_weekday, weekday_name, Customer};
pub use delivery::{DeliveryWindow, DeliveryWindowPolicy};
