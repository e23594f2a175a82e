use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use chatorder_catalog::{CatalogEntry, CatalogMatcher};
use chatorder_core::{Aggregate, AggregateRoot, CustomerPhone, DomainError};
use chatorder_customers::{Customer, DeliveryWindow, DeliveryWindowPolicy};
use chatorder_events::Event;
use chatorder_orders::{
    assemble, extract, resolve_unit, AddLines, ConfirmOrder, Order, OrderCommand, OrderLine,
    OrderStatus, RemoveQuantity,
};
use chatorder_text::squash;

use crate::intent::{
    is_cancellation, is_confirmation, is_greeting, is_warm_greeting, parse_removal,
    strip_add_prefix,
};
use crate::reply::{self, ClosedWindow, NextWindow};

/// What a message was taken to mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Outside the order-taking window; nothing else was considered.
    OutsideWindow,
    Confirm,
    /// Cancel or pause; the order is left as it is.
    Pause,
    Remove,
    Add,
    Greet,
    /// Item-shaped text that matched nothing in the catalog.
    NotSold,
    Unrecognized,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::OutsideWindow => "outside_window",
            Intent::Confirm => "confirm",
            Intent::Pause => "pause",
            Intent::Remove => "remove",
            Intent::Add => "add",
            Intent::Greet => "greet",
            Intent::NotSold => "not_sold",
            Intent::Unrecognized => "unrecognized",
        }
    }
}

impl core::fmt::Display for Intent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single replace-order write a message results in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWrite {
    pub phone: CustomerPhone,
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reply: String,
    pub write: Option<OrderWrite>,
    pub intent: Intent,
}

impl Outcome {
    fn reply(intent: Intent, reply: String) -> Self {
        Self {
            reply,
            write: None,
            intent,
        }
    }
}

/// Per-message decision logic.
#[derive(Debug, Clone, Default)]
pub struct ConversationEngine {
    policy: DeliveryWindowPolicy,
}

impl ConversationEngine {
    pub fn new(policy: DeliveryWindowPolicy) -> Self {
        Self { policy }
    }

    /// Decide the reply and the order write for one incoming message.
    ///
    /// `order` is the stored order for `phone`, if any; a stored order for another
    /// phone is treated as absent.
    pub fn handle_message<Tz: TimeZone>(
        &self,
        phone: &CustomerPhone,
        text: &str,
        customer: Option<&Customer>,
        catalog: &[CatalogEntry],
        order: Option<Order>,
        now: &DateTime<Tz>,
    ) -> Outcome {
        let name = customer.map(Customer::name).unwrap_or_default();
        let weekdays = customer.map(Customer::allowed_weekdays).unwrap_or_default();
        let text = squash(text);

        let window = self.policy.evaluate(now, weekdays);
        tracing::debug!(
            allowed = window.allowed,
            delivery_date = ?window.delivery_date,
            "order window evaluated"
        );
        if !window.allowed {
            let closed = self.closed_window(&window);
            return Outcome::reply(
                Intent::OutsideWindow,
                reply::outside_window(name, is_warm_greeting(&text), &closed),
            );
        }

        let order = order
            .filter(|o| o.phone() == phone)
            .unwrap_or_else(|| Order::empty(phone.clone()));
        let turn = Turn {
            phone,
            name,
            matcher: CatalogMatcher::new(catalog),
            occurred_at: now.with_timezone(&Utc),
        };

        if order.is_in_progress() {
            turn.edit(order, &text)
        } else {
            turn.start(order, &text)
        }
    }

    fn closed_window<Tz: TimeZone>(&self, window: &DeliveryWindow<Tz>) -> ClosedWindow {
        let next = match (&window.window_start, &window.window_end) {
            (Some(start), Some(end)) => Some(NextWindow {
                day: start.date_naive(),
                start: start.time(),
                end: end.time(),
            }),
            _ => None,
        };
        ClosedWindow {
            opens_at: self.policy.opens_at(),
            closes_at: self.policy.closes_at(),
            next,
        }
    }
}

/// Everything one message needs once the window check has passed.
struct Turn<'a> {
    phone: &'a CustomerPhone,
    name: &'a str,
    matcher: CatalogMatcher<'a>,
    occurred_at: DateTime<Utc>,
}

impl Turn<'_> {
    /// An order is in progress: confirm, pause, remove or add, in that order.
    fn edit(&self, mut order: Order, text: &str) -> Outcome {
        if is_confirmation(text) {
            let command = OrderCommand::ConfirmOrder(ConfirmOrder {
                phone: self.phone.clone(),
                occurred_at: self.occurred_at,
            });
            return match self.execute(&mut order, &command) {
                Ok(()) => self.persist(Intent::Confirm, reply::confirmed(self.name, order.lines()), &order),
                Err(_) => Outcome::reply(Intent::Unrecognized, reply::correction_hint()),
            };
        }

        if is_cancellation(text) {
            return Outcome::reply(Intent::Pause, reply::paused(self.name));
        }

        if let Some(removal) = parse_removal(text) {
            let Some(entry) = self.matcher.best_match(&removal.description) else {
                return Outcome::reply(Intent::Remove, reply::removal_unmatched(&removal.description));
            };
            let command = OrderCommand::RemoveQuantity(RemoveQuantity {
                phone: self.phone.clone(),
                product_name: entry.name().to_string(),
                unit: resolve_unit(removal.unit, entry),
                quantity: removal.quantity,
                occurred_at: self.occurred_at,
            });
            return match self.execute(&mut order, &command) {
                Ok(()) => self.persist(Intent::Remove, reply::removed(order.lines()), &order),
                Err(DomainError::NotFound) => Outcome::reply(Intent::Remove, reply::removal_not_in_order()),
                Err(_) => Outcome::reply(Intent::Remove, reply::correction_hint()),
            };
        }

        let segment = strip_add_prefix(text).unwrap_or(text);
        self.add(order, segment, reply::correction_hint())
    }

    /// No order yet: greet, or try to start one from the whole text.
    fn start(&self, order: Order, text: &str) -> Outcome {
        if is_greeting(text) {
            return Outcome::reply(Intent::Greet, reply::welcome(self.name));
        }
        self.add(order, text, reply::ask_for_items())
    }

    fn add(&self, mut order: Order, segment: &str, fallback: String) -> Outcome {
        let assembly = assemble(&self.matcher, &extract(segment));
        tracing::debug!(
            matched = assembly.items.len(),
            unknown = assembly.unknown.len(),
            "line items assembled"
        );

        if !assembly.items.is_empty() {
            let fresh = order.starts_fresh();
            let command = OrderCommand::AddLines(AddLines {
                phone: self.phone.clone(),
                lines: assembly.items,
                occurred_at: self.occurred_at,
            });
            if self.execute(&mut order, &command).is_err() {
                // Quantities too large to add up.
                return Outcome::reply(Intent::Unrecognized, reply::correction_hint());
            }
            let text = if fresh {
                reply::detected(order.lines())
            } else {
                reply::updated(order.lines())
            };
            return self.persist(Intent::Add, text, &order);
        }

        if !assembly.unknown.is_empty() {
            return Outcome::reply(Intent::NotSold, reply::not_sold(&assembly.unknown));
        }
        Outcome::reply(Intent::Unrecognized, fallback)
    }

    /// Run `command` against `order` and log every event it produced.
    fn execute(&self, order: &mut Order, command: &OrderCommand) -> Result<(), DomainError> {
        let events = order.execute(command).inspect_err(|e| {
            tracing::debug!(error = %e, "order command rejected");
        })?;
        for event in &events {
            tracing::info!(
                event_type = event.event_type(),
                event_version = event.version(),
                occurred_at = %event.occurred_at(),
                order_version = order.version(),
                "order event applied"
            );
        }
        Ok(())
    }

    fn persist(&self, intent: Intent, reply: String, order: &Order) -> Outcome {
        Outcome {
            reply,
            write: Some(OrderWrite {
                phone: self.phone.clone(),
                customer_name: self.name.to_string(),
                lines: order.lines().to_vec(),
                status: order.status(),
            }),
            intent,
        }
    }
}
