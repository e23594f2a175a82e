use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chatorder_catalog::Unit;
use chatorder_core::{Aggregate, AggregateRoot, CustomerPhone, DomainError, DomainResult};
use chatorder_events::Event;

use crate::line::{merge, merge_lines, LineKey, OrderLine};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Nothing ordered yet in this conversation.
    #[default]
    NoOrder,
    Pending,
    Confirmed,
}

/// Aggregate root: a customer's active order, keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    phone: CustomerPhone,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    version: u64,
}

impl Order {
    /// A conversation with no order yet.
    pub fn empty(phone: CustomerPhone) -> Self {
        Self {
            phone,
            status: OrderStatus::NoOrder,
            lines: Vec::new(),
            version: 0,
        }
    }

    /// Rebuild an order from what the store returned.
    ///
    /// Lines are re-merged and non-positive quantities dropped, so the aggregate
    /// invariants hold even for data written by older clients.
    pub fn restore(phone: CustomerPhone, status: OrderStatus, lines: Vec<OrderLine>) -> DomainResult<Self> {
        let lines = merge_lines(lines.iter().filter(|l| l.quantity > Decimal::ZERO))?;
        Ok(Self {
            phone,
            status,
            lines,
            version: 0,
        })
    }

    pub fn phone(&self) -> &CustomerPhone {
        &self.phone
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Whether incoming text should be read as edits to this order.
    ///
    /// True while pending, and also for any order that still has lines whatever
    /// its nominal status.
    pub fn is_in_progress(&self) -> bool {
        self.status == OrderStatus::Pending || !self.lines.is_empty()
    }

    /// Whether new items start a fresh order instead of merging into this one.
    pub fn starts_fresh(&self) -> bool {
        match self.status {
            OrderStatus::Pending => false,
            OrderStatus::Confirmed => true,
            OrderStatus::NoOrder => self.lines.is_empty(),
        }
    }

    pub fn line(&self, key: &LineKey) -> Option<&OrderLine> {
        self.lines.iter().find(|l| &l.key() == key)
    }
}

impl AggregateRoot for Order {
    type Id = CustomerPhone;

    fn id(&self) -> &Self::Id {
        &self.phone
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddLines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLines {
    pub phone: CustomerPhone,
    pub lines: Vec<OrderLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveQuantity {
    pub phone: CustomerPhone,
    pub product_name: String,
    pub unit: Unit,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOrder {
    pub phone: CustomerPhone,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    AddLines(AddLines),
    RemoveQuantity(RemoveQuantity),
    ConfirmOrder(ConfirmOrder),
}

/// Event: OrderStarted (a fresh order replaces whatever was there).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStarted {
    pub phone: CustomerPhone,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LinesAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesAdded {
    pub phone: CustomerPhone,
    pub lines: Vec<OrderLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRemoved {
    pub phone: CustomerPhone,
    pub product_name: String,
    pub unit: Unit,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub phone: CustomerPhone,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderStarted(OrderStarted),
    LinesAdded(LinesAdded),
    QuantityRemoved(QuantityRemoved),
    OrderConfirmed(OrderConfirmed),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderStarted(_) => "orders.order.started",
            OrderEvent::LinesAdded(_) => "orders.order.lines_added",
            OrderEvent::QuantityRemoved(_) => "orders.order.quantity_removed",
            OrderEvent::OrderConfirmed(_) => "orders.order.confirmed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderStarted(e) => e.occurred_at,
            OrderEvent::LinesAdded(e) => e.occurred_at,
            OrderEvent::QuantityRemoved(e) => e.occurred_at,
            OrderEvent::OrderConfirmed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderStarted(_) => {
                self.lines.clear();
                self.status = OrderStatus::Pending;
            }
            OrderEvent::LinesAdded(e) => {
                // `handle_add_lines` only emits merges that fit.
                if let Ok(lines) = merge(&self.lines, &e.lines) {
                    self.lines = lines;
                }
                self.status = OrderStatus::Pending;
            }
            OrderEvent::QuantityRemoved(e) => {
                let key = LineKey::new(&e.product_name, e.unit);
                for line in self.lines.iter_mut().filter(|l| l.key() == key) {
                    line.quantity = (line.quantity - e.quantity).max(Decimal::ZERO);
                }
                self.lines.retain(|l| l.quantity > Decimal::ZERO);
                self.status = OrderStatus::Pending;
            }
            OrderEvent::OrderConfirmed(_) => {
                self.status = OrderStatus::Confirmed;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::AddLines(cmd) => self.handle_add_lines(cmd),
            OrderCommand::RemoveQuantity(cmd) => self.handle_remove_quantity(cmd),
            OrderCommand::ConfirmOrder(cmd) => self.handle_confirm(cmd),
        }
    }
}

impl Order {
    fn ensure_phone(&self, phone: &CustomerPhone) -> Result<(), DomainError> {
        if &self.phone != phone {
            return Err(DomainError::invariant("phone mismatch"));
        }
        Ok(())
    }

    fn handle_add_lines(&self, cmd: &AddLines) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_phone(&cmd.phone)?;

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("no lines to add"));
        }
        if cmd.lines.iter().any(|l| l.quantity <= Decimal::ZERO) {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let fresh = self.starts_fresh();
        let base: &[OrderLine] = if fresh { &[] } else { &self.lines };
        merge(base, &cmd.lines)?;

        let mut events = Vec::with_capacity(2);
        if fresh {
            events.push(OrderEvent::OrderStarted(OrderStarted {
                phone: cmd.phone.clone(),
                occurred_at: cmd.occurred_at,
            }));
        }
        events.push(OrderEvent::LinesAdded(LinesAdded {
            phone: cmd.phone.clone(),
            lines: cmd.lines.clone(),
            occurred_at: cmd.occurred_at,
        }));
        Ok(events)
    }

    fn handle_remove_quantity(
        &self,
        cmd: &RemoveQuantity,
    ) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_phone(&cmd.phone)?;

        if cmd.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let key = LineKey::new(&cmd.product_name, cmd.unit);
        if self.line(&key).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![OrderEvent::QuantityRemoved(QuantityRemoved {
            phone: cmd.phone.clone(),
            product_name: cmd.product_name.clone(),
            unit: cmd.unit,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmOrder) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_phone(&cmd.phone)?;

        // Confirmation persists the current lines as they are, even when empty.
        Ok(vec![OrderEvent::OrderConfirmed(OrderConfirmed {
            phone: cmd.phone.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_phone() -> CustomerPhone {
        "5491122334455".parse().unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn line(name: &str, qty: i64, unit: Unit) -> OrderLine {
        OrderLine::new(name, Decimal::new(qty, 0), unit, Decimal::new(1000, 0)).unwrap()
    }

    fn add(lines: Vec<OrderLine>) -> OrderCommand {
        OrderCommand::AddLines(AddLines {
            phone: test_phone(),
            lines,
            occurred_at: test_time(),
        })
    }

    fn remove(name: &str, qty: i64, unit: Unit) -> OrderCommand {
        OrderCommand::RemoveQuantity(RemoveQuantity {
            phone: test_phone(),
            product_name: name.to_string(),
            unit,
            quantity: Decimal::new(qty, 0),
            occurred_at: test_time(),
        })
    }

    fn confirm() -> OrderCommand {
        OrderCommand::ConfirmOrder(ConfirmOrder {
            phone: test_phone(),
            occurred_at: test_time(),
        })
    }

    fn pending_order(lines: Vec<OrderLine>) -> Order {
        Order::restore(test_phone(), OrderStatus::Pending, lines).unwrap()
    }

    #[test]
    fn first_add_starts_order_and_merges_lines() {
        let mut order = Order::empty(test_phone());
        let events = order
            .execute(&add(vec![
                line("Picada Especial", 20, Unit::Weight),
                line("picada especial", 5, Unit::Weight),
            ]))
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], OrderEvent::OrderStarted(_)));
        assert_eq!(events[0].event_type(), "orders.order.started");
        assert_eq!(events[1].event_type(), "orders.order.lines_added");
        assert_eq!(events[1].version(), 1);
        assert_eq!(events[0].occurred_at(), events[1].occurred_at());

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.lines(), &[line("Picada Especial", 25, Unit::Weight)]);
        assert_eq!(order.version(), 2);
    }

    #[test]
    fn add_to_pending_order_merges_without_restart() {
        let mut order = pending_order(vec![line("Pechuga", 2, Unit::Unit)]);
        let events = order
            .execute(&add(vec![line("Pechuga", 3, Unit::Unit)]))
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(order.lines(), &[line("Pechuga", 5, Unit::Unit)]);
    }

    #[test]
    fn add_after_confirmation_starts_fresh_order() {
        let mut order = Order::restore(
            test_phone(),
            OrderStatus::Confirmed,
            vec![line("Pechuga", 2, Unit::Unit)],
        )
        .unwrap();
        order.execute(&add(vec![line("Nalga", 1, Unit::Weight)])).unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.lines(), &[line("Nalga", 1, Unit::Weight)]);
    }

    #[test]
    fn add_rejects_empty_batch() {
        let order = Order::empty(test_phone());
        let err = order.handle(&add(vec![])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn removing_less_than_quantity_reduces_line() {
        let mut order = pending_order(vec![line("Milanesa Mediana", 5, Unit::Case)]);
        order.execute(&remove("milanesa mediana", 2, Unit::Case)).unwrap();

        assert_eq!(order.lines(), &[line("Milanesa Mediana", 3, Unit::Case)]);
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn removing_at_least_quantity_drops_line() {
        let mut order = pending_order(vec![
            line("Milanesa Mediana", 5, Unit::Case),
            line("Pechuga", 1, Unit::Unit),
        ]);
        order.execute(&remove("Milanesa Mediana", 7, Unit::Case)).unwrap();

        assert_eq!(order.lines(), &[line("Pechuga", 1, Unit::Unit)]);
    }

    #[test]
    fn removing_a_line_not_in_order_is_not_found() {
        let order = pending_order(vec![line("Milanesa Mediana", 5, Unit::Case)]);
        let err = order.handle(&remove("Milanesa Mediana", 1, Unit::Weight)).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn removal_on_confirmed_order_reopens_it() {
        let mut order = Order::restore(
            test_phone(),
            OrderStatus::Confirmed,
            vec![line("Pechuga", 4, Unit::Unit)],
        )
        .unwrap();
        order.execute(&remove("Pechuga", 1, Unit::Unit)).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.lines(), &[line("Pechuga", 3, Unit::Unit)]);
    }

    #[test]
    fn confirm_keeps_lines_exactly() {
        let lines = vec![line("Pechuga", 4, Unit::Unit), line("Nalga", 2, Unit::Weight)];
        let mut order = pending_order(lines.clone());
        order.execute(&confirm()).unwrap();

        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.lines(), lines.as_slice());
    }

    #[test]
    fn confirm_with_zero_lines_succeeds() {
        let mut order = pending_order(vec![]);
        order.execute(&confirm()).unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.lines().is_empty());
    }

    #[test]
    fn commands_for_another_phone_are_rejected() {
        let order = Order::empty("5491100000000".parse().unwrap());
        let err = order.handle(&confirm()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn restore_upholds_line_invariants() {
        let mut zero = line("Nalga", 1, Unit::Weight);
        zero.quantity = Decimal::ZERO;
        let order = Order::restore(
            test_phone(),
            OrderStatus::Pending,
            vec![line("Pechuga", 1, Unit::Unit), zero, line("PECHUGA", 2, Unit::Unit)],
        )
        .unwrap();
        assert_eq!(order.lines(), &[line("Pechuga", 3, Unit::Unit)]);
        assert_eq!(order.version(), 0);
    }

    #[test]
    fn restore_rejects_lines_whose_sum_overflows() {
        let mut huge = line("Pechuga", 1, Unit::Unit);
        huge.quantity = Decimal::MAX;
        let err = Order::restore(test_phone(), OrderStatus::Pending, vec![huge.clone(), huge]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn add_rejects_quantities_that_overflow_the_line() {
        let mut huge = line("Pechuga", 1, Unit::Unit);
        huge.quantity = Decimal::MAX;
        let mut order = pending_order(vec![huge.clone()]);
        let before = order.clone();

        let err = order.execute(&add(vec![huge.clone()])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(order, before);

        // The same batch on a fresh order only has to fit on its own.
        let mut fresh = Order::empty(test_phone());
        fresh.execute(&add(vec![huge])).unwrap();
        assert_eq!(fresh.lines()[0].quantity, Decimal::MAX);
    }

    #[test]
    fn in_progress_and_fresh_rules() {
        assert!(!Order::empty(test_phone()).is_in_progress());
        assert!(Order::empty(test_phone()).starts_fresh());
        assert!(pending_order(vec![]).is_in_progress());
        let confirmed = Order::restore(
            test_phone(),
            OrderStatus::Confirmed,
            vec![line("Pechuga", 1, Unit::Unit)],
        )
        .unwrap();
        assert!(confirmed.is_in_progress());
        assert!(confirmed.starts_fresh());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let order = pending_order(vec![line("Pechuga", 4, Unit::Unit)]);
        let before = order.clone();

        let events1 = order.handle(&remove("Pechuga", 1, Unit::Unit)).unwrap();
        let events2 = order.handle(&remove("Pechuga", 1, Unit::Unit)).unwrap();

        assert_eq!(order, before);
        assert_eq!(events1.len(), events2.len());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: removal reduces or drops a line, never leaves it at zero.
            #[test]
            fn removal_reduces_or_drops(current in 1i64..1000, removed in 1i64..1500) {
                let mut order = pending_order(vec![line("Pechuga", current, Unit::Unit)]);
                order.execute(&remove("Pechuga", removed, Unit::Unit)).unwrap();

                if removed >= current {
                    prop_assert!(order.lines().is_empty());
                } else {
                    prop_assert_eq!(order.lines().len(), 1);
                    prop_assert_eq!(order.lines()[0].quantity, Decimal::new(current - removed, 0));
                }
                prop_assert!(order.lines().iter().all(|l| l.quantity > Decimal::ZERO));
            }

            /// Property: replaying the same events yields the same state.
            #[test]
            fn apply_is_deterministic(qty in 1i64..1000) {
                let events = Order::empty(test_phone())
                    .handle(&add(vec![line("Nalga", qty, Unit::Weight)]))
                    .unwrap();

                let mut first = Order::empty(test_phone());
                let mut second = Order::empty(test_phone());
                for event in &events {
                    first.apply(event);
                    second.apply(event);
                }
                prop_assert_eq!(first, second);
            }
        }
    }
}
