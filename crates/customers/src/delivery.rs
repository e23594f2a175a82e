//! Order-taking window.
//!
//! Orders for a delivery day are taken on the calendar day before it, between
//! `opens_at` and `closes_at` local time. A customer with no delivery days can
//! order at any time.

use chrono::{Datelike, DateTime, Days, NaiveDate, NaiveTime, TimeZone, Weekday};

use chatorder_core::{DomainError, DomainResult};

/// Result of evaluating the policy at one instant. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryWindow<Tz: TimeZone> {
    pub allowed: bool,
    pub delivery_date: Option<NaiveDate>,
    pub window_start: Option<DateTime<Tz>>,
    pub window_end: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> DeliveryWindow<Tz> {
    fn open() -> Self {
        Self {
            allowed: true,
            delivery_date: None,
            window_start: None,
            window_end: None,
        }
    }
}

/// When orders may be placed, relative to a customer's delivery weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindowPolicy {
    opens_at: NaiveTime,
    closes_at: NaiveTime,
    lookahead_days: u32,
}

impl Default for DeliveryWindowPolicy {
    fn default() -> Self {
        Self {
            opens_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closes_at: NaiveTime::from_hms_opt(14, 30, 0).unwrap_or(NaiveTime::MIN),
            lookahead_days: 14,
        }
    }
}

impl DeliveryWindowPolicy {
    pub fn new(opens_at: NaiveTime, closes_at: NaiveTime, lookahead_days: u32) -> DomainResult<Self> {
        if opens_at >= closes_at {
            return Err(DomainError::validation(
                "order window must open before it closes",
            ));
        }
        Ok(Self {
            opens_at,
            closes_at,
            lookahead_days,
        })
    }

    pub fn opens_at(&self) -> NaiveTime {
        self.opens_at
    }

    pub fn closes_at(&self) -> NaiveTime {
        self.closes_at
    }

    pub fn lookahead_days(&self) -> u32 {
        self.lookahead_days
    }

    /// Decide whether `now` may place an order.
    ///
    /// Scans delivery candidates `today + k` for `k` in `0..=lookahead_days`. The
    /// first allowed weekday whose window contains `now` allows the order; the first
    /// whose window is still ahead of `now` rejects it and reports that window.
    /// Windows already past are skipped. With no candidate the policy fails open.
    pub fn evaluate<Tz: TimeZone>(&self, now: &DateTime<Tz>, weekdays: &[Weekday]) -> DeliveryWindow<Tz> {
        if weekdays.is_empty() {
            return DeliveryWindow::open();
        }

        let tz = now.timezone();
        let today = now.date_naive();

        for k in 0..=self.lookahead_days {
            let Some(delivery) = today.checked_add_days(Days::new(u64::from(k))) else {
                break;
            };
            if !weekdays.contains(&delivery.weekday()) {
                continue;
            }
            let Some(order_day) = delivery.pred_opt() else {
                continue;
            };

            // Local times that fall into a DST gap have no instant; skip that day.
            let (Some(start), Some(end)) = (
                tz.from_local_datetime(&order_day.and_time(self.opens_at)).earliest(),
                tz.from_local_datetime(&order_day.and_time(self.closes_at)).latest(),
            ) else {
                continue;
            };

            if *now >= start && *now <= end {
                return DeliveryWindow {
                    allowed: true,
                    delivery_date: Some(delivery),
                    window_start: Some(start),
                    window_end: Some(end),
                };
            }
            if *now < start {
                return DeliveryWindow {
                    allowed: false,
                    delivery_date: Some(delivery),
                    window_start: Some(start),
                    window_end: Some(end),
                };
            }
        }

        DeliveryWindow::open()
    }
}
