use chrono::{DateTime, Utc};

/// Something an aggregate decided happened.
///
/// Events are not stored: the order is persisted as a snapshot. They are applied
/// in memory and then logged by the conversation engine, one `info` record per
/// event carrying `event_type`, `event_version` and `occurred_at`.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name used as the log field, e.g. `orders.order.lines_added`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32;

    /// Business time of the message that caused the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
