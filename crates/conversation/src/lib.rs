//! Conversation module.
//!
//! A pure state machine: given the stored order, the customer, the catalog and
//! one incoming message, decide what the message means, which single order
//! write (if any) follows from it, and what to reply. No IO happens here.

pub mod engine;
pub mod intent;
pub mod reply;

pub use engine::{ConversationEngine, Intent, OrderWrite, Outcome};
pub use intent::{
    is_cancellation, is_confirmation, is_greeting, is_warm_greeting, parse_removal, strip_add_prefix,
    Removal,
};
