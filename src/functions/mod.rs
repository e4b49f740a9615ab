//! Invocation logic for the two scheduled functions.
//!
//! - `logger`   — i3logger: battery/odometer metrics + token cache cycle
//! - `notifier` — charge-notifier: SMS + email when charging completes

pub mod logger;
pub mod notifier;

pub use logger::{InvocationSummary, Logger};
pub use notifier::ChargeNotifier;
