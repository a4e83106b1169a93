//! Busy gate for the loading indicator.
//!
//! Counts requests started vs. completed and notifies subscribers when a
//! request begins and when the last in-flight request finishes.

pub mod gate;
pub mod status;

pub use gate::{BusyGate, BusyTicket, SubscriptionId};
pub use status::GateSnapshot;
