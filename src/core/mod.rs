//! Services and infrastructure shared by the ledger and reminder layers.

pub mod clock;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
