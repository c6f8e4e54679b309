//! Time abstraction.
//!
//! State machines never read a clock. They receive instants from the caller,
//! which lets simulations drive virtual time.

use std::{fmt::Debug, ops::Sub, time::Duration};

/// Monotonic instant accepted by the session state machines.
///
/// Implemented for any type with the required bounds, including
/// `std::time::Instant` and `tokio::time::Instant`.
pub trait Timestamp: Copy + Ord + Send + Sync + Debug + Sub<Output = Duration> {}

impl<T> Timestamp for T where T: Copy + Ord + Send + Sync + Debug + Sub<Output = Duration> {}
