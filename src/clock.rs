//! Time source abstraction.
//!
//! The acquisition engine compares sample timestamps against "now" for its
//! staleness filter and session deadline. Hiding the time source behind a
//! trait lets tests drive the engine with fixed timestamps instead of the
//! wall clock.

use chrono::{DateTime, Utc};

/// Provides the current time to the acquisition engine
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
