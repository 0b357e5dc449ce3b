//! Time sources for the metrics store

use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Source of wall-clock time in milliseconds since epoch
pub trait Clock {
    fn now_millis(&self) -> i64;

    /// Current time as a UTC datetime
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_millis())
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the store.
#[derive(Clone)]
pub struct ManualClock {
    millis: Rc<Cell<i64>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Rc::new(Cell::new(millis)),
        }
    }

    /// Create a clock frozen at the given datetime
    pub fn at(time: DateTime<Utc>) -> Self {
        Self::new(time.timestamp_millis())
    }

    /// Move the clock forward
    pub fn advance(&self, millis: i64) {
        self.millis.set(self.millis.get() + millis);
    }

    /// Jump to an absolute instant
    pub fn set(&self, millis: i64) {
        self.millis.set(millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.get()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("millis", &self.millis.get())
            .finish()
    }
}
