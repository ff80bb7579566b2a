//! Wall-clock source for adjustment timestamps

use chrono::Utc;
use std::cell::Cell;

pub const SECS_PER_HOUR: f64 = 3600.0;

/// Source of "now" in Unix epoch seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Hand-driven clock for simulating elapsed time
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    pub fn advance_hours(&self, hours: f64) {
        self.advance_secs(hours * SECS_PER_HOUR);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2023() {
        assert!(SystemClock.now() > 1_700_000_000.0);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1000.0);
        clock.advance_secs(10.0);
        assert_eq!(clock.now(), 1010.0);

        clock.advance_hours(1.0);
        assert_eq!(clock.now(), 4610.0);

        clock.set(5.0);
        assert_eq!(clock.now(), 5.0);
    }
}
