//! [`IntervalTimer`] – lazily armed periodic alarm.
//!
//! Each sensing task owns one.  The alarm is armed the first time the task
//! is polled, so that first poll never reports "due"; from then on every
//! poll after the period has elapsed reports "due" once and re-arms.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bbc_hal::sim::SimWorld;
//! use bbc_kernel::IntervalTimer;
//!
//! let world = SimWorld::new();
//! let mut hw = world.peripherals();
//! let mut interval = IntervalTimer::new(Duration::from_millis(100));
//!
//! assert!(!interval.poll(hw.timers.as_mut()));   // arms
//! world.advance(Duration::from_millis(100));
//! assert!(interval.poll(hw.timers.as_mut()));    // due, re-armed
//! assert!(!interval.poll(hw.timers.as_mut()));
//! ```

use std::time::Duration;

use bbc_hal::{TimerHandle, TimerService};

#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    handle: Option<TimerHandle>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns `true` when the period has elapsed since the last arming.
    pub fn poll(&mut self, timers: &mut dyn TimerService) -> bool {
        match self.handle {
            None => {
                self.handle = Some(timers.arm_periodic(self.period));
                false
            }
            Some(handle) if timers.has_fired(handle) => {
                timers.rearm(handle);
                true
            }
            Some(_) => false,
        }
    }
}
