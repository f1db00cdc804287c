//! [`TimerService`] – periodic alarms and bounded blocking delays.
//!
//! Every sensing task arms one periodic alarm the first time it runs and
//! then polls it once per loop iteration.  [`TimerTable`] holds the deadline
//! bookkeeping so that any clock source (hardware tick counter, host
//! monotonic clock, simulated clock) can implement the trait by supplying
//! only "now".

use std::time::Duration;

/// Opaque handle to an armed periodic alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub usize);

/// Periodic alarms plus a blocking delay.
pub trait TimerService {
    /// Arm a new alarm that first fires `period` from now.
    fn arm_periodic(&mut self, period: Duration) -> TimerHandle;

    /// `true` once the alarm's deadline has passed.  Unknown handles never fire.
    fn has_fired(&self, handle: TimerHandle) -> bool;

    /// Push the alarm's deadline one period past now.
    fn rearm(&mut self, handle: TimerHandle);

    /// Block the caller for `duration`.
    fn delay(&mut self, duration: Duration);
}

// ────────────────────────────────────────────────────────────────────────────
// Deadline table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    deadline: Duration,
    period: Duration,
}

/// Deadline bookkeeping for a set of periodic alarms, expressed against an
/// externally supplied monotonic "now".
#[derive(Debug, Default, Clone)]
pub struct TimerTable {
    entries: Vec<TimerEntry>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an alarm whose first deadline is `now + period`.
    pub fn arm(&mut self, now: Duration, period: Duration) -> TimerHandle {
        self.entries.push(TimerEntry {
            deadline: now + period,
            period,
        });
        TimerHandle(self.entries.len() - 1)
    }

    pub fn fired(&self, now: Duration, handle: TimerHandle) -> bool {
        self.entries
            .get(handle.0)
            .is_some_and(|entry| now >= entry.deadline)
    }

    /// Move the deadline to `now + period`.  No-op for unknown handles.
    pub fn rearm(&mut self, now: Duration, handle: TimerHandle) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            entry.deadline = now + entry.period;
        }
    }

    /// Number of alarms armed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fresh_alarm_has_not_fired() {
        let mut table = TimerTable::new();
        let h = table.arm(ms(0), ms(125));
        assert!(!table.fired(ms(0), h));
        assert!(!table.fired(ms(124), h));
    }

    #[test]
    fn alarm_fires_at_deadline() {
        let mut table = TimerTable::new();
        let h = table.arm(ms(10), ms(100));
        assert!(table.fired(ms(110), h));
        assert!(table.fired(ms(500), h));
    }

    #[test]
    fn rearm_pushes_deadline_from_now() {
        let mut table = TimerTable::new();
        let h = table.arm(ms(0), ms(100));
        assert!(table.fired(ms(130), h));

        table.rearm(ms(130), h);
        assert!(!table.fired(ms(229), h));
        assert!(table.fired(ms(230), h));
    }

    #[test]
    fn alarms_are_independent() {
        let mut table = TimerTable::new();
        let fast = table.arm(ms(0), ms(10));
        let slow = table.arm(ms(0), ms(250));
        assert_eq!(table.len(), 2);

        assert!(table.fired(ms(10), fast));
        assert!(!table.fired(ms(10), slow));
    }

    #[test]
    fn unknown_handle_never_fires() {
        let mut table = TimerTable::new();
        assert!(table.is_empty());
        assert!(!table.fired(ms(1_000_000), TimerHandle(3)));
        // Must not panic.
        table.rearm(ms(0), TimerHandle(3));
    }

    #[test]
    fn zero_period_fires_every_poll() {
        let mut table = TimerTable::new();
        let h = table.arm(ms(5), Duration::ZERO);
        assert!(table.fired(ms(5), h));
        table.rearm(ms(5), h);
        assert!(table.fired(ms(5), h));
    }
}
