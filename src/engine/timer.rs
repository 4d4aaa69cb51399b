//! Scheduler - Interval timers on a manually advanced clock
//!
//! Models the event loop's `setInterval`/`clearInterval`. Time only moves when
//! the owner calls [`Scheduler::advance`], which makes timer-driven state
//! machines deterministic under test.
//!
//! # Pattern
//!
//! - `set_interval` arms a timer and returns its id
//! - The callback returns [`TimerControl::Cancel`] to release its own timer
//! - `clear_interval` is idempotent; clearing an already released timer is a no-op
//! - Callbacks run with no scheduler borrow held, so they may arm or clear timers
//! - The clock saturates at `u64::MAX`; an interval whose next due time would
//!   pass it fires one last time and is released

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

// =============================================================================
// TYPES
// =============================================================================

/// Handle for an armed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer callback wants to happen to its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerControl {
    Continue,
    Cancel,
}

type TimerCallback = Rc<dyn Fn() -> TimerControl>;

struct Interval {
    period_ms: u64,
    next_due: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct SchedulerInner {
    now_ms: u64,
    intervals: BTreeMap<TimerId, Interval>,
    next_id: u64,
}

impl SchedulerInner {
    /// Earliest interval due at or before `deadline`. Ties resolve by arming order.
    fn next_due(&self, deadline: u64) -> Option<(TimerId, u64)> {
        self.intervals
            .iter()
            .filter(|(_, interval)| interval.next_due <= deadline)
            .min_by_key(|(id, interval)| (interval.next_due, **id))
            .map(|(id, interval)| (*id, interval.next_due))
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// Shared handle to the timer queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Number of armed intervals.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().intervals.len()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner.borrow().intervals.contains_key(&id)
    }

    /// Arm an interval firing every `period_ms` (minimum 1ms).
    pub fn set_interval<F>(&self, period_ms: u64, callback: F) -> TimerId
    where
        F: Fn() -> TimerControl + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let period_ms = period_ms.max(1);
        let next_due = inner.now_ms.saturating_add(period_ms);
        inner.intervals.insert(
            id,
            Interval {
                period_ms,
                next_due,
                callback: Rc::new(callback),
            },
        );
        tracing::debug!(?id, period_ms, "interval armed");
        id
    }

    /// Release an interval. Returns `false` if it was not armed.
    pub fn clear_interval(&self, id: TimerId) -> bool {
        let removed = self.inner.borrow_mut().intervals.remove(&id).is_some();
        if removed {
            tracing::debug!(?id, "interval cleared");
        }
        removed
    }

    /// Advance the clock by `ms`, firing every interval that comes due.
    ///
    /// Returns the number of callbacks invoked.
    pub fn advance(&self, ms: u64) -> usize {
        let deadline = self.now_ms().saturating_add(ms);
        let mut fired = 0;

        loop {
            let (id, callback) = {
                let mut inner = self.inner.borrow_mut();
                let Some((id, due)) = inner.next_due(deadline) else {
                    break;
                };
                inner.now_ms = due;
                let Some(interval) = inner.intervals.get_mut(&id) else {
                    break;
                };
                let callback = interval.callback.clone();
                match due.checked_add(interval.period_ms) {
                    Some(next) => interval.next_due = next,
                    None => {
                        inner.intervals.remove(&id);
                        tracing::debug!(?id, "interval expired at clock limit");
                    }
                }
                (id, callback)
            };

            fired += 1;
            if callback() == TimerControl::Cancel {
                self.clear_interval(id);
            }
        }

        self.inner.borrow_mut().now_ms = deadline;
        fired
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now_ms", &inner.now_ms)
            .field("active", &inner.intervals.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_interval_fires_per_period() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        scheduler.set_interval(10, move || {
            c.set(c.get() + 1);
            TimerControl::Continue
        });

        assert_eq!(scheduler.advance(9), 0);
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(scheduler.advance(35), 3);
        assert_eq!(count.get(), 4);
        assert_eq!(scheduler.now_ms(), 45);
    }

    #[test]
    fn test_cancel_releases_interval() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        scheduler.set_interval(5, move || {
            c.set(c.get() + 1);
            if c.get() == 2 {
                TimerControl::Cancel
            } else {
                TimerControl::Continue
            }
        });

        scheduler.advance(100);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_clear_interval_is_idempotent() {
        let scheduler = Scheduler::new();
        let id = scheduler.set_interval(10, || TimerControl::Continue);
        assert!(scheduler.is_active(id));
        assert!(scheduler.clear_interval(id));
        assert!(!scheduler.clear_interval(id));
        assert_eq!(scheduler.advance(50), 0);
    }

    #[test]
    fn test_callback_may_clear_other_timer() {
        let scheduler = Scheduler::new();
        let victim_calls = Rc::new(Cell::new(0));

        let vc = victim_calls.clone();
        let victim = scheduler.set_interval(10, move || {
            vc.set(vc.get() + 1);
            TimerControl::Continue
        });

        let sched = scheduler.clone();
        scheduler.set_interval(5, move || {
            sched.clear_interval(victim);
            TimerControl::Cancel
        });

        scheduler.advance(30);
        assert_eq!(victim_calls.get(), 0);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_arm_after_clock_saturates() {
        let scheduler = Scheduler::new();
        scheduler.advance(u64::MAX);
        assert_eq!(scheduler.now_ms(), u64::MAX);

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = scheduler.set_interval(10, move || {
            c.set(c.get() + 1);
            TimerControl::Continue
        });
        assert!(scheduler.is_active(id));

        // Due at the clock limit: fires once, then cannot be rescheduled
        assert_eq!(scheduler.advance(50), 1);
        assert_eq!(scheduler.now_ms(), u64::MAX);
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_active(id));
    }

    #[test]
    fn test_interval_near_clock_limit_fires_once_then_expires() {
        let scheduler = Scheduler::new();
        scheduler.advance(u64::MAX - 15);

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = scheduler.set_interval(10, move || {
            c.set(c.get() + 1);
            TimerControl::Continue
        });

        assert_eq!(scheduler.advance(u64::MAX), 1);
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_active(id));
        assert_eq!(scheduler.now_ms(), u64::MAX);
    }

    #[test]
    fn test_zero_period_clamps_to_one() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        scheduler.set_interval(0, move || {
            c.set(c.get() + 1);
            TimerControl::Continue
        });
        scheduler.advance(3);
        assert_eq!(count.get(), 3);
    }
}
