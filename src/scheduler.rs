//! Single-threaded virtual-time timer queue.
//!
//! All animation timers live here. Time only moves when the host calls
//! [`Scheduler::pop_due`] / [`Scheduler::advance_to`], so animations are
//! deterministic and fully cancelable: a cancelled timer is never returned
//! again, and timer ids are never reused.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Smallest interval period; keeps a zero period from spinning forever.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Timeout,
    Interval(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    due: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: HashMap<TimerId, Timer>,
    // Entries of cancelled timers stay queued and are skipped when popped.
    queue: BinaryHeap<Reverse<(Duration, TimerId)>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fires once, `delay` from now.
    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.insert(TimerKind::Timeout, delay)
    }

    /// Fires every `period`, first one `period` from now.
    pub fn set_interval(&mut self, period: Duration) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(TimerKind::Interval(period), period)
    }

    /// Cancels a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pops the next timer due at or before `until`, moving the clock to
    /// its due time. Intervals are re-armed before being returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        while let Some(Reverse((due, id))) = self.queue.peek().copied() {
            let live = self.timers.get(&id).is_some_and(|timer| timer.due == due);
            if !live {
                self.queue.pop();
                continue;
            }
            if due > until {
                return None;
            }

            self.queue.pop();
            self.now = self.now.max(due);
            match self.timers[&id].kind {
                TimerKind::Timeout => {
                    self.timers.remove(&id);
                }
                TimerKind::Interval(period) => {
                    let next = due + period;
                    if let Some(timer) = self.timers.get_mut(&id) {
                        timer.due = next;
                    }
                    self.queue.push(Reverse((next, id)));
                }
            }
            return Some(id);
        }
        None
    }

    /// Moves the clock forward to `until` once every due timer has been
    /// popped.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay;
        self.timers.insert(id, Timer { kind, due });
        self.queue.push(Reverse((due, id)));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(scheduler: &mut Scheduler, until: Duration) -> Vec<(TimerId, Duration)> {
        let mut fired = Vec::new();
        while let Some(id) = scheduler.pop_due(until) {
            fired.push((id, scheduler.now()));
        }
        scheduler.advance_to(until);
        fired
    }

    #[test]
    fn timeout_fires_once() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.set_timeout(ms(500));

        assert!(drain(&mut scheduler, ms(499)).is_empty());
        assert_eq!(drain(&mut scheduler, ms(1000)), vec![(id, ms(500))]);
        assert_eq!(scheduler.now(), ms(1000));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn interval_repeats_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.set_interval(ms(100));

        let fired = drain(&mut scheduler, ms(350));
        assert_eq!(fired, vec![(id, ms(100)), (id, ms(200)), (id, ms(300))]);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(drain(&mut scheduler, ms(10_000)).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn simultaneous_timers_fire_in_creation_order() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.set_timeout(ms(100));
        let b = scheduler.set_interval(ms(100));
        let fired: Vec<TimerId> = drain(&mut scheduler, ms(100)).into_iter().map(|f| f.0).collect();
        assert_eq!(fired, vec![a, b]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.set_timeout(ms(1));
        scheduler.cancel(first);
        let second = scheduler.set_timeout(ms(1));
        assert_ne!(first, second);
        assert!(!scheduler.is_pending(first));
        assert!(scheduler.is_pending(second));
    }

    #[test]
    fn timers_set_during_dispatch_are_relative_to_fire_time() {
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(ms(100));
        assert!(scheduler.pop_due(ms(1000)).is_some());
        let follow_up = scheduler.set_timeout(ms(500));
        assert_eq!(drain(&mut scheduler, ms(1000)), vec![(follow_up, ms(600))]);
    }
}
