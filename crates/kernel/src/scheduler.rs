//! Virtual-clock timer queue for block decay and growth.
//!
//! Time only moves when the world is advanced, so transitions are
//! deterministic and testable without sleeping.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use blockfield_common::BlockPos;
use serde::{Deserialize, Serialize};

/// Cancellation handle for a scheduled timer. Ids increase monotonically, so
/// timers sharing a deadline fire in the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Grass covered from above; fires into dirt.
    Decay,
    /// Dirt exposed to the sky; fires into grass.
    Growth,
}

/// A pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub target: BlockPos,
    pub deadline: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Timer>,
    deadlines: HashMap<TimerId, Duration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, kind: TimerKind, target: BlockPos) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert(
            (deadline, id),
            Timer {
                id,
                kind,
                target,
                deadline,
            },
        );
        self.deadlines.insert(id, deadline);
        tracing::trace!(?id, ?kind, %target, ?deadline, "timer scheduled");
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        let removed = self.queue.remove(&(deadline, id));
        debug_assert!(removed.is_some(), "timer index out of sync for {id:?}");
        tracing::trace!(?id, "timer cancelled");
        true
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        let deadline = self.deadlines.get(&id)?;
        self.queue.get(&(*deadline, id))
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Pending timers in firing order.
    pub fn pending(&self) -> impl Iterator<Item = &Timer> {
        self.queue.values()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn next_due(&mut self, until: Duration) -> Option<Timer> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until {
            return None;
        }
        let timer = self.queue.remove(&key)?;
        self.deadlines.remove(&timer.id);
        self.now = self.now.max(timer.deadline);
        Some(timer)
    }

    /// Move the clock forward. Never moves it backwards.
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut s = Scheduler::new();
        let late = s.schedule(ms(300), TimerKind::Growth, BlockPos::new(1, 0, 0));
        let early = s.schedule(ms(100), TimerKind::Decay, BlockPos::ORIGIN);

        assert_eq!(s.next_due(ms(1000)).map(|t| t.id), Some(early));
        assert_eq!(s.now(), ms(100));
        assert_eq!(s.next_due(ms(1000)).map(|t| t.id), Some(late));
        assert_eq!(s.now(), ms(300));
        assert!(s.next_due(ms(1000)).is_none());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(50), TimerKind::Decay, BlockPos::new(0, 0, 0));
        let b = s.schedule(ms(50), TimerKind::Decay, BlockPos::new(1, 0, 0));
        assert_eq!(s.next_due(ms(50)).map(|t| t.id), Some(a));
        assert_eq!(s.next_due(ms(50)).map(|t| t.id), Some(b));
    }

    #[test]
    fn timers_after_horizon_stay_pending() {
        let mut s = Scheduler::new();
        let id = s.schedule(ms(500), TimerKind::Decay, BlockPos::ORIGIN);
        assert!(s.next_due(ms(499)).is_none());
        assert!(s.is_pending(id));
        assert_eq!(s.now(), Duration::ZERO);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = Scheduler::new();
        let id = s.schedule(ms(10), TimerKind::Growth, BlockPos::ORIGIN);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(!s.is_pending(id));
        assert!(s.next_due(ms(1000)).is_none());
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut s = Scheduler::new();
        s.advance_to(ms(1000));
        let id = s.schedule(ms(200), TimerKind::Decay, BlockPos::ORIGIN);
        assert_eq!(s.get(id).map(|t| t.deadline), Some(ms(1200)));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut s = Scheduler::new();
        s.advance_to(ms(100));
        s.advance_to(ms(40));
        assert_eq!(s.now(), ms(100));
    }
}
