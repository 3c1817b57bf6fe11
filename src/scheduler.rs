//! Single-shot debounce timer, one per search engine
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for the scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Coalesces bursts of requests into one action after a quiet interval.
///
/// At most one deadline is pending; arming again replaces it. The owner
/// polls, and a passed deadline is reported exactly once.
#[derive(Debug)]
pub struct DebounceScheduler<C: Clock = SystemClock> {
    clock: C,
    fire_at: Option<Instant>,
}

impl Default for DebounceScheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> DebounceScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            fire_at: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Arms the timer `delay` from now. Returns true when a pending deadline was replaced.
    pub fn start(&mut self, delay: Duration) -> bool {
        let replaced = self.fire_at.is_some();
        self.fire_at = Some(self.clock.now() + delay);
        replaced
    }

    pub fn reset(&mut self) {
        self.fire_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.fire_at.is_some()
    }

    /// Time left until the deadline, `None` when disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.fire_at
            .map(|at| at.saturating_duration_since(self.clock.now()))
    }

    /// True once the deadline has passed; the timer is disarmed by firing.
    pub fn poll(&mut self) -> bool {
        match self.fire_at {
            Some(at) if self.clock.now() >= at => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_once_after_delay() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::new(clock.clone());

        assert!(!scheduler.start(DELAY));
        assert!(!scheduler.poll());

        clock.advance(Duration::from_millis(299));
        assert!(!scheduler.poll());
        assert_eq!(scheduler.remaining(), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert!(scheduler.poll());
        assert!(!scheduler.poll());
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_restart_pushes_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::new(clock.clone());

        scheduler.start(DELAY);
        clock.advance(Duration::from_millis(200));
        assert!(scheduler.start(DELAY));

        clock.advance(Duration::from_millis(200));
        assert!(!scheduler.poll());
        clock.advance(Duration::from_millis(100));
        assert!(scheduler.poll());
    }

    #[test]
    fn test_reset_cancels() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::new(clock.clone());

        scheduler.start(DELAY);
        scheduler.reset();
        clock.advance(DELAY * 2);
        assert!(!scheduler.poll());
        assert_eq!(scheduler.remaining(), None);
    }

    #[test]
    fn test_instances_are_independent() {
        let clock = ManualClock::new();
        let mut first = DebounceScheduler::new(clock.clone());
        let mut second = DebounceScheduler::new(clock.clone());

        first.start(DELAY);
        second.start(DELAY * 2);
        clock.advance(DELAY);
        assert!(first.poll());
        assert!(!second.poll());
        clock.advance(DELAY);
        assert!(second.poll());
    }
}
