use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

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

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

/// Identifies one scheduling of a [`PendingTask`]. Stale once the task is rescheduled or
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    generation: u64,
}

/// A single cancellable deadline slot.
///
/// Scheduling again supersedes the previous deadline, which is what both debouncing (restart the
/// window on every request) and the parse timeout race (one deadline per parse) need.
#[derive(Debug, Default)]
pub struct PendingTask {
    generation: u64,
    deadline: Option<Instant>,
}

impl PendingTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant) -> TaskHandle {
        self.generation += 1;
        self.deadline = Some(deadline);
        TaskHandle {
            generation: self.generation,
        }
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_current(&self, handle: TaskHandle) -> bool {
        self.deadline.is_some() && handle.generation == self.generation
    }

    /// Fires the task if its deadline has passed. The slot is empty afterwards.
    pub fn take_due(&mut self, now: Instant) -> Option<TaskHandle> {
        let deadline = self.deadline?;
        if deadline > now {
            return None;
        }
        self.deadline = None;
        Some(TaskHandle {
            generation: self.generation,
        })
    }

    /// Settles a race against the deadline: `true` when the work behind `handle` finished
    /// before the deadline. A stale handle never wins.
    pub fn finish(&mut self, handle: TaskHandle, now: Instant) -> bool {
        if !self.is_current(handle) {
            return false;
        }
        let in_time = self.deadline.is_some_and(|deadline| now < deadline);
        self.cancel();
        in_time
    }
}
