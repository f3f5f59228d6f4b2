//! Fixed-period redraw timer.
//!
//! The scheduler does not own a thread. The event loop asks it for the next
//! deadline, sleeps until then, and calls [`Scheduler::poll`] when it wakes.
//! Each due poll fires once and schedules the next fire one period after the
//! moment it was observed, so late wakeups drift instead of catching up.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    next_fire: Option<Instant>,
    stopped: bool,
}

impl Scheduler {
    /// Start a timer whose first fire is one period after `now`.
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_fire: Some(now + period),
            stopped: false,
        }
    }

    /// When the loop should wake next; `None` once stopped.
    pub fn deadline(&self) -> Option<Instant> {
        self.next_fire
    }

    /// Returns `true` if a fire is due at `now`, and reschedules.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(due) if now >= due => {
                self.next_fire = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// Stop firing. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        self.next_fire = None;
        true
    }
}
