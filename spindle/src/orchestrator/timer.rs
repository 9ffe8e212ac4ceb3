//! The local tick schedule.

use std::time::Duration;
use tokio::time::Instant;

/// When the next timer round is due.
///
/// The schedule is re-armed after each round completes, so `interval` is a
/// floor on the spacing between rounds. Missed ticks are not caught up.
#[derive(Debug)]
pub struct TimerSchedule {
    interval: Duration,
    next: Option<Instant>,
    ticks: u64,
}

impl TimerSchedule {
    /// A disarmed schedule.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
            ticks: 0,
        }
    }

    /// Schedule the next round one interval from now.
    pub fn arm(&mut self) {
        self.next = Some(Instant::now() + self.interval);
    }

    /// When the next round is due, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }

    /// Disarm and return the 1-based number of the round that is due.
    pub fn fire(&mut self) -> u64 {
        self.next = None;
        self.ticks += 1;
        self.ticks
    }

    /// Number of rounds fired so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Spacing between rounds.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
