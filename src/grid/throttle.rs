//! Pacing between rooms.
//!
//! The runner calls the throttle once after every room. Swapping the
//! implementation changes the pacing without touching the per-cell work.

use log::debug;
use std::thread;
use std::time::Duration;

use crate::config::ThrottleSettings;

pub trait Throttle {
    /// Called after `processed` rooms have completed (1-based).
    fn after_room(&mut self, processed: usize);
}

/// Never pauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn after_room(&mut self, _processed: usize) {}
}

/// Sleeps for `pause` after every `every` rooms.
#[derive(Clone, Copy, Debug)]
pub struct PauseEvery {
    every: usize,
    pause: Duration,
}

impl PauseEvery {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }

    /// True if a pause is due after `processed` rooms.
    pub fn is_due(&self, processed: usize) -> bool {
        self.every > 0 && processed > 0 && processed % self.every == 0
    }
}

impl From<ThrottleSettings> for PauseEvery {
    fn from(settings: ThrottleSettings) -> Self {
        Self::new(settings.every, Duration::from_millis(settings.pause_ms))
    }
}

impl Throttle for PauseEvery {
    fn after_room(&mut self, processed: usize) {
        if self.is_due(processed) {
            debug!("Processed {} rooms, pausing {:?}", processed, self.pause);
            thread::sleep(self.pause);
        }
    }
}
