//! Blocking waits used by the countdown and prompt operations.

use std::time::Duration;

/// Blocks the calling thread.
pub trait Sleeper {
    /// Sleep for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
