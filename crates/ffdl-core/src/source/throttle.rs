//! Minimum spacing between page requests.

use std::time::{Duration, Instant};

/// Enforces `min_interval` between successive calls to [`Throttle::wait`].
/// The first call never sleeps.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Sleep until `min_interval` has passed since the previous call, then mark now.
    /// Returns how long it slept.
    pub fn wait(&mut self) -> Duration {
        let slept = match self.last {
            Some(last) => {
                let remaining = self.min_interval.saturating_sub(last.elapsed());
                if !remaining.is_zero() {
                    std::thread::sleep(remaining);
                }
                remaining
            }
            None => Duration::ZERO,
        };
        self.last = Some(Instant::now());
        slept
    }
}
