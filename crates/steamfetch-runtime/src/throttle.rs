//! Rate limiting for progress events.

use std::time::{Duration, Instant};

/// Minimum spacing between emitted progress events.
const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

/// Limits how often progress events reach the broadcast channel.
///
/// SteamCMD can print progress lines far faster than browsers care to
/// repaint. State updates are never throttled, only the events.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Whether enough time has passed to emit again. The first call always
    /// returns true.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
