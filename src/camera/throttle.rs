use web_time::{Duration, Instant};

/// Admits at most one event per interval. Events inside the window are
/// rejected, not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Throttle with the given minimum spacing.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Throttle with a spacing in milliseconds.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Minimum spacing between admitted events.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Admit an event at `now` if the window since the last admitted one
    /// has elapsed.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let open = match self.last {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.interval),
        };
        if open {
            self.last = Some(now);
        }
        open
    }

    /// Forget the last admitted event.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
