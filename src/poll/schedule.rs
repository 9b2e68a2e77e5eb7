//! Backoff schedules: attempt number -> delay before the next probe.
//!
//! The attempt number passed to [`Interval::delay`] is the count of attempts
//! that have already failed, so the first retry asks for `delay(1)`. The
//! first probe never consults the schedule; it waits `initial_delay`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(15);

/// Caller-supplied schedule function.
pub type IntervalFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// How long to wait between failed attempts.
#[derive(Clone, Default)]
pub enum Interval {
    /// 10s for attempts 1-3, 15s for 4-6, 20s for 7-10, 30s beyond.
    #[default]
    Tiered,
    /// Same delay after every failure.
    Fixed(Duration),
    /// Arbitrary schedule.
    Custom(IntervalFn),
}

impl Interval {
    /// Wrap a closure as a custom schedule.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Delay to wait after `attempt` failed attempts.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Tiered => tiered_delay(attempt),
            Self::Fixed(d) => *d,
            Self::Custom(f) => f(attempt),
        }
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiered => f.write_str("Tiered"),
            Self::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// The default tiered schedule.
#[must_use]
pub fn tiered_delay(attempt: u32) -> Duration {
    let secs = match attempt {
        0..=3 => 10,
        4..=6 => 15,
        7..=10 => 20,
        _ => 30,
    };
    Duration::from_secs(secs)
}

/// Attempt/delay settings for one controller.
#[derive(Clone, Debug)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub interval: Interval,
}

impl PollConfig {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: Interval::Tiered,
        }
    }
}

/// Human-readable delay for progress strings: whole seconds when exact,
/// milliseconds otherwise.
#[must_use]
pub fn describe_delay(delay: Duration) -> String {
    if delay.subsec_millis() == 0 && delay.as_secs() > 0 {
        format!("{}s", delay.as_secs())
    } else {
        format!("{}ms", delay.as_millis())
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
