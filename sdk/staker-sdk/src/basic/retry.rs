use std::time::Duration;

/// Delay between consecutive attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// Doubles after every failed attempt, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

/// How many times an operation may be attempted and how long to wait in between.
///
/// `max_attempts: None` retries forever, which is the default for both the
/// chain-info fetch and the per-chunk rebuild cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn unbounded(backoff: Backoff) -> Self {
        Self {
            max_attempts: None,
            backoff,
        }
    }

    pub fn bounded(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            backoff,
        }
    }

    /// Whether attempt number `attempt` (1-based) is still allowed
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(d) => d,
            Backoff::Exponential { initial, max } => {
                let shift = attempt.saturating_sub(1).min(31);
                initial.saturating_mul(1u32 << shift).min(max)
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(Backoff::Fixed(Duration::ZERO))
    }
}
