use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::time::Duration;

/// Minimum spacing between outbound provider calls.
///
/// Each instance owns its limiter, so two clients never throttle each other.
/// A zero interval disables throttling.
pub struct RequestThrottle {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    interval: Duration,
}

impl RequestThrottle {
    pub fn new(interval: Duration) -> Self {
        // One cell per interval with a burst of one
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);

        Self { limiter, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next call is allowed
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
