use shelfsync_config::MIN_THROTTLE_MS;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Spaces out consecutive requests by at least `delay`.
///
/// The first request goes out immediately; each later one waits until
/// `delay` has passed since the previous one started. Delays shorter than
/// [`MIN_THROTTLE_MS`] are raised to it.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        let floor = Duration::from_millis(MIN_THROTTLE_MS);
        if delay < floor {
            tracing::warn!(?delay, ?floor, "Throttle delay too short, using the minimum");
        }
        Self {
            delay: delay.max(floor),
            last: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            sleep_until(previous + self.delay).await;
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_spaced_out() {
        let throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_delay_has_a_floor() {
        assert_eq!(Throttle::new(Duration::ZERO).delay(), Duration::from_millis(MIN_THROTTLE_MS));
        assert_eq!(Throttle::new(Duration::from_secs(3)).delay(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_still_spaces_requests() {
        let throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(MIN_THROTTLE_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_slow_request() {
        let throttle = Throttle::new(Duration::from_secs(1));
        throttle.wait().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
