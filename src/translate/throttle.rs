use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between consecutive calls.
/// The first call passes immediately.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Wait until the next call is allowed, then mark it as made
    pub async fn ready(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn spaces_calls_by_interval() {
        let mut throttle = Throttle::new(Duration::from_millis(1000));
        let start = Instant::now();

        throttle.ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        throttle.ready().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1100));

        throttle.ready().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2000) && elapsed < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_wait_when_interval_already_passed() {
        let mut throttle = Throttle::new(Duration::from_millis(500));
        throttle.ready().await;
        tokio::time::sleep(Duration::from_millis(800)).await;

        let before = Instant::now();
        throttle.ready().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
