//! Global request spacing for the vocabulary service

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between consecutive outbound requests.
///
/// One throttle is shared by every worker, so the spacing holds in aggregate
/// no matter how many rows are in flight. The lock is held while waiting,
/// which queues callers in arrival order.
#[derive(Debug)]
pub struct RequestThrottle {
    spacing: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: Mutex::new(None),
        }
    }

    /// A throttle that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Wait until the next request slot is free, then claim it.
    pub async fn acquire(&self) {
        if self.spacing.is_zero() {
            return;
        }
        let mut next = self.next_slot.lock().await;
        if let Some(at) = *next {
            if at > Instant::now() {
                sleep_until(at).await;
            }
        }
        *next = Some(Instant::now() + self.spacing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let throttle = RequestThrottle::new(Duration::from_millis(200));
        let start = Instant::now();
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_acquires_are_spaced() {
        let throttle = RequestThrottle::new(Duration::from_millis(200));
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        throttle.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_holds_across_tasks() {
        let throttle = Arc::new(RequestThrottle::new(Duration::from_millis(100)));
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let t = Arc::clone(&throttle);
            handles.push(tokio::spawn(async move {
                t.acquire().await;
                Instant::now()
            }));
        }
        let mut stamps = Vec::new();
        for h in handles {
            stamps.push(h.await.unwrap());
        }
        stamps.sort();
        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlimited_never_waits() {
        let throttle = RequestThrottle::unlimited();
        let start = Instant::now();
        for _ in 0..10 {
            throttle.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
