//! Delay source for readiness polling

use async_trait::async_trait;
use std::time::Duration;

/// Something that can suspend the caller for a while
///
/// The provisioner never calls `tokio::time::sleep` directly so that tests
/// can count and skip its waits.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock delays on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_sleeps_for_duration() {
        let start = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_secs(10)).await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }
}
