//! Reconnect supervision: a single recurring retry timer.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Issues periodic reconnection attempts after an unexpected close.
///
/// Retries are not capped: the timer ticks at a fixed interval until a
/// successful open or an explicit disconnect cancels it.
pub(crate) struct ReconnectSupervisor {
    retry_interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl ReconnectSupervisor {
    pub(crate) fn new(retry_interval: Duration) -> Self {
        Self {
            retry_interval,
            timer: None,
        }
    }

    /// Whether a retry timer is currently armed.
    pub(crate) fn is_scheduled(&self) -> bool {
        self.timer.is_some()
    }

    /// Arm the retry timer unless one is already running.
    pub(crate) fn schedule_if_absent<F>(&mut self, retry: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.timer.is_some() {
            return;
        }
        let period = self.retry_interval;
        tracing::debug!(?period, "scheduling reconnect attempts");
        self.timer = Some(tokio::spawn(async move {
            // First tick a full period out, like every later one.
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                retry();
            }
        }));
    }

    /// Stop retrying and clear the timer. Idempotent.
    pub(crate) fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ReconnectSupervisor {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_retry_fires_repeatedly() {
        let attempts = Arc::new(AtomicU32::new(0));
        let mut supervisor = ReconnectSupervisor::new(Duration::from_millis(10));

        let attempts_clone = attempts.clone();
        supervisor.schedule_if_absent(move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(supervisor.is_scheduled());

        sleep(Duration::from_millis(100)).await;
        assert!(attempts.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_schedule_is_idempotent() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut supervisor = ReconnectSupervisor::new(Duration::from_millis(10));

        let first_clone = first.clone();
        supervisor.schedule_if_absent(move || {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = second.clone();
        supervisor.schedule_if_absent(move || {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(60)).await;
        assert!(first.load(Ordering::SeqCst) >= 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_retries() {
        let attempts = Arc::new(AtomicU32::new(0));
        let mut supervisor = ReconnectSupervisor::new(Duration::from_millis(10));

        let attempts_clone = attempts.clone();
        supervisor.schedule_if_absent(move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(35)).await;
        supervisor.cancel();
        assert!(!supervisor.is_scheduled());

        let after_cancel = attempts.load(Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), after_cancel);

        // Cancelling again is a no-op.
        supervisor.cancel();
    }

    #[tokio::test]
    async fn test_rearm_after_cancel() {
        let attempts = Arc::new(AtomicU32::new(0));
        let mut supervisor = ReconnectSupervisor::new(Duration::from_millis(10));

        let attempts_clone = attempts.clone();
        supervisor.schedule_if_absent(move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
        });
        supervisor.cancel();

        let attempts_clone = attempts.clone();
        supervisor.schedule_if_absent(move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
        });
        sleep(Duration::from_millis(50)).await;
        assert!(attempts.load(Ordering::SeqCst) >= 1);
    }
}
