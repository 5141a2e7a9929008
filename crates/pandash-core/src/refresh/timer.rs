use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a running fixed-interval ticker.
///
/// The first tick fires one full period after start. Stopping is idempotent
/// and also happens when the handle is dropped.
#[derive(Debug)]
pub struct RefreshTimer {
    cancel_token: CancellationToken,
    period: Duration,
}

impl RefreshTimer {
    /// Spawn a ticker that sends `make()` on `tx` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<M, F>(period: Duration, tx: mpsc::UnboundedSender<M>, make: F) -> Self
    where
        M: Send + 'static,
        F: Fn() -> M + Send + 'static,
    {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if tx.send(make()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel_token,
            period,
        }
    }

    /// Stop ticking. Safe to call more than once.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Whether the ticker is still running.
    pub fn is_running(&self) -> bool {
        !self.cancel_token.is_cancelled()
    }

    /// Tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RefreshTimer::start(Duration::from_secs(5), tx.clone(), || 7_u32);
        let started = Instant::now();

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        assert!(timer.is_running());
        assert_eq!(timer.period(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RefreshTimer::start(Duration::from_secs(5), tx.clone(), || ());

        assert_eq!(rx.recv().await, Some(()));
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());

        let next = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(next.is_err(), "no tick after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(RefreshTimer::start(Duration::from_secs(1), tx.clone(), || ()));

        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(next.is_err());
    }
}
