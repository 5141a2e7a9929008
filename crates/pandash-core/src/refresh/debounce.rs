use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Trailing-edge debouncer.
///
/// Each [`schedule`](Self::schedule) replaces the pending call. The message is
/// built with the generation it was scheduled under so the receiver can check
/// [`is_current`](Self::is_current) and ignore anything that slipped into the
/// channel before a later schedule or cancel.
#[derive(Debug)]
pub struct Debouncer<M> {
    delay: Duration,
    tx: mpsc::UnboundedSender<M>,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl<M: Send + 'static> Debouncer<M> {
    /// Create a debouncer posting to `tx` after `delay` of quiet.
    pub const fn new(delay: Duration, tx: mpsc::UnboundedSender<M>) -> Self {
        Self {
            delay,
            tx,
            generation: 0,
            pending: None,
        }
    }

    /// Replace any pending call with a new one. Returns its generation.
    pub fn schedule<F>(&mut self, build: F) -> u64
    where
        F: FnOnce(u64) -> M,
    {
        self.cancel();
        let generation = self.generation;
        let message = build(generation);

        let token = CancellationToken::new();
        let guard = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = guard.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(message);
                }
            }
        });

        self.pending = Some(token);
        generation
    }

    /// Drop the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether `generation` belongs to the latest scheduled call.
    pub const fn is_current(&self, generation: u64) -> bool {
        self.pending.is_some() && self.generation == generation
    }

    /// Mark the current call as delivered.
    pub fn fired(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Debounce delay.
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_last_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500), tx);

        for word in ["r", "ru", "rus"] {
            debouncer.schedule(|g| (g, word));
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        let last = debouncer.schedule(|g| (g, "rust"));

        let (generation, word) = rx.recv().await.unwrap();
        assert_eq!(word, "rust");
        assert_eq!(generation, last);
        assert!(debouncer.fired(generation));
        assert!(!debouncer.fired(generation));

        let extra = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(extra, Err(_) | Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500), tx.clone());

        let generation = debouncer.schedule(|g| g);
        debouncer.cancel();
        assert!(!debouncer.is_current(generation));

        let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel::<u64>();
        let mut debouncer = Debouncer::new(Duration::from_millis(500), tx);

        let first = debouncer.schedule(|g| g);
        let second = debouncer.schedule(|g| g);
        assert_ne!(first, second);
        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));
        assert_eq!(debouncer.delay(), Duration::from_millis(500));
    }
}
