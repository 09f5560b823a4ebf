use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiet period before a burst of edits turns into a lookup
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(400);

/// A single armed timer. Dropping the handle cancels it.
#[derive(Debug)]
pub struct DebounceHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl DebounceHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for DebounceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Coalesces input bursts into one callback after a quiet period
///
/// At most one timer is armed at a time. Arming again replaces (and aborts)
/// the previous timer. Every timer carries a generation number; an elapse
/// that raced with a re-arm is rejected by [`Debouncer::claim`].
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    generation: u64,
    pending: Option<DebounceHandle>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            generation: 0,
            pending: None,
        }
    }

    /// Arm a fresh timer, cancelling any pending one.
    ///
    /// `on_elapsed` runs on the runtime with the timer's generation once the
    /// quiet period passes without another call to `schedule` or `cancel`.
    pub fn schedule<F>(&mut self, on_elapsed: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let quiet_period = self.quiet_period;

        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            on_elapsed(generation);
        });

        // replacing the handle aborts the previous timer
        self.pending = Some(DebounceHandle { generation, task });
        generation
    }

    /// Cancel the pending timer, returns whether one was armed
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept an elapse notification if it belongs to the timer still armed.
    pub fn claim(&mut self, generation: u64) -> bool {
        match &self.pending {
            Some(handle) if handle.generation() == generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn debouncer_with_channel() -> (Debouncer, mpsc::UnboundedSender<u64>, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(DEFAULT_QUIET_PERIOD), tx, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_last_generation() {
        let (mut debouncer, tx, mut rx) = debouncer_with_channel();

        for _ in 0..3 {
            let tx = tx.clone();
            debouncer.schedule(move |g| {
                let _ = tx.send(g);
            });
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(rx.try_recv().ok(), Some(3));
        assert!(rx.try_recv().is_err());
        assert!(debouncer.claim(3));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_callback() {
        let (mut debouncer, tx, mut rx) = debouncer_with_channel();

        debouncer.schedule(move |g| {
            let _ = tx.send(g);
        });
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_debouncer_releases_timer() {
        let (mut debouncer, tx, mut rx) = debouncer_with_channel();

        debouncer.schedule(move |g| {
            let _ = tx.send(g);
        });
        drop(debouncer);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_rejected() {
        let mut debouncer = Debouncer::new(DEFAULT_QUIET_PERIOD);
        let first = debouncer.schedule(|_| {});
        let second = debouncer.schedule(|_| {});

        assert!(!debouncer.claim(first));
        assert!(debouncer.claim(second));
        assert!(!debouncer.claim(second));
    }
}
