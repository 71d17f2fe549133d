use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Collapses bursts of calls into one.
///
/// Holds a single pending slot and a timer. Every `schedule` aborts the
/// pending timer and re-arms it with the new value, so the sink fires at most
/// once per quiescence window and always with the latest value. Must be used
/// from within a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    sink: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, sink: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Debouncer {
            delay,
            pending: Mutex::new(None),
            sink: Arc::new(sink),
        }
    }

    pub fn schedule(&self, value: T) {
        let mut slot = self.pending.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink(value);
        }));
    }

    /// Drops the pending call, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_debouncer(delay_ms: u64) -> (Debouncer<String>, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink_calls = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |query: String| {
            sink_calls.lock().push(query);
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_value() {
        let (debouncer, calls) = recording_debouncer(150);

        debouncer.schedule("o".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.schedule("on".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.schedule("ony".to_string());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*calls.lock(), vec!["ony".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_windows_fire_separately() {
        let (debouncer, calls) = recording_debouncer(150);

        debouncer.schedule("drake".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.schedule("raptor".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(*calls.lock(), vec!["drake".to_string(), "raptor".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let (debouncer, calls) = recording_debouncer(150);

        debouncer.schedule("proto".to_string());
        assert!(debouncer.is_pending());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(calls.lock().is_empty());
    }
}
