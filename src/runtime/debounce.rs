//! Debounced settling of rapidly changing inputs.
//!
//! Hosts feed every keystroke of a custom-token source (or a template being
//! edited) through a [`Debouncer`]; the callback fires once the input has
//! been quiet for the configured window, with only the latest value.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

pub struct Debouncer {
    tx: mpsc::UnboundedSender<String>,
}

impl Debouncer {
    /// Spawns the settling task. `on_settle` runs on the runtime after each
    /// quiet window; dropping the `Debouncer` flushes a pending value before
    /// the task exits.
    pub fn new<F>(quiet: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    Some(value) => {
                        tokio::select! {
                            next = rx.recv() => match next {
                                Some(newer) => pending = Some(newer),
                                None => {
                                    on_settle(value);
                                    break;
                                }
                            },
                            _ = sleep(quiet) => on_settle(value),
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Submits a new value, superseding any value still waiting to settle.
    pub fn submit(&self, value: impl Into<String>) {
        // Send fails only after the task exited, which only happens at
        // shutdown; losing the value is fine then.
        let _ = self.tx.send(value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn settles_only_the_latest_value() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::new(Duration::from_millis(100), move |v| {
            sink.lock().unwrap().push(v);
        });

        debouncer.submit("a");
        debouncer.submit("ab");
        debouncer.submit("abc");
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_again_after_each_quiet_window() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        let debouncer = Debouncer::new(Duration::from_millis(50), move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.submit("first");
        tokio::time::sleep(Duration::from_millis(80)).await;
        debouncer.submit("second");
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_flushes_the_pending_value() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::new(Duration::from_secs(60), move |v| {
            sink.lock().unwrap().push(v);
        });

        debouncer.submit("pending");
        drop(debouncer);
        tokio::task::yield_now().await;

        assert_eq!(*seen.lock().unwrap(), vec!["pending".to_string()]);
    }
}
