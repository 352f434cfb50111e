use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

enum Command {
    Touch,
    Flush(oneshot::Sender<()>),
}

type Slot<T> = Arc<Mutex<Option<T>>>;

fn lock<T>(slot: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trailing-edge debouncer with a single pending slot.
///
/// Every `schedule` replaces the pending value and restarts the timer. The
/// sink runs with the latest value once `delay` passes with no further
/// schedule. Dropping the handle writes whatever is still pending.
pub struct Debouncer<T> {
    pending: Slot<T>,
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task on the current tokio runtime
    pub fn spawn<F, Fut>(delay: Duration, mut sink: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let pending: Slot<T> = Arc::default();
        let slot = pending.clone();

        let task = tokio::spawn(async move {
            let mut armed = false;
            let timer = sleep(delay);
            tokio::pin!(timer);

            loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(Command::Touch) => {
                            armed = true;
                            timer.as_mut().reset(Instant::now() + delay);
                        }
                        Some(Command::Flush(ack)) => {
                            armed = false;
                            let value = lock(&slot).take();
                            if let Some(value) = value {
                                sink(value).await;
                            }
                            let _ = ack.send(());
                        }
                        None => {
                            let value = lock(&slot).take();
                            if let Some(value) = value {
                                sink(value).await;
                            }
                            break;
                        }
                    },
                    () = &mut timer, if armed => {
                        armed = false;
                        let value = lock(&slot).take();
                        if let Some(value) = value {
                            sink(value).await;
                        }
                    }
                }
            }
        });

        Self { pending, tx, task }
    }

    /// Replace the pending value and restart the delay window
    pub fn schedule(&self, value: T) {
        self.schedule_with(|pending| *pending = Some(value));
    }

    /// Edit the pending slot in place and restart the delay window. The
    /// slot is `None` when nothing is waiting to be written.
    pub fn schedule_with<F>(&self, edit: F)
    where
        F: FnOnce(&mut Option<T>),
    {
        edit(&mut lock(&self.pending));
        if self.tx.send(Command::Touch).is_err() {
            tracing::warn!("debounce task has stopped, dropping scheduled value");
        }
    }

    /// Run the sink now if a value is pending; resolves after it finished
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush the pending value and wait for the timer task to exit
    pub async fn shutdown(self) {
        let Self { tx, task, .. } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "debounce task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(u32, Instant)>>>;

    fn recorder(delay: Duration) -> (Debouncer<u32>, Log) {
        let log: Log = Arc::default();
        let sink_log = log.clone();
        let debouncer = Debouncer::spawn(delay, move |value| {
            let log = sink_log.clone();
            async move {
                log.lock().unwrap().push((value, Instant::now()));
            }
        });
        (debouncer, log)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_coalesce_into_one_write() {
        let delay = Duration::from_millis(500);
        let (debouncer, log) = recorder(delay);

        for value in 1..=5 {
            debouncer.schedule(value);
            sleep(Duration::from_millis(100)).await;
        }
        assert!(log.lock().unwrap().is_empty());

        sleep(Duration::from_millis(600)).await;

        let writes = log.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_waits_full_window_after_last_schedule() {
        let delay = Duration::from_millis(500);
        let (debouncer, log) = recorder(delay);

        debouncer.schedule(1);
        sleep(Duration::from_millis(300)).await;
        let last_schedule = Instant::now();
        debouncer.schedule(2);

        sleep(Duration::from_millis(499)).await;
        assert!(log.lock().unwrap().is_empty());

        sleep(Duration::from_millis(2)).await;
        let writes = log.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].1 - last_schedule >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_write_separately() {
        let (debouncer, log) = recorder(Duration::from_millis(500));

        debouncer.schedule(1);
        sleep(Duration::from_millis(700)).await;
        debouncer.schedule(2);
        sleep(Duration::from_millis(700)).await;

        let values: Vec<u32> = log.lock().unwrap().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let (debouncer, log) = recorder(Duration::from_secs(60));

        debouncer.schedule(7);
        debouncer.flush().await;
        assert_eq!(log.lock().unwrap().len(), 1);

        // Nothing pending: flush is a no-op
        debouncer.flush().await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_with_edits_pending_value_in_place() {
        let delay = Duration::from_millis(500);
        let (debouncer, log) = recorder(delay);

        debouncer.schedule(10);
        for _ in 0..3 {
            debouncer.schedule_with(|pending| {
                if let Some(value) = pending.as_mut() {
                    *value += 1;
                }
            });
            sleep(Duration::from_millis(100)).await;
        }
        assert!(log.lock().unwrap().is_empty());

        sleep(delay).await;
        let values: Vec<u32> = log.lock().unwrap().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![13]);

        // Slot was emptied by the write
        debouncer.schedule_with(|pending| assert!(pending.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_writes_pending_value() {
        let (debouncer, log) = recorder(Duration::from_secs(60));

        debouncer.schedule(3);
        debouncer.shutdown().await;

        let values: Vec<u32> = log.lock().unwrap().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![3]);
    }
}
