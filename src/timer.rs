use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// `MM:SS`, zero-padded. Minutes keep growing past 59.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Elapsed-seconds counter for the question on screen.
///
/// The tick task only ever increments the shared counter, so the display can
/// read it from the UI thread without coordination.
#[derive(Default)]
pub struct QuestionTimer {
    elapsed: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl QuestionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts from zero. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        self.elapsed.store(0, Ordering::SeqCst);

        let elapsed = Arc::clone(&self.elapsed);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        }));
        debug!("question timer started");
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(elapsed = self.elapsed_secs(), "question timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn display(&self) -> String {
        format_time(self.elapsed_secs())
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
