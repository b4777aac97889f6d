use crate::client::InterviewClient;
use crate::protocol::ReadyQuestions;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` polls until the backend is ready or the poll is cancelled.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PollError {
    #[error("polling cancelled")]
    Cancelled,
    #[error("questions not ready after {attempts} status checks")]
    Exhausted { attempts: u32 },
}

/// Asks the backend for readiness until it reports a usable question set.
///
/// Transport failures, error statuses and undecodable bodies count the same
/// as "not ready yet": the next check happens after `settings.interval`.
pub async fn poll_until_ready(
    client: &InterviewClient,
    session_id: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<ReadyQuestions, PollError> {
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        attempts += 1;
        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            status = client.interview_status(session_id) => status,
        };

        match status {
            Ok(status) => match status.ready_questions() {
                Some(ready) => {
                    info!(
                        session_id,
                        attempts,
                        total_questions = ready.total_questions,
                        "questions ready"
                    );
                    return Ok(ready);
                }
                None => debug!(
                    session_id,
                    attempts,
                    message = status.message.as_deref().unwrap_or(""),
                    "questions not ready"
                ),
            },
            Err(err) => warn!(session_id, attempts, error = %err, "status check failed"),
        }

        if settings.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(PollError::Exhausted { attempts });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}

/// Handle to a background poll. Dropping it cancels the poll.
pub struct Poller {
    cancel: CancellationToken,
}

impl Poller {
    /// Spawns `poll_until_ready` and forwards its result through `sender`,
    /// tagged by `wrap`. Nothing is sent once the poll has been cancelled.
    pub fn spawn<E, F>(
        client: InterviewClient,
        session_id: String,
        settings: PollSettings,
        sender: mpsc::Sender<E>,
        wrap: F,
    ) -> Self
    where
        E: Send + 'static,
        F: FnOnce(Result<ReadyQuestions, PollError>) -> E + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            let result = poll_until_ready(&client, &session_id, &settings, &token).await;
            if matches!(result, Err(PollError::Cancelled)) {
                debug!(session_id = %session_id, "poll cancelled");
                return;
            }
            let _ = sender.send(wrap(result)).await;
        });

        Self { cancel }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
