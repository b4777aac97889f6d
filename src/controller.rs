use crate::client::{ClientError, InterviewClient};
use crate::poller::{PollError, PollSettings, Poller};
use crate::protocol::{
    AnswerOutcome, FeedbackPayload, FinalResults, ReadyQuestions, SubmitAnswerRequest,
};
use crate::session::{InterviewConfig, Phase, SessionState};
use crate::timer::QuestionTimer;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const EMPTY_ANSWER_ALERT: &str = "Please provide an answer before submitting.";
pub const START_FAILED_ALERT: &str = "Error starting interview session";
pub const SUBMIT_FAILED_ALERT: &str = "Error submitting answer";
pub const POLL_EXHAUSTED_ALERT: &str = "Question generation did not finish in time";

/// Results of background work, delivered to the UI thread. Each carries the
/// epoch of the session that spawned it.
#[derive(Debug)]
pub enum AppEvent {
    SessionCreated {
        epoch: u64,
        session_id: String,
    },
    StartFailed {
        epoch: u64,
        error: ClientError,
    },
    Polled {
        epoch: u64,
        result: Result<ReadyQuestions, PollError>,
    },
    AnswerScored {
        epoch: u64,
        feedback: FeedbackPayload,
        outcome: AnswerOutcome,
    },
    SubmitFailed {
        epoch: u64,
        error: ClientError,
    },
}

impl AppEvent {
    fn epoch(&self) -> u64 {
        match self {
            AppEvent::SessionCreated { epoch, .. }
            | AppEvent::StartFailed { epoch, .. }
            | AppEvent::Polled { epoch, .. }
            | AppEvent::AnswerScored { epoch, .. }
            | AppEvent::SubmitFailed { epoch, .. } => *epoch,
        }
    }
}

/// What handling an event changed, for the parts of the screen the
/// controller does not own.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Ignored,
    Refreshed,
    Entered(Phase),
    NextQuestion,
}

pub struct SessionController {
    client: InterviewClient,
    poll: PollSettings,
    phase: Phase,
    config: Option<InterviewConfig>,
    session: SessionState,
    question: Option<String>,
    feedback: Option<FeedbackPayload>,
    results: Option<FinalResults>,
    timer: QuestionTimer,
    poller: Option<Poller>,
    alert: Option<String>,
    submitting: bool,
    epoch: u64,
    sender: mpsc::Sender<AppEvent>,
    receiver: mpsc::Receiver<AppEvent>,
}

impl SessionController {
    pub fn new(client: InterviewClient, poll: PollSettings) -> Self {
        let (sender, receiver) = mpsc::channel(100);

        Self {
            client,
            poll,
            phase: Phase::Setup,
            config: None,
            session: SessionState::new(),
            question: None,
            feedback: None,
            results: None,
            timer: QuestionTimer::new(),
            poller: None,
            alert: None,
            submitting: false,
            epoch: 0,
            sender,
            receiver,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> Option<&InterviewConfig> {
        self.config.as_ref()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn feedback(&self) -> Option<&FeedbackPayload> {
        self.feedback.as_ref()
    }

    pub fn results(&self) -> Option<&FinalResults> {
        self.results.as_ref()
    }

    pub fn timer(&self) -> &QuestionTimer {
        &self.timer
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn raise(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }

    fn enter(&mut self, phase: Phase) -> Update {
        info!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        Update::Entered(phase)
    }

    /// Leaves Setup for Loading and creates the session in the background.
    /// Ignored outside Setup.
    pub fn start(&mut self, config: InterviewConfig) -> Update {
        if self.phase != Phase::Setup {
            warn!(phase = ?self.phase, "start ignored outside setup");
            return Update::Ignored;
        }

        self.epoch += 1;
        let epoch = self.epoch;
        let request = config.to_request();
        info!(epoch, config = %config.describe(), "starting interview");
        self.config = Some(config);

        let client = self.client.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let event = match client.start_interview(&request).await {
                Ok(response) => {
                    debug!(
                        status = response.status.as_deref().unwrap_or(""),
                        message = response.message.as_deref().unwrap_or(""),
                        question_count = response.question_count,
                        "start accepted"
                    );
                    AppEvent::SessionCreated {
                        epoch,
                        session_id: response.session_id,
                    }
                }
                Err(error) => AppEvent::StartFailed { epoch, error },
            };
            let _ = sender.send(event).await;
        });

        self.enter(Phase::Loading)
    }

    /// Sends the trimmed answer for the current question. Returns whether a
    /// request went out.
    pub fn submit_answer(&mut self, answer: &str) -> bool {
        if self.phase != Phase::Interview || self.submitting {
            return false;
        }

        let answer = answer.trim();
        if answer.is_empty() {
            self.raise(EMPTY_ANSWER_ALERT);
            return false;
        }

        let Some(session_id) = self.session.session_id.clone() else {
            return false;
        };

        let request = SubmitAnswerRequest {
            session_id,
            question_index: self.session.current_question_index,
            answer: answer.to_string(),
        };
        self.submitting = true;

        let epoch = self.epoch;
        let client = self.client.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let event = match client.submit_answer(&request).await {
                Ok((feedback, outcome)) => AppEvent::AnswerScored {
                    epoch,
                    feedback,
                    outcome,
                },
                Err(error) => AppEvent::SubmitFailed { epoch, error },
            };
            let _ = sender.send(event).await;
        });

        true
    }

    /// Abandons whatever is in progress and returns to a blank Setup.
    pub fn restart(&mut self) -> Update {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        self.timer.stop();
        self.epoch += 1;

        self.session.reset();
        self.config = None;
        self.question = None;
        self.feedback = None;
        self.results = None;
        self.submitting = false;
        self.alert = None;

        self.enter(Phase::Setup)
    }

    pub fn handle(&mut self, event: AppEvent) -> Update {
        if event.epoch() != self.epoch {
            return Update::Ignored;
        }

        match event {
            AppEvent::SessionCreated { session_id, .. } => self.session_created(session_id),
            AppEvent::StartFailed { error, .. } => {
                error!(error = %error, "error starting interview");
                self.raise(START_FAILED_ALERT);
                self.enter(Phase::Setup)
            }
            AppEvent::Polled { result, .. } => {
                self.poller = None;
                match result {
                    Ok(ready) => self.begin(ready),
                    Err(PollError::Cancelled) => Update::Ignored,
                    Err(err) => {
                        error!(error = %err, "giving up on question generation");
                        self.session.reset();
                        self.raise(POLL_EXHAUSTED_ALERT);
                        self.enter(Phase::Setup)
                    }
                }
            }
            AppEvent::AnswerScored {
                feedback, outcome, ..
            } => {
                self.submitting = false;
                self.feedback = Some(feedback);
                match outcome {
                    AnswerOutcome::Next { index, question } => self.advance(index, question),
                    AnswerOutcome::Complete(results) => self.complete(results),
                }
            }
            AppEvent::SubmitFailed { error, .. } => {
                self.submitting = false;
                error!(error = %error, "error submitting answer");
                self.raise(SUBMIT_FAILED_ALERT);
                Update::Refreshed
            }
        }
    }

    /// Applies every event already waiting, without blocking.
    pub fn drain(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            updates.push(self.handle(event));
        }
        updates
    }

    /// Waits for the next background event and applies it.
    #[cfg(test)]
    pub async fn next_update(&mut self) -> Option<Update> {
        let event = self.receiver.recv().await?;
        Some(self.handle(event))
    }

    fn session_created(&mut self, session_id: String) -> Update {
        if self.phase != Phase::Loading {
            return Update::Ignored;
        }

        info!(session_id = %session_id, "session created");
        self.session.session_id = Some(session_id.clone());

        let epoch = self.epoch;
        self.poller = Some(Poller::spawn(
            self.client.clone(),
            session_id,
            self.poll.clone(),
            self.sender.clone(),
            move |result| AppEvent::Polled { epoch, result },
        ));
        Update::Refreshed
    }

    fn begin(&mut self, ready: ReadyQuestions) -> Update {
        if self.phase != Phase::Loading {
            return Update::Ignored;
        }

        self.session.current_question_index = 0;
        self.session.total_questions = ready.total_questions;
        self.question = Some(ready.first_question);
        self.timer.start();
        self.enter(Phase::Interview)
    }

    fn advance(&mut self, index: usize, question: String) -> Update {
        if self.phase != Phase::Interview {
            return Update::Ignored;
        }

        self.session.current_question_index = index;
        self.question = Some(question);
        self.timer.start();
        Update::NextQuestion
    }

    fn complete(&mut self, results: FinalResults) -> Update {
        if self.phase != Phase::Interview {
            return Update::Ignored;
        }

        self.timer.stop();
        info!(
            overall_score = results.overall_score,
            total_questions = results.total_questions,
            "interview complete"
        );
        self.results = Some(results);
        self.enter(Phase::Results)
    }
}
