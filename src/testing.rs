//! In-process stand-in for the interview backend, served with axum on an
//! ephemeral port. Questions are generated synchronously, and readiness is
//! scripted per builder so poll counts are deterministic.

use crate::client::{ClientConfig, InterviewClient};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

type HandlerResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
pub(crate) struct MockBackendBuilder {
    failing_polls: usize,
    not_ready_polls: usize,
    fail_start: bool,
    fail_submit: bool,
    truncated_submit: bool,
}

impl MockBackendBuilder {
    /// Status requests answered with HTTP 500 before anything else.
    pub(crate) fn failing_polls(mut self, count: usize) -> Self {
        self.failing_polls = count;
        self
    }

    /// Status requests answered with `questions_ready: false` after the failures.
    pub(crate) fn not_ready_polls(mut self, count: usize) -> Self {
        self.not_ready_polls = count;
        self
    }

    pub(crate) fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub(crate) fn fail_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// Submit responses claim the interview continues but omit the next question.
    pub(crate) fn truncated_submit(mut self) -> Self {
        self.truncated_submit = true;
        self
    }

    pub(crate) async fn spawn(self) -> MockBackend {
        let state = Arc::new(MockState {
            script: self,
            sessions: Mutex::new(HashMap::new()),
            start_requests: AtomicUsize::new(0),
            status_requests: AtomicUsize::new(0),
            submit_requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/start_interview", post(start_interview))
            .route("/interview_status/:session_id", get(interview_status))
            .route("/submit_answer", post(submit_answer))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            base_url: format!("http://{}", addr),
            state,
            task,
        }
    }
}

pub(crate) struct MockBackend {
    base_url: String,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockBackend {
    pub(crate) fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    pub(crate) fn client(&self) -> InterviewClient {
        InterviewClient::new(ClientConfig {
            base_url: format!("{}/", self.base_url),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    pub(crate) fn start_requests(&self) -> usize {
        self.state.start_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn status_requests(&self) -> usize {
        self.state.status_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn submit_requests(&self) -> usize {
        self.state.submit_requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct MockState {
    script: MockBackendBuilder,
    sessions: Mutex<HashMap<String, MockSession>>,
    start_requests: AtomicUsize,
    status_requests: AtomicUsize,
    submit_requests: AtomicUsize,
}

struct MockSession {
    questions: Vec<String>,
    polls: usize,
    index: usize,
}

fn error(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

async fn start_interview(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> HandlerResult {
    state.start_requests.fetch_add(1, Ordering::SeqCst);
    if state.script.fail_start {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
    }

    let role = body["job_role"].as_str().unwrap_or_default().to_string();
    let level = body["experience_level"].as_str().unwrap_or_default().to_string();
    let count = body["question_count"].as_u64().unwrap_or(10).min(100) as usize;

    let questions = (1..=count)
        .map(|n| format!("Question {} for {} {}", n, level, role))
        .collect();
    let session_id = Uuid::new_v4().to_string();
    state.sessions.lock().unwrap().insert(
        session_id.clone(),
        MockSession {
            questions,
            polls: 0,
            index: 0,
        },
    );

    Ok(Json(json!({
        "session_id": session_id,
        "status": "generating_questions",
        "message": "AI is generating personalized interview questions...",
        "question_count": count
    })))
}

async fn interview_status(
    State(state): State<Arc<MockState>>,
    Path(session_id): Path<String>,
) -> HandlerResult {
    let mut sessions = state.sessions.lock().unwrap();
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Session not found"))?;

    state.status_requests.fetch_add(1, Ordering::SeqCst);
    session.polls += 1;

    if session.polls <= state.script.failing_polls {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "generator crashed"));
    }
    if session.polls <= state.script.failing_polls + state.script.not_ready_polls {
        return Ok(Json(json!({
            "status": "generating_questions",
            "message": "AI is still generating questions...",
            "questions_ready": false
        })));
    }

    Ok(Json(json!({
        "status": "ready",
        "questions_ready": true,
        "current_question_index": session.index,
        "total_questions": session.questions.len(),
        "interview_complete": false,
        "overall_score": 0.0,
        "first_question": session.questions.first()
    })))
}

async fn submit_answer(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> HandlerResult {
    let session_id = body["session_id"].as_str().unwrap_or_default().to_string();
    let answer = body["answer"].as_str().unwrap_or_default().to_string();

    let mut sessions = state.sessions.lock().unwrap();
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Session not found"))?;

    state.submit_requests.fetch_add(1, Ordering::SeqCst);
    if state.script.fail_submit {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "analysis failed"));
    }

    let feedback = json!({
        "question": session.questions[session.index],
        "user_answer": answer,
        "scores": {
            "content_score": 8.0,
            "technical_score": 7.0,
            "communication_score": 9.0,
            "relevance_score": 7.0,
            "overall_question_score": 7.8
        },
        "improvement_suggestions": [
            "Provide more specific examples from your experience",
            "Include quantitative results or metrics when possible"
        ],
        "overall_assessment": "Good answer with room for improvement."
    });

    if state.script.truncated_submit {
        return Ok(Json(json!({
            "session_id": session_id,
            "feedback": feedback,
            "interview_complete": false
        })));
    }

    session.index += 1;
    if session.index >= session.questions.len() {
        return Ok(Json(json!({
            "session_id": session_id,
            "feedback": feedback,
            "interview_complete": true,
            "overall_score": 7.8,
            "category_scores": {
                "content_score": 8.0,
                "technical_score": 7.0,
                "communication_score": 9.0,
                "relevance_score": 7.0
            },
            "performance_feedback": [
                "Good performance with solid fundamentals and some standout areas."
            ],
            "total_questions": session.questions.len()
        })));
    }

    Ok(Json(json!({
        "session_id": session_id,
        "feedback": feedback,
        "next_question": session.questions[session.index],
        "interview_complete": false,
        "current_question_index": session.index,
        "total_questions": session.questions.len()
    })))
}
