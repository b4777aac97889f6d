use crate::protocol::{
    AnswerOutcome, FeedbackPayload, InterviewStatus, StartInterviewRequest,
    StartInterviewResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};
use reqwest::Client as HttpClient;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{context}: {status} - {body}")]
    Status {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone)]
pub struct InterviewClient {
    base_url: Url,
    http: HttpClient,
}

impl InterviewClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn start_interview(
        &self,
        request: &StartInterviewRequest,
    ) -> ClientResult<StartInterviewResponse> {
        debug!(
            job_role = %request.job_role,
            experience_level = %request.experience_level,
            question_count = request.question_count,
            "starting interview"
        );
        let response = self
            .http
            .post(self.endpoint(&["start_interview"]))
            .json(request)
            .send()
            .await?;

        decode(response, "Failed to start interview").await
    }

    pub async fn interview_status(&self, session_id: &str) -> ClientResult<InterviewStatus> {
        let response = self
            .http
            .get(self.endpoint(&["interview_status", session_id]))
            .send()
            .await?;

        decode(response, "Failed to fetch interview status").await
    }

    /// Submits an answer and returns its feedback plus what comes next.
    pub async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> ClientResult<(FeedbackPayload, AnswerOutcome)> {
        debug!(
            session_id = %request.session_id,
            question_index = request.question_index,
            "submitting answer"
        );
        let response = self
            .http
            .post(self.endpoint(&["submit_answer"]))
            .json(request)
            .send()
            .await?;

        let response: SubmitAnswerResponse = decode(response, "Failed to submit answer").await?;
        response
            .into_parts()
            .map_err(ClientError::UnexpectedResponse)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, context: &'static str) -> ClientResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            context,
            status,
            body,
        });
    }

    Ok(response.json().await?)
}

fn parse_base_url(value: &str) -> ClientResult<Url> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    Ok(url)
}
