use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct StartInterviewRequest {
    pub job_role: String,
    pub experience_level: String,
    pub question_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub question_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewStatus {
    pub questions_ready: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_questions: Option<usize>,
    #[serde(default)]
    pub first_question: Option<String>,
    #[serde(default)]
    pub current_question_index: Option<usize>,
    #[serde(default)]
    pub interview_complete: Option<bool>,
    #[serde(default)]
    pub overall_score: Option<f64>,
}

/// The part of a ready status the interview needs to begin.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyQuestions {
    pub total_questions: usize,
    pub first_question: String,
}

impl InterviewStatus {
    /// Returns `None` unless the backend reports readiness and sent a usable
    /// question set along with it.
    pub fn ready_questions(&self) -> Option<ReadyQuestions> {
        if !self.questions_ready {
            return None;
        }

        match (self.total_questions, &self.first_question) {
            (Some(total), Some(first)) if total > 0 => Some(ReadyQuestions {
                total_questions: total,
                first_question: first.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    pub question_index: usize,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScores {
    pub content_score: f64,
    pub technical_score: f64,
    pub communication_score: f64,
    pub relevance_score: f64,
    pub overall_question_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub scores: QuestionScores,
    pub overall_assessment: String,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
}

// The backend sends `{}` here when it has nothing to average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryScores {
    pub content_score: f64,
    pub technical_score: f64,
    pub communication_score: f64,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResults {
    pub overall_score: f64,
    pub category_scores: CategoryScores,
    pub performance_feedback: Vec<String>,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    pub feedback: FeedbackPayload,
    pub interview_complete: bool,
    #[serde(default)]
    pub current_question_index: Option<usize>,
    #[serde(default)]
    pub next_question: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub category_scores: Option<CategoryScores>,
    #[serde(default)]
    pub performance_feedback: Option<Vec<String>>,
    #[serde(default)]
    pub total_questions: Option<usize>,
}

/// What the interview does after an answer has been scored.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Next { index: usize, question: String },
    Complete(FinalResults),
}

impl SubmitAnswerResponse {
    /// Splits the response into the feedback for the answered question and
    /// the next step. Returns `Err` with a short description when the shape
    /// does not match what `interview_complete` promises.
    pub fn into_parts(self) -> Result<(FeedbackPayload, AnswerOutcome), String> {
        if self.interview_complete {
            let overall_score = self
                .overall_score
                .ok_or("completed interview without overall_score")?;
            let results = FinalResults {
                overall_score,
                category_scores: self.category_scores.unwrap_or_default(),
                performance_feedback: self.performance_feedback.unwrap_or_default(),
                total_questions: self.total_questions.unwrap_or_default(),
            };
            return Ok((self.feedback, AnswerOutcome::Complete(results)));
        }

        match (self.current_question_index, self.next_question) {
            (Some(index), Some(question)) => {
                Ok((self.feedback, AnswerOutcome::Next { index, question }))
            }
            _ => Err("missing current_question_index or next_question".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feedback_json() -> serde_json::Value {
        json!({
            "question": "How do you handle technical debt?",
            "user_answer": "We track it.",
            "scores": {
                "content_score": 6.5,
                "technical_score": 5.0,
                "communication_score": 7.0,
                "relevance_score": 7.0,
                "overall_question_score": 6.4
            },
            "improvement_suggestions": ["Give an example"],
            "overall_assessment": "Decent."
        })
    }

    #[test]
    fn status_not_ready_has_no_questions() {
        let status: InterviewStatus = serde_json::from_value(json!({
            "status": "generating_questions",
            "message": "AI is still generating questions...",
            "questions_ready": false
        }))
        .unwrap();

        assert_eq!(status.ready_questions(), None);
    }

    #[test]
    fn status_ready_without_first_question_is_not_usable() {
        let status: InterviewStatus = serde_json::from_value(json!({
            "questions_ready": true,
            "total_questions": 3,
            "first_question": null
        }))
        .unwrap();

        assert_eq!(status.ready_questions(), None);
    }

    #[test]
    fn status_ready_yields_first_question() {
        let status: InterviewStatus = serde_json::from_value(json!({
            "status": "ready",
            "questions_ready": true,
            "current_question_index": 0,
            "total_questions": 5,
            "interview_complete": false,
            "overall_score": 0.0,
            "first_question": "Tell me about yourself"
        }))
        .unwrap();

        assert_eq!(
            status.ready_questions(),
            Some(ReadyQuestions {
                total_questions: 5,
                first_question: "Tell me about yourself".to_string(),
            })
        );
    }

    #[test]
    fn submit_response_advances_to_next_question() {
        let response: SubmitAnswerResponse = serde_json::from_value(json!({
            "session_id": "abc",
            "feedback": feedback_json(),
            "next_question": "Describe a production incident",
            "interview_complete": false,
            "current_question_index": 1,
            "total_questions": 3
        }))
        .unwrap();

        let (feedback, outcome) = response.into_parts().unwrap();
        assert_eq!(feedback.scores.overall_question_score, 6.4);
        assert_eq!(feedback.question.as_deref(), Some("How do you handle technical debt?"));
        assert_eq!(
            outcome,
            AnswerOutcome::Next {
                index: 1,
                question: "Describe a production incident".to_string(),
            }
        );
    }

    #[test]
    fn submit_response_completes_with_final_results() {
        let response: SubmitAnswerResponse = serde_json::from_value(json!({
            "session_id": "abc",
            "feedback": feedback_json(),
            "interview_complete": true,
            "overall_score": 6.4,
            "category_scores": {
                "content_score": 6.5,
                "technical_score": 5.0,
                "communication_score": 7.0,
                "relevance_score": 7.0
            },
            "performance_feedback": ["Needs significant improvement in multiple areas."],
            "total_questions": 1
        }))
        .unwrap();

        let (_, outcome) = response.into_parts().unwrap();
        match outcome {
            AnswerOutcome::Complete(results) => {
                assert_eq!(results.overall_score, 6.4);
                assert_eq!(results.category_scores.technical_score, 5.0);
                assert_eq!(results.performance_feedback.len(), 1);
                assert_eq!(results.total_questions, 1);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn empty_category_scores_decode_as_zero() {
        let scores: CategoryScores = serde_json::from_value(json!({})).unwrap();
        assert_eq!(scores, CategoryScores::default());
    }

    #[test]
    fn incomplete_response_without_next_question_is_rejected() {
        let response: SubmitAnswerResponse = serde_json::from_value(json!({
            "feedback": feedback_json(),
            "interview_complete": false
        }))
        .unwrap();

        assert!(response.into_parts().is_err());
    }
}
