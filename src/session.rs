use crate::protocol::StartInterviewRequest;

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 100;

/// Coarse UI state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Loading,
    Interview,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewConfig {
    pub job_role: String,
    pub experience_level: String,
    pub question_count: u32,
}

impl InterviewConfig {
    pub fn to_request(&self) -> StartInterviewRequest {
        StartInterviewRequest {
            job_role: self.job_role.clone(),
            experience_level: self.experience_level.clone(),
            question_count: self.question_count,
        }
    }

    /// `"Senior Data Engineer (10 questions)"`
    pub fn describe(&self) -> String {
        format!(
            "{} {} ({} questions)",
            self.experience_level, self.job_role, self.question_count
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub current_question_index: usize,
    pub total_questions: usize,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn progress_percent(&self) -> u16 {
        if self.total_questions == 0 {
            return 0;
        }
        let ratio = self.current_question_index as f64 / self.total_questions as f64;
        (ratio * 100.0).round().min(100.0) as u16
    }

    pub fn progress_label(&self) -> String {
        format!(
            "Question {} of {}",
            self.current_question_index + 1,
            self.total_questions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_initial_values() {
        let mut state = SessionState {
            session_id: Some("abc".to_string()),
            current_question_index: 4,
            total_questions: 5,
        };

        state.reset();

        assert_eq!(state.session_id, None);
        assert_eq!(state.current_question_index, 0);
        assert_eq!(state.total_questions, 0);
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        let state = SessionState {
            session_id: None,
            current_question_index: 1,
            total_questions: 3,
        };

        assert_eq!(state.progress_percent(), 33);
        assert_eq!(state.progress_label(), "Question 2 of 3");
        assert_eq!(SessionState::new().progress_percent(), 0);
    }

    #[test]
    fn config_describes_itself_for_loading_screen() {
        let config = InterviewConfig {
            job_role: "Data Engineer".to_string(),
            experience_level: "Senior".to_string(),
            question_count: 10,
        };

        assert_eq!(config.describe(), "Senior Data Engineer (10 questions)");
        assert_eq!(config.to_request().question_count, 10);
    }
}
