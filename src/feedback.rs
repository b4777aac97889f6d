use crate::protocol::{FeedbackPayload, FinalResults};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub text: String,
    pub style: Style,
}

impl LineSpec {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new("", Style::default())
    }
}

pub fn to_text(lines: Vec<LineSpec>) -> Text<'static> {
    Text::from(
        lines
            .into_iter()
            .map(|spec| Line::from(Span::styled(spec.text, spec.style)))
            .collect::<Vec<_>>(),
    )
}

/// One decimal place, with a trailing `.0` dropped.
pub fn format_score(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{}", rounded)
}

fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn score_line(label: &str, caption: &str, value: f64, color: Color) -> LineSpec {
    LineSpec::new(
        format!("  {:<14}{:>5}   {}", label, format_score(value), caption),
        Style::default().fg(color),
    )
}

pub fn feedback_placeholder() -> Vec<LineSpec> {
    let style = Style::default().fg(Color::DarkGray);
    vec![
        LineSpec::new("Your AI-powered feedback will appear here", style),
        LineSpec::new(
            "After you submit your first answer",
            style.add_modifier(Modifier::ITALIC),
        ),
    ]
}

pub fn render_answer_feedback(feedback: &FeedbackPayload) -> Vec<LineSpec> {
    let scores = &feedback.scores;
    let mut lines = vec![
        score_line("Content", "Quality", scores.content_score, Color::Blue),
        score_line("Technical", "Depth", scores.technical_score, Color::Magenta),
        score_line(
            "Communication",
            "Clarity",
            scores.communication_score,
            Color::Green,
        ),
        score_line("Relevance", "To Role", scores.relevance_score, Color::LightRed),
        LineSpec::blank(),
        LineSpec::new(
            format!(
                "OVERALL QUESTION SCORE  {}/10",
                format_score(scores.overall_question_score)
            ),
            bold(Color::Cyan),
        ),
        LineSpec::blank(),
        LineSpec::new("AI Assessment", bold(Color::Gray)),
    ];

    for line in feedback.overall_assessment.lines() {
        lines.push(LineSpec::new(
            format!("  {}", line),
            Style::default().fg(Color::Gray),
        ));
    }

    if !feedback.improvement_suggestions.is_empty() {
        lines.push(LineSpec::blank());
        lines.push(LineSpec::new("Improvement Suggestions", bold(Color::Yellow)));
        for suggestion in &feedback.improvement_suggestions {
            lines.push(LineSpec::new(
                format!("  › {}", suggestion),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    lines
}

pub fn render_final_results(results: &FinalResults) -> Vec<LineSpec> {
    let categories = &results.category_scores;
    let mut lines = vec![
        LineSpec::new(
            format!("{}/10", format_score(results.overall_score)),
            bold(Color::Green),
        ),
        LineSpec::new("Overall Interview Score", Style::default().fg(Color::Gray)),
        LineSpec::blank(),
        score_line("Content", "", categories.content_score, Color::Blue),
        score_line("Technical", "", categories.technical_score, Color::Magenta),
        score_line(
            "Communication",
            "",
            categories.communication_score,
            Color::Green,
        ),
        score_line("Relevance", "", categories.relevance_score, Color::LightRed),
        LineSpec::blank(),
        LineSpec::new("Performance Summary", bold(Color::Cyan)),
    ];

    for feedback in &results.performance_feedback {
        lines.push(LineSpec::new(
            format!("  ★ {}", feedback),
            Style::default().fg(Color::White),
        ));
    }

    lines.push(LineSpec::blank());
    lines.push(LineSpec::new(
        format!(
            "You completed {} AI-generated questions in this interview session.",
            results.total_questions
        ),
        Style::default().fg(Color::Gray),
    ));
    lines
}
