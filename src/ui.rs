use crate::controller::{SessionController, Update};
use crate::feedback::{
    LineSpec, feedback_placeholder, render_answer_feedback, render_final_results, to_text,
};
use crate::session::{InterviewConfig, MAX_QUESTIONS, MIN_QUESTIONS, Phase};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;
use std::io::Write;
use std::time::Duration;

type UiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Restores terminal settings even if the loop exits early.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Self {
        Self
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();
    }
}

fn byte_index(line: &str, cursor: usize) -> usize {
    line.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

struct InputBuffer {
    lines: Vec<String>,
    cursor_x: usize,
    cursor_y: usize,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        for c in text.chars() {
            if c == '\n' {
                buffer.new_line();
            } else {
                buffer.insert_char(c);
            }
        }
        buffer
    }

    fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    fn line_len(&self) -> usize {
        self.lines[self.cursor_y].chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_y];
        let idx = byte_index(line, self.cursor_x);
        line.insert(idx, c);
        self.cursor_x += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let idx = byte_index(line, self.cursor_x - 1);
            line.remove(idx);
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            let prev_line = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.line_len();
            self.lines[self.cursor_y].push_str(&prev_line);
        }
    }

    fn new_line(&mut self) {
        let line = &self.lines[self.cursor_y];
        let remaining: String = line.chars().skip(self.cursor_x).collect();
        self.lines[self.cursor_y] = line.chars().take(self.cursor_x).collect();
        self.lines.insert(self.cursor_y + 1, remaining);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    fn move_left(&mut self) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.line_len();
        }
    }

    fn move_right(&mut self) {
        if self.cursor_x < self.line_len() {
            self.cursor_x += 1;
        } else if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.cursor_x = 0;
        }
    }

    fn move_up(&mut self) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.cursor_x.min(self.line_len());
        }
    }

    fn move_down(&mut self) {
        if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.cursor_x = self.cursor_x.min(self.line_len());
        }
    }

    fn home(&mut self) {
        self.cursor_x = 0;
    }

    fn end(&mut self) {
        self.cursor_x = self.line_len();
    }

    fn to_string(&self) -> String {
        self.lines.join("\n")
    }

    fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    fn render(&self, placeholder: &str) -> Text<'static> {
        if self.is_empty() {
            return Text::from(Span::styled(
                placeholder.to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Text::from(
            self.lines
                .iter()
                .map(|l| Line::from(l.clone()))
                .collect::<Vec<_>>(),
        )
    }

    /// Rows as laid out in a box `width` columns wide. Lines are cut at
    /// exactly `width` characters, and a line that fills its last row gets
    /// an empty row after it for the caret.
    fn wrapped_rows(&self, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut rows = Vec::new();
        for line in &self.lines {
            let chars: Vec<char> = line.chars().collect();
            for start in (0..=chars.len()).step_by(width) {
                let end = (start + width).min(chars.len());
                rows.push(chars[start..end].iter().collect());
            }
        }
        rows
    }

    /// Caret as (column, row) within `wrapped_rows(width)`.
    fn wrapped_cursor(&self, width: usize) -> (usize, usize) {
        let width = width.max(1);
        let rows_above: usize = self.lines[..self.cursor_y]
            .iter()
            .map(|line| line.chars().count() / width + 1)
            .sum();
        (self.cursor_x % width, rows_above + self.cursor_x / width)
    }

    fn render_wrapped(&self, placeholder: &str, width: usize) -> Text<'static> {
        if self.is_empty() {
            return self.render(placeholder);
        }
        Text::from(
            self.wrapped_rows(width)
                .into_iter()
                .map(Line::from)
                .collect::<Vec<_>>(),
        )
    }

    /// Edits shared by every text field; other keys are ignored.
    fn apply_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Role,
    Level,
    Count,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Role => FormField::Level,
            FormField::Level => FormField::Count,
            FormField::Count => FormField::Role,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Role => FormField::Count,
            FormField::Level => FormField::Role,
            FormField::Count => FormField::Level,
        }
    }
}

struct SetupForm {
    role: InputBuffer,
    level: InputBuffer,
    count: u32,
    focus: FormField,
}

impl SetupForm {
    fn new(defaults: &InterviewConfig) -> Self {
        Self {
            role: InputBuffer::from_text(&defaults.job_role),
            level: InputBuffer::from_text(&defaults.experience_level),
            count: defaults.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS),
            focus: FormField::Role,
        }
    }

    fn adjust_count(&mut self, delta: i64) {
        let next = (self.count as i64 + delta).clamp(MIN_QUESTIONS as i64, MAX_QUESTIONS as i64);
        self.count = next as u32;
    }

    fn to_config(&self) -> InterviewConfig {
        InterviewConfig {
            job_role: self.role.to_string().trim().to_string(),
            experience_level: self.level.to_string().trim().to_string(),
            question_count: self.count,
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match (self.focus, code) {
            (_, KeyCode::Tab | KeyCode::Down) => self.focus = self.focus.next(),
            (_, KeyCode::BackTab | KeyCode::Up) => self.focus = self.focus.prev(),
            (FormField::Count, KeyCode::Left | KeyCode::Char('-')) => self.adjust_count(-1),
            (FormField::Count, KeyCode::Right | KeyCode::Char('+')) => self.adjust_count(1),
            (FormField::Count, KeyCode::PageDown) => self.adjust_count(-10),
            (FormField::Count, KeyCode::PageUp) => self.adjust_count(10),
            (FormField::Count, _) => {}
            (FormField::Role, code) => self.role.apply_edit(code),
            (FormField::Level, code) => self.level.apply_edit(code),
        }
    }
}

fn field_block(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(color))
}

/// Puts the terminal cursor at `(col, row)` inside a bordered box, clamped to
/// its interior. Boxes with no interior get no cursor.
fn place_cursor(f: &mut Frame, rect: Rect, col: usize, row: usize) {
    if rect.width < 3 || rect.height < 3 {
        return;
    }
    let col = u16::try_from(col).unwrap_or(u16::MAX).min(rect.width - 3);
    let row = u16::try_from(row).unwrap_or(u16::MAX).min(rect.height - 3);
    f.set_cursor_position((rect.x + 1 + col, rect.y + 1 + row));
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub struct App {
    controller: SessionController,
    form: SetupForm,
    answer: InputBuffer,
    should_quit: bool,
}

impl App {
    pub fn new(controller: SessionController, defaults: InterviewConfig) -> Self {
        Self {
            controller,
            form: SetupForm::new(&defaults),
            answer: InputBuffer::new(),
            should_quit: false,
        }
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();
        match self.controller.phase() {
            Phase::Setup => self.draw_setup(f, area),
            Phase::Loading => self.draw_loading(f, area),
            Phase::Interview => self.draw_interview(f, area),
            Phase::Results => self.draw_results(f, area),
        }

        if let Some(alert) = self.controller.alert() {
            let popup = centered(area, 60, 5);
            f.render_widget(Clear, popup);
            f.render_widget(
                Paragraph::new(alert.to_string())
                    .style(Style::default().fg(Color::White))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(" Notice (any key to dismiss) ")
                            .border_style(Style::default().fg(Color::Red)),
                    )
                    .wrap(Wrap { trim: true }),
                popup,
            );
        }
    }

    fn draw_setup(&self, f: &mut Frame, area: Rect) {
        let [title, role, level, count, help] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(centered(area, 70, 14));

        f.render_widget(
            Paragraph::new(Span::styled(
                "AI Smart Interview Assistant",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            title,
        );

        let focus = self.form.focus;
        f.render_widget(
            Paragraph::new(self.form.role.render("e.g. Data Engineer"))
                .block(field_block("Job role", focus == FormField::Role)),
            role,
        );
        f.render_widget(
            Paragraph::new(self.form.level.render("e.g. Senior"))
                .block(field_block("Experience level", focus == FormField::Level)),
            level,
        );
        f.render_widget(
            Paragraph::new(format!("◀ {} ▶", self.form.count))
                .block(field_block("Number of questions", focus == FormField::Count)),
            count,
        );
        f.render_widget(
            Paragraph::new(
                "Tab: next field   ←/→: adjust count   Enter: start interview   Esc: quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
            help,
        );

        let (buffer, rect) = match focus {
            FormField::Role => (&self.form.role, role),
            FormField::Level => (&self.form.level, level),
            FormField::Count => return,
        };
        if self.controller.alert().is_none() {
            place_cursor(f, rect, buffer.cursor_x, 0);
        }
    }

    fn draw_loading(&self, f: &mut Frame, area: Rect) {
        let target = self
            .controller
            .config()
            .map(InterviewConfig::describe)
            .unwrap_or_default();
        let lines = vec![
            Line::from(Span::styled(
                "AI is generating personalized interview questions...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Generating for: {}", target)),
            Line::from(""),
            Line::from(Span::styled(
                "Esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            centered(area, 70, 7),
        );
    }

    fn draw_interview(&self, f: &mut Frame, area: Rect) {
        let [header, progress, question, body] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(6),
        ])
        .areas(area);
        let [input, feedback] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(body);

        let session = self.controller.session();
        let timer = self.controller.timer();
        let timer_style = if timer.is_running() {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let info = match self.controller.config() {
            Some(config) => format!(
                " {} · {} · {} questions",
                config.job_role, config.experience_level, session.total_questions
            ),
            None => String::new(),
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(info, Style::default().fg(Color::Gray)),
                Span::raw("   "),
                Span::styled(format!("⏱ {}", timer.display()), timer_style),
            ])),
            header,
        );

        let percent = session.progress_percent();
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Blue))
                .percent(percent)
                .label(format!("{}   {}%", session.progress_label(), percent)),
            progress,
        );

        f.render_widget(
            Paragraph::new(self.controller.question().unwrap_or_default().to_string())
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" Question {} ", session.current_question_index + 1)),
                )
                .wrap(Wrap { trim: false }),
            question,
        );

        let title = if self.controller.is_submitting() {
            " Your answer (Enter to submit, Shift+Enter for newline) [Analyzing...] "
        } else {
            " Your answer (Enter to submit, Shift+Enter for newline) "
        };
        let inner_width = usize::from(input.width.saturating_sub(2));
        let inner_height = usize::from(input.height.saturating_sub(2));
        let (cursor_col, cursor_row) = self.answer.wrapped_cursor(inner_width);
        let scroll = (cursor_row + 1).saturating_sub(inner_height.max(1));
        f.render_widget(
            Paragraph::new(
                self.answer
                    .render_wrapped("Type your answer here...", inner_width),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
            input,
        );

        let lines = match self.controller.feedback() {
            Some(payload) => render_answer_feedback(payload),
            None => feedback_placeholder(),
        };
        f.render_widget(
            Paragraph::new(to_text(lines))
                .block(Block::default().borders(Borders::ALL).title(" AI Feedback "))
                .wrap(Wrap { trim: false }),
            feedback,
        );

        if self.controller.alert().is_none() {
            place_cursor(f, input, cursor_col, cursor_row - scroll);
        }
    }

    fn draw_results(&self, f: &mut Frame, area: Rect) {
        let Some(results) = self.controller.results() else {
            return;
        };
        let mut lines = render_final_results(results);
        lines.push(LineSpec::new("", Style::default()));
        lines.push(LineSpec::new(
            "Enter/r: start a new interview   Esc/q: quit",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(
            Paragraph::new(to_text(lines))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Interview Complete "),
                )
                .wrap(Wrap { trim: false }),
            centered(area, 80, 22),
        );
    }

    fn apply(&mut self, update: Update) {
        if matches!(
            update,
            Update::NextQuestion | Update::Entered(Phase::Interview | Phase::Setup)
        ) {
            self.answer.clear();
        }
    }

    fn restart(&mut self) {
        let update = self.controller.restart();
        self.apply(update);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.controller.alert().is_some() {
            self.controller.dismiss_alert();
            return;
        }

        match self.controller.phase() {
            Phase::Setup => match key.code {
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Enter => {
                    let update = self.controller.start(self.form.to_config());
                    self.apply(update);
                }
                code => self.form.handle_key(code),
            },
            Phase::Loading => {
                if key.code == KeyCode::Esc {
                    self.restart();
                }
            }
            Phase::Interview => match key.code {
                KeyCode::Esc => self.restart(),
                KeyCode::Enter => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        self.answer.new_line();
                    } else {
                        let answer = self.answer.to_string();
                        self.controller.submit_answer(&answer);
                    }
                }
                code => self.answer.apply_edit(code),
            },
            Phase::Results => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Enter | KeyCode::Char('r') => self.restart(),
                _ => {}
            },
        }
    }

    fn handle_events(&mut self) -> UiResult<bool> {
        for update in self.controller.drain() {
            self.apply(update);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }

        Ok(!self.should_quit)
    }
}

pub fn run_tui(controller: SessionController, defaults: InterviewConfig) -> UiResult<()> {
    enable_raw_mode()?;
    let _guard = TerminalGuard::new();
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, defaults);

    terminal.draw(|f| app.draw(f))?;

    while !app.should_quit {
        if !app.handle_events()? {
            break;
        }

        terminal.draw(|f| app.draw(f))?;

        std::thread::sleep(Duration::from_millis(10));
    }

    Ok(())
}
