use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use taja::{
    app::{App, AppState, SubmitStatus},
    session::{CharState, Clock},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw<C: Clock>(app: &App<C>, f: &mut Frame) {
    f.render_widget(AppView(app), f.area());
}

/// Renders one practice view
pub struct AppView<'a, C: Clock>(pub &'a App<C>);

/// `m:ss` countdown label
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn styled_char(c: char, state: CharState) -> Span<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    match state {
        CharState::Correct => Span::styled(c.to_string(), bold_style.fg(Color::Green)),
        CharState::Incorrect => Span::styled(
            match c {
                ' ' => "·".to_owned(),
                '\n' => "↵".to_owned(),
                c => c.to_string(),
            },
            bold_style.fg(Color::Red),
        ),
        CharState::Current => Span::styled(
            match c {
                '\n' => "↵".to_owned(),
                c => c.to_string(),
            },
            bold_style.add_modifier(Modifier::DIM | Modifier::UNDERLINED),
        ),
        CharState::Untyped => Span::styled(c.to_string(), bold_style.add_modifier(Modifier::DIM)),
    }
}

/// Practice text split into display lines, each character styled by its state
pub fn prompt_lines(text: &str, states: &[CharState]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = Vec::new();

    for (idx, c) in text.chars().enumerate() {
        let state = states.get(idx).copied().unwrap_or(CharState::Untyped);
        if c == '\n' {
            if matches!(state, CharState::Current | CharState::Incorrect) {
                spans.push(styled_char('\n', state));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
            continue;
        }
        spans.push(styled_char(c, state));
    }
    lines.push(Line::from(spans));

    lines
}

impl<C: Clock> Widget for AppView<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let snapshot = app.snapshot();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        match app.state {
            AppState::Typing => {
                let lines = prompt_lines(app.text(), &app.char_states());
                let prompt_height = lines.len() as u16;
                let single_line = lines.len() == 1
                    && app.text().width() <= area.width.saturating_sub(HORIZONTAL_MARGIN * 2) as usize;
                let padding = area.height.saturating_sub(prompt_height + 6) / 2;

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(padding),
                        Constraint::Length(2), // title + timer
                        Constraint::Length(prompt_height.max(1) + 1),
                        Constraint::Length(1), // live stats
                        Constraint::Length(1), // key hint
                        Constraint::Length(1), // notice
                        Constraint::Min(0),
                    ])
                    .split(area);

                let header = Paragraph::new(vec![
                    Line::from(Span::styled(app.mode.title(), bold_style)),
                    Line::from(Span::styled(
                        format_time(snapshot.remaining_seconds),
                        dim_bold_style,
                    )),
                ])
                .alignment(Alignment::Center);
                header.render(chunks[1], buf);

                Paragraph::new(lines)
                    .alignment(if single_line {
                        Alignment::Center
                    } else {
                        Alignment::Left
                    })
                    .wrap(Wrap { trim: false })
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {} pts",
                        snapshot.wpm, snapshot.accuracy_percent, snapshot.score
                    ),
                    bold_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);

                if let Some(hint) = app.key_hint() {
                    let key = match hint.key {
                        ' ' => "space".to_string(),
                        '\n' => "enter".to_string(),
                        c => c.to_string(),
                    };
                    let label = if hint.shift {
                        format!("next: shift + {key}")
                    } else {
                        format!("next: {key}")
                    };
                    Paragraph::new(Span::styled(label, italic_style.fg(Color::Cyan)))
                        .alignment(Alignment::Center)
                        .render(chunks[4], buf);
                }

                if let Some(notice) = &app.notice {
                    Paragraph::new(Span::styled(notice.clone(), italic_style.fg(Color::Yellow)))
                        .alignment(Alignment::Center)
                        .render(chunks[5], buf);
                }
            }
            AppState::Results => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(1),
                        Constraint::Length(1), // final numbers
                        Constraint::Length(1), // submission status
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                if let Some(result) = app.result() {
                    Paragraph::new(Span::styled(
                        format!(
                            "{} wpm   {}% acc   {} pts   {}s",
                            result.wpm, result.accuracy_percent, result.score, result.duration_seconds
                        ),
                        bold_style,
                    ))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);
                }

                let status = match &app.submit_status {
                    SubmitStatus::Submitted { .. } => Span::styled(
                        format!(
                            "saved for {}",
                            app.student_id().map(|id| id.as_str()).unwrap_or_default()
                        ),
                        Style::default().fg(Color::Green),
                    ),
                    SubmitStatus::Failed(err) => {
                        Span::styled(format!("save failed: {err}"), Style::default().fg(Color::Red))
                    }
                    SubmitStatus::NotSubmitted => Span::styled(
                        app.notice.clone().unwrap_or_default(),
                        italic_style.fg(Color::Yellow),
                    ),
                };
                Paragraph::new(status)
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);

                let legend = if app.can_submit() {
                    "(s)ave / (r)etry / (esc)ape"
                } else {
                    "(r)etry / (esc)ape"
                };
                Paragraph::new(Span::styled(legend, italic_style)).render(chunks[4], buf);
            }
        }
    }
}
