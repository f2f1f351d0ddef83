//! Create/edit post modal

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::app::{FormField, PostForm};

/// Renders the post form on top of the current view
pub fn render(frame: &mut Frame, form: &PostForm) {
    let area = centered_rect(70, 14, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", form.heading()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_field(frame, chunks[0], "Title", &form.title, form.focus == FormField::Title);
    render_field(frame, chunks[1], "Body", &form.body, form.focus == FormField::Body);

    let hint = Paragraph::new(Line::from(Span::styled(
        "Tab switch field · Enter save · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hint, chunks[2]);
}

fn render_field(
    frame: &mut Frame,
    area: ratatui::layout::Rect,
    label: &str,
    value: &str,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut text = value.to_string();
    if focused {
        text.push('_');
    }

    let field = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", label),
                    border_style.add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(field, area);
}
