//! UI rendering for the dialog surface
//!
//! The idle screen shows the socket, connected sessions and recent calls.
//! While a dialog is up it is drawn as a modal over that screen.

mod helpers;
mod modals;

use crate::app::App;
use crate::config::colors;
use helpers::truncate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Main render function
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Activity log
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_activity(f, chunks[1], app);
    render_footer(f, chunks[2], app);

    if let Some(task) = app.active_task() {
        modals::render_dialog(f, &task.snapshot(), app.spinner_frame);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let sessions = match app.sessions {
        0 => "no sessions".to_string(),
        1 => "1 session".to_string(),
        n => format!("{n} sessions"),
    };
    let dialog = app.active_task().map_or_else(
        || "idle".to_string(),
        |task| match task.snapshot().dialog.title() {
            Some(title) => format!("showing {} \"{}\"", task.kind(), truncate(title, 30)),
            None => format!("showing {}", task.kind()),
        },
    );

    let line = Line::from(vec![
        Span::styled(
            "dialogd ",
            Style::default()
                .fg(colors::HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", app.socket.display()),
            Style::default().fg(colors::DIM),
        ),
        Span::styled(format!("│ {sessions} "), Style::default().fg(colors::ACCENT)),
        Span::styled(format!("│ {dialog}"), Style::default().fg(colors::FG)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .border_type(BorderType::Rounded),
    );
    f.render_widget(header, area);
}

fn render_activity(f: &mut Frame, area: Rect, app: &App) {
    let width = usize::from(area.width.saturating_sub(4));
    let items: Vec<ListItem> = app
        .activity
        .iter()
        .rev()
        .map(|record| {
            let (mark, color) = if record.is_ok() {
                ("✓", colors::OK)
            } else {
                ("✗", colors::WARN)
            };
            let mut spans = vec![
                Span::styled(
                    format!("{} ", record.at.format("%H:%M:%S")),
                    Style::default().fg(colors::DIM),
                ),
                Span::styled(format!("{mark} "), Style::default().fg(color)),
                Span::styled(
                    format!("#{} ", record.session),
                    Style::default().fg(colors::ACCENT),
                ),
                Span::styled(record.method.clone(), Style::default().fg(colors::FG)),
            ];
            if let Some(error) = &record.error {
                let room = width.saturating_sub(record.method.len() + 16);
                spans.push(Span::styled(
                    format!("  {}", truncate(error, room)),
                    Style::default().fg(colors::WARN),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Activity ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .border_type(BorderType::Rounded),
    );
    f.render_widget(list, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((message, _)) = &app.status_message {
        Span::styled(message.clone(), Style::default().fg(colors::OK))
    } else if app.active_task().is_some() {
        Span::styled(
            "Answer the dialog  Esc:cancel  Ctrl+C:quit",
            Style::default().fg(colors::DIM),
        )
    } else {
        Span::styled(
            "Waiting for dialogs  q:quit",
            Style::default().fg(colors::DIM),
        )
    };
    f.render_widget(Paragraph::new(Line::from(text)), area);
}
