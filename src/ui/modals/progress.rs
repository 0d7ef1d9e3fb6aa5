//! Progress dialogs

use super::dialog_block;
use crate::config::colors;
use crate::dialog::task::ProgressDialog;
use crate::ui::helpers::{centered_rect, ratio};
use ratatui::{
    layout::{Constraint, Layout},
    prelude::*,
    widgets::{Clear, Gauge, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const HINTS: &str = " [Esc] Cancel ";

pub fn render_spinner(f: &mut Frame, dialog: &ProgressDialog, frame: usize) {
    let area = centered_rect(50, 20, f.area());
    let block = dialog_block(dialog.title.as_deref(), HINTS);
    let inner = block.inner(area);

    let spinner = SPINNER[frame % SPINNER.len()];
    let line = Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(colors::ACCENT)),
        Span::styled(
            dialog.message.clone().unwrap_or_default(),
            Style::default().fg(colors::FG),
        ),
    ]);

    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), inner);
}

pub fn render_horizontal(f: &mut Frame, dialog: &ProgressDialog, value: i32, max: i32) {
    let area = centered_rect(60, 25, f.area());
    let block = dialog_block(dialog.title.as_deref(), HINTS);
    let inner = block.inner(area);
    let [message_area, gauge_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let message = Paragraph::new(dialog.message.clone().unwrap_or_default())
        .style(Style::default().fg(colors::FG))
        .wrap(Wrap { trim: true });
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(colors::ACCENT).bg(colors::BORDER))
        .ratio(ratio(value, max))
        .label(format!("{value}/{max}"));

    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(message, message_area);
    f.render_widget(gauge, gauge_area);
}
