//! Seek bar dialog

use super::{button_line, dialog_block};
use crate::config::colors;
use crate::dialog::task::SeekBarDialog;
use crate::dialog::Button;
use crate::ui::helpers::{centered_rect, ratio};
use ratatui::{
    layout::{Constraint, Layout},
    prelude::*,
    widgets::{Clear, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn render_seek_bar(f: &mut Frame, dialog: &SeekBarDialog, value: i32) {
    let area = centered_rect(60, 30, f.area());
    let block = dialog_block(
        Some(dialog.title.as_str()),
        " [←/→] Adjust  [PgUp/PgDn] Step  [Esc] Cancel ",
    );
    let inner = block.inner(area);
    let [message_area, gauge_area, _, button_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let message = Paragraph::new(dialog.message.as_str())
        .style(Style::default().fg(colors::FG))
        .wrap(Wrap { trim: true });
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(colors::HIGHLIGHT).bg(colors::BORDER))
        .ratio(ratio(value, dialog.max))
        .label(format!("{value}"));
    let buttons = button_line(&[
        (Button::Positive, 'y', dialog.button_label(Button::Positive)),
        (Button::Negative, 'n', dialog.button_label(Button::Negative)),
    ]);

    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(message, message_area);
    f.render_widget(gauge, gauge_area);
    f.render_widget(Paragraph::new(buttons), button_area);
}
