//! One modal per dialog kind
//!
//! Every modal renders from a [`TaskSnapshot`], so label changes made by the
//! caller after display show up on the next frame.

mod alert;
mod progress;
mod seek_bar;

use crate::config::colors;
use crate::dialog::{Button, Dialog, TaskSnapshot, Widget};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders},
    Frame,
};

/// Render the dialog on top of whatever is on screen
pub fn render_dialog(f: &mut Frame, snapshot: &TaskSnapshot, spinner_frame: usize) {
    let Some(widget) = snapshot.widget else {
        return;
    };
    match (&snapshot.dialog, widget) {
        (Dialog::SpinnerProgress(p), Widget::Progress { .. }) => {
            progress::render_spinner(f, p, spinner_frame);
        }
        (Dialog::HorizontalProgress(p), Widget::Progress { value, max }) => {
            progress::render_horizontal(f, p, value, max);
        }
        (Dialog::Alert(a), Widget::Alert { cursor }) => alert::render_alert(f, a, cursor),
        (Dialog::SeekBar(s), Widget::SeekBar { value }) => seek_bar::render_seek_bar(f, s, value),
        (dialog, widget) => {
            tracing::warn!(kind = dialog.kind(), ?widget, "Widget does not match dialog");
        }
    }
}

/// Modal frame shared by all dialogs
fn dialog_block<'a>(title: Option<&'a str>, hints: &'a str) -> Block<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HIGHLIGHT))
        .border_type(BorderType::Double)
        .title_bottom(Line::from(hints).centered())
        .style(Style::default().bg(colors::BG));
    match title {
        Some(title) => block.title(format!(" {title} ")),
        None => block,
    }
}

/// `[y] OK  [n] Cancel` for the buttons that have labels
fn button_line<'a>(buttons: &[(Button, char, Option<&'a str>)]) -> Line<'a> {
    let spans: Vec<Span> = buttons
        .iter()
        .filter_map(|(which, key, label)| label.map(|label| (which, key, label)))
        .flat_map(|(which, key, label)| {
            let style = match which {
                Button::Positive => Style::default().fg(colors::OK),
                Button::Negative => Style::default().fg(colors::WARN),
                Button::Neutral => Style::default().fg(colors::ACCENT),
            };
            [
                Span::styled(format!("[{key}] "), Style::default().fg(colors::DIM)),
                Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
                Span::raw("   "),
            ]
        })
        .collect();
    Line::from(spans).centered()
}
