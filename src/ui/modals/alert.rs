//! Alert dialog: message, optional list, up to three buttons

use super::{button_line, dialog_block};
use crate::config::colors;
use crate::dialog::task::AlertDialog;
use crate::dialog::{Button, SelectionMode};
use crate::ui::helpers::{centered_rect, truncate};
use ratatui::{
    layout::{Constraint, Layout},
    prelude::*,
    style::Modifier,
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render_alert(f: &mut Frame, dialog: &AlertDialog, cursor: usize) {
    let height = if dialog.items.is_empty() { 30 } else { 60 };
    let area = centered_rect(60, height, f.area());

    let hints = if dialog.items.is_empty() {
        " [Enter] Confirm  [Esc] Cancel "
    } else {
        match dialog.mode {
            SelectionMode::None => " [↑/↓] Move  [Enter] Pick  [Esc] Cancel ",
            SelectionMode::Single => " [↑/↓] Move  [Space] Select  [Esc] Cancel ",
            SelectionMode::Multiple => " [↑/↓] Move  [Space] Toggle  [Esc] Cancel ",
        }
    };
    let block = dialog_block(dialog.title.as_deref(), hints);
    let inner = block.inner(area);

    let message_height = if dialog.message.is_some() { 3 } else { 0 };
    let [message_area, list_area, button_area] = Layout::vertical([
        Constraint::Length(message_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    if let Some(message) = &dialog.message {
        let message = Paragraph::new(message.as_str())
            .style(Style::default().fg(colors::FG))
            .wrap(Wrap { trim: true });
        f.render_widget(message, message_area);
    }

    if !dialog.items.is_empty() {
        let width = usize::from(list_area.width.saturating_sub(6));
        let items: Vec<ListItem> = dialog
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = match dialog.mode {
                    SelectionMode::None => "",
                    SelectionMode::Single if dialog.selected.contains(&i) => "(•) ",
                    SelectionMode::Single => "( ) ",
                    SelectionMode::Multiple if dialog.selected.contains(&i) => "[x] ",
                    SelectionMode::Multiple => "[ ] ",
                };
                ListItem::new(format!("{marker}{}", truncate(item, width)))
            })
            .collect();
        let list = List::new(items)
            .style(Style::default().fg(colors::FG))
            .highlight_style(
                Style::default()
                    .fg(colors::HIGHLIGHT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(cursor));
        f.render_stateful_widget(list, list_area, &mut state);
    }

    let buttons = button_line(&[
        (Button::Positive, 'y', dialog.button_label(Button::Positive)),
        (Button::Neutral, 'u', dialog.button_label(Button::Neutral)),
        (Button::Negative, 'n', dialog.button_label(Button::Negative)),
    ]);
    f.render_widget(Paragraph::new(buttons), button_area);
}
