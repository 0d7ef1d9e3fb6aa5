//! Dialog tasks: what to show, how far along it is, and the realized widget
//!
//! A task moves `Created -> Queued -> Shown -> {Responded, Dismissed}`.
//! `Responded` and `Dismissed` are terminal. The caller side mutates the
//! dialog description before display; the UI surface realizes the widget and
//! settles the response. Both sides go through the same lock.

use super::response::{Button, DialogResponse};
use super::sync::{ResponseSlot, ShowGate};
use crate::errors::{DialogError, Result};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default maximum for progress dialogs and seek bars
pub const DEFAULT_MAX: i32 = 100;

/// Default starting value for seek bars
pub const DEFAULT_SEEK_PROGRESS: i32 = 50;

/// Lifecycle state of a dialog task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Queued,
    Shown,
    Responded,
    Dismissed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Responded | Self::Dismissed)
    }

    /// Widget not realized yet, description still editable
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Created | Self::Queued)
    }
}

/// How list items are picked in an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Clicking an item answers the dialog
    #[default]
    None,
    /// Radio list; the answer comes from a button
    Single,
    /// Checkbox list; the answer comes from a button
    Multiple,
}

/// Progress dialog description (spinner or horizontal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDialog {
    pub title: Option<String>,
    pub message: Option<String>,
    pub max: i32,
    pub indeterminate: bool,
}

/// Alert dialog description
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertDialog {
    pub title: Option<String>,
    pub message: Option<String>,
    pub positive: Option<String>,
    pub negative: Option<String>,
    pub neutral: Option<String>,
    pub items: Vec<String>,
    pub mode: SelectionMode,
    pub selected: BTreeSet<usize>,
}

impl AlertDialog {
    pub fn button_label(&self, which: Button) -> Option<&str> {
        match which {
            Button::Positive => self.positive.as_deref(),
            Button::Negative => self.negative.as_deref(),
            Button::Neutral => self.neutral.as_deref(),
        }
    }
}

/// Seek bar dialog description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekBarDialog {
    pub progress: i32,
    pub max: i32,
    pub title: String,
    pub message: String,
    pub positive: Option<String>,
    pub negative: Option<String>,
}

impl SeekBarDialog {
    pub fn button_label(&self, which: Button) -> Option<&str> {
        match which {
            Button::Positive => self.positive.as_deref(),
            Button::Negative => self.negative.as_deref(),
            Button::Neutral => None,
        }
    }
}

/// The four dialog variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    SpinnerProgress(ProgressDialog),
    HorizontalProgress(ProgressDialog),
    Alert(AlertDialog),
    SeekBar(SeekBarDialog),
}

impl Dialog {
    pub fn spinner(title: Option<String>, message: Option<String>, max: i32) -> Self {
        Self::SpinnerProgress(ProgressDialog {
            title,
            message,
            max,
            indeterminate: true,
        })
    }

    pub fn horizontal(title: Option<String>, message: Option<String>, max: i32) -> Self {
        Self::HorizontalProgress(ProgressDialog {
            title,
            message,
            max,
            indeterminate: false,
        })
    }

    pub fn alert(title: Option<String>, message: Option<String>) -> Self {
        Self::Alert(AlertDialog {
            title,
            message,
            ..AlertDialog::default()
        })
    }

    pub fn seek_bar(progress: i32, max: i32, title: String, message: String) -> Self {
        Self::SeekBar(SeekBarDialog {
            progress: progress.clamp(0, max.max(0)),
            max,
            title,
            message,
            positive: None,
            negative: None,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpinnerProgress(_) => "spinner",
            Self::HorizontalProgress(_) => "horizontal",
            Self::Alert(_) => "alert",
            Self::SeekBar(_) => "seekbar",
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::SpinnerProgress(p) | Self::HorizontalProgress(p) => p.title.as_deref(),
            Self::Alert(a) => a.title.as_deref(),
            Self::SeekBar(s) => Some(s.title.as_str()),
        }
    }
}

/// State of a realized widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Progress { value: i32, max: i32 },
    Alert { cursor: usize },
    SeekBar { value: i32 },
}

impl Widget {
    fn realize(dialog: &Dialog) -> Self {
        match dialog {
            Dialog::SpinnerProgress(p) | Dialog::HorizontalProgress(p) => Self::Progress {
                value: 0,
                max: p.max,
            },
            Dialog::Alert(a) => Self::Alert {
                cursor: a.selected.iter().next().copied().unwrap_or(0),
            },
            Dialog::SeekBar(s) => Self::SeekBar { value: s.progress },
        }
    }
}

/// Point-in-time copy of a task for rendering
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub id: u64,
    pub dialog: Dialog,
    pub widget: Option<Widget>,
    pub state: TaskState,
}

#[derive(Debug)]
struct TaskInner {
    dialog: Dialog,
    state: TaskState,
    widget: Option<Widget>,
}

/// A pending or active interactive prompt
#[derive(Debug)]
pub struct DialogTask {
    id: u64,
    inner: Mutex<TaskInner>,
    shown: ShowGate,
    response: ResponseSlot,
}

impl DialogTask {
    pub fn new(id: u64, dialog: Dialog) -> Self {
        Self {
            id,
            inner: Mutex::new(TaskInner {
                dialog,
                state: TaskState::Created,
                widget: None,
            }),
            shown: ShowGate::new(),
            response: ResponseSlot::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.lock().dialog.kind()
    }

    pub fn state(&self) -> TaskState {
        self.lock().state
    }

    pub fn widget(&self) -> Option<Widget> {
        self.lock().widget
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let inner = self.lock();
        TaskSnapshot {
            id: self.id,
            dialog: inner.dialog.clone(),
            widget: inner.widget,
            state: inner.state,
        }
    }

    // ---- caller side ----

    /// Move to `Queued`. Only a task whose widget has not been realized can be shown.
    pub fn mark_queued(&self) -> Result<()> {
        let mut inner = self.lock();
        if !inner.state.is_pending() {
            return Err(DialogError::NoDialog("no dialog to show"));
        }
        inner.state = TaskState::Queued;
        Ok(())
    }

    pub fn wait_shown(&self) -> Result<()> {
        self.shown.wait()
    }

    pub fn wait_response(&self) -> Result<DialogResponse> {
        self.response.wait()
    }

    pub fn set_current_progress(&self, value: i32) -> Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let state = inner.state;
        match (&inner.dialog, inner.widget.as_mut()) {
            (
                Dialog::SpinnerProgress(_) | Dialog::HorizontalProgress(_),
                Some(Widget::Progress { value: current, max }),
            ) if state == TaskState::Shown => {
                *current = value.clamp(0, (*max).max(0));
                Ok(())
            }
            (Dialog::SpinnerProgress(_) | Dialog::HorizontalProgress(_), _) => Err(
                DialogError::InvalidDialogState("progress dialog is not shown"),
            ),
            _ => Err(DialogError::InvalidDialogState(
                "no progress dialog to assign value to",
            )),
        }
    }

    pub fn set_max_progress(&self, max: i32) -> Result<()> {
        let mut inner = self.lock();
        let state = inner.state;
        let TaskInner { dialog, widget, .. } = &mut *inner;
        match (dialog, widget.as_mut()) {
            (
                Dialog::SpinnerProgress(p) | Dialog::HorizontalProgress(p),
                Some(Widget::Progress { value, max: current }),
            ) if state == TaskState::Shown => {
                p.max = max;
                *current = max;
                *value = (*value).clamp(0, max.max(0));
                Ok(())
            }
            (Dialog::SpinnerProgress(_) | Dialog::HorizontalProgress(_), _) => Err(
                DialogError::InvalidDialogState("progress dialog is not shown"),
            ),
            _ => Err(DialogError::InvalidDialogState(
                "no progress dialog to set maximum value of",
            )),
        }
    }

    /// Set a button label. The realized widget renders from the same
    /// description, so a shown dialog picks the label up on its next frame.
    pub fn set_button_text(&self, which: Button, text: String) -> Result<()> {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return Err(DialogError::NoDialog("dialog already closed"));
        }
        let slot = match (&mut inner.dialog, which) {
            (Dialog::Alert(a), Button::Positive) => &mut a.positive,
            (Dialog::Alert(a), Button::Negative) => &mut a.negative,
            (Dialog::Alert(a), Button::Neutral) => &mut a.neutral,
            (Dialog::SeekBar(s), Button::Positive) => &mut s.positive,
            (Dialog::SeekBar(s), Button::Negative) => &mut s.negative,
            (Dialog::SeekBar(_), Button::Neutral) => {
                return Err(DialogError::InvalidDialogState(
                    "seek bar dialogs have no neutral button",
                ))
            }
            _ => {
                return Err(DialogError::InvalidDialogState(
                    "no dialog to add button to",
                ))
            }
        };
        *slot = Some(text);
        Ok(())
    }

    /// Replace the list content and selection mode of an alert
    ///
    /// Out-of-range selections are dropped. Only allowed before display.
    pub fn set_items(
        &self,
        items: Vec<String>,
        mode: SelectionMode,
        selected: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        let mut inner = self.lock();
        let state = inner.state;
        let Dialog::Alert(alert) = &mut inner.dialog else {
            return Err(DialogError::InvalidDialogState("no dialog to add list to"));
        };
        if !state.is_pending() {
            return Err(DialogError::InvalidDialogState(
                "list items cannot change after the dialog is shown",
            ));
        }
        let len = items.len();
        alert.selected = match mode {
            SelectionMode::None => BTreeSet::new(),
            SelectionMode::Single => selected.into_iter().take(1).filter(|&i| i < len).collect(),
            SelectionMode::Multiple => selected.into_iter().filter(|&i| i < len).collect(),
        };
        alert.items = items;
        alert.mode = mode;
        Ok(())
    }

    pub fn selected_items(&self) -> Result<Vec<usize>> {
        match &self.lock().dialog {
            Dialog::Alert(alert) => Ok(alert.selected.iter().copied().collect()),
            _ => Err(DialogError::InvalidDialogState(
                "selected items are only tracked for alert dialogs",
            )),
        }
    }

    /// Force the task to `Dismissed`, releasing the widget.
    ///
    /// A parked `show()` is interrupted and a pending response becomes
    /// `Canceled`. Returns true if a realized widget was released.
    pub fn dismiss(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return false;
        }
        inner.state = TaskState::Dismissed;
        let released = inner.widget.take().is_some();
        drop(inner);
        self.shown.interrupt();
        self.response.fulfill(DialogResponse::Canceled);
        released
    }

    /// Cancel any parked waiters without changing the dialog
    pub fn interrupt(&self) {
        self.shown.interrupt();
        self.response.interrupt();
    }

    // ---- UI surface side ----

    /// Build the widget and open the show gate. Returns false for tasks that
    /// were dismissed or already realized.
    pub fn realize(&self) -> bool {
        let mut inner = self.lock();
        if !inner.state.is_pending() {
            return false;
        }
        inner.widget = Some(Widget::realize(&inner.dialog));
        inner.state = TaskState::Shown;
        drop(inner);
        self.shown.signal();
        true
    }

    /// The surface went away before the user answered
    pub fn abandon(&self, reason: &str) {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return;
        }
        inner.state = TaskState::Dismissed;
        inner.widget = None;
        drop(inner);
        self.shown.interrupt();
        self.response.fail(reason);
    }

    /// Settle the response from the UI surface. Only a shown task can answer.
    pub fn respond(&self, response: DialogResponse) -> bool {
        let mut inner = self.lock();
        if !close_answered(&mut inner) {
            return false;
        }
        drop(inner);
        self.response.fulfill(response)
    }

    /// Press a button. Buttons without a label do not exist and are ignored.
    pub fn press(&self, which: Button) -> bool {
        let mut inner = self.lock();
        let response = press_locked(&mut inner, which);
        drop(inner);
        response.is_some_and(|response| self.response.fulfill(response))
    }

    pub fn cancel(&self) -> bool {
        self.respond(DialogResponse::Canceled)
    }

    /// Move the alert list cursor, clamped to the list
    pub fn move_cursor(&self, delta: isize) {
        let mut inner = self.lock();
        let len = match &inner.dialog {
            Dialog::Alert(a) => a.items.len(),
            _ => return,
        };
        if let Some(Widget::Alert { cursor }) = inner.widget.as_mut() {
            if len == 0 {
                *cursor = 0;
            } else {
                *cursor = cursor.saturating_add_signed(delta).min(len - 1);
            }
        }
    }

    /// Activate the item under the cursor
    ///
    /// Plain lists answer with the item, single-choice lists select it,
    /// multi-choice lists toggle it. An alert without items treats this as
    /// the positive button. Returns true if the dialog was answered.
    pub fn activate(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != TaskState::Shown {
            return false;
        }
        let Some(Widget::Alert { cursor }) = inner.widget else {
            return false;
        };
        let Dialog::Alert(alert) = &mut inner.dialog else {
            return false;
        };
        let response = if alert.items.is_empty() {
            press_locked(&mut inner, Button::Positive)
        } else {
            match alert.mode {
                SelectionMode::None => {
                    alert.selected = BTreeSet::from([cursor]);
                    close_answered(&mut inner);
                    Some(DialogResponse::Item(cursor))
                }
                SelectionMode::Single => {
                    alert.selected = BTreeSet::from([cursor]);
                    None
                }
                SelectionMode::Multiple => {
                    if !alert.selected.remove(&cursor) {
                        alert.selected.insert(cursor);
                    }
                    None
                }
            }
        };
        drop(inner);
        response.is_some_and(|response| self.response.fulfill(response))
    }

    /// Nudge a seek bar, clamped to `[0, max]`
    pub fn seek_by(&self, delta: i32) {
        let mut inner = self.lock();
        let max = match &inner.dialog {
            Dialog::SeekBar(s) => s.max.max(0),
            _ => return,
        };
        if let Some(Widget::SeekBar { value }) = inner.widget.as_mut() {
            *value = value.saturating_add(delta).clamp(0, max);
        }
    }

    /// Page size for seek bar keyboard paging
    pub fn seek_step(&self) -> i32 {
        match &self.lock().dialog {
            Dialog::SeekBar(s) => (s.max / 10).max(1),
            _ => 1,
        }
    }
}

/// Move a shown task to `Responded` and release its widget.
///
/// Runs under the task lock; the response slot is settled after the guard drops.
fn close_answered(inner: &mut TaskInner) -> bool {
    if inner.state != TaskState::Shown {
        return false;
    }
    inner.state = TaskState::Responded;
    inner.widget = None;
    true
}

/// Resolve a button press under the task lock
fn press_locked(inner: &mut TaskInner, which: Button) -> Option<DialogResponse> {
    if inner.state != TaskState::Shown {
        return None;
    }
    let widget = inner.widget;
    let response = match &mut inner.dialog {
        Dialog::Alert(a) if a.button_label(which).is_some() => DialogResponse::Button {
            which,
            progress: None,
        },
        Dialog::SeekBar(s) if s.button_label(which).is_some() => {
            if let Some(Widget::SeekBar { value }) = widget {
                s.progress = value;
            }
            DialogResponse::Button {
                which,
                progress: Some(s.progress),
            }
        }
        _ => return None,
    };
    close_answered(inner);
    Some(response)
}
