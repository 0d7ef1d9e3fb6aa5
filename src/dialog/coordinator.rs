//! Single-dialog lifecycle coordinator
//!
//! Owns the one current dialog task and brokers it between a blocking caller
//! thread and the UI surface. Creating a dialog replaces (and dismisses) the
//! previous one; there is no queue of dialog requests.
//!
//! Two calls park the caller:
//! - [`DialogCoordinator::show`] until the surface has realized the widget
//! - [`DialogCoordinator::get_response`] until the user answers or cancels
//!
//! The slot lock is never held across either wait.

use super::queue::TaskQueue;
use super::response::{Button, DialogResponse};
use super::task::{Dialog, DialogTask, SelectionMode};
use crate::errors::{DialogError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Brings a UI surface to the foreground so it drains the task queue
pub trait Launcher: Send + Sync {
    fn launch(&self);
}

pub struct DialogCoordinator {
    current: Mutex<Option<Arc<DialogTask>>>,
    queue: Arc<dyn TaskQueue>,
    launcher: Arc<dyn Launcher>,
    next_id: AtomicU64,
}

impl DialogCoordinator {
    pub fn new(queue: Arc<dyn TaskQueue>, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            current: Mutex::new(None),
            queue,
            launcher,
            next_id: AtomicU64::new(1),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<DialogTask>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current task, if any
    pub fn current(&self) -> Option<Arc<DialogTask>> {
        self.slot().clone()
    }

    fn require(&self, what: &'static str) -> Result<Arc<DialogTask>> {
        self.current().ok_or(DialogError::NoDialog(what))
    }

    /// Dismiss whatever is current and install a fresh task in `Created`
    fn install(&self, dialog: Dialog) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = dialog.kind();
        let previous = self.slot().replace(Arc::new(DialogTask::new(id, dialog)));
        if let Some(previous) = previous {
            let released = previous.dismiss();
            debug!(
                task_id = previous.id(),
                released, "Dismissed previous dialog"
            );
        }
        info!(task_id = id, kind, "Created dialog");
        id
    }

    pub fn create_spinner_progress(
        &self,
        title: Option<String>,
        message: Option<String>,
        max: i32,
    ) -> u64 {
        self.install(Dialog::spinner(title, message, max))
    }

    pub fn create_horizontal_progress(
        &self,
        title: Option<String>,
        message: Option<String>,
        max: i32,
    ) -> u64 {
        self.install(Dialog::horizontal(title, message, max))
    }

    pub fn create_alert(&self, title: Option<String>, message: Option<String>) -> u64 {
        self.install(Dialog::alert(title, message))
    }

    pub fn create_seek_bar(&self, progress: i32, max: i32, title: String, message: String) -> u64 {
        self.install(Dialog::seek_bar(progress, max, title, message))
    }

    /// Release the current dialog, if any. Idempotent.
    pub fn dismiss(&self) {
        if let Some(task) = self.slot().take() {
            let released = task.dismiss();
            info!(task_id = task.id(), released, "Dismissed dialog");
        }
    }

    /// Queue the current dialog for the UI surface and park until it is visible
    pub fn show(&self) -> Result<()> {
        let task = self.require("no dialog to show")?;
        task.mark_queued()?;
        info!(task_id = task.id(), kind = task.kind(), "Showing dialog");
        self.queue.offer(Arc::clone(&task));
        self.launcher.launch();
        task.wait_shown()?;
        debug!(task_id = task.id(), "Dialog visible");
        Ok(())
    }

    pub fn set_current_progress(&self, value: i32) -> Result<()> {
        self.require("no dialog to assign value to")?
            .set_current_progress(value)
    }

    pub fn set_max_progress(&self, max: i32) -> Result<()> {
        self.require("no dialog to set maximum value of")?
            .set_max_progress(max)
    }

    pub fn set_positive_button_text(&self, text: String) -> Result<()> {
        self.set_button_text(Button::Positive, text)
    }

    pub fn set_negative_button_text(&self, text: String) -> Result<()> {
        self.set_button_text(Button::Negative, text)
    }

    pub fn set_neutral_button_text(&self, text: String) -> Result<()> {
        self.set_button_text(Button::Neutral, text)
    }

    fn set_button_text(&self, which: Button, text: String) -> Result<()> {
        self.require("no dialog to add button to")?
            .set_button_text(which, text)
    }

    pub fn set_items(&self, items: Vec<String>) -> Result<()> {
        self.require("no dialog to add list to")?
            .set_items(items, SelectionMode::None, [])
    }

    /// Radio list. `None` starts with nothing selected.
    pub fn set_single_choice_items(&self, items: Vec<String>, selected: Option<usize>) -> Result<()> {
        self.require("no dialog to add list to")?
            .set_items(items, SelectionMode::Single, selected)
    }

    pub fn set_multi_choice_items(&self, items: Vec<String>, selected: Vec<usize>) -> Result<()> {
        self.require("no dialog to add list to")?
            .set_items(items, SelectionMode::Multiple, selected)
    }

    /// Park until the user answers the current dialog
    pub fn get_response(&self) -> Result<DialogResponse> {
        let task = self.require("no dialog to get a response from")?;
        let response = task.wait_response()?;
        debug!(
            task_id = task.id(),
            canceled = response.is_canceled(),
            ?response,
            "Dialog answered"
        );
        Ok(response)
    }

    pub fn get_selected_items(&self) -> Result<Vec<usize>> {
        self.require("no dialog to read selection from")?
            .selected_items()
    }

    /// Wake any caller parked on the current dialog with `InterruptedWait`
    pub fn interrupt(&self) {
        if let Some(task) = self.current() {
            info!(task_id = task.id(), "Interrupting dialog waiters");
            task.interrupt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::queue::TaskSlot;
    use crate::dialog::task::{TaskState, Widget, DEFAULT_MAX, DEFAULT_SEEK_PROGRESS};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Launcher that wakes a fake surface thread
    struct ChannelLauncher(Mutex<mpsc::Sender<()>>);

    impl Launcher for ChannelLauncher {
        fn launch(&self) {
            let _ = self.0.lock().unwrap().send(());
        }
    }

    struct Harness {
        coordinator: Arc<DialogCoordinator>,
        slot: Arc<TaskSlot>,
        launches: mpsc::Receiver<()>,
    }

    impl Harness {
        fn new() -> Self {
            let slot = Arc::new(TaskSlot::new());
            let (tx, launches) = mpsc::channel();
            let coordinator = Arc::new(DialogCoordinator::new(
                slot.clone(),
                Arc::new(ChannelLauncher(Mutex::new(tx))),
            ));
            Self {
                coordinator,
                slot,
                launches,
            }
        }

        /// Show on a caller thread while this thread plays the UI surface
        fn show(&self) -> Arc<DialogTask> {
            let caller = {
                let coordinator = Arc::clone(&self.coordinator);
                thread::spawn(move || coordinator.show())
            };
            self.launches
                .recv_timeout(Duration::from_secs(5))
                .expect("launcher was not called");
            let task = self.slot.take().expect("nothing queued");
            assert_eq!(task.state(), TaskState::Queued);
            assert!(task.realize());
            caller.join().unwrap().unwrap();
            task
        }

        fn response_reader(&self) -> JoinHandle<Result<DialogResponse>> {
            let coordinator = Arc::clone(&self.coordinator);
            thread::spawn(move || coordinator.get_response())
        }
    }

    #[test]
    fn test_create_replaces_and_dismisses_previous() {
        let h = Harness::new();
        h.coordinator.create_alert(None, None);
        let first = h.coordinator.current().unwrap();
        h.coordinator.create_spinner_progress(None, None, DEFAULT_MAX);
        h.coordinator
            .create_seek_bar(DEFAULT_SEEK_PROGRESS, DEFAULT_MAX, "t".into(), "m".into());
        let current = h.coordinator.current().unwrap();
        assert_eq!(first.state(), TaskState::Dismissed);
        assert_ne!(first.id(), current.id());
        assert_eq!(current.kind(), "seekbar");
        assert_eq!(current.state(), TaskState::Created);
    }

    #[test]
    fn test_create_dismisses_shown_dialog() {
        let h = Harness::new();
        h.coordinator.create_spinner_progress(None, None, DEFAULT_MAX);
        let first = h.show();
        let waiter = {
            let first = Arc::clone(&first);
            thread::spawn(move || first.wait_response())
        };
        h.coordinator.create_alert(None, None);
        assert_eq!(first.state(), TaskState::Dismissed);
        assert!(first.widget().is_none());
        assert_eq!(waiter.join().unwrap(), Ok(DialogResponse::Canceled));
    }

    #[test]
    fn test_show_without_dialog() {
        let h = Harness::new();
        assert_eq!(
            h.coordinator.show(),
            Err(DialogError::NoDialog("no dialog to show"))
        );
    }

    #[test]
    fn test_show_twice_fails() {
        let h = Harness::new();
        h.coordinator.create_alert(Some("T".into()), None);
        h.show();
        assert_eq!(
            h.coordinator.show(),
            Err(DialogError::NoDialog("no dialog to show"))
        );
        assert!(h.slot.is_empty());
    }

    #[test]
    fn test_dismiss_idempotent() {
        let h = Harness::new();
        h.coordinator.dismiss();
        h.coordinator.create_alert(None, None);
        h.coordinator.dismiss();
        h.coordinator.dismiss();
        assert!(h.coordinator.current().is_none());
    }

    #[test]
    fn test_variant_restricted_setters() {
        let h = Harness::new();
        h.coordinator
            .create_seek_bar(DEFAULT_SEEK_PROGRESS, DEFAULT_MAX, "t".into(), "m".into());
        assert!(matches!(
            h.coordinator.set_neutral_button_text("x".into()),
            Err(DialogError::InvalidDialogState(_))
        ));
        assert!(matches!(
            h.coordinator.set_items(vec!["a".into()]),
            Err(DialogError::InvalidDialogState(_))
        ));
        assert!(matches!(
            h.coordinator.get_selected_items(),
            Err(DialogError::InvalidDialogState(_))
        ));
        assert!(matches!(
            h.coordinator.set_current_progress(1),
            Err(DialogError::InvalidDialogState(_))
        ));
        h.coordinator.set_positive_button_text("OK".into()).unwrap();
        h.coordinator.set_negative_button_text("No".into()).unwrap();
    }

    #[test]
    fn test_setters_without_dialog() {
        let h = Harness::new();
        assert!(matches!(
            h.coordinator.set_max_progress(10),
            Err(DialogError::NoDialog(_))
        ));
        assert!(matches!(
            h.coordinator.set_positive_button_text("OK".into()),
            Err(DialogError::NoDialog(_))
        ));
        assert!(matches!(
            h.coordinator.get_selected_items(),
            Err(DialogError::NoDialog(_))
        ));
    }

    #[test]
    fn test_get_response_without_dialog() {
        let h = Harness::new();
        assert_eq!(
            h.coordinator.get_response(),
            Err(DialogError::NoDialog("no dialog to get a response from"))
        );
    }

    #[test]
    fn test_response_round_trip() {
        let h = Harness::new();
        h.coordinator.create_alert(None, Some("Continue?".into()));
        h.coordinator.set_positive_button_text("Yes".into()).unwrap();
        h.coordinator.set_neutral_button_text("Later".into()).unwrap();
        let task = h.show();
        let reader = h.response_reader();
        thread::sleep(Duration::from_millis(20));
        assert!(task.press(Button::Neutral));
        let expected = DialogResponse::Button {
            which: Button::Neutral,
            progress: None,
        };
        assert_eq!(reader.join().unwrap(), Ok(expected.clone()));
        assert_eq!(h.coordinator.get_response(), Ok(expected));
    }

    #[test]
    fn test_button_label_set_while_shown() {
        let h = Harness::new();
        h.coordinator.create_alert(Some("T".into()), None);
        let task = h.show();
        assert!(!task.press(Button::Positive));
        assert_eq!(task.state(), TaskState::Shown);

        h.coordinator.set_positive_button_text("Go".into()).unwrap();
        match task.snapshot().dialog {
            Dialog::Alert(a) => assert_eq!(a.button_label(Button::Positive), Some("Go")),
            other => panic!("unexpected dialog {other:?}"),
        }
        assert!(task.press(Button::Positive));
        assert_eq!(
            h.coordinator.get_response(),
            Ok(DialogResponse::Button {
                which: Button::Positive,
                progress: None
            })
        );
    }

    #[test]
    fn test_seek_bar_label_set_while_shown() {
        let h = Harness::new();
        h.coordinator
            .create_seek_bar(DEFAULT_SEEK_PROGRESS, DEFAULT_MAX, "t".into(), "m".into());
        let task = h.show();
        task.seek_by(5);
        assert!(!task.press(Button::Negative));

        h.coordinator.set_negative_button_text("Skip".into()).unwrap();
        assert!(task.press(Button::Negative));
        assert_eq!(
            h.coordinator.get_response(),
            Ok(DialogResponse::Button {
                which: Button::Negative,
                progress: Some(DEFAULT_SEEK_PROGRESS + 5)
            })
        );
    }

    #[test]
    fn test_alert_item_scenario() {
        let h = Harness::new();
        h.coordinator.create_alert(Some("T".into()), Some("M".into()));
        h.coordinator
            .set_items(vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        let task = h.show();
        task.move_cursor(1);
        assert!(task.activate());
        assert_eq!(h.coordinator.get_response(), Ok(DialogResponse::Item(1)));
        assert_eq!(h.coordinator.get_selected_items(), Ok(vec![1]));
    }

    #[test]
    fn test_items_rejected_after_show() {
        let h = Harness::new();
        h.coordinator.create_alert(None, None);
        h.show();
        assert!(matches!(
            h.coordinator.set_single_choice_items(vec!["a".into()], Some(0)),
            Err(DialogError::InvalidDialogState(_))
        ));
    }

    #[test]
    fn test_spinner_progress_scenario() {
        let h = Harness::new();
        h.coordinator.create_spinner_progress(None, None, DEFAULT_MAX);
        assert!(matches!(
            h.coordinator.set_current_progress(42),
            Err(DialogError::InvalidDialogState(_))
        ));
        let task = h.show();
        h.coordinator.set_current_progress(42).unwrap();
        assert_eq!(
            task.widget(),
            Some(Widget::Progress {
                value: 42,
                max: DEFAULT_MAX
            })
        );
        assert_eq!(task.state(), TaskState::Shown);
        h.coordinator.set_max_progress(200).unwrap();
        assert_eq!(task.widget(), Some(Widget::Progress { value: 42, max: 200 }));
    }

    #[test]
    fn test_interrupt_unblocks_show() {
        let h = Harness::new();
        h.coordinator.create_alert(None, None);
        let caller = {
            let coordinator = Arc::clone(&h.coordinator);
            thread::spawn(move || coordinator.show())
        };
        h.launches.recv_timeout(Duration::from_secs(5)).unwrap();
        h.coordinator.interrupt();
        assert_eq!(caller.join().unwrap(), Err(DialogError::InterruptedWait));
    }

    #[test]
    fn test_interrupt_unblocks_get_response() {
        let h = Harness::new();
        h.coordinator.create_alert(None, None);
        h.show();
        let reader = h.response_reader();
        thread::sleep(Duration::from_millis(20));
        h.coordinator.interrupt();
        assert_eq!(reader.join().unwrap(), Err(DialogError::InterruptedWait));
    }

    #[test]
    fn test_surface_failure_surfaces_as_interaction_error() {
        let h = Harness::new();
        h.coordinator.create_alert(None, None);
        let task = h.show();
        task.abandon("surface closed");
        assert_eq!(
            h.coordinator.get_response(),
            Err(DialogError::DialogInteraction("surface closed".into()))
        );
    }
}
