//! Keyboard input handling for each dialog kind

use super::App;
use crate::dialog::{Button, Dialog, DialogTask};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Handle Ctrl+C always
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let Some(task) = self.active_task() else {
            if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        };

        let answered = match task.snapshot().dialog {
            Dialog::SpinnerProgress(_) | Dialog::HorizontalProgress(_) => {
                key.code == KeyCode::Esc && task.cancel()
            }
            Dialog::Alert(_) => handle_key_alert(&task, key),
            Dialog::SeekBar(_) => handle_key_seek_bar(&task, key),
        };

        if answered {
            tracing::debug!(task_id = task.id(), "Dialog answered from keyboard");
            self.active = None;
            self.show_status("Answer sent");
        }
    }
}

/// Returns true if the key answered the dialog
fn handle_key_alert(task: &DialogTask, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => {
            task.move_cursor(-1);
            false
        }
        KeyCode::Char('j') | KeyCode::Down => {
            task.move_cursor(1);
            false
        }
        KeyCode::Enter | KeyCode::Char(' ') => task.activate(),
        KeyCode::Char('y') => task.press(Button::Positive),
        KeyCode::Char('n') => task.press(Button::Negative),
        KeyCode::Char('u') => task.press(Button::Neutral),
        KeyCode::Esc => task.cancel(),
        _ => false,
    }
}

fn handle_key_seek_bar(task: &DialogTask, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            task.seek_by(-1);
            false
        }
        KeyCode::Char('l') | KeyCode::Right => {
            task.seek_by(1);
            false
        }
        KeyCode::PageDown => {
            task.seek_by(-task.seek_step());
            false
        }
        KeyCode::PageUp => {
            task.seek_by(task.seek_step());
            false
        }
        KeyCode::Home => {
            task.seek_by(i32::MIN);
            false
        }
        KeyCode::End => {
            task.seek_by(i32::MAX);
            false
        }
        KeyCode::Enter | KeyCode::Char('y') => task.press(Button::Positive),
        KeyCode::Char('n') => task.press(Button::Negative),
        KeyCode::Esc => task.cancel(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{
        DialogCoordinator, DialogResponse, Launcher, TaskSlot, DEFAULT_MAX,
        DEFAULT_SEEK_PROGRESS,
    };
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    struct NoopLauncher;

    impl Launcher for NoopLauncher {
        fn launch(&self) {}
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (App, Arc<DialogCoordinator>) {
        let slot = Arc::new(TaskSlot::new());
        let coordinator = Arc::new(DialogCoordinator::new(
            slot.clone(),
            Arc::new(NoopLauncher),
        ));
        (App::new(slot, PathBuf::from("/tmp/test.sock"), 10), coordinator)
    }

    fn show(app: &mut App, coordinator: &Arc<DialogCoordinator>) {
        let caller = {
            let coordinator = Arc::clone(coordinator);
            thread::spawn(move || coordinator.show())
        };
        while app.slot.is_empty() {
            thread::yield_now();
        }
        app.drain_pending();
        caller.join().unwrap().unwrap();
    }

    #[test]
    fn test_ctrl_c_quits_even_with_dialog() {
        let (mut app, coordinator) = setup();
        coordinator.create_alert(None, None);
        show(&mut app, &coordinator);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_only_quits_when_idle() {
        let (mut app, coordinator) = setup();
        coordinator.create_alert(None, None);
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_alert_list_pick() {
        let (mut app, coordinator) = setup();
        coordinator.create_alert(Some("T".into()), Some("M".into()));
        coordinator
            .set_items(vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(coordinator.get_response(), Ok(DialogResponse::Item(1)));
        assert_eq!(coordinator.get_selected_items(), Ok(vec![1]));
        assert!(app.active.is_none());
    }

    #[test]
    fn test_alert_buttons() {
        let (mut app, coordinator) = setup();
        coordinator.create_alert(None, Some("Delete?".into()));
        coordinator.set_negative_button_text("Keep".into()).unwrap();
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::Char('y'))); // no positive button
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(
            coordinator.get_response(),
            Ok(DialogResponse::Button {
                which: Button::Negative,
                progress: None
            })
        );
    }

    #[test]
    fn test_single_choice_then_confirm() {
        let (mut app, coordinator) = setup();
        coordinator.create_alert(None, None);
        coordinator
            .set_single_choice_items(vec!["x".into(), "y".into(), "z".into()], Some(0))
            .unwrap();
        coordinator.set_positive_button_text("OK".into()).unwrap();
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(coordinator.get_selected_items(), Ok(vec![2]));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(
            coordinator.get_response(),
            Ok(DialogResponse::Button {
                which: Button::Positive,
                progress: None
            })
        );
    }

    #[test]
    fn test_seek_bar_keys() {
        let (mut app, coordinator) = setup();
        coordinator.create_seek_bar(DEFAULT_SEEK_PROGRESS, DEFAULT_MAX, "t".into(), "m".into());
        coordinator.set_positive_button_text("Set".into()).unwrap();
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::End));
        app.handle_key(key(KeyCode::PageDown));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            coordinator.get_response(),
            Ok(DialogResponse::Button {
                which: Button::Positive,
                progress: Some(89)
            })
        );
    }

    #[test]
    fn test_progress_escape_cancels() {
        let (mut app, coordinator) = setup();
        coordinator.create_horizontal_progress(None, None, DEFAULT_MAX);
        show(&mut app, &coordinator);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.active_task().is_some());
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(coordinator.get_response(), Ok(DialogResponse::Canceled));
    }
}
