//! Application state and logic
//!
//! The `App` is the UI surface: it drains the task slot, realizes dialogs,
//! turns key presses into user responses and keeps the activity log.
//! It only holds a weak reference to the dialog it renders; the coordinator
//! owns the task.

mod keyboard;
pub mod launcher;

pub use launcher::SurfaceLauncher;

use crate::dialog::{DialogTask, TaskSlot};
use crate::event::{CallRecord, Event};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// How long footer status messages stay visible
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Reason given to callers when the surface closes under them
pub const SURFACE_CLOSED: &str = "surface closed";

/// Application state and logic
pub struct App {
    /// Hand-off slot filled by the coordinator
    pub slot: Arc<TaskSlot>,
    /// Dialog currently on screen
    pub active: Option<Weak<DialogTask>>,
    pub should_quit: bool,
    /// Dirty flag: true if UI needs re-render (render-on-change optimization)
    pub needs_render: bool,
    /// Spinner animation frame, advanced on tick
    pub spinner_frame: usize,
    /// Recent remote calls, newest last
    pub activity: VecDeque<CallRecord>,
    /// Bound on `activity`
    pub activity_limit: usize,
    /// Connected socket sessions
    pub sessions: usize,
    /// Socket path shown in the header
    pub socket: PathBuf,
    /// Status message to display in footer (message, timestamp)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(slot: Arc<TaskSlot>, socket: PathBuf, activity_limit: usize) -> Self {
        Self {
            slot,
            active: None,
            should_quit: false,
            needs_render: true, // Always render first frame
            spinner_frame: 0,
            activity: VecDeque::with_capacity(activity_limit),
            activity_limit,
            sessions: 0,
            socket,
            status_message: None,
        }
    }

    /// Show a status message in the footer
    pub fn show_status(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), Instant::now()));
        self.needs_render = true;
    }

    /// The dialog on screen, if it is still live
    pub fn active_task(&self) -> Option<Arc<DialogTask>> {
        self.active
            .as_ref()
            .and_then(Weak::upgrade)
            .filter(|task| !task.state().is_terminal())
    }

    /// Handle incoming events
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                self.handle_key(key);
                self.needs_render = true;
            }
            Event::Resize => {
                self.needs_render = true;
            }
            Event::Raise => {
                self.drain_pending();
            }
            Event::SessionOpened { session } => {
                self.sessions += 1;
                self.show_status(&format!("Session {session} connected"));
            }
            Event::SessionClosed { session } => {
                self.sessions = self.sessions.saturating_sub(1);
                self.show_status(&format!("Session {session} disconnected"));
            }
            Event::Call(record) => {
                self.record_call(*record);
            }
        }
    }

    fn record_call(&mut self, record: CallRecord) {
        if self.activity_limit == 0 {
            return;
        }
        while self.activity.len() >= self.activity_limit {
            self.activity.pop_front();
        }
        self.activity.push_back(record);
        self.needs_render = true;
    }

    /// Realize whatever the coordinator queued
    ///
    /// Tasks dismissed before they were drained are skipped.
    pub fn drain_pending(&mut self) {
        let Some(task) = self.slot.take() else {
            return;
        };
        if task.realize() {
            tracing::info!(task_id = task.id(), kind = task.kind(), "Dialog realized");
            self.active = Some(Arc::downgrade(&task));
            self.needs_render = true;
        } else {
            tracing::debug!(
                task_id = task.id(),
                state = ?task.state(),
                "Skipped dialog that is no longer pending"
            );
        }
    }

    /// Timer updates
    pub fn tick(&mut self) {
        self.drain_pending();

        if let Some(task) = self.active_task() {
            if task.kind() == "spinner" {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                self.needs_render = true;
            }
        } else if self.active.take().is_some() {
            // Answered or dismissed since the last tick
            self.needs_render = true;
        }

        if let Some((_, at)) = &self.status_message {
            if at.elapsed() >= STATUS_TTL {
                self.status_message = None;
                self.needs_render = true;
            }
        }
    }

    /// Mark frame as rendered
    pub fn rendered(&mut self) {
        self.needs_render = false;
    }

    /// Fail anything still waiting on this surface
    pub fn shutdown(&mut self) {
        if let Some(task) = self.active_task() {
            tracing::info!(task_id = task.id(), "Abandoning shown dialog");
            task.abandon(SURFACE_CLOSED);
        }
        if let Some(task) = self.slot.take() {
            tracing::info!(task_id = task.id(), "Abandoning queued dialog");
            task.abandon(SURFACE_CLOSED);
        }
        self.active = None;
    }
}
