pub mod input;
pub mod socket;

use chrono::{DateTime, Local};

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input
    Key(crossterm::event::KeyEvent),
    /// Terminal resized; redraw
    Resize,
    /// A dialog was queued and the surface should come forward
    Raise,
    /// A socket session connected
    SessionOpened { session: u64 },
    /// A socket session went away
    SessionClosed { session: u64 },
    /// A remote call finished (boxed to keep the enum small)
    Call(Box<CallRecord>),
}

/// One completed remote call, for the activity log
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// When the call finished
    pub at: DateTime<Local>,
    /// Session that made the call
    pub session: u64,
    /// Method name as sent (may be unknown)
    pub method: String,
    /// Error text if the call failed
    pub error: Option<String>,
}

impl CallRecord {
    pub fn new(session: u64, method: impl Into<String>, error: Option<String>) -> Self {
        Self {
            at: Local::now(),
            session,
            method: method.into(),
            error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
