//! Brings the terminal surface forward when a dialog is queued

use crate::dialog::Launcher;
use crate::event::Event;
use crate::notify;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Wakes the UI loop and optionally pings the desktop
///
/// `launch` is called from the blocking pool, so it never awaits: a full
/// channel is fine because the UI also drains the slot on every tick.
pub struct SurfaceLauncher {
    events: mpsc::Sender<Event>,
    notify: bool,
}

impl SurfaceLauncher {
    pub fn new(events: mpsc::Sender<Event>, notify: bool) -> Self {
        Self { events, notify }
    }
}

impl Launcher for SurfaceLauncher {
    fn launch(&self) {
        match self.events.try_send(Event::Raise) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!("Event channel full, dialog will be drained on tick");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("UI surface is gone, dialog cannot be raised");
            }
        }
        if self.notify {
            notify::dialog_waiting();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_posts_raise() {
        let (tx, mut rx) = mpsc::channel(1);
        let launcher = SurfaceLauncher::new(tx, false);
        launcher.launch();
        launcher.launch(); // full channel is not an error
        assert!(matches!(rx.try_recv(), Ok(Event::Raise)));
        assert!(rx.try_recv().is_err());
    }
}
