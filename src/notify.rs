//! Desktop notification when a dialog is waiting
//!
//! Uses notify-rust (libnotify on Linux, native APIs on macOS).

use notify_rust::Notification;

/// Notification display time
const TIMEOUT_MS: i32 = 5000;

/// Tell the user a dialog is waiting in the dialogd terminal
///
/// Fire and forget: runs on its own thread so the caller never blocks on the
/// notification daemon.
pub fn dialog_waiting() {
    std::thread::spawn(|| {
        if let Err(e) = Notification::new()
            .summary("dialogd")
            .body("A script is waiting for your answer")
            .timeout(TIMEOUT_MS)
            .show()
        {
            tracing::debug!(error = %e, "Desktop notification failed");
        }
    });
}
