use super::Event;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Poll interval for terminal input
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Listen for keyboard and resize events with graceful shutdown support
pub async fn listen(tx: mpsc::Sender<Event>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("Input listener cancelled");
                break;
            }
            () = tokio::time::sleep(POLL_INTERVAL) => {
                // Non-blocking poll; the sleep above is the wait
                if !event::poll(Duration::ZERO).unwrap_or(false) {
                    continue;
                }
                let forwarded = match event::read() {
                    // Windows reports releases too; only presses drive dialogs
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Some(Event::Key(key))
                    }
                    Ok(CrosstermEvent::Resize(_, _)) => Some(Event::Resize),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read terminal input");
                        None
                    }
                };
                if let Some(event) = forwarded {
                    if tx.send(event).await.is_err() {
                        // Channel closed, exit
                        break;
                    }
                }
            }
        }
    }
}
