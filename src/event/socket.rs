//! Unix socket RPC listener
//!
//! Each connection is a session: request lines are handled one after another
//! on the blocking pool, since `dialogShow` and `dialogGetResponse` park the
//! calling thread until the user acts.

use super::{CallRecord, Event};
use crate::config::SessionConfig;
use crate::dialog::DialogCoordinator;
use crate::errors::{DialogError, RpcError};
use crate::rpc::{self, Request, Response};
use color_eyre::Result;
use serde_json::Value;
use std::os::unix::io::{FromRawFd, IntoRawFd};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Socket receive buffer size (request lines are small)
const SOCKET_RECV_BUF: usize = 16 * 1024;

/// Request lines a client may send ahead of the call in progress
const PIPELINED_LINES: usize = 16;

/// Upper bound for accept error backoff
const MAX_BACKOFF_MS: u64 = 5000;

/// Serves the dialog coordinator on a Unix socket
#[derive(Clone)]
pub struct SocketServer {
    coordinator: Arc<DialogCoordinator>,
    events: mpsc::Sender<Event>,
    session: SessionConfig,
    cancel: CancellationToken,
}

impl SocketServer {
    pub fn new(
        coordinator: Arc<DialogCoordinator>,
        events: mpsc::Sender<Event>,
        session: SessionConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            coordinator,
            events,
            session,
            cancel,
        }
    }

    /// Accept sessions until cancelled
    pub async fn listen(self, socket_path: &Path) -> Result<()> {
        // Remove stale socket file
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }

        // Create socket with socket2 for buffer tuning
        let socket = socket2::Socket::new(socket2::Domain::UNIX, socket2::Type::STREAM, None)?;
        if let Err(e) = socket.set_recv_buffer_size(SOCKET_RECV_BUF) {
            tracing::debug!("Could not set recv buffer size: {}", e);
        }
        socket.bind(&socket2::SockAddr::unix(socket_path)?)?;
        socket.listen(16)?;
        socket.set_nonblocking(true)?;

        // Convert to tokio UnixListener
        let std_listener: std::os::unix::net::UnixListener =
            unsafe { std::os::unix::net::UnixListener::from_raw_fd(socket.into_raw_fd()) };
        let listener = UnixListener::from_std(std_listener)?;

        tracing::info!(
            max_sessions = self.session.max_sessions,
            "Listening on {:?}",
            socket_path
        );

        let sessions = Arc::new(Semaphore::new(self.session.max_sessions));
        let next_session = AtomicU64::new(1);
        let mut backoff_ms: u64 = 0;

        loop {
            let accepted = tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!("Socket listener cancelled");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((mut stream, _)) => {
                    backoff_ms = 0;

                    let Ok(permit) = Arc::clone(&sessions).try_acquire_owned() else {
                        tracing::warn!(
                            "Session limit reached ({} max), refusing connection",
                            self.session.max_sessions
                        );
                        let refusal = Response::err(
                            Value::Null,
                            &RpcError::SessionLimit(self.session.max_sessions),
                        );
                        tokio::spawn(async move {
                            let _ = write_response(&mut stream, &refusal).await;
                            let _ = stream.shutdown().await;
                        });
                        continue;
                    };

                    let session = next_session.fetch_add(1, Ordering::Relaxed);
                    let server = self.clone();
                    tokio::spawn(server.serve_session(stream, session, permit));
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);

                    // Exponential backoff to prevent CPU spin on persistent errors
                    backoff_ms = if backoff_ms == 0 {
                        100
                    } else {
                        (backoff_ms * 2).min(MAX_BACKOFF_MS)
                    };
                    tracing::debug!("Backing off for {}ms", backoff_ms);
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }

        Ok(())
    }

    async fn serve_session(self, stream: UnixStream, session: u64, permit: OwnedSemaphorePermit) {
        tracing::info!(session, "Session opened");
        let _ = self.events.send(Event::SessionOpened { session }).await;

        let (reader, mut writer) = stream.into_split();
        let (lines_tx, mut lines) = mpsc::channel(PIPELINED_LINES);
        let disconnected = CancellationToken::new();
        let reader_task = tokio::spawn(read_lines(
            reader,
            lines_tx,
            disconnected.clone(),
            session,
        ));

        loop {
            let line = tokio::select! {
                () = self.cancel.cancelled() => break,
                line = lines.recv() => line,
            };

            let line = match line {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => line,
                None => break, // Peer closed
            };

            let (method, response) = match Request::parse(&line) {
                Ok(request) => {
                    let method = request.method.clone();
                    (method, self.run_call(request, &disconnected, session).await)
                }
                Err(e) => {
                    tracing::warn!(session, "Failed to parse request: {} - {}", e, line);
                    ("<malformed>".to_string(), Response::err(Value::Null, &e))
                }
            };

            let record = CallRecord::new(session, method, response.error.clone());
            let _ = self.events.send(Event::Call(Box::new(record))).await;

            if let Err(e) = write_response(&mut writer, &response).await {
                tracing::warn!(session, "Write error: {}", e);
                break;
            }
        }

        reader_task.abort();
        if self.session.dismiss_on_disconnect {
            self.coordinator.dismiss();
        }
        drop(permit);
        tracing::info!(session, "Session closed");
        let _ = self.events.send(Event::SessionClosed { session }).await;
    }

    /// Run one call on the blocking pool
    ///
    /// Shutdown interrupts a parked call so it answers with an error instead
    /// of hanging. If the client goes away while the call is parked, the
    /// dialog is dismissed when configured; otherwise the dialog stays up for
    /// the next session and the parked thread is left to finish on its own.
    async fn run_call(
        &self,
        request: Request,
        disconnected: &CancellationToken,
        session: u64,
    ) -> Response {
        let id = request.id.clone();
        let coordinator = Arc::clone(&self.coordinator);
        let mut call = tokio::task::spawn_blocking(move || rpc::handle(&coordinator, request));

        let joined = tokio::select! {
            biased;
            joined = &mut call => joined,
            () = self.cancel.cancelled() => {
                self.coordinator.interrupt();
                call.await
            }
            () = disconnected.cancelled() => {
                if self.session.dismiss_on_disconnect {
                    tracing::info!(session, "Client left during a call, dismissing dialog");
                    self.coordinator.dismiss();
                    call.await
                } else {
                    tracing::info!(session, "Client left during a call, leaving dialog up");
                    return Response::err(id, &RpcError::Dialog(DialogError::InterruptedWait));
                }
            }
        };

        joined.unwrap_or_else(|e| {
            tracing::error!("Call task failed: {}", e);
            Response {
                id,
                result: Value::Null,
                error: Some(format!("Call task failed: {e}")),
            }
        })
    }
}

/// Forward request lines until the client closes its end or the session ends
async fn read_lines(
    reader: OwnedReadHalf,
    lines_tx: mpsc::Sender<String>,
    disconnected: CancellationToken,
    session: u64,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if lines_tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(session, "Read error: {}", e);
                break;
            }
        }
    }
    disconnected.cancel();
}

async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{Launcher, TaskSlot};
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, BufReader};

    struct NoopLauncher;

    impl Launcher for NoopLauncher {
        fn launch(&self) {}
    }

    async fn start(
        dir: &tempfile::TempDir,
        session: SessionConfig,
    ) -> (
        std::path::PathBuf,
        mpsc::Receiver<Event>,
        CancellationToken,
        Arc<DialogCoordinator>,
    ) {
        let path = dir.path().join("dialogd.sock");
        let (tx, rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let coordinator = Arc::new(DialogCoordinator::new(
            Arc::new(TaskSlot::new()),
            Arc::new(NoopLauncher),
        ));
        let server = SocketServer::new(
            Arc::clone(&coordinator),
            tx,
            session,
            cancel.clone(),
        );
        let listen_path = path.clone();
        tokio::spawn(async move { server.listen(&listen_path).await });
        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        (path, rx, cancel, coordinator)
    }

    async fn roundtrip(
        lines: &mut tokio::io::Lines<BufReader<tokio::net::unix::OwnedReadHalf>>,
        writer: &mut tokio::net::unix::OwnedWriteHalf,
        request: Value,
    ) -> Response {
        let mut line = request.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await.unwrap();
        let reply = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&reply).unwrap()
    }

    #[tokio::test]
    async fn test_session_calls() {
        let dir = tempfile::tempdir().unwrap();
        let (path, mut events, cancel, coordinator) = start(&dir, SessionConfig::default()).await;

        let stream = UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let response = roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 1, "method": "dialogCreateAlert", "params": ["T", "M"]}),
        )
        .await;
        assert_eq!(response, Response::ok(json!(1), Value::Null));

        let response = roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 2, "method": "dialogSetSingleChoiceItems", "params": {"items": ["a", "b"], "selected": 1}}),
        )
        .await;
        assert!(response.is_ok());

        let response = roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 3, "method": "dialogGetSelectedItems"}),
        )
        .await;
        assert_eq!(response.result, json!([1]));

        writer.write_all(b"garbage\n").await.unwrap();
        let reply: Response =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply.id, Value::Null);
        assert!(reply.error.unwrap().starts_with("Malformed request"));

        assert!(matches!(
            events.recv().await,
            Some(Event::SessionOpened { session: 1 })
        ));
        match events.recv().await {
            Some(Event::Call(record)) => {
                assert_eq!(record.method, "dialogCreateAlert");
                assert!(record.is_ok());
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Disconnect dismisses the session's dialog
        drop(writer);
        drop(lines);
        loop {
            match events.recv().await {
                Some(Event::SessionClosed { session: 1 }) => break,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
        assert!(coordinator.current().is_none());
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_second_session_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (path, mut events, cancel, _coordinator) = start(&dir, SessionConfig::default()).await;

        let _first = UnixStream::connect(&path).await.unwrap();
        assert!(matches!(
            events.recv().await,
            Some(Event::SessionOpened { .. })
        ));

        let second = UnixStream::connect(&path).await.unwrap();
        let mut lines = BufReader::new(second).lines();
        let reply: Response =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(
            reply.error.as_deref(),
            Some("Host busy: 1 session(s) already connected")
        );
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_parked_call() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _events, cancel, _coordinator) = start(&dir, SessionConfig::default()).await;

        let stream = UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 1, "method": "dialogCreateAlert"}),
        )
        .await;

        // Nobody drains the slot, so this parks until shutdown
        writer
            .write_all(b"{\"id\": 2, \"method\": \"dialogShow\"}\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let reply: Response =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply.id, json!(2));
        assert_eq!(reply.error.as_deref(), Some("Wait interrupted"));
    }

    async fn wait_closed(events: &mut mpsc::Receiver<Event>, session: u64) {
        loop {
            match events.recv().await {
                Some(Event::SessionClosed { session: closed }) if closed == session => break,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    /// Leave a `dialogShow` parked (nobody drains the slot) and hang up
    async fn abandon_parked_show(path: &Path) {
        let stream = UnixStream::connect(path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 1, "method": "dialogCreateAlert", "params": ["T"]}),
        )
        .await;
        writer
            .write_all(b"{\"id\": 2, \"method\": \"dialogShow\"}\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_disconnect_during_parked_call_frees_session() {
        let dir = tempfile::tempdir().unwrap();
        let (path, mut events, cancel, coordinator) =
            start(&dir, SessionConfig::default()).await;

        abandon_parked_show(&path).await;
        wait_closed(&mut events, 1).await;
        assert!(coordinator.current().is_none());

        let stream = UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let response = roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 1, "method": "dialogCreateAlert"}),
        )
        .await;
        assert_eq!(response, Response::ok(json!(1), Value::Null));
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_disconnect_keeps_dialog_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionConfig {
            dismiss_on_disconnect: false,
            ..SessionConfig::default()
        };
        let (path, mut events, cancel, coordinator) = start(&dir, session).await;

        abandon_parked_show(&path).await;
        wait_closed(&mut events, 1).await;
        let task = coordinator.current().unwrap();
        assert_eq!(task.state(), crate::dialog::TaskState::Queued);

        let stream = UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let response = roundtrip(
            &mut lines,
            &mut writer,
            json!({"id": 7, "method": "dialogGetSelectedItems"}),
        )
        .await;
        assert_eq!(response, Response::ok(json!(7), json!([])));

        // Shutdown still releases the thread left parked by the first client
        cancel.cancel();
        coordinator.interrupt();
        assert_eq!(task.wait_shown(), Err(DialogError::InterruptedWait));
    }
}
