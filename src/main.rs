// Clippy configuration: enable pedantic but allow overly strict lints
#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::missing_panics_doc)] // Internal functions don't need # Panics docs
#![allow(clippy::must_use_candidate)] // Not all getters need #[must_use]
#![allow(clippy::module_name_repetitions)] // e.g., DialogTask in dialog module is fine
#![allow(clippy::doc_markdown)] // Don't require backticks around JSON, TOML, etc.
#![allow(clippy::too_many_lines)] // Some functions are naturally long
#![allow(clippy::cast_possible_truncation)] // We're careful with our casts
#![allow(clippy::cast_sign_loss)] // Index conversions are range-checked first
#![allow(clippy::cast_possible_wrap)] // Index conversions are range-checked first
#![allow(clippy::significant_drop_tightening)] // Lock guard drops are intentional
#![allow(clippy::redundant_closure_for_method_calls)] // Sometimes closures are clearer
#![allow(clippy::match_same_arms)] // Explicit arms are clearer than combined patterns
#![allow(clippy::option_if_let_else)] // if-let is more readable for Option handling
#![allow(clippy::needless_pass_by_value)] // Owned params mirror the wire arguments

//! dialogd - Terminal dialog host for scripts
//!
//! A single Rust binary that provides both:
//! - Host mode: a terminal surface that shows one dialog at a time, driven
//!   by calls arriving on a Unix socket
//! - Client modes: send calls to a running host and print the answers
//!
//! Usage:
//!   dialogd                                   # Host the dialog surface
//!   dialogd session < script.txt              # Create, show and answer a dialog
//!   dialogd call dialogGetResponse            # One call on its own session
//!
//! `call` opens a fresh session per invocation. With the default
//! `dismiss_on_disconnect`, a dialog created by `call` is dismissed as soon
//! as that session ends, so multi-step scripts use `session`.

mod app;
mod cli;
mod config;
mod dialog;
mod errors;
mod event;
mod notify;
mod rpc;
mod tui;
mod ui;

use app::{App, SurfaceLauncher};
use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use dialog::{DialogCoordinator, TaskSlot};
use event::socket::SocketServer;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long a client waits for the host to accept
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// How long the host waits for the socket listener to wind down
const LISTENER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/dialogd/logs"),
        |dirs| dirs.cache_dir().join("dialogd").join("logs"),
    )
}

/// Client modes log to stderr so stdout carries only results
fn init_client_logging(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("dialogd={level}")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// A rate from the command line must keep the run loop's intervals sane
fn checked_rate(name: &str, value: f64) -> Result<f64> {
    if config::RATE_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(eyre!(
            "--{name} must be between {} and {}, got {value}",
            config::RATE_RANGE.start(),
            config::RATE_RANGE.end()
        ))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    color_eyre::install()?;

    match cli.command {
        Some(Commands::Call { method, params }) => {
            init_client_logging(&cli.log_level);
            return run_call(&cli.socket, method, params).await;
        }
        Some(Commands::Session) => {
            init_client_logging(&cli.log_level);
            return run_session(&cli.socket).await;
        }
        Some(Commands::Methods) => {
            print_methods();
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Config) => {
            println!("# {}", config::DialogdConfig::default_path().display());
            print!("{}", config::DialogdConfig::example());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Completions { shell }) => {
            cli::print_completions(shell);
            return Ok(ExitCode::SUCCESS);
        }
        None => {
            // Host mode: continue with full setup
        }
    }

    // Setup file logging with rotation; the terminal belongs to the surface
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "dialogd.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let log_filter = format!("dialogd={}", cli.log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(non_blocking),
        )
        .init();

    tracing::info!("Starting dialogd v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {:?}", log_dir);
    tracing::debug!("Socket path: {:?}", cli.socket);

    let config = config::DialogdConfig::load();
    let tick_rate = checked_rate("tick-rate", cli.tick_rate.unwrap_or(config.ui.tick_rate))?;
    let frame_rate = checked_rate("frame-rate", cli.frame_rate.unwrap_or(config.ui.frame_rate))?;

    let (event_tx, event_rx) = mpsc::channel(100);

    let slot = Arc::new(TaskSlot::new());
    let launcher = Arc::new(SurfaceLauncher::new(event_tx.clone(), config.surface.notify));
    let coordinator = Arc::new(DialogCoordinator::new(slot.clone(), launcher));

    // Spawn socket listener
    let cancel = CancellationToken::new();
    let server = SocketServer::new(
        Arc::clone(&coordinator),
        event_tx.clone(),
        config.session.clone(),
        cancel.clone(),
    );
    let socket_path = cli.socket.clone();
    let socket_handle = tokio::spawn(async move {
        if let Err(e) = server.listen(&socket_path).await {
            tracing::error!("Socket listener error: {}", e);
        }
    });

    let mut app = App::new(slot, cli.socket.clone(), config.ui.activity_log);
    let result = run_tui(&mut app, event_tx, event_rx, tick_rate, frame_rate).await;

    // Nothing answers dialogs from here on
    app.shutdown();
    cancel.cancel();
    coordinator.interrupt();
    if tokio::time::timeout(LISTENER_SHUTDOWN_TIMEOUT, socket_handle)
        .await
        .is_err()
    {
        tracing::warn!("Socket listener did not stop in time");
    }

    if cli.socket.exists() {
        let _ = std::fs::remove_file(&cli.socket);
    }

    tracing::info!("dialogd stopped");
    result.map(|()| ExitCode::SUCCESS)
}

async fn run_tui(
    app: &mut App,
    event_tx: mpsc::Sender<event::Event>,
    mut event_rx: mpsc::Receiver<event::Event>,
    tick_rate: f64,
    frame_rate: f64,
) -> Result<()> {
    let tick_duration = Duration::from_secs_f64(1.0 / tick_rate);
    let frame_duration = Duration::from_secs_f64(1.0 / frame_rate);

    tracing::info!(
        "TUI starting: {:.1} FPS, {:.1} ticks/sec",
        frame_rate,
        tick_rate
    );

    let mut terminal = tui::init()?;

    // RAII guard ensures terminal is restored on panic or early return
    let _guard = tui::TerminalGuard;

    let cancel = CancellationToken::new();
    let input_cancel = cancel.clone();
    let input_handle = tokio::spawn(async move {
        event::input::listen(event_tx, input_cancel).await;
    });

    let mut last_frame = Instant::now();

    loop {
        // Frame rate limiting with dirty flag check
        let now = Instant::now();
        if app.needs_render && now.duration_since(last_frame) >= frame_duration {
            terminal.draw(|f| ui::render(f, app))?;
            app.rendered();
            last_frame = now;
        }

        tokio::select! {
            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }
            () = tokio::time::sleep(tick_duration) => {
                app.tick();
            }
        }

        if app.should_quit {
            break;
        }
    }

    tracing::debug!("Shutting down input listener");
    cancel.cancel();
    input_handle.abort();

    tui::restore()?;
    terminal.show_cursor()?;

    Ok(())
}

/// One connection to a running host
struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(socket: &Path) -> Result<Self> {
        let stream = match tokio::time::timeout(CONNECT_TIMEOUT, UnixStream::connect(socket)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(eyre!(
                    "Cannot reach dialogd at {}: {e} (is the host running?)",
                    socket.display()
                ))
            }
            Err(_) => return Err(eyre!("Timed out connecting to {}", socket.display())),
        };
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    /// Send one request and wait for its reply; dialog calls may block for a long time
    async fn call(&mut self, request: &rpc::Request) -> Result<rpc::Response> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        tracing::debug!(method = %request.method, "Request sent");

        let reply = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| eyre!("Host closed the connection"))?;
        serde_json::from_str(&reply).wrap_err("Host sent a malformed response")
    }
}

async fn run_call(socket: &Path, method: String, params: Option<String>) -> Result<ExitCode> {
    let params = params
        .map(|p| serde_json::from_str::<Value>(&p))
        .transpose()
        .wrap_err("params must be a JSON array or object")?;
    let request = rpc::Request {
        id: Value::from(1),
        method,
        params,
    };

    let mut client = Client::connect(socket).await?;
    let response = client.call(&request).await?;

    if let Some(error) = &response.error {
        eprintln!("error: {error}");
        return Ok(ExitCode::FAILURE);
    }
    if !response.result.is_null() {
        println!("{}", serde_json::to_string_pretty(&response.result)?);
    }
    Ok(ExitCode::SUCCESS)
}

/// Replay stdin on one session; the exit code reports whether every call succeeded
async fn run_session(socket: &Path) -> Result<ExitCode> {
    let mut client = Client::connect(socket).await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut next_id: u64 = 1;
    let mut failed = false;

    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let request = match rpc::Request::parse_loose(line, next_id) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("error: {e}: {line}");
                failed = true;
                continue;
            }
        };
        next_id += 1;

        let response = client.call(&request).await?;
        failed |= !response.is_ok();
        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_methods() {
    for method in rpc::methods::METHODS {
        let returns = method
            .returns
            .map_or_else(String::new, |r| format!(" -> {r}"));
        println!("{}{returns}", method.signature());
        println!("    {}", method.description);
        for param in method.params {
            if let Some(description) = param.description {
                println!("    {}: {description}", param.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_rate_bounds() {
        assert!(checked_rate("tick-rate", 4.0).is_ok());
        assert!(checked_rate("tick-rate", 1e-20).is_err());
        assert!(checked_rate("frame-rate", 1e9).is_err());
        assert!(checked_rate("frame-rate", f64::NAN).is_err());
        assert!(checked_rate("frame-rate", 0.0).is_err());
    }
}
