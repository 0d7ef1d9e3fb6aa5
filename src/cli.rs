//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros. With no subcommand the
//! binary hosts the dialog surface; the subcommands are thin socket clients.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Get default socket path, preferring XDG_RUNTIME_DIR on Linux
fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("dialogd.sock");
    }
    PathBuf::from("/tmp/dialogd.sock")
}

/// Terminal dialog host for scripts: progress, alerts and seek bars over a Unix socket
#[derive(Parser, Debug)]
#[command(name = "dialogd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Socket path (default: $XDG_RUNTIME_DIR/dialogd.sock or /tmp/dialogd.sock)
    #[arg(
        short,
        long,
        env = "DIALOGD_SOCKET",
        default_value_os_t = default_socket_path(),
        global = true
    )]
    pub socket: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Tick rate in ticks per second (overrides config)
    #[arg(short = 't', long)]
    pub tick_rate: Option<f64>,

    /// Frame rate in frames per second (overrides config)
    #[arg(short = 'F', long)]
    pub frame_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make one call on its own session and print the result
    ///
    /// The session ends after the call, which dismisses the dialog unless
    /// `dismiss_on_disconnect` is off. Use `session` to create, show and
    /// answer a dialog. Example: dialogd call dialogGetResponse
    Call {
        /// Method name, e.g. dialogShow
        method: String,

        /// Parameters as a JSON array or object
        params: Option<String>,
    },

    /// Read calls from stdin, one per line, on a single session
    ///
    /// Lines are either full request objects or `method [params-json]`.
    Session,

    /// List the methods the host understands
    Methods,

    /// Print the config file location and an example config
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "dialogd", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_verifies() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_call_parses() {
        let cli = Cli::try_parse_from([
            "dialogd",
            "--socket",
            "/tmp/x.sock",
            "call",
            "dialogCreateAlert",
            r#"["T","M"]"#,
        ])
        .unwrap();
        assert_eq!(cli.socket, PathBuf::from("/tmp/x.sock"));
        match cli.command {
            Some(Commands::Call { method, params }) => {
                assert_eq!(method, "dialogCreateAlert");
                assert_eq!(params.as_deref(), Some(r#"["T","M"]"#));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_host_mode_rate_overrides() {
        let cli = Cli::try_parse_from(["dialogd", "-t", "10"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.tick_rate, Some(10.0));
        assert_eq!(cli.frame_rate, None);
    }
}
