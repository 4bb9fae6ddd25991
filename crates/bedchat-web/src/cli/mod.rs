//! CLI command definitions for the `bedchat` binary.
//!
//! Uses clap derive macros for argument parsing. Without a subcommand the
//! binary starts the web server.

pub mod chat;
pub mod check;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat with a Bedrock-hosted model from the browser or the terminal.
#[derive(Parser)]
#[command(name = "bedchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to bedchat.toml (defaults to the platform config directory).
    #[arg(long, global = true, env = "BEDCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Show a generic apology instead of the provider error text in replies.
    #[arg(long, global = true)]
    pub hide_errors: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web chat server.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host address to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat in the terminal using a single in-process session.
    Chat,

    /// Send a short test prompt to verify Bedrock credentials and model access.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["bedchat"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["bedchat", "-vv", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Serve { port, host }) => {
                assert_eq!(port, Some(9000));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }
}
