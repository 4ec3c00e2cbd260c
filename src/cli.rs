//! Command line interface for the `errorframe` binary.
//!
//! The binary is a diagnostic tool: it shows how a wire value would be
//! classified and handled, and how a result would be enveloped.

use clap::{Parser, Subcommand, ValueEnum};

/// Command line arguments for the `errorframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "errorframe",
    version,
    about = "Inspect failure classification and response envelopes"
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a JSON value as if a handler had failed with it.
    Classify {
        /// Context the failure is raised under.
        #[arg(short, long, value_enum, default_value_t = ContextArg::Http)]
        context: ContextArg,
        /// Redeliveries the message has already had.
        #[arg(short, long, default_value_t = 0)]
        retries: u32,
        /// Redelivery budget.
        #[arg(long, default_value_t = 2)]
        max_retries: u32,
        /// Prefix prepended to HTTP-facing messages.
        #[arg(short, long)]
        prefix: Option<String>,
        /// The thrown value as JSON.
        json: String,
    },
    /// Wrap a JSON result in the standard response envelope.
    Envelope {
        /// The handler result as JSON.
        json: String,
        /// Request path recorded in the envelope metadata.
        #[arg(short, long, default_value = "/")]
        path: String,
        /// Request id recorded in the envelope metadata.
        #[arg(long)]
        request_id: Option<String>,
    },
}

/// Context names accepted by `--context`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContextArg {
    /// HTTP request.
    Http,
    /// Queue message or RPC call.
    Rpc,
    /// WebSocket event.
    Ws,
}

impl ContextArg {
    /// Context name as the host runtime reports it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Rpc => "rpc",
            Self::Ws => "ws",
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command, ContextArg};

    #[test]
    fn parses_classify_options() {
        let cli = Cli::parse_from([
            "errorframe",
            "classify",
            "--context",
            "rpc",
            "--retries",
            "3",
            r#"{"message":"timeout"}"#,
        ]);
        let Command::Classify {
            context,
            retries,
            max_retries,
            prefix,
            json,
        } = cli.command
        else {
            panic!("expected classify");
        };
        assert_eq!(context, ContextArg::Rpc);
        assert_eq!((retries, max_retries), (3, 2));
        assert_eq!(prefix, None);
        assert_eq!(json, r#"{"message":"timeout"}"#);
    }

    #[test]
    fn parses_envelope_path() {
        let cli = Cli::parse_from(["errorframe", "envelope", "[1,2]", "--path", "/items"]);
        let Command::Envelope { json, path, request_id } = cli.command else {
            panic!("expected envelope");
        };
        assert_eq!(json, "[1,2]");
        assert_eq!(path, "/items");
        assert_eq!(request_id, None);
    }

    #[test]
    fn rejects_unknown_context() {
        assert!(Cli::try_parse_from(["errorframe", "classify", "-c", "grpc", "{}"]).is_err());
    }
}
