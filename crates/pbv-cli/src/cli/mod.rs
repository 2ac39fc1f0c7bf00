//! Clap CLI definition: root struct and subcommands.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits one line per violation to stderr; `Json` emits each
/// violation as a single-line NDJSON object.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default).
    Human,
    /// NDJSON output, one object per violation.
    Json,
}

/// All top-level subcommands exposed by the `pbv` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Compile a JSON-encoded schema into validator source text.
    Compile {
        /// Path to a JSON-encoded schema file, or `-` for stdin.
        #[arg(value_name = "SCHEMA")]
        schema: PathOrStdin,
        /// Directory to write the rendered validator source into (one file
        /// per schema file, named after its declared `path`).
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        /// Fixed capacity threaded into every rendered validator's
        /// `ValidationContext<N>` (: a single compile-time
        /// bound shared across the engine).
        #[arg(long, default_value = "32")]
        violation_capacity: usize,
    },

    /// Validate a sample JSON payload against one message type in a schema.
    ///
    /// Decodes `payload` through the schema-guided JSON-to-`MessageValue`
    /// bridge and runs it through the same IR `pbv-codegen` compiles from,
    /// interpreted directly rather than compiled — useful for schema authors
    /// smoke-testing constraints before wiring up the real wire codec.
    Check {
        /// Path to a JSON-encoded schema file, or `-` for stdin.
        #[arg(value_name = "SCHEMA")]
        schema: PathOrStdin,
        /// Path to a JSON-encoded sample payload, or `-` for stdin (at most
        /// one of `schema`/`payload` may be `-`).
        #[arg(value_name = "PAYLOAD")]
        payload: PathOrStdin,
        /// Name of the message type in the schema to validate the payload
        /// against.
        #[arg(long, value_name = "MESSAGE")]
        message: String,
    },
}

/// Root CLI struct for the `pbv` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
        name = "pbv",
        version,
        about = "Constraint-compiler and runtime-validator front end",
        long_about = "Compiles JSON-encoded protobuf-style schemas into constraint\n\
        validator source text, and smoke-tests sample payloads\n\
        against a schema's declared rules."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format for `check` diagnostics: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity: rule counts, timing (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `PBV_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(long, global = true, env = "PBV_MAX_FILE_SIZE", default_value = "268435456")]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compile_subcommand_parses() {
        let cli = Cli::parse_from(["pbv", "compile", "schema.json", "--out", "out/"]);
        match cli.command {
            Command::Compile { schema, out, violation_capacity } => {
                assert!(matches!(schema, PathOrStdin::Path(p) if p == PathBuf::from("schema.json")));
                assert_eq!(out, PathBuf::from("out/"));
                assert_eq!(violation_capacity, 32);
            }
            Command::Check { .. } => panic!("expected Compile"),
        }
    }

    #[test]
    fn check_subcommand_parses() {
        let cli = Cli::parse_from(["pbv", "check", "schema.json", "payload.json", "--message", "Envelope"]);
        match cli.command {
            Command::Check { schema, payload, message } => {
                assert!(matches!(schema, PathOrStdin::Path(p) if p == PathBuf::from("schema.json")));
                assert!(matches!(payload, PathOrStdin::Path(p) if p == PathBuf::from("payload.json")));
                assert_eq!(message, "Envelope");
            }
            Command::Compile { .. } => panic!("expected Check"),
        }
    }

    #[test]
    fn check_subcommand_accepts_stdin_sentinel_for_payload() {
        let cli = Cli::parse_from(["pbv", "check", "schema.json", "-", "--message", "Envelope"]);
        match cli.command {
            Command::Check { payload, .. } => assert!(matches!(payload, PathOrStdin::Stdin)),
            Command::Compile { .. } => panic!("expected Check"),
        }
    }
}
