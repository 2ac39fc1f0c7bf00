/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `pbv` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2** — input/schema failure: the tool could not read, parse,
/// or make sense of its input at all. These errors terminate early before
/// any validation runs.
/// - Exit code **1** — logical failure: the tool ran to completion but the
/// payload was rejected by the schema's declared rules.
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `pbv` CLI can produce.
///
/// Use [`CliError::exit_code`] to obtain the exit code associated with each
/// variant. [`CliError::message`] returns the human-readable error string
/// that should be printed to stderr before exiting.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input/schema failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// A human-readable label for the source (`"-"` for stdin, or the
        /// filesystem path).
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only; `None` for
        /// stdin where the exact size is unknown).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The schema file is not well-formed JSON.
    SchemaParseFailed {
        /// The underlying `serde_json` error message.
        detail: String,
    },

    /// The schema parsed as JSON but violates a model invariant (duplicate
    /// field name, out-of-range `oneof_index`, ...).
    SchemaInvalid {
        /// The underlying [`pbv_core::ModelError`] message.
        detail: String,
    },

    /// `check --message <NAME>` named a message that does not exist in the
    /// schema.
    UnknownMessage {
        /// The message name that was not found.
        name: String,
    },

    /// The payload file is not well-formed JSON.
    PayloadParseFailed {
        /// The underlying `serde_json` error message.
        detail: String,
    },

    /// The payload JSON does not match the shape the schema's field types
    /// require (wrong JSON type for a field, unrepresentable well-known
    /// type, ...).
    PayloadShapeMismatch {
        /// A description of the mismatch.
        detail: String,
    },

    /// `pbv-codegen::compile_schema` rejected the schema (cyclic file
    /// dependency, template rendering failure, ...).
    CompileFailed {
        /// The underlying [`pbv_codegen::CodegenError`] message.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// `check` ran to completion but the payload failed one or more declared
    /// constraints.
    ///
    /// The violations have already been printed; this variant exists so
    /// `main` can call `process::exit(1)` cleanly.
    ValidationRejected,
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2` — input/schema failure (file not found, parse error, invalid
    /// schema, unknown message, malformed payload, compile failure).
    /// - `1` — logical failure (the payload was rejected by the schema).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::SchemaParseFailed { .. }
            | Self::SchemaInvalid { .. }
            | Self::UnknownMessage { .. }
            | Self::PayloadParseFailed { .. }
            | Self::PayloadShapeMismatch { .. }
            | Self::CompileFailed { .. } => 2,

            Self::ValidationRejected => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge { source, limit, actual: Some(actual) } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge { source, limit, actual: None } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 { source, byte_offset } => {
                format!("error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}")
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::SchemaParseFailed { detail } => {
                format!("error: failed to parse schema JSON: {detail}")
            }
            Self::SchemaInvalid { detail } => {
                format!("error: schema failed model validation: {detail}")
            }
            Self::UnknownMessage { name } => {
                format!("error: no message named '{name}' in schema")
            }
            Self::PayloadParseFailed { detail } => {
                format!("error: failed to parse payload JSON: {detail}")
            }
            Self::PayloadShapeMismatch { detail } => {
                format!("error: payload does not match schema: {detail}")
            }
            Self::CompileFailed { detail } => {
                format!("error: schema compilation failed: {detail}")
            }
            Self::ValidationRejected => "error: payload rejected: one or more constraints failed".to_owned(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
