/// Violation formatting: human-readable and JSON (NDJSON) modes.
///
/// This module implements two output strategies for [`pbv_core::Violation`]
/// values:
///
/// - **Human mode** (default): one line per violation, colored red, to
/// stderr. Colors are disabled when `--no-color` is set, the `NO_COLOR`
/// environment variable is present (per <https://no-color.org>), or
/// stderr is not a TTY.
/// - **JSON mode**: each violation is serialized as a single-line JSON
/// object (NDJSON) to stderr.
///
/// Both modes support a **quiet** flag (suppress the summary line) and a
/// **verbose** flag (add timing).
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use pbv_core::Violation;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any non-empty value).
/// - stderr is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the violation formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress the summary line.
    pub quiet: bool,
    /// Emit timing information to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stderr TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Human-mode formatting
// ---------------------------------------------------------------------------

/// Writes a single [`Violation`] to `writer` in human-readable format.
///
/// Format: `field.path: message (constraint.id)`, using [`Violation`]'s own
/// `Display` impl, optionally wrapped in red ANSI codes.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_violation_human<W: Write>(writer: &mut W, violation: &Violation, config: &FormatterConfig) -> std::io::Result<()> {
    if config.colors {
        writeln!(writer, "{ANSI_RED}{violation}{ANSI_RESET}")
    } else {
        writeln!(writer, "{violation}")
    }
}

/// Writes a summary line to `writer` for human mode.
///
/// Format: `3 violations (truncated)` or `0 violations`.
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_human<W: Write>(writer: &mut W, count: usize, truncated: bool, config: &FormatterConfig) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    let noun = pluralize(count, "violation", "violations");
    if truncated {
        writeln!(writer, "{count} {noun} (truncated)")
    } else {
        writeln!(writer, "{count} {noun}")
    }
}

/// Writes timing information to `writer` in verbose mode.
///
/// This is a no-op when `config.verbose` is `false`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing_human<W: Write>(writer: &mut W, label: &str, duration: Duration, config: &FormatterConfig) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// JSON-mode formatting (NDJSON)
// ---------------------------------------------------------------------------

/// Writes a single [`Violation`] to `writer` as a NDJSON line.
///
/// Each line is a self-contained JSON object:
/// ```json
/// {"field_path":"amount","constraint_id":"uint32.gte","message":"..."}
/// ```
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_violation_json<W: Write>(writer: &mut W, violation: &Violation, _config: &FormatterConfig) -> std::io::Result<()> {
    let field_path_json = json_string(&violation.field_path);
    let constraint_id_json = json_string(violation.constraint_id.as_str());
    let message_json = json_string(violation.message);

    writeln!(
        writer,
        r#"{{"field_path":{field_path_json},"constraint_id":{constraint_id_json},"message":{message_json}}}"#,
    )
}

/// Writes a JSON summary object as a final NDJSON line.
///
/// Format: `{"summary":{"violations":3,"truncated":false}}`
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_json<W: Write>(writer: &mut W, count: usize, truncated: bool, config: &FormatterConfig) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    writeln!(writer, r#"{{"summary":{{"violations":{count},"truncated":{truncated}}}}}"#)
}

// ---------------------------------------------------------------------------
// Helper: dispatch by format
// ---------------------------------------------------------------------------

/// Output format selection, mirroring the CLI `--format` flag.
///
/// Used by [`write_violation`] and [`write_summary`] to dispatch to the
/// correct formatter without the caller needing to know the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured NDJSON output.
    Json,
}

/// Writes a single [`Violation`] to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_violation<W: Write>(writer: &mut W, violation: &Violation, mode: FormatMode, config: &FormatterConfig) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => write_violation_human(writer, violation, config),
        FormatMode::Json => write_violation_json(writer, violation, config),
    }
}

/// Writes a summary to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(writer: &mut W, count: usize, truncated: bool, mode: FormatMode, config: &FormatterConfig) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => write_summary_human(writer, count, truncated, config),
        FormatMode::Json => write_summary_json(writer, count, truncated, config),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns the singular or plural form of `word` depending on `count`.
fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Serializes `s` as a JSON string literal, escaping special characters.
///
/// Handles `"`, `\`, and the ASCII control characters `\n`, `\r`, `\t`.
fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str(r#"\""#),
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
