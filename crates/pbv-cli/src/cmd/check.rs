/// `pbv check <schema.json> <payload.json> --message <NAME>`: decodes a
/// JSON-shaped stand-in payload through the schema-guided JSON-to-value
/// bridge and runs it through the same IR `pbv-codegen` compiles from,
/// interpreted directly rather than compiled — useful
/// for schema authors smoke-testing constraints before wiring up the real
/// wire codec.
use pbv_core::{MessageValueStreams, Schema, SystemClock, ValidationContext, ViolationBuffer, filter::VIOLATION_CAPACITY};

use crate::cli::{OutputFormat, PathOrStdin};
use crate::error::CliError;
use crate::format::{self, FormatMode, FormatterConfig};
use crate::io;
use crate::valuejson;

/// `VIOLATION_CAPACITY` is the same fixed bound `pbv-core`'s own filter
/// pipeline uses (: a single compile-time bound shared
/// across the engine). Unlike `compile`'s `--violation-capacity` flag
/// (which only substitutes a numeric literal into rendered source text),
/// `check` calls the interpreter directly, so its `ValidationContext<N>`
/// must be monomorphized over a compile-time constant — a CLI flag cannot
/// choose it at runtime.
const PATH_CAPACITY: usize = 256;

#[allow(clippy::too_many_arguments)]
pub fn run(
    schema_source: &PathOrStdin,
    payload_source: &PathOrStdin,
    message_name: &str,
    max_file_size: u64,
    format_mode: &OutputFormat,
    quiet: bool,
    verbose: bool,
    no_color: bool,
) -> Result<(), CliError> {
    let schema_text = io::read_input(schema_source, max_file_size)?;
    let schema: Schema = serde_json::from_str(&schema_text).map_err(|e| CliError::SchemaParseFailed { detail: e.to_string() })?;
    schema.validate().map_err(|e| CliError::SchemaInvalid { detail: e.to_string() })?;

    let (_, message) = schema.find_message(message_name).ok_or_else(|| CliError::UnknownMessage { name: message_name.to_string() })?;

    let payload_text = io::read_input(payload_source, max_file_size)?;
    let payload_json: serde_json::Value = serde_json::from_str(&payload_text).map_err(|e| CliError::PayloadParseFailed { detail: e.to_string() })?;
    let value = valuejson::build_message_value(&schema, message, &payload_json).map_err(|detail| CliError::PayloadShapeMismatch { detail })?;

    let mut violations: ViolationBuffer<VIOLATION_CAPACITY> = ViolationBuffer::new();
    let mut ctx = ValidationContext::new(&mut violations, PATH_CAPACITY);
    let streams = MessageValueStreams::new(&value);
    let accepted = pbv_codegen::validate_message(&schema, message, &value, &mut ctx, &SystemClock, &streams);

    let config = FormatterConfig::from_flags(no_color, quiet, verbose);
    let mode = match format_mode {
        OutputFormat::Human => FormatMode::Human,
        OutputFormat::Json => FormatMode::Json,
    };

    let mut stderr = std::io::stderr();
    for violation in ctx.violations.iter() {
        format::write_violation(&mut stderr, violation, mode, &config)
        .map_err(|e| CliError::IoError { source: "stderr".to_string(), detail: e.to_string() })?;
    }
    format::write_summary(&mut stderr, ctx.violations.count(), ctx.violations.truncated(), mode, &config)
    .map_err(|e| CliError::IoError { source: "stderr".to_string(), detail: e.to_string() })?;

    if accepted {
        if !quiet {
            eprintln!("{message_name}: accepted");
        }
        Ok(())
    } else {
        Err(CliError::ValidationRejected)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write as _;

    fn schema_with_gte_rule() -> String {
        serde_json::json!({
                "files": [{
                        "path": "envelope.proto",
                        "package": "pkg",
                        "messages": [{
                                "name": "Envelope",
                                "fields": [{
                                        "name": "version",
                                        "field_type": {"Scalar": "U32"},
                                        "cardinality": "SingleRequired",
                                        "storage_mode": "InlineFixed",
                                        "rules": {"rules": [{"kind": "Gte", "payload": {"I64": 1}}]}
                                }]
                        }]
                }]
        })
        .to_string()
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn accepts_a_conforming_payload() {
        let schema_file = write_temp(&schema_with_gte_rule());
        let payload_file = write_temp(r#"{"version": 5}"#);

        let result = run(
            &PathOrStdin::Path(schema_file.path().to_path_buf()),
            &PathOrStdin::Path(payload_file.path().to_path_buf()),
            "Envelope",
            1024 * 1024,
            &OutputFormat::Human,
            true,
            false,
            true,
        );
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn rejects_a_payload_that_fails_a_rule() {
        let schema_file = write_temp(&schema_with_gte_rule());
        let payload_file = write_temp(r#"{"version": 0}"#);

        let result = run(
            &PathOrStdin::Path(schema_file.path().to_path_buf()),
            &PathOrStdin::Path(payload_file.path().to_path_buf()),
            "Envelope",
            1024 * 1024,
            &OutputFormat::Human,
            true,
            false,
            true,
        );
        assert!(matches!(result, Err(CliError::ValidationRejected)));
    }

    #[test]
    fn unknown_message_name_is_reported() {
        let schema_file = write_temp(&schema_with_gte_rule());
        let payload_file = write_temp(r#"{"version": 5}"#);

        let result = run(
            &PathOrStdin::Path(schema_file.path().to_path_buf()),
            &PathOrStdin::Path(payload_file.path().to_path_buf()),
            "NoSuchMessage",
            1024 * 1024,
            &OutputFormat::Human,
            true,
            false,
            true,
        );
        assert!(matches!(result, Err(CliError::UnknownMessage { .. })));
    }
}
