//! WASM bindings exposing `pbv-core`'s constraint-validation runtime to a
//! JS host: schema + payload in, an accept/reject verdict with violations
//! out — keeps the real wire codec and schema build-system
//! plumbing out of scope, so this crate, like `pbv-cli`'s `check`
//! subcommand, drives the interpreter directly against a JSON-shaped
//! stand-in payload rather than a compiled validator.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod valuejson;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use pbv_core::{MessageValueStreams, Schema, SystemClock, ValidationContext, ViolationBuffer, filter::VIOLATION_CAPACITY};

/// One recorded constraint failure, mirroring [`pbv_core::Violation`]'s
/// shape in a form `serde_json` can hand to JS as a plain object.
#[derive(Debug, Serialize)]
struct JsViolation {
    field_path: String,
    constraint_id: String,
    message: String,
}

/// The JSON shape returned by [`validate_json`].
#[derive(Debug, Serialize)]
struct JsValidationResult {
    accepted: bool,
    violations: Vec<JsViolation>,
    truncated: bool,
}

/// Validates `payload_json` against `message_name` in `schema_json`,
/// returning a JSON-encoded [`JsValidationResult`].
///
/// `schema_json` is a [`pbv_core::Schema`] serialized as JSON (the same
/// shape `pbv compile`/`pbv check` read); `payload_json` is a JSON object
/// shaped like the target message, converted through the same
/// schema-guided bridge `pbv-cli`'s `check` subcommand uses.
///
/// Returns a [`JsError`] if the schema fails to parse or its model
/// invariants, if `message_name` does not name a message in the schema, or
/// if the payload does not match the schema's declared field shapes —
/// these are input-shape failures, not constraint violations, so they
/// surface as a JS exception rather than inside the returned report.
#[wasm_bindgen]
pub fn validate_json(schema_json: &str, payload_json: &str, message_name: &str) -> Result<String, JsError> {
    let schema: Schema = serde_json::from_str(schema_json).map_err(|e| JsError::new(&format!("schema parse error: {e}")))?;
    schema.validate().map_err(|e| JsError::new(&format!("schema model error: {e}")))?;

    let (_, message) = schema.find_message(message_name).ok_or_else(|| JsError::new(&format!("no message named '{message_name}' in schema")))?;

    let payload: serde_json::Value = serde_json::from_str(payload_json).map_err(|e| JsError::new(&format!("payload parse error: {e}")))?;
    let value = valuejson::build_message_value(&schema, message, &payload).map_err(|e| JsError::new(&e))?;

    let mut violations: ViolationBuffer<VIOLATION_CAPACITY> = ViolationBuffer::new();
    let mut ctx = ValidationContext::new(&mut violations, 256);
    let streams = MessageValueStreams::new(&value);
    let accepted = pbv_codegen::validate_message(&schema, message, &value, &mut ctx, &SystemClock, &streams);

    let result = JsValidationResult {
        accepted,
        violations: ctx
        .violations
        .iter()
        .map(|v| JsViolation {
                field_path: v.field_path.clone(),
                constraint_id: v.constraint_id.as_str().to_string(),
                message: v.message.to_string(),
        })
        .collect(),
        truncated: ctx.violations.truncated(),
    };

    serde_json::to_string(&result).map_err(|e| JsError::new(&format!("result serialization error: {e}")))
}

/// Returns the crate version, useful for a JS host to assert compatibility
/// with the schema format it is sending.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
