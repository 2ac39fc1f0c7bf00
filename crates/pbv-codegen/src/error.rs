/// Errors produced while lowering a schema and emitting validators.
use thiserror::Error;

/// All error conditions the constraint compiler can raise.
///
/// Structural errors (unknown message references, dependency cycles,
/// template failures) fail fast; there is no equivalent of a collected
/// "validation failed with N errors" path here, since this crate never
/// validates data — it only compiles schemas into validators.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A field's message or enum type name was not found anywhere in the
    /// schema.
    #[error("{file}: message {message:?} references unknown type {type_name:?}")]
    UnknownType {
        file: String,
        message: String,
        type_name: String,
    },

    /// Validator headers formed a cycle, which is not permitted.
    #[error("dependency cycle among validator headers: {}", .files.join(" -> "))]
    DependencyCycle { files: Vec<String> },

    /// The offline [`pbv_core::model::Message`] itself violated a structural
    /// invariant (duplicate field, unknown oneof index).
    #[error("invalid message model: {0}")]
    InvalidModel(#[from] pbv_core::ModelError),

    /// A Tera template failed to parse or render.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}
