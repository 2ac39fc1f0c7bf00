/// The offline constraint compiler: lowers a [`pbv_core::Schema`] into
/// validator source text.
///
/// # Pipeline
///
/// 1. [`depgraph::DepGraph::build`] resolves cross-file validator
/// dependencies and rejects cycles.
/// 2. [`ir::lower_message`] lowers each message's fields and rules into a
/// structured IR.
/// 3. [`render::render_validator`] renders each message's validator source
/// text from its IR.
/// 4. [`service::lower_services`]/[`service::render_service_entries`] do the
/// same for RPC-service-derived `filter_udp`/`filter_tcp` entry points.
///
/// File I/O and build-system integration are out of scope here;
/// [`compile_schema`] returns rendered source strings, and the caller
/// (`pbv-cli`) is responsible for writing them out.
///
/// [`eval::validate_message`] is a separate, parallel consumer of the same
/// IR: it walks [`ir::lower_message`]'s output directly against a decoded
/// [`pbv_core::MessageValue`] instead of rendering Rust source text, so a
/// schema's rules can be exercised against a sample payload without a
/// second compilation step.
pub mod depgraph;
pub mod error;
pub mod eval;
pub mod ir;
pub mod render;
pub mod service;

pub use error::CodegenError;
pub use eval::validate_message;
pub use ir::{CheckNode, FieldNode, MessageIr, lower_field, lower_message};
pub use render::{RenderedValidator, render_validator};
pub use service::{ServiceMethodIr, lower_services, render_service_entries};

use pbv_core::Schema;

/// One compiled schema file's output: validator declarations plus their
/// rendered source definitions.
#[derive(Debug, Clone)]
pub struct CompiledFile {
    pub path: String,
    pub validators: Vec<RenderedValidator>,
    pub dependencies: Vec<String>,
}

/// The full compilation output: one [`CompiledFile`] per schema file, plus
/// the rendered service-dispatch source if the schema declares any RPC
/// services.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub files: Vec<CompiledFile>,
    pub service_dispatch_source: Option<String>,
}

/// Compiles a whole [`Schema`]: builds the dependency graph, checks it is
/// acyclic, lowers every message to IR, and renders each to source text.
///
/// `violation_capacity` is threaded into every rendered validator's
/// [`pbv_core::ValidationContext`] type parameter: a single compile-time
/// bound shared across the engine.
pub fn compile_schema(schema: &Schema, violation_capacity: usize) -> Result<CompiledSchema, CodegenError> {
    let graph = depgraph::DepGraph::build(schema);
    graph.check_acyclic()?;

    tracing::info!(file_count = schema.files.len(), "lowering schema to validator IR");

    let mut files = Vec::new();
    for file in &schema.files {
        let mut validators = Vec::new();
        for message in &file.messages {
            let ir = lower_message(message);
            validators.push(render_validator(&ir, violation_capacity)?);
        }
        files.push(CompiledFile {
                path: file.path.clone(),
                validators,
                dependencies: graph.dependencies_of(&file.path).map(str::to_string).collect(),
        });
    }

    let methods = lower_services(schema)?;
    let service_dispatch_source = if methods.is_empty() {
        None
    } else {
        tracing::info!(method_count = methods.len(), "rendering service-derived filter dispatch");
        Some(render_service_entries(&methods))
    };

    Ok(CompiledSchema {
            files,
            service_dispatch_source,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pbv_core::{Cardinality, Field, FieldType, Message, RuleKind, RuleSet, SchemaFile, ScalarType, StorageMode};

    fn sample_schema() -> Schema {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Gte, pbv_core::RulePayload::I64(1));
        let field = Field::new(
            "version",
            FieldType::Scalar(ScalarType::U32),
            Cardinality::SingleRequired,
            StorageMode::InlineFixed,
        )
        .with_rules(rules);
        let message = Message::new("Envelope", vec![field], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "envelope.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        Schema { files: vec![file] }
    }

    #[test]
    fn compile_schema_produces_one_compiled_file_per_schema_file() {
        let schema = sample_schema();
        let compiled = compile_schema(&schema, 32).unwrap();
        assert_eq!(compiled.files.len(), 1);
        assert_eq!(compiled.files[0].validators.len(), 1);
        assert!(compiled.service_dispatch_source.is_none());
    }
}
