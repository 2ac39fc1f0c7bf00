/// `pbv compile <schema.json> --out <dir>`: runs `pbv-codegen` end to end
/// and writes the rendered validator source text to `out`.
use std::path::{Path, PathBuf};

use pbv_core::Schema;
use pbv_codegen::CompiledSchema;

use crate::cli::PathOrStdin;
use crate::error::CliError;
use crate::io;

/// Parses the schema at `schema_source`, compiles it, and writes one
/// `.rs` file per schema file (named after the file's declared `path`,
/// re-extensioned to `.rs`) into `out_dir`. Writes `service_dispatch.rs`
/// too if the schema declares any RPC services.
pub fn run(schema_source: &PathOrStdin, out_dir: &Path, violation_capacity: usize, max_file_size: u64, quiet: bool) -> Result<(), CliError> {
    let schema_text = io::read_input(schema_source, max_file_size)?;
    let schema: Schema = serde_json::from_str(&schema_text).map_err(|e| CliError::SchemaParseFailed { detail: e.to_string() })?;
    schema.validate().map_err(|e| CliError::SchemaInvalid { detail: e.to_string() })?;

    let compiled = pbv_codegen::compile_schema(&schema, violation_capacity).map_err(|e| CliError::CompileFailed { detail: e.to_string() })?;

    std::fs::create_dir_all(out_dir).map_err(|e| CliError::IoError { source: out_dir.display().to_string(), detail: e.to_string() })?;

    write_compiled_schema(&compiled, out_dir)?;

    if !quiet {
        let validator_count: usize = compiled.files.iter().map(|f| f.validators.len()).sum();
        eprintln!("compiled {} file(s), {validator_count} validator(s) -> {}", compiled.files.len(), out_dir.display());
    }

    Ok(())
}

fn write_compiled_schema(compiled: &CompiledSchema, out_dir: &Path) -> Result<(), CliError> {
    for file in &compiled.files {
        let out_path = out_dir.join(output_file_name(&file.path));
        let mut source = String::new();
        for validator in &file.validators {
            source.push_str(&validator.source);
            source.push('\n');
        }
        std::fs::write(&out_path, source).map_err(|e| CliError::IoError { source: out_path.display().to_string(), detail: e.to_string() })?;
    }

    if let Some(service_source) = &compiled.service_dispatch_source {
        let out_path = out_dir.join("service_dispatch.rs");
        std::fs::write(&out_path, service_source).map_err(|e| CliError::IoError { source: out_path.display().to_string(), detail: e.to_string() })?;
    }

    Ok(())
}

/// Maps a schema file's declared `path` (e.g. `"envelope.proto"`) to the
/// output source file name (`"envelope.rs"`), dropping any directory
/// components so compiled output never escapes `out_dir`.
fn output_file_name(schema_path: &str) -> PathBuf {
    let stem = Path::new(schema_path).file_stem().and_then(|s| s.to_str()).unwrap_or("schema");
    PathBuf::from(format!("{stem}.rs"))
}
