/// Cross-file validator dependency resolution.
///
/// Before emission, walks every field of every message; for each field
/// whose type is a message defined in a different file, records the
/// containing file as a dependency. No cycles are permitted among
/// validator headers.
use std::collections::{BTreeMap, BTreeSet};

use pbv_core::{FieldType, Schema};

use crate::error::CodegenError;

/// The per-file dependency graph: `file -> files whose validator header it
/// must include`.
#[derive(Debug, Default)]
pub struct DepGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    /// Builds the graph by walking every field of every message in every
    /// file, recording an edge from the declaring file to the field's
    /// message type's declaring file whenever they differ.
    pub fn build(schema: &Schema) -> Self {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for file in &schema.files {
            let entry = edges.entry(file.path.clone()).or_default();
            for message in &file.messages {
                collect_message_deps(message, &file.path, entry);
            }
        }
        Self { edges }
    }

    /// The files whose validator header `file` must include, in path order.
    pub fn dependencies_of(&self, file: &str) -> impl Iterator<Item = &str> {
        self.edges.get(file).into_iter().flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Returns the first cycle found among validator headers, as an ordered
    /// list of file paths ending back at the start, or `None` if the graph
    /// is acyclic.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut state: BTreeMap<&str, VisitState> = BTreeMap::new();
        for file in self.edges.keys() {
            if state.get(file.as_str()).is_none()
            && let Some(cycle) = self.visit(file, &mut state, &mut Vec::new())
            {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(&'a self, file: &'a str, state: &mut BTreeMap<&'a str, VisitState>, stack: &mut Vec<&'a str>) -> Option<Vec<String>> {
        state.insert(file, VisitState::Visiting);
        stack.push(file);
        if let Some(deps) = self.edges.get(file) {
            for dep in deps {
                match state.get(dep.as_str()) {
                    Some(VisitState::Visiting) => {
                        let start = stack.iter().position(|f| *f == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                        cycle.push(dep.clone());
                        return Some(cycle);
                    }
                    Some(VisitState::Done) => continue,
                    None => {
                        if let Some(cycle) = self.visit(dep.as_str(), state, stack) {
                            return Some(cycle);
                        }
                    }
                }
            }
        }
        stack.pop();
        state.insert(file, VisitState::Done);
        None
    }

    /// Validates the graph, returning [`CodegenError::DependencyCycle`] if
    /// any cycle exists among validator headers.
    pub fn check_acyclic(&self) -> Result<(), CodegenError> {
        match self.detect_cycle() {
            Some(files) => Err(CodegenError::DependencyCycle { files }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

fn collect_message_deps(message: &pbv_core::Message, owning_file: &str, deps: &mut BTreeSet<String>) {
    for field in &message.fields {
        if let FieldType::Message { declaring_file, .. } = &field.field_type
        && declaring_file != owning_file
        {
            deps.insert(declaring_file.clone());
        }
    }
    for nested in &message.nested {
        collect_message_deps(nested, owning_file, deps);
    }
}
