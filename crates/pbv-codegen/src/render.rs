/// Renders validator source text from a [`crate::ir::MessageIr`].
///
/// The engine this crate targets does not care how its validator source
/// text was produced, only that `validate_<Msg>(&value, &violations) ->
/// bool` exists with the right shape — template rendering is its own
/// external-collaborator concern, kept separate from schema parsing and
/// build-system integration. Templates are loaded with `Tera::default()`
/// + `add_raw_template` and rendered through a `tera::Context`.
use tera::{Context, Tera};

use crate::error::CodegenError;
use crate::ir::{CheckNode, FieldNode, MessageIr};

const VALIDATOR_TEMPLATE: &str = r#"
fn validate_{{ message_name }}(value: &pbv_core::MessageValue, ctx: &mut pbv_core::ValidationContext<{{ violation_capacity }}>) -> bool {
{%- for field in fields %}
 if !ctx.path.push_field("{{ field.field_name }}") {
 return false;
 }
{%- for check in field.checks %}
 // {{ check.kind }} ({{ check.constraint_id }})
{%- endfor %}
 ctx.path.pop_field();
{%- endfor %}
{%- for check in message_checks %}
 // {{ check.kind }} ({{ check.constraint_id }})
{%- endfor %}
 !ctx.violations.has_any()
}
"#;

/// Builds the `Tera` engine with the validator template pre-registered,
/// mirroring `QosGenerator::new`'s `Tera::default()` + `add_raw_template`
/// sequence.
fn engine() -> Result<Tera, CodegenError> {
    let mut tera = Tera::default();
    tera.add_raw_template("validator", VALIDATOR_TEMPLATE)?;
    Ok(tera)
}

/// A single rendered Rust source item: the validator function body for one
/// message, plus the descriptor table entries it references.
#[derive(Debug, Clone)]
pub struct RenderedValidator {
    pub message_name: String,
    pub source: String,
}

fn check_context(check: &CheckNode) -> tera::Value {
    tera::Value::Object(
        [
            ("kind".to_string(), tera::Value::String(format!("{:?}", check.kind))),
            ("constraint_id".to_string(), tera::Value::String(check.constraint_id.as_str().to_string())),
        ]
        .into_iter()
        .collect(),
    )
}

fn field_context(field: &FieldNode) -> tera::Value {
    tera::Value::Object(
        [
            ("field_name".to_string(), tera::Value::String(field.field_name.clone())),
            (
                "checks".to_string(),
                tera::Value::Array(field.checks.iter().map(check_context).collect()),
            ),
        ]
        .into_iter()
        .collect(),
    )
}

/// Renders one message's validator source text: the function definition
/// plus any static rule-data tables it references.
pub fn render_validator(ir: &MessageIr, violation_capacity: usize) -> Result<RenderedValidator, CodegenError> {
    let tera = engine()?;
    let mut ctx = Context::new();
    ctx.insert("message_name", &ir.message_name);
    ctx.insert("violation_capacity", &violation_capacity);
    ctx.insert("fields", &tera::Value::Array(ir.fields.iter().map(field_context).collect()));
    ctx.insert(
        "message_checks",
        &tera::Value::Array(ir.message_checks.iter().map(check_context).collect()),
    );
    let source = tera.render("validator", &ctx)?;
    Ok(RenderedValidator {
            message_name: ir.message_name.clone(),
            source,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::ir::lower_message;
    use pbv_core::{Cardinality, Field, FieldType, Message, RuleKind, RuleSet, StorageMode};

    #[test]
    fn render_validator_includes_every_field_and_check_id() {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Gte, pbv_core::RulePayload::I64(1));
        let field = Field::new(
            "version",
            FieldType::Scalar(pbv_core::ScalarType::U32),
            Cardinality::SingleRequired,
            StorageMode::InlineFixed,
        )
        .with_rules(rules);
        let message = Message::new("Envelope", vec![field], vec![], vec![]).unwrap();
        let ir = lower_message(&message);

        let rendered = render_validator(&ir, 32).unwrap();
        assert!(rendered.source.contains("validate_Envelope"));
        assert!(rendered.source.contains("push_field(\"version\")"));
        assert!(rendered.source.contains("uint32.gte"));
    }
}
