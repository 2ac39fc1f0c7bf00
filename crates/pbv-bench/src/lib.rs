//! Schema and payload fixture generation for `pbv-core`/`pbv-codegen`
//! benchmarks.
//!
//! Produces deterministic [`pbv_core::Schema`]/[`pbv_core::MessageValue`]
//! pairs at three size tiers (small/medium/large), scoped to constraint
//! validation.

use pbv_core::{
    Cardinality, Field, FieldType, FieldValue, Message, MessageValue, RuleKind, RulePayload,
    RuleSet, ScalarType, Schema, SchemaFile, StorageMode,
};

/// Named fixture sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    /// Number of scalar fields carrying a `gte` rule in the generated
    /// message, and the number of elements in its repeated field.
    pub fn field_count(self) -> usize {
        match self {
            Self::Small => 8,
            Self::Medium => 64,
            Self::Large => 512,
        }
    }
}

/// Builds a single message named `"Record"` with `tier.field_count()`
/// required `i32` fields (each `gte(1)`) plus one repeated string field
/// bounded by `max_items`, inside a one-file [`Schema`].
pub fn generate_schema(tier: SizeTier) -> Schema {
    let n = tier.field_count();
    let mut fields = Vec::with_capacity(n + 1);
    for i in 0..n {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Gte, RulePayload::I64(1));
        fields.push(
            Field::new(format!("field_{i}"), FieldType::Scalar(ScalarType::I32), Cardinality::SingleRequired, StorageMode::InlineFixed)
            .with_rules(rules),
        );
    }

    let mut tag_rules = RuleSet::new();
    tag_rules.push(RuleKind::MaxItems, RulePayload::I64(n as i64));
    fields.push(Field::new("tags", FieldType::String, Cardinality::Repeated, StorageMode::InlineFixed).with_rules(tag_rules));

    let message = Message::new("Record", fields, vec![], vec![]).expect("no field is assigned to a oneof");

    let file = SchemaFile {
        path: "record.proto".to_string(),
        package: "bench".to_string(),
        messages: vec![message],
        enums: vec![],
        services: vec![],
        imports: vec![],
    };

    Schema { files: vec![file] }
}

/// Builds a [`MessageValue`] for [`generate_schema`]'s message. Every
/// scalar field is set to `1` when `conforming` is true (satisfying
/// `gte(1)`) or `0` for the last field when false (failing it, to exercise
/// the violation-accumulation and early-exit paths). `tags` always holds
/// `tier.field_count() / 2` short strings, well under its `max_items` bound.
pub fn generate_value(tier: SizeTier, conforming: bool) -> MessageValue {
    let n = tier.field_count();
    let mut value = MessageValue::new();
    for i in 0..n {
        let v = if !conforming && i == n - 1 { 0 } else { 1 };
        value = value.with_field(format!("field_{i}"), FieldValue::I32(v));
    }
    let tags = (0..n / 2).map(|i| FieldValue::String(format!("tag-{i}"))).collect();
    value.with_field("tags", FieldValue::Repeated(tags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_schema_produces_one_message_per_tier() {
        for tier in [SizeTier::Small, SizeTier::Medium, SizeTier::Large] {
            let schema = generate_schema(tier);
            assert_eq!(schema.files.len(), 1);
            let message = &schema.files[0].messages[0];
            assert_eq!(message.fields.len(), tier.field_count() + 1);
        }
    }

    #[test]
    fn conforming_value_has_one_field_per_schema_field() {
        let tier = SizeTier::Small;
        let value = generate_value(tier, true);
        for i in 0..tier.field_count() {
            assert!(value.get(&format!("field_{i}")).is_some());
        }
        assert!(value.get("tags").is_some());
    }

    #[test]
    fn violating_value_zeroes_the_last_field() {
        let tier = SizeTier::Small;
        let value = generate_value(tier, false);
        let last = format!("field_{}", tier.field_count() - 1);
        assert_eq!(value.get(&last), Some(&FieldValue::I32(0)));
    }
}
