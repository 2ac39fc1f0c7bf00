/// A direct interpreter over [`crate::ir`] and the offline
/// [`pbv_core::model`] schema, driving the exact per-field/per-message
/// ordering [`crate::ir::lower_message`] already computes (structural
/// guards first, then container-level rules, then element-level rules, in
/// declaration order) without a second compile-and-link step.
///
/// This is what [`pbv-cli`](../../pbv-cli)'s `check` subcommand calls: a
/// generated-Rust validator is the production deployment shape, but an
/// author smoke-testing a schema's constraints against a sample payload
/// does not want to run a second `rustc` invocation first. Reusing
/// [`crate::ir::lower_message`] for ordering means this interpreter and
/// [`crate::render::render_validator`] can never silently disagree on
/// traversal order.
use pbv_core::rules::{enum_rules, format, message as message_rules, numeric, repeated, string};
use pbv_core::{
    Cardinality, Clock, ConstraintId, Field, FieldType, FieldValue, Message, MessageValue, RuleKind, RulePayload, RuleSet, Schema,
    StorageMode, StreamedField, StreamedFieldSource, ValidationContext,
};

use crate::ir::{self, CheckNode, FieldNode};

/// Validates `value` against `message`'s compiled rule set. `schema`
/// resolves nested-message and enum-typed field references; `clock` backs
/// the `timestamp.*` well-known rules.
///
/// Returns `true` iff no violation was recorded during this call —
/// `ctx.violations` may already hold violations from a prior call; only
/// violations appended during *this* call affect the return value, so
/// callers can reuse one buffer across a batch without an earlier
/// rejection poisoning a later, conforming record.
pub fn validate_message<const N: usize>(
    schema: &Schema,
    message: &Message,
    value: &MessageValue,
    ctx: &mut ValidationContext<'_, N>,
    clock: &dyn Clock,
    streams: &dyn StreamedFieldSource,
) -> bool {
    let before = ctx.violations.count();
    let ir = ir::lower_message(message);

    for field_node in &ir.fields {
        let Some(field) = message.field(&field_node.field_name) else {
            continue;
        };
        if !ctx.path.push_field(&field_node.field_name) {
            return false;
        }
        let value_here = value.get(&field_node.field_name);
        let keep_going = validate_field(schema, field, field_node, value_here, ctx, clock, streams);
        ctx.path.pop_field();
        if !keep_going {
            return false;
        }
    }

    for check in &ir.message_checks {
        if !validate_message_check(check, value, ctx) {
            return false;
        }
    }

    ctx.violations.count() == before
}

fn validate_field<const N: usize>(
    schema: &Schema,
    field: &Field,
    node: &FieldNode,
    value: Option<&FieldValue>,
    ctx: &mut ValidationContext<'_, N>,
    clock: &dyn Clock,
    streams: &dyn StreamedFieldSource,
) -> bool {
    // Storage-mode dispatch: `StreamedCallback` fields are never
    // materialized in `value` and must be read through the configured
    // `StreamedField` bridge instead. `PointerHeap` fields pass through a
    // null guard first — a null pointer reads as absent, same as an unset
    // inline field, rather than as a dereference. `InlineFixed` fields are
    // read straight out of the value tree.
    let materialized;
    let value = match field.storage_mode {
        StorageMode::StreamedCallback => {
            materialized = streams.field(&field.name).and_then(StreamedField::read).map(|bytes| match field.field_type {
                FieldType::Bytes => FieldValue::Bytes(bytes.to_vec()),
                _ => FieldValue::String(String::from_utf8_lossy(bytes).into_owned()),
            });
            materialized.as_ref()
        }
        StorageMode::PointerHeap => match value {
            Some(v) => Some(v),
            None => None,
        },
        StorageMode::InlineFixed => value,
    };
    let present = value.is_some();

    for check in &node.checks {
        let keep_going = match check.kind {
            RuleKind::Required => {
                if present {
                    true
                } else {
                    ctx.record(check.constraint_id, "required field is missing")
                }
            }
            RuleKind::Items => match value {
                Some(FieldValue::Repeated(items)) => validate_items(check, items, ctx),
                // Streamed/pointer-null fields skip non-required rules;
                // `required` still fails on its own branch above.
                _ => true,
            },
            _ => match value {
                None => true,
                Some(v) => validate_scalar_check(schema, field, check, v, ctx, clock),
            },
        };
        if !keep_going {
            return false;
        }
    }

    // Nested-message composition: a message-typed field with no rules of
    // its own (or rules plus composition) still recurses into the nested
    // message's own validator. Repeated message fields recurse per
    // element, under an indexed path segment.
    if let FieldType::Message { type_name, .. } = &field.field_type
    && type_name != "google.protobuf.Any"
    && type_name != "google.protobuf.Timestamp"
    && let Some((_, nested_message)) = schema.find_message(type_name)
    {
        match value {
            Some(FieldValue::Message(inner_value)) => {
                return validate_message(schema, nested_message, inner_value, ctx, clock, streams);
            }
            Some(FieldValue::Repeated(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let FieldValue::Message(inner_value) = item else {
                        continue;
                    };
                    if !ctx.path.push_index(index) {
                        return false;
                    }
                    let keep_going = validate_message(schema, nested_message, inner_value, ctx, clock, streams);
                    ctx.path.pop_index();
                    if !keep_going {
                        return false;
                    }
                }
            }
            _ => {}
        }
    }

    true
}

/// One element-level check inside a `RuleKind::Items` nested rule set: the
/// nested rule set applied to each element in turn.
fn validate_items<const N: usize>(check: &CheckNode, items: &[FieldValue], ctx: &mut ValidationContext<'_, N>) -> bool {
    let RulePayload::Nested(nested) = &check.payload else {
        return true;
    };
    for (index, element) in items.iter().enumerate() {
        if !ctx.path.push_index(index) {
            return false;
        }
        let keep_going = validate_element_ruleset(nested, element, ctx);
        ctx.path.pop_index();
        if !keep_going {
            return false;
        }
    }
    true
}

fn validate_element_ruleset<const N: usize>(rules: &RuleSet, element: &FieldValue, ctx: &mut ValidationContext<'_, N>) -> bool {
    for rule in rules.iter() {
        let check = CheckNode {
            constraint_id: ConstraintId(rule.kind.code()),
            kind: rule.kind,
            payload: rule.payload.clone(),
        };
        if !validate_scalar_check_bare(&check, element, ctx) {
            return false;
        }
    }
    true
}

fn validate_scalar_check<const N: usize>(
    schema: &Schema,
    field: &Field,
    check: &CheckNode,
    value: &FieldValue,
    ctx: &mut ValidationContext<'_, N>,
    clock: &dyn Clock,
) -> bool {
    if is_wellknown_rule(check.kind) {
        return validate_wellknown_check(field, check, value, ctx, clock);
    }
    if matches!(field.cardinality, Cardinality::Repeated) && matches!(check.kind, RuleKind::MinItems | RuleKind::MaxItems) {
        return validate_repeated_container_check(check, value, ctx);
    }
    if matches!(check.kind, RuleKind::DefinedOnly)
    && let FieldType::Enum { type_name } = &field.field_type
    && let Some(enum_type) = schema.find_enum(type_name)
    {
        let ok = value.as_i64().is_some_and(|v| enum_rules::defined_only(v as i32, &enum_type.values));
        return ok || ctx.record(check.constraint_id, "enum value is not a defined member");
    }
    validate_scalar_check_bare(check, value, ctx)
}

fn is_wellknown_rule(kind: RuleKind) -> bool {
    matches!(
        kind,
        RuleKind::AnyIn | RuleKind::AnyNotIn | RuleKind::TimestampGtNow | RuleKind::TimestampLtNow | RuleKind::TimestampWithin
    )
}

fn validate_wellknown_check<const N: usize>(
    _field: &Field,
    check: &CheckNode,
    value: &FieldValue,
    ctx: &mut ValidationContext<'_, N>,
    clock: &dyn Clock,
) -> bool {
    let Some(inner) = value.as_message() else {
        return true;
    };
    let ok = match check.kind {
        RuleKind::AnyIn | RuleKind::AnyNotIn => {
            let Some(type_url) = inner.get("type_url").and_then(FieldValue::as_str) else {
                return true;
            };
            let RulePayload::Strs(candidates) = &check.payload else {
                return true;
            };
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            // Compared against the full type_url, prefix included, per the
            // `any.in`/`any.not_in` contract — unlike the nested-path
            // prefix below, which uses the stripped bare type name.
            if check.kind == RuleKind::AnyIn {
                pbv_core::rules::wellknown::any_in(type_url, &refs)
            } else {
                pbv_core::rules::wellknown::any_not_in(type_url, &refs)
            }
        }
        RuleKind::TimestampGtNow => {
            let Some(seconds) = inner.get("seconds").and_then(FieldValue::as_i64) else {
                return true;
            };
            pbv_core::rules::wellknown::timestamp_gt_now(seconds, clock)
        }
        RuleKind::TimestampLtNow => {
            let Some(seconds) = inner.get("seconds").and_then(FieldValue::as_i64) else {
                return true;
            };
            pbv_core::rules::wellknown::timestamp_lt_now(seconds, clock)
        }
        RuleKind::TimestampWithin => {
            let Some(seconds) = inner.get("seconds").and_then(FieldValue::as_i64) else {
                return true;
            };
            let RulePayload::U64(tolerance) = &check.payload else {
                return true;
            };
            pbv_core::rules::wellknown::timestamp_within(seconds, *tolerance, clock)
        }
        _ => true,
    };
    ok || ctx.record(check.constraint_id, "well-known type constraint violated")
}

fn validate_repeated_container_check<const N: usize>(check: &CheckNode, value: &FieldValue, ctx: &mut ValidationContext<'_, N>) -> bool {
    let Some(items) = value.as_repeated() else {
        return true;
    };
    let ok = match (check.kind, &check.payload) {
        (RuleKind::MinItems, RulePayload::U64(n)) => repeated::min_items(items.len(), *n as u32),
        (RuleKind::MaxItems, RulePayload::U64(n)) => repeated::max_items(items.len(), *n as u32),
        _ => true,
    };
    ok || ctx.record(check.constraint_id, "repeated field item count out of bounds")
}

/// Scalar/format rule dispatch shared by field-level and element-level
/// (`items`) checks. `Unique` also lands here when called on a repeated
/// field's own `FieldValue::Repeated`.
fn validate_scalar_check_bare<const N: usize>(check: &CheckNode, value: &FieldValue, ctx: &mut ValidationContext<'_, N>) -> bool {
    let ok = match check.kind {
        RuleKind::Lt | RuleKind::Lte | RuleKind::Gt | RuleKind::Gte | RuleKind::NumEq => numeric_bound_check(check.kind, &check.payload, value),
        RuleKind::NumIn | RuleKind::NumNotIn => numeric_set_check(check.kind, &check.payload, value),
        RuleKind::MinLen | RuleKind::MaxLen | RuleKind::StrEq | RuleKind::Prefix | RuleKind::Suffix | RuleKind::Contains | RuleKind::Ascii => {
            string_check(check.kind, &check.payload, value)
        }
        RuleKind::Email | RuleKind::Hostname | RuleKind::Ip | RuleKind::Ipv4 | RuleKind::Ipv6 => format_check(check.kind, value),
        RuleKind::StrIn | RuleKind::StrNotIn => string_set_check(check.kind, &check.payload, value),
        RuleKind::EnumEq | RuleKind::EnumIn | RuleKind::EnumNotIn => enum_check(check.kind, &check.payload, value),
        RuleKind::Unique => value.as_repeated().is_none_or(repeated::unique),
        // DefinedOnly, well-known rules and container rules are resolved
        // with extra context in validate_scalar_check; reaching here (e.g.
        // from an `items` nested rule set) means there is nothing more to
        // check.
        _ => true,
    };
    ok || ctx.record(check.constraint_id, violation_message(check.kind))
}

fn numeric_bound_check(kind: RuleKind, payload: &RulePayload, value: &FieldValue) -> bool {
    match payload {
        RulePayload::I64(bound) => value.as_i64().is_some_and(|v| apply_bound(kind, v, *bound)),
        RulePayload::U64(bound) => value.as_u64().is_some_and(|v| apply_bound(kind, v, *bound)),
        RulePayload::F64(bound) => value.as_f64().is_some_and(|v| apply_bound(kind, v, *bound)),
        _ => true,
    }
}

fn apply_bound<T: numeric::Comparable>(kind: RuleKind, value: T, bound: T) -> bool {
    match kind {
        RuleKind::Lt => numeric::lt(value, bound),
        RuleKind::Lte => numeric::lte(value, bound),
        RuleKind::Gt => numeric::gt(value, bound),
        RuleKind::Gte => numeric::gte(value, bound),
        RuleKind::NumEq => numeric::eq(value, bound),
        _ => true,
    }
}

fn numeric_set_check(kind: RuleKind, payload: &RulePayload, value: &FieldValue) -> bool {
    match payload {
        RulePayload::Ints(set) => value.as_i64().is_some_and(|v| apply_set(kind, v, set)),
        RulePayload::Uints(set) => value.as_u64().is_some_and(|v| apply_set(kind, v, set)),
        RulePayload::Floats(set) => value.as_f64().is_some_and(|v| apply_set(kind, v, set)),
        _ => true,
    }
}

fn apply_set<T: numeric::Comparable>(kind: RuleKind, value: T, set: &[T]) -> bool {
    match kind {
        RuleKind::NumIn => numeric::in_set(value, set),
        RuleKind::NumNotIn => numeric::not_in_set(value, set),
        _ => true,
    }
}

fn string_check(kind: RuleKind, payload: &RulePayload, value: &FieldValue) -> bool {
    let bytes = value.as_bytes().unwrap_or(&[]);
    match (kind, payload) {
        (RuleKind::MinLen, RulePayload::U64(n)) => string::min_len(bytes, *n as u32),
        (RuleKind::MaxLen, RulePayload::U64(n)) => string::max_len(bytes, *n as u32),
        (RuleKind::StrEq, RulePayload::Str(s)) => string::eq(bytes, s.as_bytes()),
        (RuleKind::Prefix, RulePayload::Str(s)) => string::prefix(bytes, s.as_bytes()),
        (RuleKind::Suffix, RulePayload::Str(s)) => string::suffix(bytes, s.as_bytes()),
        (RuleKind::Contains, RulePayload::Str(s)) => string::contains(bytes, s.as_bytes()),
        (RuleKind::Ascii, _) => string::ascii(bytes),
        _ => true,
    }
}

fn format_check(kind: RuleKind, value: &FieldValue) -> bool {
    let Some(text) = value.as_str().or_else(|| value.as_bytes().and_then(|b| std::str::from_utf8(b).ok())) else {
        return false;
    };
    match kind {
        RuleKind::Email => format::email(text),
        RuleKind::Hostname => format::hostname(text),
        RuleKind::Ip => format::ip(text),
        RuleKind::Ipv4 => format::ipv4(text),
        RuleKind::Ipv6 => format::ipv6(text),
        _ => true,
    }
}

fn string_set_check(kind: RuleKind, payload: &RulePayload, value: &FieldValue) -> bool {
    let RulePayload::Strs(candidates) = payload else {
        return true;
    };
    let bytes = value.as_bytes().unwrap_or(&[]);
    let refs: Vec<&[u8]> = candidates.iter().map(String::as_bytes).collect();
    match kind {
        RuleKind::StrIn => string::in_set(bytes, &refs),
        RuleKind::StrNotIn => string::not_in_set(bytes, &refs),
        _ => true,
    }
}

fn enum_check(kind: RuleKind, payload: &RulePayload, value: &FieldValue) -> bool {
    let Some(discriminant) = value.as_i64().map(|v| v as i32) else {
        return true;
    };
    match (kind, payload) {
        (RuleKind::EnumEq, RulePayload::I64(expected)) => enum_rules::eq(discriminant, *expected as i32),
        (RuleKind::EnumIn, RulePayload::Ints(set)) => enum_rules::in_set(discriminant, &set.iter().map(|v| *v as i32).collect::<Vec<_>>()),
        (RuleKind::EnumNotIn, RulePayload::Ints(set)) => enum_rules::not_in_set(discriminant, &set.iter().map(|v| *v as i32).collect::<Vec<_>>()),
        _ => true,
    }
}

fn violation_message(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Lt => "value must be < bound",
        RuleKind::Lte => "value must be <= bound",
        RuleKind::Gt => "value must be > bound",
        RuleKind::Gte => "value must be >= limit",
        RuleKind::NumEq => "value does not equal the required constant",
        RuleKind::NumIn => "value is not in the allowed set",
        RuleKind::NumNotIn => "value is in the disallowed set",
        RuleKind::MinLen => "string too short",
        RuleKind::MaxLen => "string too long",
        RuleKind::StrEq => "string does not equal the required constant",
        RuleKind::Prefix => "string does not start with the required prefix",
        RuleKind::Suffix => "string does not end with the required suffix",
        RuleKind::Contains => "string does not contain the required substring",
        RuleKind::Ascii => "string contains non-ASCII bytes",
        RuleKind::Email => "not a valid email address",
        RuleKind::Hostname => "not a valid hostname",
        RuleKind::Ip | RuleKind::Ipv4 | RuleKind::Ipv6 => "not a valid IP address",
        RuleKind::StrIn => "string is not in the allowed set",
        RuleKind::StrNotIn => "string is in the disallowed set",
        RuleKind::EnumEq => "enum value does not equal the required constant",
        RuleKind::EnumIn => "enum value is not in the allowed set",
        RuleKind::EnumNotIn => "enum value is in the disallowed set",
        RuleKind::Unique => "repeated field contains duplicate elements",
        _ => "constraint violated",
    }
}

fn validate_message_check<const N: usize>(check: &CheckNode, value: &MessageValue, ctx: &mut ValidationContext<'_, N>) -> bool {
    let RulePayload::FieldNames(names) = &check.payload else {
        return true;
    };
    let ok = match check.kind {
        RuleKind::OneofRequired => {
            let variant_set = names.iter().any(|n| value.get(n).is_some());
            message_rules::oneof_required(variant_set)
        }
        RuleKind::Mutex => {
            let present: Vec<bool> = names.iter().map(|n| value.get(n).is_some()).collect();
            message_rules::mutex(&present)
        }
        RuleKind::AtLeast => {
            let Some((count_str, field_names)) = names.split_first() else {
                return true;
            };
            let Ok(n) = count_str.parse::<usize>() else {
                return true;
            };
            let present: Vec<bool> = field_names.iter().map(|f| value.get(f).is_some()).collect();
            message_rules::at_least(n, &present)
        }
        RuleKind::Requires => {
            let Some((trigger, required)) = names.split_first() else {
                return true;
            };
            let trigger_present = value.get(trigger).is_some();
            let required_present: Vec<bool> = required.iter().map(|f| value.get(f).is_some()).collect();
            message_rules::requires(trigger_present, &required_present)
        }
        _ => true,
    };
    ok || ctx.record(check.constraint_id, "message-level composition constraint violated")
}

/// Builds the `FieldNames` payload convention `validate_message_check`
/// expects for `RuleKind::AtLeast`: a decimal count followed by the
/// candidate field names. This encoding is an internal implementation
/// choice (see `DESIGN.md`) — this module only names the semantics, not a
/// serialization shape for message-level rule payloads.
pub fn at_least_payload(n: usize, field_names: &[&str]) -> RulePayload {
    let mut names = vec![n.to_string()];
    names.extend(field_names.iter().map(|s| s.to_string()));
    RulePayload::FieldNames(names)
}

/// Builds the `FieldNames` payload convention for `RuleKind::Requires`: the
/// trigger field name followed by the fields it requires.
pub fn requires_payload(trigger: &str, required: &[&str]) -> RulePayload {
    let mut names = vec![trigger.to_string()];
    names.extend(required.iter().map(|s| s.to_string()));
    RulePayload::FieldNames(names)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pbv_core::{
        Cardinality as Card, EnumType, FieldType as FT, MessageValueStreams, NoStreamedFields, Oneof, RulePayload as RP, SchemaFile, ScalarType,
        StorageMode, ViolationBuffer,
    };

    fn envelope_schema() -> (Schema, Message) {
        let mut version_rules = RuleSet::new();
        version_rules.push(RuleKind::Gte, RP::U64(1));
        let version = Field::new("version", FT::Scalar(ScalarType::U32), Card::SingleRequired, StorageMode::InlineFixed).with_rules(version_rules);

        let mut msg_type_rules = RuleSet::new();
        msg_type_rules.push(RuleKind::DefinedOnly, RP::None);
        let msg_type = Field::new("msg_type", FT::Enum { type_name: "MsgType".to_string() }, Card::SingleRequired, StorageMode::InlineFixed)
        .with_rules(msg_type_rules);

        let payload = Field::new("payload", FT::Bytes, Card::SingleOptionalPresence, StorageMode::InlineFixed);

        let message = Message::new("Envelope", vec![version, msg_type, payload], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "envelope.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![EnumType {
                    name: "MsgType".to_string(),
                    values: (0..=6).collect(),
            }],
            services: vec![],
            imports: vec![],
        };
        (Schema { files: vec![file] }, message)
    }

    #[test]
    fn scenario_1_accepts_version_in_range_and_defined_enum() {
        let (schema, message) = envelope_schema();
        let value = MessageValue::new()
        .with_field("version", FieldValue::U32(5))
        .with_field("msg_type", FieldValue::Enum(3))
        .with_field("payload", FieldValue::Bytes(vec![1, 2, 3]));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        assert!(!ctx.violations.has_any());
    }

    #[test]
    fn scenario_2_rejects_version_zero_with_gte_violation() {
        let (schema, message) = envelope_schema();
        let value = MessageValue::new()
        .with_field("version", FieldValue::U32(0))
        .with_field("msg_type", FieldValue::Enum(3));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        assert_eq!(ctx.violations.count(), 1);
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "version");
        assert_eq!(violation.constraint_id.as_str(), "uint32.gte");
    }

    #[test]
    fn scenario_3_rejects_undefined_enum_discriminant() {
        let (schema, message) = envelope_schema();
        let value = MessageValue::new()
        .with_field("version", FieldValue::U32(5))
        .with_field("msg_type", FieldValue::Enum(99));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "msg_type");
        assert_eq!(violation.constraint_id.as_str(), "enum.defined_only");
    }

    fn request_schema() -> (Schema, Message) {
        let mut method_rules = RuleSet::new();
        method_rules.push(RuleKind::MinLen, RP::U64(1));
        let method = Field::new("method", FT::String, Card::SingleRequired, StorageMode::StreamedCallback).with_rules(method_rules);
        let request_id = Field::new("request_id", FT::Bytes, Card::SingleRequired, StorageMode::InlineFixed);
        let message = Message::new("Request", vec![method, request_id], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "request.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        (Schema { files: vec![file] }, message)
    }

    #[test]
    fn scenario_4_empty_streamed_method_rejects_min_len() {
        let (schema, message) = request_schema();
        let value = MessageValue::new()
        .with_field("method", FieldValue::String(String::new()))
        .with_field("request_id", FieldValue::Bytes(vec![0xAB]));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        let streams = MessageValueStreams::new(&value);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &streams));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "method");
        assert_eq!(violation.constraint_id.as_str(), "string.min_len");
    }

    #[test]
    fn scenario_4b_streamed_method_reads_through_bridge_not_the_value_tree() {
        let (schema, message) = request_schema();
        // `method` is unset in the materialized value tree; the streamed
        // bridge is the only source a `StreamedCallback` field reads from.
        let value = MessageValue::new().with_field("request_id", FieldValue::Bytes(vec![0xAB]));
        let delivered = FieldValue::String("connect".to_string());
        struct OneField<'a>(&'a FieldValue);
        impl StreamedFieldSource for OneField<'_> {
            fn field(&self, field_name: &str) -> Option<&dyn StreamedField> {
                (field_name == "method").then_some(self.0 as &dyn StreamedField)
            }
        }
        let streams = OneField(&delivered);
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(validate_message(&schema, &message, &value, &mut ctx, &clock, &streams));
    }

    fn any_envelope_schema() -> (Schema, Message) {
        let mut any_rules = RuleSet::new();
        any_rules.push(
            RuleKind::AnyIn,
            RP::Strs(vec![
                "type.googleapis.com/UserInfo".to_string(),
                "type.googleapis.com/ProductInfo".to_string(),
            ]),
        );
        let payload = Field::new(
            "payload",
            FT::Message {
                type_name: "google.protobuf.Any".to_string(),
                declaring_file: "any.proto".to_string(),
            },
            Card::SingleRequired,
            StorageMode::InlineFixed,
        )
        .with_rules(any_rules);
        let message = Message::new("AnyEnvelope", vec![payload], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "any.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        (Schema { files: vec![file] }, message)
    }

    #[test]
    fn scenario_5_any_type_url_outside_whitelist_rejects() {
        let (schema, message) = any_envelope_schema();
        let inner = MessageValue::new()
        .with_field("type_url", FieldValue::String("type.googleapis.com/OrderInfo".to_string()))
        .with_field("value", FieldValue::Bytes(vec![]));
        let value = MessageValue::new().with_field("payload", FieldValue::Message(Box::new(inner)));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "payload");
        assert_eq!(violation.constraint_id.as_str(), "any.in");
    }

    #[test]
    fn scenario_5_any_type_url_full_url_in_whitelist_accepts() {
        let (schema, message) = any_envelope_schema();
        let inner = MessageValue::new()
        .with_field("type_url", FieldValue::String("type.googleapis.com/UserInfo".to_string()))
        .with_field("value", FieldValue::Bytes(vec![]));
        let value = MessageValue::new().with_field("payload", FieldValue::Message(Box::new(inner)));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
    }

    fn oneof_envelope_schema() -> (Schema, Message) {
        let mut username_rules = RuleSet::new();
        username_rules.push(RuleKind::MinLen, RP::U64(3));
        let auth_username = Field::new("auth_username", FT::String, Card::SingleOptionalPresence, StorageMode::InlineFixed)
        .with_rules(username_rules);
        let mut field = auth_username;
        field.oneof_index = Some(0);
        let oneof = Oneof {
            name: "auth".to_string(),
            field_names: vec!["auth_username".to_string()],
            required: true,
        };
        let message = Message::new("OneofEnvelope", vec![field], vec![oneof], vec![]).unwrap();
        let file = SchemaFile {
            path: "oneof.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        (Schema { files: vec![file] }, message)
    }

    #[test]
    fn scenario_6_oneof_variant_min_len_rejects_then_accepts() {
        let (schema, message) = oneof_envelope_schema();

        let short = MessageValue::new().with_field("auth_username", FieldValue::String("ab".to_string()));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &short, &mut ctx, &clock, &NoStreamedFields));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "auth_username");
        assert_eq!(violation.constraint_id.as_str(), "string.min_len");

        let long = MessageValue::new().with_field("auth_username", FieldValue::String("alice".to_string()));
        let mut buf2: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx2 = ValidationContext::new(&mut buf2, 128);
        assert!(validate_message(&schema, &message, &long, &mut ctx2, &clock, &NoStreamedFields));
    }

    #[test]
    fn unique_violation_on_repeated_field_reports_container_path() {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Unique, RP::None);
        let tags = Field::new("tags", FT::String, Card::Repeated, StorageMode::InlineFixed).with_rules(rules);
        let message = Message::new("Tagged", vec![tags], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "tagged.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        let schema = Schema { files: vec![file] };
        let value = MessageValue::new().with_field(
            "tags",
            FieldValue::Repeated(vec![FieldValue::String("a".to_string()), FieldValue::String("a".to_string())]),
        );
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "tags");
        assert_eq!(violation.constraint_id.as_str(), "repeated.unique");
    }

    #[test]
    fn items_rule_validates_each_element_with_indexed_path() {
        let mut element_rules = RuleSet::new();
        element_rules.push(RuleKind::Email, RP::None);
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Items, RP::Nested(Box::new(element_rules)));
        let recipients = Field::new("recipients", FT::String, Card::Repeated, StorageMode::InlineFixed).with_rules(rules);
        let message = Message::new("Mailing", vec![recipients], vec![], vec![]).unwrap();
        let file = SchemaFile {
            path: "mailing.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![message.clone()],
            enums: vec![],
            services: vec![],
            imports: vec![],
        };
        let schema = Schema { files: vec![file] };
        let value = MessageValue::new().with_field(
            "recipients",
            FieldValue::Repeated(vec![
                    FieldValue::String("a@b.c".to_string()),
                    FieldValue::String("not-an-email".to_string()),
            ]),
        );
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        assert!(!validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields));
        let violation = ctx.violations.iter().next().unwrap();
        assert_eq!(violation.field_path, "recipients[1]");
    }

    #[test]
    fn validate_message_is_idempotent() {
        let (schema, message) = envelope_schema();
        let value = MessageValue::new()
        .with_field("version", FieldValue::U32(0))
        .with_field("msg_type", FieldValue::Enum(3));
        let mut buf: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx = ValidationContext::new(&mut buf, 128);
        let clock = pbv_core::FixedClock(0);
        let first = validate_message(&schema, &message, &value, &mut ctx, &clock, &NoStreamedFields);
        let first_count = ctx.violations.count();

        let mut buf2: ViolationBuffer<8> = ViolationBuffer::new();
        let mut ctx2 = ValidationContext::new(&mut buf2, 128);
        let second = validate_message(&schema, &message, &value, &mut ctx2, &clock, &NoStreamedFields);
        assert_eq!(first, second);
        assert_eq!(first_count, ctx2.violations.count());
    }
}
