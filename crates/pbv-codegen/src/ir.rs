/// The structured intermediate representation the emitter renders from: a
/// small IR (a list of `Check { path_segment, RulePayload, constraint_id }`
/// nodes) in place of macro-heavy emission templates. [`lower_message`] is
/// the function that builds it from the offline [`pbv_core::model`] schema
/// types, one field at a time.
use pbv_core::{Cardinality, ConstraintId, Field, Message, Rule, RuleKind, RulePayload, ScalarType, StorageMode};

/// One lowered rule check, ready for rendering.
#[derive(Debug, Clone)]
pub struct CheckNode {
    pub constraint_id: ConstraintId,
    pub kind: RuleKind,
    pub payload: RulePayload,
}

/// The lowered form of one field: its storage dispatch and its ordered
/// checks, in emission order — structural guards first, then
/// container-level rules, then element-level rules, then the remaining
/// rules in declaration order (ties broken by declaration order too).
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub field_name: String,
    pub cardinality: Cardinality,
    pub storage_mode: StorageMode,
    pub oneof_variant_of: Option<String>,
    pub checks: Vec<CheckNode>,
}

/// The lowered form of one message: its fields in declaration order plus
/// any message-level (cross-field) checks.
#[derive(Debug, Clone)]
pub struct MessageIr {
    pub message_name: String,
    pub fields: Vec<FieldNode>,
    pub message_checks: Vec<CheckNode>,
}

/// Resolves the numeric-rule type prefix (`"int32"`, `"uint32"`, ...) for a
/// field, or `None` if the field is not a scalar (numeric rules only apply
/// to scalar fields).
fn scalar_prefix(field: &Field) -> Option<&'static str> {
    match &field.field_type {
        pbv_core::FieldType::Scalar(scalar) => Some(scalar.prefix()),
        _ => None,
    }
}

fn is_numeric_kind(kind: RuleKind) -> bool {
    matches!(
        kind,
        RuleKind::Lt | RuleKind::Lte | RuleKind::Gt | RuleKind::Gte | RuleKind::NumEq | RuleKind::NumIn | RuleKind::NumNotIn
    )
}

/// Builds the stable [`ConstraintId`] for one rule, qualifying numeric rules
/// with their field's scalar-type prefix (worked examples:
/// `int32.gte`, `uint32.gte`).
fn constraint_id_for(field: &Field, rule: &Rule) -> ConstraintId {
    if is_numeric_kind(rule.kind) {
        let prefix = scalar_prefix(field).unwrap_or(ScalarType::I32.prefix());
        // `ConstraintId` wants a `&'static str`; the compiler is a
        // short-lived, run-once-per-invocation process, so leaking the
        // small set of numeric-qualified strings it builds is cheaper than
        // threading an arena through every IR node.
        ConstraintId(Box::leak(rule.kind.numeric_code(prefix).into_boxed_str()))
    } else {
        ConstraintId(rule.kind.code())
    }
}

/// Lowers one [`Field`]'s [`RuleSet`](pbv_core::RuleSet) into ordered
/// [`CheckNode`]s: container-level rules (`min_items`/`max_items`/`unique`)
/// keep their declaration order, but `items` (element-level) is always
/// moved after them.
pub fn lower_field(field: &Field) -> FieldNode {
    let mut checks = Vec::new();
    let mut element_checks = Vec::new();
    for rule in field.rules.iter() {
        let node = CheckNode {
            constraint_id: constraint_id_for(field, rule),
            kind: rule.kind,
            payload: rule.payload.clone(),
        };
        if rule.kind == RuleKind::Items {
            element_checks.push(node);
        } else {
            checks.push(node);
        }
    }
    checks.extend(element_checks);

    FieldNode {
        field_name: field.name.clone(),
        cardinality: field.cardinality,
        storage_mode: field.storage_mode,
        oneof_variant_of: None,
        checks,
    }
}

/// Lowers a [`Message`] into a [`MessageIr`], resolving each field's oneof
/// membership to the containing oneof's name, since the validator emits a
/// path segment equal to the variant field name when validating that arm.
pub fn lower_message(message: &Message) -> MessageIr {
    let fields = message
    .fields
    .iter()
    .map(|field| {
            let mut node = lower_field(field);
            node.oneof_variant_of = field.oneof_index.and_then(|idx| message.oneofs.get(idx)).map(|o| o.name.clone());
            node
    })
    .collect();

    let message_checks = message
    .message_rules
    .iter()
    .map(|rule| CheckNode {
            constraint_id: ConstraintId(rule.kind.code()),
            kind: rule.kind,
            payload: rule.payload.clone(),
    })
    .collect();

    MessageIr {
        message_name: message.name.clone(),
        fields,
        message_checks,
    }
}
