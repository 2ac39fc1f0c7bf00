/// The three envelope dispatch strategies.
///
/// The emitter picks one [`EnvelopeMode`] per generated filter entry point;
/// the functions here are the small, pure dispatch-decision primitives the
/// generated code calls into — the equivalent of `rules::*` but for
/// envelope-level routing rather than field-level constraints.
///
/// [`check_envelope_oneof`] and [`check_envelope_any`] are the bridge
/// `pbv-core::filter::process_with` calls: they read the named fields out
/// of a decoded [`crate::value::MessageValue`] and hand them to the pure
/// primitives above, the same division `pbv-codegen::eval` keeps between
/// reading the value tree and evaluating a rule against what it reads.
use crate::model::ConstraintId;
use crate::value::{FieldValue, MessageValue};

/// Stable constraint id for an opcode/variant mismatch in
/// [`check_opcode_variant`]. Not part of the closed [`crate::model::RuleKind`]
/// taxonomy since it is a dispatch-level, not field-level, concern.
pub const OPCODE_MISMATCH: ConstraintId = ConstraintId("envelope.opcode_mismatch");

/// Stable constraint id for an unresolved `Any` `type_url`, used when the
/// envelope's [`AnyUnregisteredPolicy`] is [`AnyUnregisteredPolicy::Reject`].
pub const ANY_UNREGISTERED: ConstraintId = ConstraintId("any.unregistered");

/// What an `Any`-dispatched envelope does when `type_url` resolves to no
/// registered descriptor. The emitter picks one policy per envelope and
/// documents it; the default is [`AnyUnregisteredPolicy::Reject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyUnregisteredPolicy {
    /// Report a violation with [`ANY_UNREGISTERED`] and reject.
    Reject,
    /// Accept the envelope without decoding or validating the inner
    /// payload.
    Accept,
}

/// The dispatch strategy a filter entry point uses to go from decoded
/// envelope bytes to a concrete inner validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeMode {
    /// A single, fixed message type; no dispatch.
    RootMessage { message_type: String },
    /// A wrapping message with an opcode field and a oneof payload, routed
    /// by discriminator. `opcode_field` names the envelope's opcode field;
    /// `opcode_map` pairs each declared opcode with the oneof variant field
    /// name the schema says it corresponds to.
    OneofDispatched {
        opcode_field: String,
        opcode_map: Vec<(i32, String)>,
    },
    /// A wrapping message carrying a `google.protobuf.Any`, routed by
    /// `type_url` against a whitelist/blacklist and a local descriptor
    /// registry. `payload_field` names the envelope's `Any`-typed field.
    AnyDispatched {
        payload_field: String,
        registered_types: Vec<String>,
        unregistered_policy: AnyUnregisteredPolicy,
    },
}

/// Checks the opcode/variant correspondence for an [`EnvelopeMode::OneofDispatched`]
/// envelope: whether the opcode and the active-variant discriminator agree
/// under the schema-supplied correspondence.
///
/// `variant_tag` is the oneof's active variant field name (`None` if no
/// variant is set — `oneof_required`, not this check, is responsible for
/// that failure). Returns `true` iff `opcode` maps to `variant_tag` in
/// `opcode_map`.
pub fn check_opcode_variant(opcode: i32, variant_tag: Option<&str>, opcode_map: &[(i32, String)]) -> bool {
    let Some(tag) = variant_tag else {
        return false;
    };
    opcode_map
    .iter()
    .any(|(code, name)| *code == opcode && name == tag)
}

/// The outcome of resolving an `Any`'s `type_url` against the envelope's
/// local descriptor registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyResolution {
    /// The type is registered; decode and validate the inner payload with a
    /// nested path of `payload.<type-name>.<field>`.
    Resolved,
    /// The type is not registered and the policy is [`AnyUnregisteredPolicy::Reject`].
    RejectUnregistered,
    /// The type is not registered and the policy is [`AnyUnregisteredPolicy::Accept`].
    AcceptUnregistered,
}

/// Resolves an `Any`'s bare type name (post-prefix-stripping, see
/// [`crate::wellknown::Any::type_name`]) against `registered_types` and
/// `policy`.
pub fn resolve_any(type_name: &str, registered_types: &[String], policy: AnyUnregisteredPolicy) -> AnyResolution {
    if registered_types.iter().any(|t| t == type_name) {
        AnyResolution::Resolved
    } else {
        match policy {
            AnyUnregisteredPolicy::Reject => AnyResolution::RejectUnregistered,
            AnyUnregisteredPolicy::Accept => AnyResolution::AcceptUnregistered,
        }
    }
}

/// Renders the nested path prefix used for an `Any`-dispatched payload's
/// violations, e.g. `"payload.UserInfo"`.
pub fn any_payload_path_prefix(type_name: &str) -> String {
    format!("payload.{type_name}")
}

/// Reads `opcode_field` and the oneof's active variant out of `value` and
/// checks them against `opcode_map` via [`check_opcode_variant`]. The active
/// variant is derived structurally: whichever `opcode_map` field name is
/// present in `value` (there is no discriminator stored in the value tree
/// itself, see [`crate::value`]).
pub fn check_envelope_oneof(value: &MessageValue, opcode_field: &str, opcode_map: &[(i32, String)]) -> bool {
    let Some(opcode) = value.get(opcode_field).and_then(FieldValue::as_i64) else {
        return false;
    };
    let variant_tag = opcode_map
    .iter()
    .find(|(_, name)| value.get(name).is_some())
    .map(|(_, name)| name.as_str());
    let Ok(opcode) = i32::try_from(opcode) else {
        return false;
    };
    check_opcode_variant(opcode, variant_tag, opcode_map)
}

/// Reads `payload_field`'s `type_url` out of `value` and resolves it against
/// `registered_types`/`policy` via [`resolve_any`]. A missing payload field
/// or a payload with no `type_url` is treated as an unregistered type under
/// `policy`, the same as any other unresolved `type_url`.
pub fn check_envelope_any(value: &MessageValue, payload_field: &str, registered_types: &[String], policy: AnyUnregisteredPolicy) -> AnyResolution {
    let type_url = value
    .get(payload_field)
    .and_then(FieldValue::as_message)
    .and_then(|inner| inner.get("type_url"))
    .and_then(FieldValue::as_str);
    let Some(type_url) = type_url else {
        return match policy {
            AnyUnregisteredPolicy::Reject => AnyResolution::RejectUnregistered,
            AnyUnregisteredPolicy::Accept => AnyResolution::AcceptUnregistered,
        };
    };
    let type_name = type_url.strip_prefix("type.googleapis.com/").unwrap_or(type_url);
    resolve_any(type_name, registered_types, policy)
}
