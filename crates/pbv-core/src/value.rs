/// The runtime message value tree produced by the decoder: a tree of
/// language-neutral records. Nested messages are owned by their parent;
/// repeated fields are ordered sequences. A oneof group carries no
/// dedicated variant: each member field is set or unset independently, and
/// which one is "active" is derived structurally from the schema's
/// [`crate::model::Oneof`] field-name list rather than from a
/// discriminator stored in the value tree itself — the same presence check
/// `required`/`mutex`/`oneof_required` already run against any other field.
///
/// This is a closed-enum, zero-indirection value representation scoped to
/// the field kinds the schema model names, rather than a general-purpose
/// dynamic-language value.
use std::collections::BTreeMap;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    /// An enum's raw numeric value; `defined_only` checks it against the
    /// enum type's declared value set.
    Enum(i32),
    String(String),
    Bytes(Vec<u8>),
    Message(Box<MessageValue>),
    Repeated(Vec<FieldValue>),
}

impl FieldValue {
    /// The length used by `min_len`/`max_len`/`ascii`/format predicates:
    /// byte length for strings, byte length for bytes, element count for
    /// repeated fields. Returns `None` for kinds with no natural length.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.len()),
            Self::Bytes(b) => Some(b.len()),
            Self::Repeated(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            Self::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_repeated(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Repeated(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I32(v) => Some(i64::from(v)),
            Self::I64(v) => Some(v),
            Self::Enum(v) => Some(i64::from(v)),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U32(v) => Some(u64::from(v)),
            Self::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(f64::from(v)),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }
}

/// A decoded message: field name -> value, insertion order preserved so
/// traversal order matches field declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageValue {
    /// Ordered list of `(field_name, value)` pairs. A `BTreeMap` would lose
    /// declaration order, so this is a plain `Vec` searched linearly — the
    /// messages the emitter ever looks at are small, fixed-shape schema
    /// types, not unbounded user data.
    fields: Vec<(String, FieldValue)>,
}

impl MessageValue {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterates fields in declaration order, as required for the
    /// deterministic depth-first traversal demands.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A convenience map builder used by tests and the CLI's JSON-to-value
/// bridge; not part of the decode path proper (the real `Codec` boundary
/// is [`crate::codec::Codec`]).
pub type FieldMap = BTreeMap<String, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_value_preserves_field_declaration_order() {
        let value = MessageValue::new()
        .with_field("version", FieldValue::U32(5))
        .with_field("msg_type", FieldValue::Enum(3));
        let names: Vec<&str> = value.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["version", "msg_type"]);
    }

    #[test]
    fn field_value_len_covers_string_bytes_and_repeated() {
        assert_eq!(FieldValue::String("abc".into()).len(), Some(3));
        assert_eq!(FieldValue::Bytes(vec![1, 2]).len(), Some(2));
        assert_eq!(
            FieldValue::Repeated(vec![FieldValue::Bool(true)]).len(),
            Some(1)
        );
        assert_eq!(FieldValue::Bool(true).len(), None);
    }
}
