/// The offline schema model consumed by the constraint compiler.
///
/// This mirrors the data model described in : an ordered
/// sequence of [`SchemaFile`]s, each holding [`Message`]s and [`EnumType`]s.
/// Every field carries a [`RuleSet`] mapping [`RuleKind`] to rule-specific
/// payload. The rule taxonomy is closed: [`RuleKind`] is an exhaustive enum,
/// not an open string space, so the compiler can match on it exhaustively and
/// the linker can dead-strip unused rule code.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable dotted identifier attached to each rule, exposed unchanged in
/// violation reports (e.g. `"string.min_len"`, `"int32.gte"`).
///
/// `ConstraintId` is a transparent wrapper over a `&'static str`: there is
/// nothing to validate at construction (unlike, say, a semver or LEI
/// newtype) — its only purpose is to keep the dotted-string convention from
/// being threaded as a bare `&str` everywhere it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub &'static str);

impl ConstraintId {
    /// Returns the dotted string form, e.g. `"string.min_len"`.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The closed taxonomy of rule kinds.
///
/// Each variant names exactly one row of the rule taxonomy table. Variants
/// carry no payload here — payload lives in [`RuleSet`] keyed by `RuleKind`
/// — so this enum can be used as a map key and matched on exhaustively by
/// the emitter's per-field lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    // numeric
    Lt,
    Lte,
    Gt,
    Gte,
    NumEq,
    NumIn,
    NumNotIn,
    // string / bytes
    MinLen,
    MaxLen,
    StrEq,
    Prefix,
    Suffix,
    Contains,
    Ascii,
    Email,
    Hostname,
    Ip,
    Ipv4,
    Ipv6,
    StrIn,
    StrNotIn,
    // enum
    EnumEq,
    EnumIn,
    EnumNotIn,
    DefinedOnly,
    // repeated (container-level)
    MinItems,
    MaxItems,
    Unique,
    Items,
    // message-level
    Required,
    OneofRequired,
    Mutex,
    AtLeast,
    Requires,
    // well-known
    AnyIn,
    AnyNotIn,
    TimestampGtNow,
    TimestampLtNow,
    TimestampWithin,
}

impl RuleKind {
    /// Returns the stable dotted [`ConstraintId`] string for this rule kind,
    /// as it appears in worked examples
    /// (`string.min_len`, `int32.gte`, `repeated.unique`, `any.in`, ...).
    ///
    /// The type-qualifying prefix (`string.`, `int32.`, `repeated.`, ...) is
    /// not recoverable from `RuleKind` alone for the numeric rules — it
    /// depends on the field's scalar type — so callers building a
    /// [`ConstraintId`] for a numeric rule should use
    /// [`RuleKind::numeric_code`] instead.
    pub fn code(self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::NumEq => "eq",
            Self::NumIn => "in",
            Self::NumNotIn => "not_in",
            Self::MinLen => "string.min_len",
            Self::MaxLen => "string.max_len",
            Self::StrEq => "string.eq",
            Self::Prefix => "string.prefix",
            Self::Suffix => "string.suffix",
            Self::Contains => "string.contains",
            Self::Ascii => "string.ascii",
            Self::Email => "string.email",
            Self::Hostname => "string.hostname",
            Self::Ip => "string.ip",
            Self::Ipv4 => "string.ipv4",
            Self::Ipv6 => "string.ipv6",
            Self::StrIn => "string.in",
            Self::StrNotIn => "string.not_in",
            Self::EnumEq => "enum.eq",
            Self::EnumIn => "enum.in",
            Self::EnumNotIn => "enum.not_in",
            Self::DefinedOnly => "enum.defined_only",
            Self::MinItems => "repeated.min_items",
            Self::MaxItems => "repeated.max_items",
            Self::Unique => "repeated.unique",
            Self::Items => "repeated.items",
            Self::Required => "message.required",
            Self::OneofRequired => "message.oneof_required",
            Self::Mutex => "message.mutex",
            Self::AtLeast => "message.at_least",
            Self::Requires => "message.requires",
            Self::AnyIn => "any.in",
            Self::AnyNotIn => "any.not_in",
            Self::TimestampGtNow => "timestamp.gt_now",
            Self::TimestampLtNow => "timestamp.lt_now",
            Self::TimestampWithin => "timestamp.within",
        }
    }

    /// Builds a type-qualified [`ConstraintId`] for a numeric comparator
    /// rule, e.g. `RuleKind::Gte.numeric_code("int32")` yields
    /// `"int32.gte"`.
    ///
    /// Only meaningful for the numeric variants (`Lt`/`Lte`/`Gt`/`Gte`/
    /// `NumEq`/`NumIn`/`NumNotIn`); other variants already carry their
    /// own prefix in [`RuleKind::code`].
    pub fn numeric_code(self, scalar_type: &'static str) -> String {
        format!("{scalar_type}.{}", self.code())
    }
}

/// The cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    SingleRequired,
    SingleOptionalPresence,
    Repeated,
}

/// The storage mode of a field.
///
/// Determines how the emitter lowers access to the field's value (section
/// 4.1 "Field storage dispatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// Direct field access; scalars by copy, strings as a bounded buffer,
    /// repeated as `(array, count)`.
    InlineFixed,
    /// The decoded payload is not materialized; accessed through the
    /// [`crate::callback::StreamedField`] bridge.
    StreamedCallback,
    /// Heap-allocated, possibly null; a null-guard is emitted before any
    /// other rule runs.
    PointerHeap,
}

/// A scalar numeric type, used both by [`FieldType::Scalar`] and by
/// [`RuleKind::numeric_code`]'s type-qualifying prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Bool,
}

impl ScalarType {
    /// The type-name prefix used in numeric `ConstraintId`s (`"int32"`,
    /// `"uint32"`, ...), e.g. `int32.gte`, `uint32.gte`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Bool => "bool",
        }
    }
}

/// The type of a field: a scalar, a string/bytes kind, a nested message, or
/// an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Scalar(ScalarType),
    String,
    Bytes,
    /// A nested message type, named by its fully-qualified message name and
    /// the file it is declared in (used by cross-file dependency
    /// resolution,).
    Message {
        type_name: String,
        declaring_file: String,
    },
    Enum { type_name: String },
}

/// A declarative constraint attached to a field or message.
///
/// `payload` is an opaque rule-specific blob in the offline model; the
/// emitter is responsible for turning it into the
/// runtime [`crate::violation::Violation`]-producing check. We keep the
/// offline payload as a small closed enum ([`RulePayload`]) rather than a
/// type-erased pointer tagged by kind, so the compiler enforces
/// payload/kind agreement from the start instead of trusting a cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub payload: RulePayload,
}

/// Tagged rule-data payload: carries whatever scalar, string set, or
/// numeric range a `RuleKind` needs, typed per variant rather than
/// stringly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RulePayload {
    None,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Ints(Vec<i64>),
    Uints(Vec<u64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
    /// Nested rule set applied per-element for `RuleKind::Items`.
    Nested(Box<RuleSet>),
    /// Sibling field names, used by `mutex`/`at_least`/`requires`.
    FieldNames(Vec<String>),
}

/// An ordered mapping from [`RuleKind`] to its [`Rule`] payload.
///
/// Declaration order is preserved (a `Vec`, not a `HashMap`): when multiple
/// rules share the same kind, ties break on declaration order, and the
/// traversal as a whole must be deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: RuleKind, payload: RulePayload) -> &mut Self {
        self.rules.push(Rule { kind, payload });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A single field of a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub cardinality: Cardinality,
    pub storage_mode: StorageMode,
    #[serde(default)]
    pub rules: RuleSet,
    /// `Some(oneof_index)` when this field belongs to exactly one
    /// [`Oneof`] group in the owning [`Message`]; `None` otherwise.
    ///
    /// invariant: "every field belongs either to no
    /// oneof or to exactly one oneof" — enforced by
    /// [`Message::push_field`]/[`Message::push_oneof`], not by this type
    /// alone.
    #[serde(default)]
    pub oneof_index: Option<usize>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        cardinality: Cardinality,
        storage_mode: StorageMode,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            cardinality,
            storage_mode,
            rules: RuleSet::new(),
            oneof_index: None,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}

/// A named group of mutually exclusive fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oneof {
    pub name: String,
    /// Names of fields belonging to this oneof, in declaration order.
    pub field_names: Vec<String>,
    pub required: bool,
}

/// An error raised when a [`Message`] is constructed with a structural
/// invariant violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A field was assigned to a oneof group index that does not exist.
    UnknownOneof { field: String, oneof_index: usize },
    /// A field name appeared twice in one message.
    DuplicateField { field: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOneof { field, oneof_index } => {
                write!(f, "field {field:?} references unknown oneof index {oneof_index}")
            }
            Self::DuplicateField { field } => write!(f, "duplicate field name {field:?}"),
        }
    }
}

impl std::error::Error for ModelError {}

/// A message type: a name, its fields, its oneof groups, and nested
/// messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub oneofs: Vec<Oneof>,
    #[serde(default)]
    pub nested: Vec<Message>,
    /// Message-level rules (`required` composition rules that reference
    /// more than one field, e.g. `mutex`/`at_least`/`requires`).
    #[serde(default)]
    pub message_rules: RuleSet,
}

/// Checks the "at most one oneof per field" and "no duplicate field names"
/// invariants, shared by [`Message::new`] (construction
/// from raw parts) and [`Message::validate`] (a schema deserialized straight
/// from JSON, which bypasses the constructor).
fn check_field_invariants(fields: &[Field], oneofs: &[Oneof]) -> Result<(), ModelError> {
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        if !seen.insert(field.name.clone()) {
            return Err(ModelError::DuplicateField {
                    field: field.name.clone(),
            });
        }
        if let Some(idx) = field.oneof_index
        && idx >= oneofs.len()
        {
            return Err(ModelError::UnknownOneof {
                    field: field.name.clone(),
                    oneof_index: idx,
            });
        }
    }
    Ok(())
}

impl Message {
    /// Builds a `Message` from its raw parts, checking the "at most one
    /// oneof per field" invariant and rejecting duplicate field names.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<Field>,
        oneofs: Vec<Oneof>,
        nested: Vec<Message>,
    ) -> Result<Self, ModelError> {
        check_field_invariants(&fields, &oneofs)?;
        Ok(Self {
                name: name.into(),
                fields,
                oneofs,
                nested,
                message_rules: RuleSet::new(),
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Re-checks [`Message::new`]'s invariants against an already-built
    /// `Message`, recursing into nested messages. Needed because a schema
    /// loaded via `serde`'s derived `Deserialize` populates these fields
    /// directly rather than through the constructor (names
    /// the invariant; it does not mandate that every construction path go
    /// through `Message::new`).
    pub fn validate(&self) -> Result<(), ModelError> {
        check_field_invariants(&self.fields, &self.oneofs)?;
        for nested in &self.nested {
            nested.validate()?;
        }
        Ok(())
    }
}

/// An enum type: a name and its defined numeric values, used by
/// `RuleKind::DefinedOnly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<i32>,
}

/// An RPC method, referenced by [`Service`] for the service-derived
/// UDP/TCP filter entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub request_type: String,
    pub response_type: String,
}

/// An RPC service; its methods name the request/response message types
/// the generated `filter_udp`/`filter_tcp` entry points dispatch over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
}

/// One schema file: a package name, its messages, enums, services, and the
/// files it imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub path: String,
    pub package: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub imports: Vec<String>,
}

/// The full offline schema: an ordered sequence of [`SchemaFile`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub files: Vec<SchemaFile>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a message by name across every file in declaration order.
    pub fn find_message(&self, name: &str) -> Option<(&SchemaFile, &Message)> {
        for file in &self.files {
            if let Some(m) = file.messages.iter().find(|m| m.name == name) {
                return Some((file, m));
            }
        }
        None
    }

    /// Finds an enum type by name across every file.
    pub fn find_enum(&self, name: &str) -> Option<&EnumType> {
        self.files
        .iter()
        .flat_map(|f| &f.enums)
        .find(|e| e.name == name)
    }

    /// Re-checks every message's structural invariants,
    /// for schemas that arrived via `serde_json::from_str` rather than the
    /// `Message::new` constructor (`pbv-cli`'s `compile`/`check` subcommands).
    pub fn validate(&self) -> Result<(), ModelError> {
        for file in &self.files {
            for message in &file.messages {
                message.validate()?;
            }
        }
        Ok(())
    }
}
