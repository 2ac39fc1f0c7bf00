#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod callback;
pub mod codec;
pub mod context;
pub mod envelope;
pub mod filter;
pub mod model;
pub mod rules;
pub mod value;
pub mod violation;
pub mod wellknown;

pub use callback::{FixedStreamedField, MessageValueStreams, NoStreamedFields, StreamedField, StreamedFieldSource};
pub use codec::{Codec, CodecError, Descriptor};
pub use context::{DEADLINE_CONSTRAINT_ID, PathBuffer, ValidationContext};
pub use envelope::{
    ANY_UNREGISTERED, AnyResolution, AnyUnregisteredPolicy, EnvelopeMode, OPCODE_MISMATCH,
    any_payload_path_prefix, check_envelope_any, check_envelope_oneof, check_opcode_variant,
    resolve_any,
};
pub use filter::{
    EngineViolationBuffer, Filter, FilterCode, FilterSpec, PreDecodeHook, ServiceEntry,
    ServiceFilter, VIOLATION_CAPACITY, ValidatorFn, clear_filter, filter_tcp, filter_udp,
    register_filter,
};
pub use model::{
    Cardinality, ConstraintId, EnumType, Field, FieldType, Message, Method, ModelError, Oneof,
    Rule, RuleKind, RulePayload, RuleSet, Schema, SchemaFile, ScalarType, Service, StorageMode,
};
pub use value::{FieldMap, FieldValue, MessageValue};
pub use violation::{Verdict, Violation, ViolationBuffer};
pub use wellknown::{Any, Clock, FixedClock, SystemClock, Timestamp};

/// Returns the current version of the pbv-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
