/// The wire-format boundary collaborator.
///
/// The wire-format encoder/decoder itself is out of scope;
/// this module specifies only the interface the rest of `pbv-core` depends
/// on. A concrete generated codec (outside this crate) implements [`Codec`]
/// for its own descriptor and value types.
use crate::value::MessageValue;

/// A static lookup handle for a message type's wire layout, resolved once by
/// [`Codec::descriptor_of`] and reused across decode calls.
///
/// `Send + Sync` so a registered [`crate::filter::FilterSpec`] can sit behind
/// the filter pipeline's process-wide registration slot.
pub trait Descriptor: Send + Sync {
    /// The fully-qualified message type name this descriptor was resolved
    /// for, e.g. `"UserInfo"`.
    fn message_name(&self) -> &str;
}

/// Why a [`Codec`] operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input bytes do not parse as a valid wire-format message.
    Malformed,
    /// No descriptor is registered for the requested message type name.
    UnknownType,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed wire-format input"),
            Self::UnknownType => f.write_str("no descriptor registered for this message type"),
        }
    }
}

impl std::error::Error for CodecError {}

/// The `Codec` collaborator used by the filter pipeline.
///
/// `decode`/`encode` work against [`MessageValue`], the closed-enum runtime
/// value tree the rest of the engine traverses; a generated codec is
/// responsible for producing and consuming that shape from its own wire
/// representation.
pub trait Codec: Send + Sync {
    /// Populates a [`MessageValue`] from `bytes` against `descriptor`.
    /// Returns [`CodecError::Malformed`] on any wire-format error.
    fn decode(&self, bytes: &[u8], descriptor: &dyn Descriptor) -> Result<MessageValue, CodecError>;

    /// The inverse of `decode`. Not used by the validation engine itself;
    /// names it only for round-trip tests.
    fn encode(&self, value: &MessageValue, descriptor: &dyn Descriptor) -> Result<Vec<u8>, CodecError>;

    /// Resolves the descriptor for a message type name, or
    /// [`CodecError::UnknownType`] if the codec has no such type.
    fn descriptor_of(&self, message_type_name: &str) -> Result<Box<dyn Descriptor>, CodecError>;
}
