/// The streamed-callback field bridge.
///
/// Fields whose storage mode is [`crate::model::StorageMode::StreamedCallback`]
/// are delivered to the application through a user-installed streaming hook
/// at decode time; the payload is never retained in the [`crate::value::MessageValue`]
/// tree. [`StreamedField::read`] is what emitted rule checks call instead of
/// peeking through an out-of-band raw pointer: a small trait the
/// application implements and hands to the validator, the same shape as
/// [`crate::wellknown::Clock`].
///
/// Rules that need the materialized value but find `read` returning `None`
/// are *skipped*, never failed — except `required`, which fails.

/// A bridge to a streamed-callback field's payload, installed by the
/// application before decode.
pub trait StreamedField {
    /// Returns the buffered bytes for this field, or `None` if the
    /// application never configured a slot for it, or the payload exceeded
    /// the compile-time maximum length it was bounded to — a field that
    /// overflowed its bound reads as absent, not as a truncated value.
    fn read(&self) -> Option<&[u8]>;
}

/// Every string and bytes [`crate::value::FieldValue`] is itself a valid
/// (already-materialized) [`StreamedField`]: `read` just borrows the
/// underlying bytes. This is what lets [`MessageValueStreams`] hand out
/// `&dyn StreamedField` backed directly by a value tree's own fields,
/// without a second owned copy.
impl StreamedField for crate::value::FieldValue {
    fn read(&self) -> Option<&[u8]> {
        self.as_bytes()
    }
}

/// A named lookup over a validator's configured [`StreamedField`]s: the
/// collaborator `validate_field` consults for `StorageMode::StreamedCallback`
/// fields instead of reading the (never-materialized) value tree directly.
pub trait StreamedFieldSource {
    /// Returns the [`StreamedField`] bridge for `field_name`, or `None` if
    /// no slot was configured for it.
    fn field(&self, field_name: &str) -> Option<&dyn StreamedField>;
}

/// A [`StreamedFieldSource`] with no configured fields: every lookup
/// reports `None`, so streamed-callback fields behave as absent (`required`
/// fails, every other rule is skipped).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStreamedFields;

impl StreamedFieldSource for NoStreamedFields {
    fn field(&self, _field_name: &str) -> Option<&dyn StreamedField> {
        None
    }
}

/// A [`StreamedFieldSource`] backed directly by an already-built
/// [`crate::value::MessageValue`] — the shape a JSON-driven smoke test
/// needs, since it has no live decode callback to configure and instead
/// stands its sample payload's fields in for what the callback would have
/// delivered.
#[derive(Debug, Clone, Copy)]
pub struct MessageValueStreams<'a> {
    value: &'a crate::value::MessageValue,
}

impl<'a> MessageValueStreams<'a> {
    pub fn new(value: &'a crate::value::MessageValue) -> Self {
        Self { value }
    }
}

impl<'a> StreamedFieldSource for MessageValueStreams<'a> {
    fn field(&self, field_name: &str) -> Option<&dyn StreamedField> {
        self.value.get(field_name).map(|v| v as &dyn StreamedField)
    }
}

/// A fixed-capacity, stack-resident [`StreamedField`] implementation: the
/// application copies up to `N` bytes into `buf` during its pre-decode hook
/// and sets `len`; `overflowed` records whether the source payload was
/// truncated to fit.
#[derive(Debug, Clone)]
pub struct FixedStreamedField<const N: usize> {
    buf: [u8; N],
    len: usize,
    configured: bool,
    overflowed: bool,
}

impl<const N: usize> FixedStreamedField<N> {
    /// An unconfigured slot: `read` returns `None` until [`Self::set`] is
    /// called.
    pub fn empty() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            configured: false,
            overflowed: false,
        }
    }

    /// Copies up to `N` bytes of `payload` into the slot. Sets `overflowed`
    /// if `payload` did not fit; the slot still reports the truncated
    /// prefix as unavailable (`read` returns `None`) since a truncated
    /// payload is not the field's true value.
    pub fn set(&mut self, payload: &[u8]) {
        self.configured = true;
        if payload.len() > N {
            self.overflowed = true;
            self.len = 0;
            return;
        }
        self.overflowed = false;
        self.buf[..payload.len()].copy_from_slice(payload);
        self.len = payload.len();
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl<const N: usize> StreamedField for FixedStreamedField<N> {
    fn read(&self) -> Option<&[u8]> {
        if !self.configured || self.overflowed {
            None
        } else {
            Some(&self.buf[..self.len])
        }
    }
}
