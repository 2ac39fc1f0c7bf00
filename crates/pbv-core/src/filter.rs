/// The decode-then-validate packet filter pipeline.
///
/// Two APIs are offered for the same operation:
///
/// - [`register_filter`]/[`filter_udp`]/[`filter_tcp`]: the legacy,
/// process-wide single-slot API. The slot is a [`std::sync::Mutex`]
/// rather than a bare global, so registering from multiple threads is
/// safe in the sense of not being undefined behavior — but concurrent
/// *registration* still races logically (a caller mid-`process` may
/// observe a spec swapped out from under it), so the
/// single-active-spec discipline this API implies is not a correctness
/// guarantee this module can make for you.
/// - [`Filter`]/[`ServiceFilter`]: the thread-safe variant, threading the
/// active spec through the call explicitly instead of a global slot.
/// Prefer this for any multi-threaded deployment.
use std::any::Any;
use std::sync::{Mutex, OnceLock};

use crate::codec::{Codec, CodecError};
use crate::envelope::{AnyResolution, EnvelopeMode, check_envelope_any, check_envelope_oneof};
use crate::value::MessageValue;
use crate::violation::ViolationBuffer;

/// The fixed violation-buffer capacity used throughout the filter pipeline.
/// bounds all engine buffers at compile time; a single
/// capacity shared across every registered message type keeps the
/// `ValidatorFn` signature below free of a capacity type parameter.
pub const VIOLATION_CAPACITY: usize = 32;

/// The violation buffer type every [`ValidatorFn`] is handed.
pub type EngineViolationBuffer = ViolationBuffer<VIOLATION_CAPACITY>;

/// A generated validator entry point: `validate_<Msg>(&value, &mut violations) -> bool`.
pub type ValidatorFn = fn(&MessageValue, &mut EngineViolationBuffer) -> bool;

/// An optional pre-decode hook: configures [`crate::callback::StreamedField`]
/// bridges on `user_ctx` before the decoder runs.
pub type PreDecodeHook = fn(user_ctx: &mut dyn Any, is_to_server: bool);

/// The stable return codes of [`filter_udp`]/[`filter_tcp`]/[`Filter::process`].
/// The wire contract is the `i32` discriminant, not the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FilterCode {
    /// Decoded and valid.
    Ok = 0,
    /// Null or zero-length input.
    InvalidInput = -1,
    /// No active [`FilterSpec`] registration.
    NotRegistered = -2,
    /// Wire-format error *or* validation failure — overloaded by design,
    /// so callers that only care about accept/reject don't need to
    /// distinguish the two.
    Decode = -3,
    /// No validator is registered for the decoded message type.
    NoValidator = -4,
}

impl FilterCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// The registration record bundling a descriptor handle, a validator
/// adapter, an optional pre-decode hook, and an optional envelope mode.
pub struct FilterSpec {
    pub message_type: String,
    pub validator: ValidatorFn,
    pub pre_decode_hook: Option<PreDecodeHook>,
    pub envelope_mode: Option<EnvelopeMode>,
}

impl FilterSpec {
    pub fn new(message_type: impl Into<String>, validator: ValidatorFn) -> Self {
        Self {
            message_type: message_type.into(),
            validator,
            pre_decode_hook: None,
            envelope_mode: None,
        }
    }

    #[must_use]
    pub fn with_pre_decode_hook(mut self, hook: PreDecodeHook) -> Self {
        self.pre_decode_hook = Some(hook);
        self
    }

    /// Declares the envelope dispatch strategy checked ahead of `validator`
    /// in [`process_with`]. `RootMessage` needs no check here — the
    /// descriptor/decode step above already pins the message type.
    #[must_use]
    pub fn with_envelope_mode(mut self, mode: EnvelopeMode) -> Self {
        self.envelope_mode = Some(mode);
        self
    }
}

/// Runs one decode-then-validate pass against `spec` using `codec`.
///
/// Steps 1-7 of, adapted to Rust's ownership model: "zero
/// initialized value buffer, stack or heap" becomes an ordinary owned
/// [`MessageValue`] returned by the codec — there is no separate
/// allocate/free step to orchestrate here, since `MessageValue` is freed on
/// scope exit regardless of which path this function returns through.
fn process_with(
    codec: &dyn Codec,
    spec: &FilterSpec,
    bytes: &[u8],
    is_to_server: bool,
    user_ctx: &mut dyn Any,
) -> FilterCode {
    if bytes.is_empty() {
        return FilterCode::InvalidInput;
    }
    if let Some(hook) = spec.pre_decode_hook {
        hook(user_ctx, is_to_server);
    }
    let descriptor = match codec.descriptor_of(&spec.message_type) {
        Ok(d) => d,
        Err(_) => return FilterCode::Decode,
    };
    let value = match codec.decode(bytes, descriptor.as_ref()) {
        Ok(v) => v,
        Err(CodecError::Malformed | CodecError::UnknownType) => return FilterCode::Decode,
    };
    match &spec.envelope_mode {
        None | Some(EnvelopeMode::RootMessage { .. }) => {}
        Some(EnvelopeMode::OneofDispatched { opcode_field, opcode_map }) => {
            if !check_envelope_oneof(&value, opcode_field, opcode_map) {
                return FilterCode::Decode;
            }
        }
        Some(EnvelopeMode::AnyDispatched { payload_field, registered_types, unregistered_policy }) => {
            match check_envelope_any(&value, payload_field, registered_types, *unregistered_policy) {
                AnyResolution::Resolved | AnyResolution::AcceptUnregistered => {}
                AnyResolution::RejectUnregistered => return FilterCode::Decode,
            }
        }
    }
    let mut violations = EngineViolationBuffer::new();
    if (spec.validator)(&value, &mut violations) {
        FilterCode::Ok
    } else {
        FilterCode::Decode
    }
}

static ACTIVE_FILTER: OnceLock<Mutex<Option<FilterSpec>>> = OnceLock::new();

fn active_filter_slot() -> &'static Mutex<Option<FilterSpec>> {
    ACTIVE_FILTER.get_or_init(|| Mutex::new(None))
}

/// Sets the active, process-wide [`FilterSpec`]. At most
/// one spec is active at a time; a second call replaces the first.
pub fn register_filter(spec: FilterSpec) {
    let mut slot = active_filter_slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Some(spec);
}

/// Clears the active registration, so a subsequent [`filter_udp`]/[`filter_tcp`]
/// call returns [`FilterCode::NotRegistered`]. Mainly useful for tests that
/// must not leak state across the process-wide slot.
pub fn clear_filter() {
    let mut slot = active_filter_slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = None;
}

/// The legacy, process-wide UDP filter entry point.
pub fn filter_udp(codec: &dyn Codec, bytes: &[u8], is_to_server: bool, user_ctx: &mut dyn Any) -> FilterCode {
    let slot = active_filter_slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    match slot.as_ref() {
        None => FilterCode::NotRegistered,
        Some(spec) => process_with(codec, spec, bytes, is_to_server, user_ctx),
    }
}

/// The legacy, process-wide TCP filter entry point.
/// Dispatch logic is identical to [`filter_udp`] for the single-type case;
/// `is_to_server` only narrows the candidate set for service-derived
/// filters (see [`ServiceFilter`]).
pub fn filter_tcp(codec: &dyn Codec, bytes: &[u8], is_to_server: bool, user_ctx: &mut dyn Any) -> FilterCode {
    filter_udp(codec, bytes, is_to_server, user_ctx)
}

/// The thread-safe, dependency-injected single-message filter: a handle
/// passed explicitly to `process` rather than a process-wide registered slot.
pub struct Filter<'a> {
    codec: &'a dyn Codec,
    spec: FilterSpec,
}

impl<'a> Filter<'a> {
    pub fn new(codec: &'a dyn Codec, spec: FilterSpec) -> Self {
        Self { codec, spec }
    }

    pub fn process(&self, bytes: &[u8], is_to_server: bool, user_ctx: &mut dyn Any) -> FilterCode {
        process_with(self.codec, &self.spec, bytes, is_to_server, user_ctx)
    }
}

/// One RPC method's request/response validator pair, for service-derived
/// multi-type dispatch.
pub struct ServiceEntry {
    pub request_type: String,
    pub request_validator: ValidatorFn,
    pub response_type: String,
    pub response_validator: ValidatorFn,
}

/// The thread-safe, dependency-injected service-derived filter: tries every
/// candidate message type referenced by any service method, in schema
/// declaration order, accepting on the first one that decodes and validates.
pub struct ServiceFilter<'a> {
    codec: &'a dyn Codec,
    entries: Vec<ServiceEntry>,
}

impl<'a> ServiceFilter<'a> {
    pub fn new(codec: &'a dyn Codec, entries: Vec<ServiceEntry>) -> Self {
        Self { codec, entries }
    }

    fn candidates(&self, only_requests: Option<bool>) -> Vec<(&str, ValidatorFn)> {
        let mut candidates = Vec::new();
        for entry in &self.entries {
            match only_requests {
                Some(true) => candidates.push((entry.request_type.as_str(), entry.request_validator)),
                Some(false) => candidates.push((entry.response_type.as_str(), entry.response_validator)),
                None => {
                    candidates.push((entry.request_type.as_str(), entry.request_validator));
                    candidates.push((entry.response_type.as_str(), entry.response_validator));
                }
            }
        }
        candidates
    }

    /// Tries every message type referenced by any service method. Accepts
    /// on the first candidate that decodes and validates;
    /// [`FilterCode::Decode`] if none do.
    pub fn filter_udp(&self, bytes: &[u8], user_ctx: &mut dyn Any) -> FilterCode {
        self.try_candidates(bytes, &self.candidates(None), user_ctx)
    }

    /// Tries only request types when `is_to_server`, only response types
    /// otherwise (: TCP dispatch).
    pub fn filter_tcp(&self, bytes: &[u8], is_to_server: bool, user_ctx: &mut dyn Any) -> FilterCode {
        self.try_candidates(bytes, &self.candidates(Some(is_to_server)), user_ctx)
    }

    fn try_candidates(&self, bytes: &[u8], candidates: &[(&str, ValidatorFn)], user_ctx: &mut dyn Any) -> FilterCode {
        if bytes.is_empty() {
            return FilterCode::InvalidInput;
        }
        if candidates.is_empty() {
            return FilterCode::NoValidator;
        }
        for (message_type, validator) in candidates {
            let spec = FilterSpec::new(*message_type, *validator);
            match process_with(self.codec, &spec, bytes, true, user_ctx) {
                FilterCode::Ok => return FilterCode::Ok,
                _ => continue,
            }
        }
        FilterCode::Decode
    }
}
