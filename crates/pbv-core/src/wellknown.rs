/// The well-known types: `google.protobuf.Any` and `google.protobuf.Timestamp`.
///
/// The wall-clock dependency of the `Timestamp` rules is expressed as a
/// trait ([`Clock`]), an explicitly-passed collaborator rather than an
/// ambient global. This lets tests inject a fixed clock instead of
/// depending on real wall-clock time.
use std::time::{SystemTime, UNIX_EPOCH};

/// `google.protobuf.Any`: a type URL and opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Any {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl Any {
    /// The bare type name, stripped of the `type.googleapis.com/` prefix
    /// if present. `any.in`/`any.not_in` still compare against the full
    /// URL, prefix included.
    pub fn type_name(&self) -> &str {
        self.type_url
        .strip_prefix("type.googleapis.com/")
        .unwrap_or(&self.type_url)
    }
}

/// `google.protobuf.Timestamp`: seconds and nanos since the Unix epoch.
/// `nanos` is ignored by every rule in [`crate::rules::wellknown`] — a
/// deliberately coarse contract, not an oversight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

/// A source of "now", read once per `Timestamp` rule evaluation.
pub trait Clock {
    fn now_seconds(&self) -> i64;
}

/// The real wall clock, used by the generated validators at runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs() as i64,
            // Clock set before the epoch: treat as the epoch itself rather
            // than panicking.
            Err(_) => 0,
        }
    }
}

/// A fixed clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_seconds(&self) -> i64 {
        self.0
    }
}
