/// [`Violation`] and [`ViolationBuffer`] — the bounded violation accumulator.
///
/// A rule id, a location, and a message, collected into a result the
/// caller can query — but fixed-capacity and array-backed rather than a
/// growable `Vec`, since the engine does no dynamic allocation during
/// validation, and it sets a sticky `truncated` flag instead of silently
/// dropping overflow.
use std::fmt;

use crate::model::ConstraintId;

/// A single constraint failure: `(field_path, constraint_id, message)`.
///
/// `field_path` and `message` are stored by reference (:
/// "the backing storage must outlive the `ViolationBuffer`"). In practice
/// `message` is always a `&'static str` literal emitted by the compiler;
/// `field_path` is copied into the buffer's own fixed storage because the
/// path buffer it was read from is mutated in place during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field_path: String,
    pub constraint_id: ConstraintId,
    pub message: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field_path, self.message, self.constraint_id)
    }
}

/// A bounded, fixed-capacity accumulator of up to `N` [`Violation`]s.
///
/// Insertion order reflects traversal order: depth-first, in field
/// declaration order, with repeated-field indices in order. Once `N`
/// violations have been recorded, further additions are dropped and
/// [`ViolationBuffer::truncated`] becomes (and stays) `true` for the
/// remainder of the invocation — "sticky".
pub struct ViolationBuffer<const N: usize> {
    slots: [Option<Violation>; N],
    count: usize,
    truncated: bool,
}

impl<const N: usize> ViolationBuffer<N> {
    /// Creates a fresh buffer: zero count, `truncated` cleared.
    pub fn new() -> Self {
        Self {
            slots: [const { None }; N],
            count: 0,
            truncated: false,
        }
    }

    /// Resets an existing buffer to the initial state without
    /// reallocating, matching `init` operation used
    /// before each validator invocation.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.count = 0;
        self.truncated = false;
    }

    /// Adds a violation. Returns `false` and sets `truncated` if capacity
    /// has already been reached; otherwise stores the triple and returns
    /// `true`.
    pub fn add(&mut self, field_path: &str, constraint_id: ConstraintId, message: &'static str) -> bool {
        if self.count >= N {
            self.truncated = true;
            return false;
        }
        self.slots[self.count] = Some(Violation {
                field_path: field_path.to_string(),
                constraint_id,
                message,
        });
        self.count += 1;
        true
    }

    pub fn has_any(&self) -> bool {
        self.count > 0
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.slots[..self.count].iter().filter_map(|s| s.as_ref())
    }
}

impl<const N: usize> Default for ViolationBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A read-only view bundling a validator's boolean result with the
/// [`ViolationBuffer`] it populated.
///
/// `Verdict` borrows rather than owns, since the buffer it wraps is reused
/// stack storage, not a growable `Vec` collected once and handed to the
/// caller.
pub struct Verdict<'a, const N: usize> {
    pub accepted: bool,
    pub violations: &'a ViolationBuffer<N>,
}

impl<'a, const N: usize> Verdict<'a, N> {
    pub fn new(accepted: bool, violations: &'a ViolationBuffer<N>) -> Self {
        Self { accepted, violations }
    }

    /// `validate` returns `true` iff no violation was appended during the
    /// call — this checks that the two never drift apart.
    pub fn is_consistent(&self) -> bool {
        self.accepted == !self.violations.has_any()
    }

    /// Diagnostics are complete only if the buffer never overflowed.
    pub fn is_complete(&self) -> bool {
        !self.violations.truncated()
    }
}
