/// The dotted field path buffer and [`ValidationContext`].
///
/// `PathBuffer` is a fixed-capacity, stack-resident string buffer: the
/// engine does no dynamic allocation during validation. Every push is
/// paired with a pop on every exit path — a central invariant this
/// module's own tests exercise directly.
use crate::violation::ViolationBuffer;

/// A fixed-capacity, stack-resident dotted path buffer.
///
/// Segments are joined with `.`; array indices are rendered as `[i]`
/// appended directly to the preceding segment, e.g. `parent.children[2].email`.
#[derive(Debug, Clone)]
pub struct PathBuffer {
    buf: String,
    capacity: usize,
}

impl PathBuffer {
    /// Creates an empty path buffer with the given byte capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends a `.name` (or just `name` if the buffer is currently empty).
    /// Returns `false` without mutating the buffer if the append would
    /// exceed capacity.
    pub fn push_field(&mut self, name: &str) -> bool {
        let needed = if self.buf.is_empty() {
            name.len()
        } else {
            name.len() + 1
        };
        if self.buf.len() + needed > self.capacity {
            return false;
        }
        if !self.buf.is_empty() {
            self.buf.push('.');
        }
        self.buf.push_str(name);
        true
    }

    /// Truncates at the last `.` (or clears entirely if none exists).
    ///
    /// This is the `pop_field` counterpart to `push_field`. It is a
    /// structural truncation, not aware of whether the last segment carried
    /// a trailing `[i]` — `pop_index` must be called first if one was
    /// pushed, matching the balanced push/pop discipline this buffer
    /// requires of callers.
    pub fn pop_field(&mut self) {
        match self.buf.rfind('.') {
            Some(idx) => self.buf.truncate(idx),
            None => self.buf.clear(),
        }
    }

    /// Appends `[i]` to the current path. Returns `false` without mutating
    /// the buffer if it would exceed capacity.
    pub fn push_index(&mut self, index: usize) -> bool {
        let rendered = format!("[{index}]");
        if self.buf.len() + rendered.len() > self.capacity {
            return false;
        }
        self.buf.push_str(&rendered);
        true
    }

    /// Truncates at the last `[`.
    pub fn pop_index(&mut self) {
        if let Some(idx) = self.buf.rfind('[') {
            self.buf.truncate(idx);
        }
    }
}

/// The mutable state threaded through one validator invocation: the current
/// dotted path, a reference to the [`ViolationBuffer`], and the early-exit
/// flag.
pub struct ValidationContext<'a, const N: usize> {
    pub path: PathBuffer,
    pub violations: &'a mut ViolationBuffer<N>,
    pub early_exit: bool,
}

impl<'a, const N: usize> ValidationContext<'a, N> {
    pub fn new(violations: &'a mut ViolationBuffer<N>, path_capacity: usize) -> Self {
        Self {
            path: PathBuffer::with_capacity(path_capacity),
            violations,
            early_exit: false,
        }
    }

    /// Records a violation at the current path. Returns `true` if the
    /// caller should keep validating, `false` if `early_exit` is set and
    /// the calling validator must return immediately (after unwinding its
    /// own pushed path segments — "Early exit").
    pub fn record(&mut self, constraint_id: crate::model::ConstraintId, message: &'static str) -> bool {
        self.violations.add(self.path.as_str(), constraint_id, message);
        !self.early_exit
    }

    /// Records a deadline strike as a terminal violation and forces
    /// `early_exit`: "a deadline strike counts as a
    /// terminal violation with constraint id `runtime.deadline`". Always
    /// returns `false` — the calling validator must unwind and return
    /// immediately.
    pub fn record_deadline_exceeded(&mut self) -> bool {
        self.violations.add(self.path.as_str(), DEADLINE_CONSTRAINT_ID, "deadline exceeded");
        self.early_exit = true;
        false
    }
}

/// Stable constraint id for the deadline-strike violation.
pub const DEADLINE_CONSTRAINT_ID: crate::model::ConstraintId = crate::model::ConstraintId("runtime.deadline");
