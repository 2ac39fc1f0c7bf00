/// Message-level (cross-field) rules: `required`,
/// `oneof_required`, `mutex`, `at_least`, `requires`.
///
/// These operate on field presence rather than field value — the emitter
/// is responsible for computing each field's presence
/// from the decoded [`crate::value::MessageValue`] (a pointer-with-heap
/// field is present iff non-null; a streamed-callback field is present iff
/// [`crate::callback::StreamedField::read`] returns `Some`; anything else
/// is present iff the `oneof`/`optional` discriminator says so) and passing
/// the resulting booleans in here.
pub fn required(present: bool) -> bool {
    present
}

/// `oneof_required` fails when the discriminator indicates no variant is
/// set.
pub fn oneof_required(variant_set: bool) -> bool {
    variant_set
}

/// At most one of `fields_present` is `true`.
pub fn mutex(fields_present: &[bool]) -> bool {
    fields_present.iter().filter(|&&p| p).count() <= 1
}

/// At least `n` of `fields_present` are `true`.
pub fn at_least(n: usize, fields_present: &[bool]) -> bool {
    fields_present.iter().filter(|&&p| p).count() >= n
}

/// If `trigger_present`, every field in `required_present` must also be
/// present.
pub fn requires(trigger_present: bool, required_present: &[bool]) -> bool {
    !trigger_present || required_present.iter().all(|&p| p)
}
