/// Primitive comparators and format predicates.
///
/// Submodules are grouped by rule-kind category (numeric, string/bytes,
/// format predicates, enum, repeated, message-level, well-known), each a
/// set of small, pure, total, zero-allocation functions with worked
/// doctest examples.
pub mod enum_rules;
pub mod format;
pub mod message;
pub mod numeric;
pub mod repeated;
pub mod string;
pub mod wellknown;
