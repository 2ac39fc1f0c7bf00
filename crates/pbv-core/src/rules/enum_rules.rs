/// Enum comparators: `eq`, `in`, `not_in`,
/// `defined_only`.
pub fn eq(value: i32, expected: i32) -> bool {
    value == expected
}

pub fn in_set(value: i32, set: &[i32]) -> bool {
    set.contains(&value)
}

pub fn not_in_set(value: i32, set: &[i32]) -> bool {
    !in_set(value, set)
}

/// `defined_only`: the value must be one of the enum type's declared
/// values. `defined` is the enum type's value table,
/// e.g. from [`crate::model::EnumType::values`].
pub fn defined_only(value: i32, defined: &[i32]) -> bool {
    defined.contains(&value)
}
