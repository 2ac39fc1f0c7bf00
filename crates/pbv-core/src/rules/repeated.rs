/// Container-level repeated-field rules:
/// `min_items`, `max_items`, `unique`. Per-element `items` dispatch just
/// re-invokes the element's own rule set — it is handled by the emitter,
/// not a runtime primitive here.
use crate::value::FieldValue;

pub fn min_items(count: usize, min: u32) -> bool {
    count as u64 >= u64::from(min)
}

pub fn max_items(count: usize, max: u32) -> bool {
    count as u64 <= u64::from(max)
}

/// No two elements compare equal. An empty sequence is vacuously unique.
///
/// Comparison uses [`FieldValue`]'s `PartialEq`, which compares structurally
/// (byte-exact for strings/bytes). Float elements reuse this same plain
/// equality rather than the bit-exact comparison `eq` uses for scalar
/// float fields — uniqueness was never specified as bit-exact.
pub fn unique(items: &[FieldValue]) -> bool {
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            if a == b {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_items_boundary_matches_spec() {
        assert!(max_items(10, 10));
        assert!(!max_items(11, 10));
    }

    #[test]
    fn min_items_boundary() {
        assert!(min_items(3, 3));
        assert!(!min_items(2, 3));
    }

    #[test]
    fn unique_over_empty_sequence_accepts() {
        assert!(unique(&[]));
    }

    #[test]
    fn unique_detects_duplicate_strings() {
        let items = vec![
            FieldValue::String("a".into()),
            FieldValue::String("b".into()),
            FieldValue::String("a".into()),
        ];
        assert!(!unique(&items));
    }

    #[test]
    fn unique_accepts_all_distinct() {
        let items = vec![FieldValue::I32(1), FieldValue::I32(2), FieldValue::I32(3)];
        assert!(unique(&items));
    }
}
