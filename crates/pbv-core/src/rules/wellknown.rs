/// Well-known-type rules: `any.in`/`any.not_in`,
/// `timestamp.gt_now`/`timestamp.lt_now`/`timestamp.within`.
///
/// Matched against [`crate::wellknown::Any`]/[`crate::wellknown::Timestamp`]
/// by the emitter, which is responsible for extracting `type_name()` and
/// `seconds` before calling in here; these stay plain functions over
/// primitives like the rest of `rules::*`, so they can be unit tested
/// without constructing the wrapper types.
use crate::wellknown::Clock;

/// The `Any`'s type name is one of `allowed`.
pub fn any_in(type_name: &str, allowed: &[&str]) -> bool {
    allowed.contains(&type_name)
}

/// The `Any`'s type name is none of `disallowed`.
pub fn any_not_in(type_name: &str, disallowed: &[&str]) -> bool {
    !any_in(type_name, disallowed)
}

/// `seconds` is strictly after the clock's current reading.
pub fn timestamp_gt_now(seconds: i64, clock: &impl Clock) -> bool {
    seconds > clock.now_seconds()
}

/// `seconds` is strictly before the clock's current reading.
pub fn timestamp_lt_now(seconds: i64, clock: &impl Clock) -> bool {
    seconds < clock.now_seconds()
}

/// `seconds` is within `tolerance_secs` of the clock's current reading, in
/// either direction.
pub fn timestamp_within(seconds: i64, tolerance_secs: u64, clock: &impl Clock) -> bool {
    let now = clock.now_seconds();
    let delta = (seconds - now).unsigned_abs();
    delta <= tolerance_secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wellknown::FixedClock;

    #[test]
    fn any_in_and_not_in_are_complementary() {
        let allowed = ["UserInfo", "OrderInfo"];
        assert!(any_in("UserInfo", &allowed));
        assert!(!any_not_in("UserInfo", &allowed));
        assert!(!any_in("Unrelated", &allowed));
        assert!(any_not_in("Unrelated", &allowed));
    }

    #[test]
    fn timestamp_gt_now_and_lt_now_use_clock() {
        let clock = FixedClock(1_000);
        assert!(timestamp_gt_now(1_001, &clock));
        assert!(!timestamp_gt_now(1_000, &clock));
        assert!(timestamp_lt_now(999, &clock));
        assert!(!timestamp_lt_now(1_000, &clock));
    }

    #[test]
    fn timestamp_within_is_symmetric_around_now() {
        let clock = FixedClock(1_000);
        assert!(timestamp_within(995, 5, &clock));
        assert!(timestamp_within(1_005, 5, &clock));
        assert!(!timestamp_within(994, 5, &clock));
        assert!(!timestamp_within(1_006, 5, &clock));
    }
}
