/// Format predicates: email, hostname, IPv4, IPv6, IP.
///
/// These predicates are specified exhaustively because test suites must
/// agree bit-for-bit; this module implements the matching rules directly
/// on the input bytes rather than delegating to a general-purpose
/// validation or regex crate, which also keeps every function allocation-free
/// and panic-free: none of them ever read past the input's length.

/// Every byte is ASCII (<= 0x7F).
pub fn ascii(s: &str) -> bool {
    crate::rules::string::ascii(s.as_bytes())
}

/// A valid hostname label: ASCII alphanumeric or `-`, 1..63 bytes, must not
/// start or end with `-`.
fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Hostname predicate:
///
/// Overall length 1..253. Segmented by `.`; no leading/trailing dot; no
/// consecutive dots. Each label length 1..63, must not start or end with
/// `-`, each byte must be ASCII alphanumeric or `-`. No whitespace or
/// control characters anywhere (implied: such bytes never satisfy the
/// per-label alphanumeric-or-`-` check).
pub fn hostname(s: &str) -> bool {
    let len = s.len();
    if !(1..=253).contains(&len) {
        return false;
    }
    if s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.split('.').all(is_valid_label)
}

/// Email predicate:
///
/// Length >= 3. Contains exactly one `@`. No whitespace or control
/// characters. Local part non-empty, must not start/end with `.`, no
/// consecutive `.`. Domain part must be a valid hostname by the rule above.
///
/// The domain additionally must contain at least one `.` (i.e. be more
/// than a single label) — this is the detail leaves
/// implicit but own worked boundary case requires: `a@b`
/// (domain `b`, single label) rejects, `a@b.c` (domain `b.c`) accepts, even
/// though both satisfy the bare length >= 3 and "valid hostname" checks on
/// their own. See `DESIGN.md` for this resolution.
pub fn email(s: &str) -> bool {
    if s.len() < 3 {
        return false;
    }
    if s.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return false;
    }
    let mut at_positions = s.match_indices('@');
    let Some((at_idx, _)) = at_positions.next() else {
        return false;
    };
    if at_positions.next().is_some() {
        return false;
    }
    let local = &s[..at_idx];
    let domain = &s[at_idx + 1..];
    if local.is_empty() || local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    hostname(domain) && domain.contains('.')
}

/// A single IPv4 decimal segment: non-empty, all ASCII digits, at most 3
/// digits, numeric value 0..255 (leading zeros permitted).
fn is_valid_ipv4_segment(segment: &str) -> bool {
    if segment.is_empty() || segment.len() > 3 {
        return false;
    }
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match segment.parse::<u16>() {
        Ok(value) => value <= 255,
        Err(_) => false,
    }
}

/// IPv4 predicate: length 7..15, exactly four
/// dot-separated segments, each 0..255 with leading zeros permitted.
pub fn ipv4(s: &str) -> bool {
    if !(7..=15).contains(&s.len()) {
        return false;
    }
    let segments: Vec<&str> = s.split('.').collect();
    segments.len() == 4 && segments.iter().all(|seg| is_valid_ipv4_segment(seg))
}

fn is_valid_hextet(hextet: &str) -> bool {
    (1..=4).contains(&hextet.len()) && hextet.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Splits `part` on `:`, returning `None` if `part` is non-empty and
/// contains any empty segment (a stray single colon next to the `::`
/// marker, which is malformed).
fn split_hextets(part: &str) -> Option<Vec<&str>> {
    if part.is_empty() {
        return Some(Vec::new());
    }
    let segments: Vec<&str> = part.split(':').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Counts hextets in `segments`, treating a trailing dotted-quad IPv4
/// segment (if present) as two hextets. Returns
/// `None` if any non-tail segment is not a valid 1..4 digit hex hextet, or
/// the tail is present but not a valid IPv4 literal.
fn count_hextets(segments: &[&str]) -> Option<usize> {
    let Some((last, rest)) = segments.split_last() else {
        return Some(0);
    };
    if last.contains('.') {
        if !ipv4(last) {
            return None;
        }
        if rest.iter().any(|h| !is_valid_hextet(h)) {
            return None;
        }
        Some(rest.len() + 2)
    } else {
        if segments.iter().any(|h| !is_valid_hextet(h)) {
            return None;
        }
        Some(segments.len())
    }
}

/// IPv6 predicate.
///
/// Colon-separated hextets, 1..4 hex digits each, total of 8 hextets. `::`
/// permitted at most once, elides one or more zero hextets. An optional
/// trailing dotted-quad IPv4 tail is allowed as the last element and
/// counts as two hextets. Uncompressed form must have exactly 8 hextets;
/// compressed form must have fewer than 8 before substitution.
pub fn ipv6(s: &str) -> bool {
    if s.len() < 2 {
        return false;
    }

    let mut double_colon_at = None;
    let mut search_from = 0usize;
    let mut double_colon_count = 0usize;
    while let Some(pos) = s[search_from..].find("::") {
        double_colon_count += 1;
        if double_colon_count > 1 {
            return false;
        }
        double_colon_at = Some(search_from + pos);
        search_from += pos + 2;
    }

    match double_colon_at {
        Some(pos) => {
            let left = &s[..pos];
            let right = &s[pos + 2..];
            let Some(left_segments) = split_hextets(left) else {
                return false;
            };
            let Some(right_segments) = split_hextets(right) else {
                return false;
            };
            // The IPv4 tail, if any, can only appear at the very end of
            // `right` (or of `left` if `right` is empty).
            let explicit = if !right_segments.is_empty() {
                let Some(left_count) = count_hextets_no_tail(&left_segments) else {
                    return false;
                };
                let Some(right_count) = count_hextets(&right_segments) else {
                    return false;
                };
                left_count + right_count
            } else {
                let Some(left_count) = count_hextets(&left_segments) else {
                    return false;
                };
                left_count
            };
            explicit < 8
        }
        None => {
            let Some(segments) = split_hextets(s) else {
                return false;
            };
            match count_hextets(&segments) {
                Some(total) => total == 8,
                None => false,
            }
        }
    }
}

/// Like [`count_hextets`] but disallows an IPv4 tail (used for the `left`
/// side of a `::` split when `right` is non-empty — the tail can only
/// trail the whole address).
fn count_hextets_no_tail(segments: &[&str]) -> Option<usize> {
    if segments.iter().any(|h| !is_valid_hextet(h)) {
        return None;
    }
    Some(segments.len())
}

/// IP predicate: IPv4 or IPv6.
pub fn ip(s: &str) -> bool {
    ipv4(s) || ipv6(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_rejects_label_ending_in_hyphen() {
        assert!(!hostname("foo-.example.com"));
    }

    #[test]
    fn hostname_rejects_leading_trailing_and_consecutive_dots() {
        assert!(!hostname(".example.com"));
        assert!(!hostname("example.com."));
        assert!(!hostname("example..com"));
    }

    #[test]
    fn hostname_accepts_simple_names() {
        assert!(hostname("example.com"));
        assert!(hostname("a"));
        assert!(hostname("xn--d1acufc.xn--p1ai"));
    }

    #[test]
    fn email_boundary_cases_match_spec() {
        assert!(!email("a@b"));
        assert!(email("a@b.c"));
    }

    #[test]
    fn email_rejects_whitespace_and_double_dots() {
        assert!(!email("a b@example.com"));
        assert!(!email("a..b@example.com"));
        assert!(!email(".a@example.com"));
        assert!(!email("a.@example.com"));
    }

    #[test]
    fn email_rejects_multiple_at_signs() {
        assert!(!email("a@b@c.d"));
    }

    #[test]
    fn ipv4_accepts_leading_zeros_and_rejects_out_of_range() {
        assert!(ipv4("007.0.0.1"));
        assert!(!ipv4("256.0.0.1"));
        assert!(!ipv4("1.2.3"));
        assert!(ipv4("255.255.255.255"));
    }

    #[test]
    fn ipv6_double_colon_alone_accepts() {
        assert!(ipv6("::"));
    }

    #[test]
    fn ipv6_triple_colon_rejects() {
        assert!(!ipv6("2001:::1"));
    }

    #[test]
    fn ipv6_trailing_dotted_quad_accepts() {
        assert!(ipv6("::ffff:192.0.2.1"));
    }

    #[test]
    fn ipv6_uncompressed_requires_exactly_eight_hextets() {
        assert!(ipv6("2001:0db8:0000:0000:0000:ff00:0042:8329"));
        assert!(!ipv6("2001:0db8:0000:0000:0000:ff00:0042"));
    }

    #[test]
    fn ipv6_double_double_colon_rejects() {
        assert!(!ipv6("1::2::3"));
    }

    #[test]
    fn ip_accepts_either_family() {
        assert!(ip("192.0.2.1"));
        assert!(ip("::1"));
        assert!(!ip("not-an-ip"));
    }

    #[test]
    fn format_predicates_never_panic_on_arbitrary_input() {
        let inputs = ["", ":", "::::", "...", "@", ".", "-", "a".repeat(300).as_str()];
        for input in inputs {
            let _ = hostname(input);
            let _ = email(input);
            let _ = ipv4(input);
            let _ = ipv6(input);
            let _ = ip(input);
        }
    }
}
