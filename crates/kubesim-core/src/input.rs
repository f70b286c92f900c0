//! Defensive parsing of user-entered numbers.
//!
//! Form fields hand us raw strings. Nothing here ever fails: a blank,
//! non-numeric, or zero entry falls back to a safe default, and the
//! result is then clamped by the caller's bounds.

use crate::types::{MAX_REPLICA_LIMIT, MIN_REPLICA_FLOOR};

/// Fallback when the min-replica field is unusable.
pub const DEFAULT_MIN_INPUT: i64 = 1;
/// Fallback when the max-replica field is unusable.
pub const DEFAULT_MAX_INPUT: i64 = 10;
/// Fallback when the desired-replica field is unusable.
pub const DEFAULT_DESIRED_INPUT: i64 = 3;
/// Fallback when the target-utilization field is unusable.
pub const DEFAULT_TARGET_INPUT: i64 = 70;

/// Accepted range for a target utilization percentage.
pub const TARGET_UTILIZATION_RANGE: (u32, u32) = (10, 99);

/// Parse the leading integer of `raw`: optional whitespace, an optional
/// sign, then digits. Trailing junk is ignored (`"12abc"` is 12).
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Absurdly long digit runs saturate rather than fail.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// `leading_int`, with missing and zero values replaced by `fallback`.
pub fn int_or(raw: &str, fallback: i64) -> i64 {
    match leading_int(raw) {
        Some(0) | None => fallback,
        Some(n) => n,
    }
}

/// Saturate a signed entry into the replica range `[0, 20]`.
fn saturate(n: i64) -> u32 {
    n.clamp(0, MAX_REPLICA_LIMIT as i64) as u32
}

/// Parse a min-replica entry. Never below 1.
pub fn min_replicas(raw: &str) -> u32 {
    saturate(int_or(raw, DEFAULT_MIN_INPUT)).max(MIN_REPLICA_FLOOR)
}

/// Parse a max-replica entry. Never above 20; may be below the current
/// min, which `Bounds::with_max` corrects.
pub fn max_replicas(raw: &str) -> u32 {
    saturate(int_or(raw, DEFAULT_MAX_INPUT))
}

/// Parse a manual desired-replica entry, to be clamped by the bounds.
pub fn desired_replicas(raw: &str) -> u32 {
    saturate(int_or(raw, DEFAULT_DESIRED_INPUT))
}

/// Parse a target utilization entry, clamped to `[10, 99]`.
pub fn target_utilization(raw: &str) -> u32 {
    let (lo, hi) = TARGET_UTILIZATION_RANGE;
    int_or(raw, DEFAULT_TARGET_INPUT).clamp(lo as i64, hi as i64) as u32
}
