//! # Record Identifiers
//!
//! Every record gets a short, human-typeable identifier: a one-letter prefix per kind
//! followed by a decimal number (`P101`, `A117`, `B102`). Identifiers are assigned once
//! and never change.
//!
//! ## Allocation
//!
//! The obvious scheme, `prefix + (floor + count)`, is wrong: as soon as a record is
//! deleted the count drops and the next registration collides with a live record.
//!
//! Instead [`next_id`] scans every existing identifier:
//!
//! 1. Keep only identifiers of the form `<prefix><digits>` (malformed ones are skipped).
//! 2. Parse the numeric suffix and track the maximum, seeded at the configured floor.
//! 3. Issue `max + 1`.
//!
//! With the default floor of 100 the first patient is `P101`. Because only the maximum
//! matters, gaps left by deletions are never refilled while a higher number is live, and
//! the result is independent of how many records exist.
//!
//! A hand-edited file can hold a suffix as large as `u64::MAX`. Nothing can follow it,
//! so [`next_id`] returns `None` rather than wrapping around to a low number.

/// Parses the numeric suffix of `id` if it has the form `<prefix><digits>`.
pub fn parse_suffix(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Computes the next identifier for `prefix` given the identifiers in use.
///
/// Returns `None` once the highest suffix in use is `u64::MAX`.
pub fn next_id<'a, I>(existing: I, prefix: &str, floor: u64) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| parse_suffix(id, prefix))
        .fold(floor, u64::max);
    let next = max.checked_add(1)?;
    Some(format!("{}{}", prefix, next))
}
