//! Path template matching.
//!
//! # Responsibilities
//! - Split templates and request paths on `/`
//! - Match literal segments by exact equality
//! - Match `:name` segments against any non-empty segment
//!
//! # Design Decisions
//! - Segment counts must agree (anchored at both ends, no prefix match)
//! - Literal segments are compared as plain strings, so `.` or `+` in a
//!   template never act as wildcards
//! - Trailing slashes are significant (they produce an empty segment)
//! - No regex to guarantee O(n) matching
//! - No allocation: templates are matched as stored text
//! - Parameter values are consumed for matching only, not extracted

/// Returns true if the literal `actual` path satisfies `template`.
///
/// Runs on every stored template per request, so it borrows segments
/// straight from both strings instead of allocating.
pub fn matches(template: &str, actual: &str) -> bool {
    let mut parts = actual.split('/');
    for expected in template.split('/') {
        match parts.next() {
            Some(part) if segment_matches(expected, part) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}

/// `:name` matches any non-empty segment; anything else must be equal.
fn segment_matches(expected: &str, actual: &str) -> bool {
    if expected.starts_with(':') {
        !actual.is_empty()
    } else {
        expected == actual
    }
}
