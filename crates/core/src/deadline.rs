//! Deadline horizon arithmetic for the approaching-deadline scanner.

use crate::types::Timestamp;

/// Projects whose deadline is within this many days are flagged.
pub const DEADLINE_HORIZON_DAYS: i64 = 3;

/// Whole days remaining until `deadline`, rounded up.
///
/// A deadline 49 hours away is "3 days"; one 24 hours away is "1 day".
/// Past-due deadlines clamp to 0 so a late scan never reports negative days.
pub fn days_remaining(now: Timestamp, deadline: Timestamp) -> i64 {
    let secs = (deadline - now).num_seconds();
    if secs <= 0 {
        return 0;
    }
    // Ceiling division over whole seconds in a day.
    (secs + 86_400 - 1) / 86_400
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
