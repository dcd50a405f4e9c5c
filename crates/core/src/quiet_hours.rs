//! Per-user quiet window evaluation.
//!
//! A preference record may carry a quiet window as two `"HH:MM"` strings.
//! Email delivery is suppressed while the recipient's local send time falls
//! inside the half-open window `[start, end)`. Windows may wrap midnight
//! (`22:00`–`06:00`). Malformed time strings fail open: the window is treated
//! as disabled so legitimately-wanted email is never silently dropped.

use chrono::NaiveTime;

/// A user's configured quiet window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuietHours {
    pub enabled: bool,
    /// Window start, `"HH:MM"`.
    pub start: String,
    /// Window end (exclusive), `"HH:MM"`.
    pub end: String,
}

impl QuietHours {
    /// The all-disabled default used for lazily-created preference records.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "08:00".to_string(),
        }
    }

    /// Whether `now` falls inside the enabled quiet window `[start, end)`.
    ///
    /// Returns `false` when the window is disabled, when either bound fails
    /// to parse, or when start == end (an empty window).
    pub fn suppresses(&self, now: NaiveTime) -> bool {
        if !self.enabled {
            return false;
        }
        let (Some(start), Some(end)) = (parse_hhmm(&self.start), parse_hhmm(&self.end)) else {
            return false;
        };
        if start == end {
            return false;
        }
        if start < end {
            start <= now && now < end
        } else {
            // Wraps midnight: in-window means after start or before end.
            now >= start || now < end
        }
    }
}

/// Parse a `"HH:MM"` string into a [`NaiveTime`].
fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
