//! Per-user notification preference domain type and email gate logic.
//!
//! The decision of whether an email may be sent is pure: it depends only on
//! the preference record, the notification category, and the local send
//! time. Loading the record (and failing open when it cannot be loaded) is
//! the engine's job; the rules live here.

use std::collections::HashMap;

use chrono::NaiveTime;

use crate::category::Category;
use crate::quiet_hours::QuietHours;

/// Delivery cadence chosen by the user.
///
/// Stored as lowercase text. Only `immediate` affects delivery in this
/// version; `daily`/`weekly` are surfaced to the settings UI but do not gate
/// immediate sends (there is no durable digest queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Immediate,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Immediate => "immediate",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Parse a stored value. Unknown strings fall back to `Immediate` so a
    /// corrupt column never suppresses delivery.
    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            _ => Frequency::Immediate,
        }
    }
}

/// Why an email was allowed or suppressed for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailGate {
    Allow,
    MasterDisabled,
    CategoryDisabled,
    QuietHours,
}

/// A user's notification preferences.
///
/// In-app delivery is never gated by this record; it applies to email only.
#[derive(Debug, Clone)]
pub struct Preference {
    pub email_enabled: bool,
    pub push_enabled: bool,
    /// Per-category toggles; categories absent from the map are enabled.
    pub categories: HashMap<Category, bool>,
    pub frequency: Frequency,
    pub quiet_hours: QuietHours,
}

impl Preference {
    /// The all-enabled record created lazily on first access, and the
    /// fail-open fallback when a record cannot be read.
    pub fn default_enabled() -> Self {
        Self {
            email_enabled: true,
            push_enabled: true,
            categories: Category::ALL.iter().map(|c| (*c, true)).collect(),
            frequency: Frequency::Immediate,
            quiet_hours: QuietHours::disabled(),
        }
    }

    /// Whether the given category is enabled. Missing entries default to
    /// enabled (fail open).
    pub fn category_enabled(&self, category: Category) -> bool {
        self.categories.get(&category).copied().unwrap_or(true)
    }

    /// Evaluate the email gate for one send at local time `now`.
    pub fn email_gate(&self, category: Category, now: NaiveTime) -> EmailGate {
        if !self.email_enabled {
            return EmailGate::MasterDisabled;
        }
        if !self.category_enabled(category) {
            return EmailGate::CategoryDisabled;
        }
        if self.quiet_hours.suppresses(now) {
            return EmailGate::QuietHours;
        }
        EmailGate::Allow
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
