//! Notification categories used for per-user preference gating.

use serde::{Deserialize, Serialize};

/// Coarse notification grouping.
///
/// Every template declares exactly one category; a user's preference record
/// carries an enable/disable toggle per category. The wire form is the
/// lowercase name (`"project"`, `"reminder"`, ...), matching the keys of the
/// `notification_preferences.categories` JSONB map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Project,
    Worker,
    Payment,
    System,
    Reminder,
}

impl Category {
    /// All categories, in the order they appear in a default preference map.
    pub const ALL: [Category; 5] = [
        Category::Project,
        Category::Worker,
        Category::Payment,
        Category::System,
        Category::Reminder,
    ];

    /// The lowercase wire/storage name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Project => "project",
            Category::Worker => "worker",
            Category::Payment => "payment",
            Category::System => "system",
            Category::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde_form() {
        for cat in Category::ALL {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }

    #[test]
    fn deserializes_lowercase_names() {
        let cat: Category = serde_json::from_str("\"reminder\"").unwrap();
        assert_eq!(cat, Category::Reminder);
    }
}
