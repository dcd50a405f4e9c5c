//! Notification entity models and DTOs.

use serde::{Deserialize, Serialize};
use shopfloor_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    /// Notification type name, e.g. `"project_created"`.
    pub notification_type: String,
    pub title: String,
    pub message: String,
    /// Category name, one of the [`shopfloor_core::Category`] wire forms.
    pub category: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    /// The business entity the notification refers to (project,
    /// announcement, ...), when there is one.
    pub entity_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub category: String,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub entity_id: Option<DbId>,
}

/// A row from the `notification_preferences` table.
///
/// `categories` is a JSONB map of category name to enabled flag; categories
/// absent from the map are treated as enabled by the gate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub user_id: DbId,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub categories: serde_json::Value,
    /// `"immediate"`, `"daily"`, or `"weekly"`.
    pub frequency: String,
    pub quiet_enabled: bool,
    /// Quiet window start, `"HH:MM"`.
    pub quiet_start: String,
    /// Quiet window end (exclusive), `"HH:MM"`.
    pub quiet_end: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating a notification preference. All fields are optional;
/// only non-`None` fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreference {
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub categories: Option<serde_json::Value>,
    pub frequency: Option<String>,
    pub quiet_enabled: Option<bool>,
    pub quiet_start: Option<String>,
    pub quiet_end: Option<String>,
}
