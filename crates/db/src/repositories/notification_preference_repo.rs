//! Repository for the `notification_preferences` table.
//!
//! One row per user, created lazily with all-enabled defaults on first
//! access and mutated only through the settings surface.

use shopfloor_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NotificationPreference, UpdatePreference};

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, user_id, email_enabled, push_enabled, categories, \
    frequency, quiet_enabled, quiet_start, quiet_end, created_at, updated_at";

/// Provides CRUD operations for notification preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Get the preference row for a user, if one exists.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Get the preference row for a user, inserting the all-enabled default
    /// row first if none exists.
    ///
    /// Table defaults supply the enabled flags, the empty category map, and
    /// the disabled quiet window; `ON CONFLICT DO NOTHING` makes concurrent
    /// first accesses race-safe, after which the row is re-read.
    pub async fn get_or_create_default(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "WITH created AS (\
                INSERT INTO notification_preferences (user_id) \
                VALUES ($1) \
                ON CONFLICT (user_id) DO NOTHING \
                RETURNING {COLUMNS}\
             ) \
             SELECT {COLUMNS} FROM created \
             UNION ALL \
             SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1 \
             LIMIT 1"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Insert or update a user's preferences. Only non-`None` fields in
    /// `input` are applied; the rest keep their current (or default) values.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdatePreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (user_id, email_enabled, push_enabled, categories, frequency, \
                 quiet_enabled, quiet_start, quiet_end) \
             VALUES ($1, COALESCE($2, true), COALESCE($3, true), \
                     COALESCE($4, '{{}}'::jsonb), COALESCE($5, 'immediate'), \
                     COALESCE($6, false), COALESCE($7, '22:00'), COALESCE($8, '08:00')) \
             ON CONFLICT (user_id) DO UPDATE SET \
                email_enabled = COALESCE($2, notification_preferences.email_enabled), \
                push_enabled = COALESCE($3, notification_preferences.push_enabled), \
                categories = COALESCE($4, notification_preferences.categories), \
                frequency = COALESCE($5, notification_preferences.frequency), \
                quiet_enabled = COALESCE($6, notification_preferences.quiet_enabled), \
                quiet_start = COALESCE($7, notification_preferences.quiet_start), \
                quiet_end = COALESCE($8, notification_preferences.quiet_end), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(input.email_enabled)
            .bind(input.push_enabled)
            .bind(&input.categories)
            .bind(&input.frequency)
            .bind(input.quiet_enabled)
            .bind(&input.quiet_start)
            .bind(&input.quiet_end)
            .fetch_one(pool)
            .await
    }
}
