//! Repository seams between the engine and the persistent store.
//!
//! The dispatcher never touches SQL: it sees four narrow traits, which keeps
//! it store-agnostic and lets tests substitute in-memory fakes per channel.
//! [`PgStore`] is the production implementation, delegating to the
//! `shopfloor-db` repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use shopfloor_core::preference::{Frequency, Preference};
use shopfloor_core::types::DbId;
use shopfloor_core::{Category, QuietHours};
use shopfloor_db::models::notification::{NewNotification, NotificationPreference};
use shopfloor_db::models::project::DeadlineProject;
use shopfloor_db::models::user::User;
use shopfloor_db::repositories::{
    NotificationPreferenceRepo, NotificationRepo, ProjectRepo, UserRepo,
};
use shopfloor_db::DbPool;

/// Error type for store access failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All active users with the given role, in a stable order.
    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;
}

/// Read access to per-user notification preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// The user's preference record, lazily created with all-enabled
    /// defaults on first access.
    async fn get_or_default(&self, user_id: DbId) -> Result<Preference, StoreError>;
}

/// Write access for in-app notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<DbId, StoreError>;
}

/// Read access to project deadlines for the scanner.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn find_approaching_deadlines(
        &self,
        horizon_days: i64,
    ) -> Result<Vec<DeadlineProject>, StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

/// Production store backed by the PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::find_by_role(&self.pool, role).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn get_or_default(&self, user_id: DbId) -> Result<Preference, StoreError> {
        let row = NotificationPreferenceRepo::get_or_create_default(&self.pool, user_id).await?;
        Ok(preference_from_row(&row))
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create(&self, notification: &NewNotification) -> Result<DbId, StoreError> {
        Ok(NotificationRepo::create(&self.pool, notification).await?)
    }
}

#[async_trait]
impl ProjectDirectory for PgStore {
    async fn find_approaching_deadlines(
        &self,
        horizon_days: i64,
    ) -> Result<Vec<DeadlineProject>, StoreError> {
        Ok(ProjectRepo::find_approaching_deadlines(&self.pool, horizon_days).await?)
    }
}

/// Map a preference row to the domain record.
///
/// Unknown category keys and non-boolean values in the JSONB map are ignored;
/// the gate treats missing entries as enabled.
fn preference_from_row(row: &NotificationPreference) -> Preference {
    let mut categories: HashMap<Category, bool> = HashMap::new();
    if let Value::Object(map) = &row.categories {
        for (key, value) in map {
            let Ok(category) = serde_json::from_value::<Category>(Value::String(key.clone()))
            else {
                continue;
            };
            let Some(enabled) = value.as_bool() else {
                continue;
            };
            categories.insert(category, enabled);
        }
    }

    Preference {
        email_enabled: row.email_enabled,
        push_enabled: row.push_enabled,
        categories,
        frequency: Frequency::parse(&row.frequency),
        quiet_hours: QuietHours {
            enabled: row.quiet_enabled,
            start: row.quiet_start.clone(),
            end: row.quiet_end.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
