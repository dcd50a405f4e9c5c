//! Repository for the `users` table.
//!
//! Read-only: users are owned by the external auth/user-directory
//! collaborator.

use shopfloor_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, email, display_name, role, is_active, created_at, updated_at";

/// Provides read operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all active users with the given role, ordered by ID for a
    /// deterministic audience order.
    pub async fn find_by_role(pool: &PgPool, role: &str) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE role = $1 AND is_active = true \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }
}
