//! User entity model.
//!
//! Users are owned by the external auth/user-directory collaborator; this
//! crate only reads them for audience resolution and email addressing.

use serde::Serialize;
use shopfloor_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    /// Role name, one of [`shopfloor_core::roles`].
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
