//! Project summary model consumed by the deadline scanner.
//!
//! Projects are owned by the external CRUD layer; the scanner only reads the
//! columns needed to synthesize deadline events.

use serde::Serialize;
use shopfloor_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A project with an approaching deadline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeadlineProject {
    pub id: DbId,
    pub name: String,
    pub deadline: Timestamp,
    /// Completion percentage, 0-100.
    pub progress: i32,
    pub status: String,
}
