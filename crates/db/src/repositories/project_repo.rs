//! Repository for the `projects` table.
//!
//! Read-only: projects are owned by the external CRUD layer. The scanner
//! only needs the rows whose deadline falls inside the horizon.

use sqlx::PgPool;

use crate::models::project::DeadlineProject;

/// Column list for deadline scan queries.
const COLUMNS: &str = "id, name, deadline, progress, status";

/// Provides read operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List non-completed projects whose deadline is within `horizon_days`
    /// from now, soonest first.
    ///
    /// Past-due projects still inside the table are included; the caller
    /// clamps their remaining days to zero.
    pub async fn find_approaching_deadlines(
        pool: &PgPool,
        horizon_days: i64,
    ) -> Result<Vec<DeadlineProject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE status <> 'completed' \
               AND deadline IS NOT NULL \
               AND deadline <= NOW() + make_interval(days => $1::int) \
             ORDER BY deadline"
        );
        sqlx::query_as::<_, DeadlineProject>(&query)
            .bind(horizon_days)
            .fetch_all(pool)
            .await
    }
}
