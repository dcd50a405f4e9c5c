//! Audience resolution: which users should receive a given event.
//!
//! Output is an ordered, de-duplicated recipient list. Actor exclusion
//! applies only to announcements; project broadcasts go to every assembler
//! regardless of who triggered them.

use shopfloor_core::roles::{ROLE_ADMIN, ROLE_ASSEMBLER};
use shopfloor_core::types::DbId;
use shopfloor_db::models::user::User;

use crate::event::{AnnouncementAudience, TriggerEvent};
use crate::store::{StoreError, UserDirectory};

/// One resolved notification target.
///
/// `is_assembler` drives per-recipient action wording for deadline events.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user: User,
    pub is_assembler: bool,
}

impl Recipient {
    fn new(user: User) -> Self {
        let is_assembler = user.role == ROLE_ASSEMBLER;
        Self { user, is_assembler }
    }
}

/// Resolve the recipients for `event`.
///
/// An empty result is not an error; the dispatcher returns zero counts.
/// A missing single target (assignment to a deleted user, say) resolves to
/// an empty audience with a warning rather than failing the dispatch.
pub async fn resolve(
    users: &dyn UserDirectory,
    event: &TriggerEvent,
) -> Result<Vec<Recipient>, StoreError> {
    let recipients = match event {
        TriggerEvent::ProjectCreated { .. } => {
            role_members(users, ROLE_ASSEMBLER).await?
        }
        TriggerEvent::ProjectAssigned { assembler_id, .. } => {
            single(users, *assembler_id).await?
        }
        TriggerEvent::WorkSessionCompleted {
            project_lead_id, ..
        } => single(users, *project_lead_id).await?,
        TriggerEvent::DeadlineApproaching { .. } => {
            let mut all = role_members(users, ROLE_ASSEMBLER).await?;
            all.extend(role_members(users, ROLE_ADMIN).await?);
            all
        }
        TriggerEvent::AnnouncementCreated {
            actor_id, audience, ..
        } => {
            let mut all = match audience {
                AnnouncementAudience::All => {
                    let mut set = role_members(users, ROLE_ASSEMBLER).await?;
                    set.extend(role_members(users, ROLE_ADMIN).await?);
                    set
                }
                AnnouncementAudience::Assemblers => role_members(users, ROLE_ASSEMBLER).await?,
                AnnouncementAudience::Leads => role_members(users, ROLE_ADMIN).await?,
            };
            all.retain(|r| r.user.id != *actor_id);
            all
        }
    };

    Ok(dedup_by_id(recipients))
}

async fn role_members(
    users: &dyn UserDirectory,
    role: &str,
) -> Result<Vec<Recipient>, StoreError> {
    Ok(users
        .find_by_role(role)
        .await?
        .into_iter()
        .map(Recipient::new)
        .collect())
}

async fn single(users: &dyn UserDirectory, id: DbId) -> Result<Vec<Recipient>, StoreError> {
    match users.find_by_id(id).await? {
        Some(user) => Ok(vec![Recipient::new(user)]),
        None => {
            tracing::warn!(user_id = id, "Notification target not found, skipping");
            Ok(Vec::new())
        }
    }
}

/// Drop later duplicates, preserving first-seen order.
fn dedup_by_id(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = std::collections::HashSet::with_capacity(recipients.len());
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.user.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

/// Construction helpers shared by this crate's unit tests.
#[cfg(test)]
pub mod test_support {
    use super::*;
    use chrono::Utc;

    pub fn user(id: DbId, role: &str) -> User {
        User {
            id,
            username: format!("user-{id}"),
            email: format!("user-{id}@plant.example"),
            display_name: format!("User {id}"),
            role: role.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn recipient(id: DbId, role: &str) -> Recipient {
        Recipient::new(user(id, role))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
