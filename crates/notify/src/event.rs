//! Business trigger events and their template variable maps.
//!
//! [`TriggerEvent`] is a closed variant set: one case per business event the
//! CRUD layer can commit, each carrying exactly the data needed to resolve
//! its audience and render its templates.

use shopfloor_core::render::VarMap;
use shopfloor_core::types::DbId;

use crate::audience::Recipient;

/// Notification type names, used as template registry keys and stored in
/// `notifications.notification_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    ProjectCreated,
    ProjectAssigned,
    WorkSessionCompleted,
    DeadlineApproaching,
    AnnouncementCreated,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ProjectCreated => "project_created",
            NotificationType::ProjectAssigned => "project_assigned",
            NotificationType::WorkSessionCompleted => "work_session_completed",
            NotificationType::DeadlineApproaching => "deadline_approaching",
            NotificationType::AnnouncementCreated => "announcement_created",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who an announcement is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementAudience {
    All,
    Assemblers,
    Leads,
}

/// A completed business action that may warrant notification.
#[derive(Debug, Clone)]
pub enum TriggerEvent {
    ProjectCreated {
        project_id: DbId,
        project_name: String,
        actor_id: DbId,
    },
    ProjectAssigned {
        project_id: DbId,
        project_name: String,
        assembler_id: DbId,
        assembler_name: String,
        actor_id: DbId,
    },
    WorkSessionCompleted {
        project_id: DbId,
        project_name: String,
        project_lead_id: DbId,
        assembler_name: String,
        duration_minutes: i64,
        progress: i32,
        notes: Option<String>,
    },
    DeadlineApproaching {
        project_id: DbId,
        project_name: String,
        days_remaining: i64,
        current_progress: i32,
    },
    AnnouncementCreated {
        announcement_id: DbId,
        title: String,
        content: String,
        actor_id: DbId,
        audience: AnnouncementAudience,
    },
}

impl TriggerEvent {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            TriggerEvent::ProjectCreated { .. } => NotificationType::ProjectCreated,
            TriggerEvent::ProjectAssigned { .. } => NotificationType::ProjectAssigned,
            TriggerEvent::WorkSessionCompleted { .. } => NotificationType::WorkSessionCompleted,
            TriggerEvent::DeadlineApproaching { .. } => NotificationType::DeadlineApproaching,
            TriggerEvent::AnnouncementCreated { .. } => NotificationType::AnnouncementCreated,
        }
    }

    /// The business entity the resulting notifications point back at.
    pub fn entity_id(&self) -> Option<DbId> {
        match self {
            TriggerEvent::ProjectCreated { project_id, .. }
            | TriggerEvent::ProjectAssigned { project_id, .. }
            | TriggerEvent::WorkSessionCompleted { project_id, .. }
            | TriggerEvent::DeadlineApproaching { project_id, .. } => Some(*project_id),
            TriggerEvent::AnnouncementCreated {
                announcement_id, ..
            } => Some(*announcement_id),
        }
    }

    /// Template variables for one recipient.
    ///
    /// Most variables come from the event payload; `{actionUrl}` points at
    /// the referenced entity, and for deadline events `{actionLabel}` depends
    /// on whether the recipient is an assembler ("View Project") or a project
    /// lead ("Manage Project").
    pub fn variables_for(&self, recipient: &Recipient) -> VarMap {
        let mut vars = VarMap::new();
        match self {
            TriggerEvent::ProjectCreated {
                project_id,
                project_name,
                ..
            } => {
                vars.insert("projectId".into(), project_id.to_string());
                vars.insert("projectName".into(), project_name.clone());
                vars.insert("actionUrl".into(), format!("/projects/{project_id}"));
            }
            TriggerEvent::ProjectAssigned {
                project_id,
                project_name,
                assembler_name,
                ..
            } => {
                vars.insert("projectId".into(), project_id.to_string());
                vars.insert("projectName".into(), project_name.clone());
                vars.insert("assemblerName".into(), assembler_name.clone());
                vars.insert("actionUrl".into(), format!("/projects/{project_id}"));
            }
            TriggerEvent::WorkSessionCompleted {
                project_id,
                project_name,
                assembler_name,
                duration_minutes,
                progress,
                notes,
                ..
            } => {
                vars.insert("projectId".into(), project_id.to_string());
                vars.insert("projectName".into(), project_name.clone());
                vars.insert("assemblerName".into(), assembler_name.clone());
                vars.insert("duration".into(), format_duration(*duration_minutes));
                vars.insert("progress".into(), progress.to_string());
                vars.insert("notes".into(), notes.clone().unwrap_or_default());
                vars.insert("actionUrl".into(), format!("/projects/{project_id}"));
            }
            TriggerEvent::DeadlineApproaching {
                project_id,
                project_name,
                days_remaining,
                current_progress,
            } => {
                vars.insert("projectId".into(), project_id.to_string());
                vars.insert("projectName".into(), project_name.clone());
                vars.insert("days".into(), days_remaining.to_string());
                vars.insert("progress".into(), current_progress.to_string());
                vars.insert("actionUrl".into(), format!("/projects/{project_id}"));
                let label = if recipient.is_assembler {
                    "View Project"
                } else {
                    "Manage Project"
                };
                vars.insert("actionLabel".into(), label.to_string());
            }
            TriggerEvent::AnnouncementCreated {
                announcement_id,
                title,
                content,
                ..
            } => {
                vars.insert("announcementTitle".into(), title.clone());
                vars.insert("announcementContent".into(), content.clone());
                vars.insert(
                    "actionUrl".into(),
                    format!("/announcements/{announcement_id}"),
                );
            }
        }
        vars
    }
}

/// Format a minute count as `"2h 15m"` / `"45m"`.
fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
