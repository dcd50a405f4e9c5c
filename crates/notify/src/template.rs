//! Static notification templates, keyed by notification type.
//!
//! The registry is an immutable configuration object built once at process
//! start and injected into the dispatcher; nothing here is a global. Every
//! type carries an in-app template and, independently, an email template.
//! Patterns use the `{token}` placeholders resolved by
//! [`shopfloor_core::render`].

use std::collections::HashMap;

use shopfloor_core::Category;

use crate::dispatcher::DispatchError;
use crate::event::NotificationType;

/// Relative urgency of an in-app notification, used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

/// Content pattern for the persisted in-app record.
#[derive(Debug, Clone)]
pub struct InAppTemplate {
    pub title_pattern: &'static str,
    pub message_pattern: &'static str,
    pub category: Category,
    pub priority: Priority,
    pub action_url_pattern: Option<&'static str>,
    pub action_label_pattern: Option<&'static str>,
}

/// Content pattern for the email channel.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub subject_pattern: &'static str,
    pub html_pattern: &'static str,
    pub text_pattern: &'static str,
}

/// Immutable mapping from notification type to its templates.
pub struct TemplateRegistry {
    templates: HashMap<NotificationType, (InAppTemplate, EmailTemplate)>,
}

impl TemplateRegistry {
    /// The built-in template set covering every notification type.
    pub fn new() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            NotificationType::ProjectCreated,
            (
                InAppTemplate {
                    title_pattern: "New project available",
                    message_pattern: "Project \"{projectName}\" is ready for assembly.",
                    category: Category::Project,
                    priority: Priority::Normal,
                    action_url_pattern: Some("{actionUrl}"),
                    action_label_pattern: Some("View Project"),
                },
                EmailTemplate {
                    subject_pattern: "New project: {projectName}",
                    html_pattern: "<p>A new project, <strong>{projectName}</strong>, has been \
                         posted and is ready for assembly.</p>\
                         <p><a href=\"{actionUrl}\">View Project</a></p>",
                    text_pattern: "A new project, \"{projectName}\", has been posted and is \
                         ready for assembly.\n\nView Project: {actionUrl}",
                },
            ),
        );

        templates.insert(
            NotificationType::ProjectAssigned,
            (
                InAppTemplate {
                    title_pattern: "Project assigned to you",
                    message_pattern: "You have been assigned to \"{projectName}\".",
                    category: Category::Project,
                    priority: Priority::High,
                    action_url_pattern: Some("{actionUrl}"),
                    action_label_pattern: Some("View Project"),
                },
                EmailTemplate {
                    subject_pattern: "You have been assigned to {projectName}",
                    html_pattern: "<p>Hi {assemblerName},</p>\
                         <p>You have been assigned to <strong>{projectName}</strong>.</p>\
                         <p><a href=\"{actionUrl}\">View Project</a></p>",
                    text_pattern: "Hi {assemblerName},\n\nYou have been assigned to \
                         \"{projectName}\".\n\nView Project: {actionUrl}",
                },
            ),
        );

        templates.insert(
            NotificationType::WorkSessionCompleted,
            (
                InAppTemplate {
                    title_pattern: "Work session completed",
                    message_pattern: "{assemblerName} logged {duration} on \"{projectName}\" \
                         ({progress}% complete).",
                    category: Category::Worker,
                    priority: Priority::Normal,
                    action_url_pattern: Some("{actionUrl}"),
                    action_label_pattern: Some("Review Session"),
                },
                EmailTemplate {
                    subject_pattern: "Work session on {projectName}",
                    html_pattern: "<p>{assemblerName} logged <strong>{duration}</strong> on \
                         <strong>{projectName}</strong>, now at {progress}%.</p>\
                         <p>{notes}</p>\
                         <p><a href=\"{actionUrl}\">Review Session</a></p>",
                    text_pattern: "{assemblerName} logged {duration} on \"{projectName}\", \
                         now at {progress}%.\n\n{notes}\n\nReview Session: {actionUrl}",
                },
            ),
        );

        templates.insert(
            NotificationType::DeadlineApproaching,
            (
                InAppTemplate {
                    title_pattern: "Deadline approaching",
                    message_pattern: "\"{projectName}\" is due in {days} days \
                         ({progress}% complete).",
                    category: Category::Reminder,
                    priority: Priority::High,
                    action_url_pattern: Some("{actionUrl}"),
                    action_label_pattern: Some("{actionLabel}"),
                },
                EmailTemplate {
                    subject_pattern: "Deadline approaching: {projectName}",
                    html_pattern: "<p><strong>{projectName}</strong> is due in {days} days \
                         and is {progress}% complete.</p>\
                         <p><a href=\"{actionUrl}\">{actionLabel}</a></p>",
                    text_pattern: "\"{projectName}\" is due in {days} days and is {progress}% \
                         complete.\n\n{actionLabel}: {actionUrl}",
                },
            ),
        );

        templates.insert(
            NotificationType::AnnouncementCreated,
            (
                InAppTemplate {
                    title_pattern: "{announcementTitle}",
                    message_pattern: "{announcementContent}",
                    category: Category::System,
                    priority: Priority::Normal,
                    action_url_pattern: Some("{actionUrl}"),
                    action_label_pattern: Some("Read Announcement"),
                },
                EmailTemplate {
                    subject_pattern: "Announcement: {announcementTitle}",
                    html_pattern: "<p><strong>{announcementTitle}</strong></p>\
                         <p>{announcementContent}</p>\
                         <p><a href=\"{actionUrl}\">Read Announcement</a></p>",
                    text_pattern: "{announcementTitle}\n\n{announcementContent}\n\n\
                         Read Announcement: {actionUrl}",
                },
            ),
        );

        Self { templates }
    }

    /// The in-app template for `kind`.
    ///
    /// A missing entry is a deploy-time defect, surfaced as
    /// [`DispatchError::UnknownTemplate`] on first use.
    pub fn in_app(&self, kind: NotificationType) -> Result<&InAppTemplate, DispatchError> {
        self.templates
            .get(&kind)
            .map(|(in_app, _)| in_app)
            .ok_or(DispatchError::UnknownTemplate(kind))
    }

    /// The email template for `kind`.
    pub fn email(&self, kind: NotificationType) -> Result<&EmailTemplate, DispatchError> {
        self.templates
            .get(&kind)
            .map(|(_, email)| email)
            .ok_or(DispatchError::UnknownTemplate(kind))
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use shopfloor_core::render::{render, VarMap};

    const ALL_TYPES: [NotificationType; 5] = [
        NotificationType::ProjectCreated,
        NotificationType::ProjectAssigned,
        NotificationType::WorkSessionCompleted,
        NotificationType::DeadlineApproaching,
        NotificationType::AnnouncementCreated,
    ];

    #[test]
    fn every_type_has_both_templates() {
        let registry = TemplateRegistry::new();
        for kind in ALL_TYPES {
            assert!(registry.in_app(kind).is_ok(), "missing in-app for {kind}");
            assert!(registry.email(kind).is_ok(), "missing email for {kind}");
        }
    }

    #[test]
    fn deadline_message_renders_days() {
        let registry = TemplateRegistry::new();
        let template = registry.in_app(NotificationType::DeadlineApproaching).unwrap();

        let mut vars = VarMap::new();
        vars.insert("projectName".into(), "Widget".into());
        vars.insert("days".into(), "2".into());
        vars.insert("progress".into(), "65".into());

        let message = render(template.message_pattern, &vars);
        assert_eq!(message, "\"Widget\" is due in 2 days (65% complete).");
    }

    #[test]
    fn missing_variable_stays_verbatim_in_rendered_output() {
        let registry = TemplateRegistry::new();
        let template = registry.in_app(NotificationType::DeadlineApproaching).unwrap();

        let mut vars = VarMap::new();
        vars.insert("projectName".into(), "Widget".into());
        vars.insert("progress".into(), "65".into());

        let message = render(template.message_pattern, &vars);
        assert_eq!(message, "\"Widget\" is due in {days} days (65% complete).");
    }

    #[test]
    fn categories_match_the_event_domain() {
        let registry = TemplateRegistry::new();
        assert_eq!(
            registry.in_app(NotificationType::ProjectCreated).unwrap().category,
            Category::Project
        );
        assert_eq!(
            registry
                .in_app(NotificationType::DeadlineApproaching)
                .unwrap()
                .category,
            Category::Reminder
        );
        assert_eq!(
            registry
                .in_app(NotificationType::AnnouncementCreated)
                .unwrap()
                .category,
            Category::System
        );
    }
}
