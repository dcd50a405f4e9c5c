//! End-to-end dispatch tests against in-memory fakes.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{dispatcher, user, FakeDirectory, FakePrefs, RecordingNotifications, RecordingTransport};
use shopfloor_core::preference::Preference;
use shopfloor_notify::event::{AnnouncementAudience, TriggerEvent};
use shopfloor_notify::triggers::Notifier;

fn plant_directory() -> FakeDirectory {
    FakeDirectory {
        users: vec![
            user(1, "admin", "lead-1@plant.example"),
            user(2, "assembler", "a2@plant.example"),
            user(3, "assembler", "a3@plant.example"),
            user(4, "assembler", "a4@plant.example"),
        ],
    }
}

fn project_created() -> TriggerEvent {
    TriggerEvent::ProjectCreated {
        project_id: 10,
        project_name: "Widget".to_string(),
        actor_id: 1,
    }
}

#[tokio::test]
async fn project_created_counts_reflect_email_preferences() {
    // Three assemblers, one of whom has disabled email entirely.
    let mut prefs = FakePrefs::default();
    let mut disabled = Preference::default_enabled();
    disabled.email_enabled = false;
    prefs.prefs.insert(4, disabled);

    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(plant_directory(), prefs, notifications.clone(), transport.clone());

    let result = d.dispatch(&project_created()).await.unwrap();

    assert_eq!(result.recipients_considered, 3);
    assert_eq!(result.in_app_delivered, 3);
    assert_eq!(result.email_delivered, 2);

    // The email-disabled user still got the in-app record but no email.
    let record_users: HashSet<_> = notifications.records().iter().map(|n| n.user_id).collect();
    assert_eq!(record_users, HashSet::from([2, 3, 4]));

    let email_targets: HashSet<_> = transport
        .emails()
        .iter()
        .map(|e| e.to_address.clone())
        .collect();
    assert!(!email_targets.contains("a4@plant.example"));
    assert_eq!(email_targets.len(), 2);
}

#[tokio::test]
async fn in_app_records_carry_rendered_content() {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications.clone(),
        transport,
    );

    d.dispatch(&project_created()).await.unwrap();

    let records = notifications.records();
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.title, "New project available");
        assert_eq!(record.message, "Project \"Widget\" is ready for assembly.");
        assert_eq!(record.category, "project");
        assert_eq!(record.notification_type, "project_created");
        assert_eq!(record.action_url.as_deref(), Some("/projects/10"));
        assert_eq!(record.entity_id, Some(10));
    }
}

#[tokio::test]
async fn missing_preference_records_fail_open() {
    // No preference rows at all: every assembler gets email.
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications,
        transport.clone(),
    );

    let result = d.dispatch(&project_created()).await.unwrap();
    assert_eq!(result.email_delivered, 3);
    assert_eq!(transport.emails().len(), 3);
}

#[tokio::test]
async fn preference_read_failures_fail_open() {
    let prefs = FakePrefs {
        fail: true,
        ..Default::default()
    };
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(plant_directory(), prefs, notifications, transport.clone());

    let result = d.dispatch(&project_created()).await.unwrap();
    assert_eq!(result.email_delivered, 3);
}

#[tokio::test]
async fn email_failure_for_one_recipient_is_isolated() {
    let mut transport = RecordingTransport::default();
    transport.fail_for.insert("a2@plant.example".to_string());
    let transport = Arc::new(transport);
    let notifications = Arc::new(RecordingNotifications::default());

    let d = dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications.clone(),
        transport.clone(),
    );

    let result = d.dispatch(&project_created()).await.unwrap();

    // Dispatch itself succeeds; the failing recipient only affects counts.
    assert_eq!(result.recipients_considered, 3);
    assert_eq!(result.in_app_delivered, 3);
    assert_eq!(result.email_delivered, 2);
    assert!(result.in_app_delivered <= result.recipients_considered);
    assert!(result.email_delivered <= result.recipients_considered);
}

#[tokio::test]
async fn in_app_failure_does_not_abort_sibling_deliveries() {
    let mut notifications = RecordingNotifications::default();
    notifications.fail_for.insert(2);
    let notifications = Arc::new(notifications);
    let transport = Arc::new(RecordingTransport::default());

    let d = dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications.clone(),
        transport.clone(),
    );

    let result = d.dispatch(&project_created()).await.unwrap();

    assert_eq!(result.in_app_delivered, 2);
    // The failing user's email is independent of their in-app write.
    assert_eq!(result.email_delivered, 3);
    assert_eq!(transport.emails().len(), 3);
}

#[tokio::test]
async fn deadline_event_uses_role_specific_action_wording() {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(
        FakeDirectory {
            users: vec![
                user(1, "admin", "lead-1@plant.example"),
                user(2, "assembler", "a2@plant.example"),
                user(3, "assembler", "a3@plant.example"),
            ],
        },
        FakePrefs::default(),
        notifications.clone(),
        transport.clone(),
    );

    let result = d
        .dispatch(&TriggerEvent::DeadlineApproaching {
            project_id: 10,
            project_name: "Widget".to_string(),
            days_remaining: 2,
            current_progress: 65,
        })
        .await
        .unwrap();

    assert_eq!(result.recipients_considered, 3);

    for email in transport.emails() {
        if email.to_address == "lead-1@plant.example" {
            assert!(email.text.contains("Manage Project"));
        } else {
            assert!(email.text.contains("View Project"));
        }
        assert!(email.text.contains("due in 2 days"));
    }

    for record in notifications.records() {
        assert_eq!(record.category, "reminder");
        let expected = if record.user_id == 1 {
            "Manage Project"
        } else {
            "View Project"
        };
        assert_eq!(record.action_label.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn announcement_excludes_the_author() {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications.clone(),
        transport,
    );

    let result = d
        .dispatch(&TriggerEvent::AnnouncementCreated {
            announcement_id: 77,
            title: "Maintenance window".to_string(),
            content: "Line 2 down Saturday 06:00-10:00.".to_string(),
            actor_id: 1,
            audience: AnnouncementAudience::All,
        })
        .await
        .unwrap();

    assert_eq!(result.recipients_considered, 3);
    let record_users: HashSet<_> = notifications.records().iter().map(|n| n.user_id).collect();
    assert!(!record_users.contains(&1));

    for record in notifications.records() {
        assert_eq!(record.title, "Maintenance window");
        assert_eq!(record.category, "system");
    }
}

#[tokio::test]
async fn empty_audience_yields_zero_counts() {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(
        FakeDirectory { users: Vec::new() },
        FakePrefs::default(),
        notifications.clone(),
        transport.clone(),
    );

    let result = d.dispatch(&project_created()).await.unwrap();

    assert_eq!(result.recipients_considered, 0);
    assert_eq!(result.in_app_delivered, 0);
    assert_eq!(result.email_delivered, 0);
    assert!(notifications.records().is_empty());
    assert!(transport.emails().is_empty());
}

#[tokio::test]
async fn notifier_schedules_and_drains_background_dispatch() {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = Arc::new(dispatcher(
        plant_directory(),
        FakePrefs::default(),
        notifications.clone(),
        transport,
    ));

    let notifier = Notifier::new(d);
    notifier.project_created(10, "Widget", 1);
    notifier.close().await;

    assert_eq!(notifications.records().len(), 3);
}
