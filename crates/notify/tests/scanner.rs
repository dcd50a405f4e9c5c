//! Deadline scanner tests against in-memory fakes.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{
    dispatcher, user, FakeDirectory, FakePrefs, FakeProjects, RecordingNotifications,
    RecordingTransport,
};
use shopfloor_db::models::project::DeadlineProject;
use shopfloor_notify::scanner::{DeadlineScanner, ScannerConfig};

fn due_project(id: i64, name: &str, hours_out: i64, progress: i32) -> DeadlineProject {
    DeadlineProject {
        id,
        name: name.to_string(),
        deadline: Utc::now() + Duration::hours(hours_out),
        progress,
        status: "active".to_string(),
    }
}

fn scan_setup(
    due: Vec<DeadlineProject>,
) -> (DeadlineScanner, Arc<RecordingNotifications>, Arc<RecordingTransport>) {
    let notifications = Arc::new(RecordingNotifications::default());
    let transport = Arc::new(RecordingTransport::default());
    let d = Arc::new(dispatcher(
        FakeDirectory {
            users: vec![
                user(1, "admin", "lead-1@plant.example"),
                user(2, "assembler", "a2@plant.example"),
            ],
        },
        FakePrefs::default(),
        notifications.clone(),
        transport.clone(),
    ));
    let scanner = DeadlineScanner::new(
        Arc::new(FakeProjects { due }),
        d,
        ScannerConfig::default(),
    );
    (scanner, notifications, transport)
}

#[tokio::test]
async fn scan_dispatches_one_event_per_due_project() {
    let (scanner, notifications, _) = scan_setup(vec![
        due_project(10, "Widget", 47, 65),
        due_project(11, "Gearbox", 20, 90),
    ]);

    let summary = scanner.scan_once().await.unwrap();

    assert_eq!(summary.projects_flagged, 2);
    assert_eq!(summary.events_dispatched, 2);

    // Two projects, two recipients each.
    let records = notifications.records();
    assert_eq!(records.len(), 4);

    let widget_message = &records
        .iter()
        .find(|r| r.entity_id == Some(10))
        .unwrap()
        .message;
    assert!(widget_message.contains("due in 2 days"));

    let gearbox_message = &records
        .iter()
        .find(|r| r.entity_id == Some(11))
        .unwrap()
        .message;
    assert!(gearbox_message.contains("due in 1 days"));
}

#[tokio::test]
async fn scan_with_nothing_due_is_a_no_op() {
    let (scanner, notifications, transport) = scan_setup(Vec::new());

    let summary = scanner.scan_once().await.unwrap();

    assert_eq!(summary.projects_flagged, 0);
    assert_eq!(summary.events_dispatched, 0);
    assert!(notifications.records().is_empty());
    assert!(transport.emails().is_empty());
}

#[tokio::test]
async fn past_due_projects_clamp_to_zero_days() {
    let (scanner, notifications, _) = scan_setup(vec![due_project(12, "Axle", -6, 80)]);

    scanner.scan_once().await.unwrap();

    let records = notifications.records();
    assert!(!records.is_empty());
    assert!(records[0].message.contains("due in 0 days"));
}
