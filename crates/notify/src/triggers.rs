//! Typed trigger entry points for the CRUD layer.
//!
//! Each method builds the matching [`TriggerEvent`] and schedules a detached
//! dispatch task: the contract is "schedules dispatch, returns immediately",
//! never "guarantees delivery before returning". A business operation must
//! not fail or slow down because notification dispatch did. Tasks are
//! tracked so a shutdown can drain in-flight dispatches instead of leaking
//! them.

use std::sync::Arc;

use shopfloor_core::types::DbId;
use tokio_util::task::TaskTracker;

use crate::dispatcher::Dispatcher;
use crate::event::{AnnouncementAudience, TriggerEvent};

/// Fire-and-forget facade over the [`Dispatcher`].
#[derive(Clone)]
pub struct Notifier {
    dispatcher: Arc<Dispatcher>,
    tracker: TaskTracker,
}

impl Notifier {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            tracker: TaskTracker::new(),
        }
    }

    /// A project was created; notify every assembler.
    pub fn project_created(&self, project_id: DbId, project_name: &str, actor_id: DbId) {
        self.spawn(TriggerEvent::ProjectCreated {
            project_id,
            project_name: project_name.to_string(),
            actor_id,
        });
    }

    /// A project was assigned; notify the named assembler.
    pub fn project_assigned(
        &self,
        project_id: DbId,
        project_name: &str,
        assembler_id: DbId,
        assembler_name: &str,
        actor_id: DbId,
    ) {
        self.spawn(TriggerEvent::ProjectAssigned {
            project_id,
            project_name: project_name.to_string(),
            assembler_id,
            assembler_name: assembler_name.to_string(),
            actor_id,
        });
    }

    /// A work session was completed; notify the project lead.
    #[allow(clippy::too_many_arguments)]
    pub fn work_session_completed(
        &self,
        project_id: DbId,
        project_name: &str,
        project_lead_id: DbId,
        assembler_name: &str,
        duration_minutes: i64,
        progress: i32,
        notes: Option<String>,
    ) {
        self.spawn(TriggerEvent::WorkSessionCompleted {
            project_id,
            project_name: project_name.to_string(),
            project_lead_id,
            assembler_name: assembler_name.to_string(),
            duration_minutes,
            progress,
            notes,
        });
    }

    /// A deadline is approaching; notify assemblers and project leads.
    ///
    /// Normally synthesized by the [`DeadlineScanner`](crate::DeadlineScanner)
    /// rather than called from request paths.
    pub fn deadline_approaching(
        &self,
        project_id: DbId,
        project_name: &str,
        days_remaining: i64,
        current_progress: i32,
    ) {
        self.spawn(TriggerEvent::DeadlineApproaching {
            project_id,
            project_name: project_name.to_string(),
            days_remaining,
            current_progress,
        });
    }

    /// An announcement was posted; notify its audience, minus the author.
    pub fn announcement_created(
        &self,
        announcement_id: DbId,
        title: &str,
        content: &str,
        actor_id: DbId,
        audience: AnnouncementAudience,
    ) {
        self.spawn(TriggerEvent::AnnouncementCreated {
            announcement_id,
            title: title.to_string(),
            content: content.to_string(),
            actor_id,
            audience,
        });
    }

    fn spawn(&self, event: TriggerEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.tracker.spawn(async move {
            if let Err(e) = dispatcher.dispatch(&event).await {
                tracing::error!(
                    notification_type = %event.notification_type(),
                    error = %e,
                    "Background dispatch failed"
                );
            }
        });
    }

    /// Drain in-flight dispatch tasks. Called once during shutdown; new
    /// triggers after this are dropped by the tracker.
    pub async fn close(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
