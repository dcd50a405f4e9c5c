//! Approaching-deadline scanner.
//!
//! Queries the project directory for non-completed projects due within the
//! horizon and feeds a synthesized [`TriggerEvent::DeadlineApproaching`] per
//! project into the dispatcher. The scanner itself performs no run-to-run
//! de-duplication; cadence is owned by whatever schedules it (cron, systemd
//! timer, or the `--watch` loop of the scanner binary).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shopfloor_core::deadline::{days_remaining, DEADLINE_HORIZON_DAYS};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::event::TriggerEvent;
use crate::store::ProjectDirectory;

/// Default interval between watch-mode scans.
const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(3600);

/// Scanner tuning knobs.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Projects due within this many days are flagged.
    pub horizon_days: i64,
    /// Interval between scans in watch mode.
    pub interval: Duration,
}

impl ScannerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `DEADLINE_HORIZON_DAYS`| `3`     |
    /// | `SCAN_INTERVAL_SECS`   | `3600`  |
    pub fn from_env() -> Self {
        let horizon_days: i64 = std::env::var("DEADLINE_HORIZON_DAYS")
            .unwrap_or_else(|_| DEADLINE_HORIZON_DAYS.to_string())
            .parse()
            .expect("DEADLINE_HORIZON_DAYS must be a valid i64");

        let interval_secs: u64 = std::env::var("SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SCAN_INTERVAL.as_secs().to_string())
            .parse()
            .expect("SCAN_INTERVAL_SECS must be a valid u64");

        Self {
            horizon_days,
            interval: Duration::from_secs(interval_secs),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEADLINE_HORIZON_DAYS,
            interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

/// Aggregate outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Projects inside the horizon.
    pub projects_flagged: usize,
    /// Deadline events successfully handed to the dispatcher.
    pub events_dispatched: usize,
}

/// Periodic job that turns approaching deadlines into notifications.
pub struct DeadlineScanner {
    projects: Arc<dyn ProjectDirectory>,
    dispatcher: Arc<Dispatcher>,
    config: ScannerConfig,
}

impl DeadlineScanner {
    pub fn new(
        projects: Arc<dyn ProjectDirectory>,
        dispatcher: Arc<Dispatcher>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            projects,
            dispatcher,
            config,
        }
    }

    /// Run a single scan.
    ///
    /// A dispatch failure for one project is logged and does not stop the
    /// remaining projects from being processed; only the directory query
    /// itself can fail the scan.
    pub async fn scan_once(&self) -> Result<ScanSummary, DispatchError> {
        let now = Utc::now();
        let due = self
            .projects
            .find_approaching_deadlines(self.config.horizon_days)
            .await?;

        let mut summary = ScanSummary {
            projects_flagged: due.len(),
            events_dispatched: 0,
        };

        for project in &due {
            let event = TriggerEvent::DeadlineApproaching {
                project_id: project.id,
                project_name: project.name.clone(),
                days_remaining: days_remaining(now, project.deadline),
                current_progress: project.progress,
            };

            match self.dispatcher.dispatch(&event).await {
                Ok(result) => {
                    summary.events_dispatched += 1;
                    tracing::debug!(
                        project_id = project.id,
                        recipients = result.recipients_considered,
                        "Deadline notification dispatched"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        project_id = project.id,
                        error = %e,
                        "Failed to dispatch deadline notification"
                    );
                }
            }
        }

        if summary.projects_flagged > 0 {
            tracing::info!(
                flagged = summary.projects_flagged,
                dispatched = summary.events_dispatched,
                "Deadline scan complete"
            );
        }

        Ok(summary)
    }

    /// Run the watch-mode loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            horizon_days = self.config.horizon_days,
            "Deadline scanner started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Deadline scanner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.scan_once().await {
                        tracing::error!(error = %e, "Deadline scan failed");
                    }
                }
            }
        }
    }
}
