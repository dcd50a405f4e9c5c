//! The orchestration core: event in, delivery counts out.
//!
//! [`Dispatcher::dispatch`] resolves the audience, gates email per recipient,
//! renders both channels, fans delivery out concurrently with a bounded
//! in-flight cap, and aggregates boolean outcomes into a [`DispatchResult`].
//! Channel failures never propagate to the caller; only programmer/config
//! errors (unknown template) and audience-resolution infrastructure failures
//! surface as [`DispatchError`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::stream::StreamExt;
use serde::Serialize;
use shopfloor_core::preference::EmailGate;
use shopfloor_core::render::render;

use crate::audience::{self, Recipient};
use crate::delivery::email::EmailSink;
use crate::delivery::in_app::InAppSink;
use crate::event::{NotificationType, TriggerEvent};
use crate::gate;
use crate::store::{PreferenceStore, StoreError, UserDirectory};
use crate::template::{EmailTemplate, InAppTemplate, TemplateRegistry};

/// Default bound on concurrently in-flight recipient deliveries.
const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Default timeout for a single channel call.
const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Dispatcher tuning knobs.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum recipients being delivered to at once. Audiences are
    /// organization-sized, so tens of concurrent sends is plenty.
    pub max_in_flight: usize,
    /// Per channel call timeout; a stuck SMTP handshake must not stall the
    /// whole dispatch.
    pub channel_timeout: Duration,
}

impl DispatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `DISPATCH_MAX_IN_FLIGHT`        | `16`    |
    /// | `DISPATCH_CHANNEL_TIMEOUT_SECS` | `10`    |
    pub fn from_env() -> Self {
        let max_in_flight: usize = std::env::var("DISPATCH_MAX_IN_FLIGHT")
            .unwrap_or_else(|_| DEFAULT_MAX_IN_FLIGHT.to_string())
            .parse()
            .expect("DISPATCH_MAX_IN_FLIGHT must be a valid usize");

        let timeout_secs: u64 = std::env::var("DISPATCH_CHANNEL_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_CHANNEL_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("DISPATCH_CHANNEL_TIMEOUT_SECS must be a valid u64");

        Self {
            max_in_flight: max_in_flight.max(1),
            channel_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            channel_timeout: DEFAULT_CHANNEL_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Result / error
// ---------------------------------------------------------------------------

/// Aggregate outcome of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub recipients_considered: usize,
    pub in_app_delivered: usize,
    pub email_delivered: usize,
}

/// Error type for dispatch-level failures.
///
/// Per-recipient channel failures are not errors; they are absorbed into the
/// counts. These variants cover deploy-time defects and the inability to
/// resolve the audience at all.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no template registered for notification type {0}")]
    UnknownTemplate(NotificationType),

    #[error("audience resolution failed: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Turns one [`TriggerEvent`] into gated, multi-channel deliveries.
pub struct Dispatcher {
    users: Arc<dyn UserDirectory>,
    prefs: Arc<dyn PreferenceStore>,
    registry: TemplateRegistry,
    in_app: InAppSink,
    email: EmailSink,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        prefs: Arc<dyn PreferenceStore>,
        registry: TemplateRegistry,
        in_app: InAppSink,
        email: EmailSink,
        config: DispatchConfig,
    ) -> Self {
        Self {
            users,
            prefs,
            registry,
            in_app,
            email,
            config,
        }
    }

    /// Dispatch one event to its full audience.
    ///
    /// Completes only after every fanned-out channel call has finished or
    /// timed out. Never returns an error for per-recipient failures.
    pub async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchResult, DispatchError> {
        let kind = event.notification_type();
        let in_app_template = self.registry.in_app(kind)?;
        let email_template = self.registry.email(kind)?;

        let recipients = audience::resolve(self.users.as_ref(), event).await?;
        if recipients.is_empty() {
            tracing::debug!(notification_type = %kind, "Empty audience, nothing to dispatch");
            return Ok(DispatchResult::default());
        }

        let deliveries: Vec<_> = recipients
            .iter()
            .map(|r| self.deliver_to(event, in_app_template, email_template, r))
            .collect();
        let outcomes: Vec<(bool, bool)> = futures::stream::iter(deliveries)
            .buffer_unordered(self.config.max_in_flight)
            .collect()
            .await;

        let result = DispatchResult {
            recipients_considered: recipients.len(),
            in_app_delivered: outcomes.iter().filter(|(in_app, _)| *in_app).count(),
            email_delivered: outcomes.iter().filter(|(_, email)| *email).count(),
        };

        tracing::info!(
            notification_type = %kind,
            priority = in_app_template.priority.as_str(),
            recipients = result.recipients_considered,
            in_app = result.in_app_delivered,
            email = result.email_delivered,
            "Dispatch complete"
        );

        Ok(result)
    }

    /// Deliver both channels to a single recipient.
    ///
    /// The in-app and email attempts run concurrently and independently: a
    /// failure or timeout on one never rolls back or blocks the other.
    async fn deliver_to(
        &self,
        event: &TriggerEvent,
        in_app_template: &InAppTemplate,
        email_template: &EmailTemplate,
        recipient: &Recipient,
    ) -> (bool, bool) {
        let vars = event.variables_for(recipient);

        let in_app_attempt = async {
            let record = InAppSink::build(event, in_app_template, recipient, &vars);
            match tokio::time::timeout(self.config.channel_timeout, self.in_app.deliver(&record))
                .await
            {
                Ok(outcome) => outcome.is_delivered(),
                Err(_) => {
                    tracing::warn!(
                        user_id = recipient.user.id,
                        "In-app delivery timed out"
                    );
                    false
                }
            }
        };

        let email_attempt = async {
            let now = Local::now().time();
            let decision = gate::evaluate(
                self.prefs.as_ref(),
                recipient.user.id,
                in_app_template.category,
                now,
            )
            .await;
            if decision != EmailGate::Allow {
                return false;
            }

            let subject = render(email_template.subject_pattern, &vars);
            let html = render(email_template.html_pattern, &vars);
            let text = render(email_template.text_pattern, &vars);

            match tokio::time::timeout(
                self.config.channel_timeout,
                self.email.deliver(recipient, subject, html, text),
            )
            .await
            {
                Ok(outcome) => outcome.is_delivered(),
                Err(_) => {
                    tracing::warn!(user_id = recipient.user.id, "Email delivery timed out");
                    false
                }
            }
        };

        tokio::join!(in_app_attempt, email_attempt)
    }
}
