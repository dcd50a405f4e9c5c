//! In-app delivery: persists a notification record for one user.

use std::sync::Arc;

use shopfloor_core::channels::CHANNEL_IN_APP;
use shopfloor_core::render::{render, VarMap};
use shopfloor_db::models::notification::NewNotification;

use crate::audience::Recipient;
use crate::delivery::DeliveryOutcome;
use crate::event::TriggerEvent;
use crate::store::NotificationStore;
use crate::template::InAppTemplate;

/// Persists in-app notification records.
///
/// Always attempted for every resolved recipient; in-app notifications
/// cannot be disabled. A failed write is logged and reported as
/// [`DeliveryOutcome::Failed`] without affecting sibling deliveries.
#[derive(Clone)]
pub struct InAppSink {
    store: Arc<dyn NotificationStore>,
}

impl InAppSink {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Render the record for one recipient from the event's template.
    pub fn build(
        event: &TriggerEvent,
        template: &InAppTemplate,
        recipient: &Recipient,
        vars: &VarMap,
    ) -> NewNotification {
        NewNotification {
            user_id: recipient.user.id,
            notification_type: event.notification_type().as_str().to_string(),
            title: render(template.title_pattern, vars),
            message: render(template.message_pattern, vars),
            category: template.category.as_str().to_string(),
            action_url: template.action_url_pattern.map(|p| render(p, vars)),
            action_label: template.action_label_pattern.map(|p| render(p, vars)),
            entity_id: event.entity_id(),
        }
    }

    /// Persist one record.
    pub async fn deliver(&self, notification: &NewNotification) -> DeliveryOutcome {
        match self.store.create(notification).await {
            Ok(id) => {
                tracing::debug!(
                    notification_id = id,
                    user_id = notification.user_id,
                    channel = CHANNEL_IN_APP,
                    notification_type = %notification.notification_type,
                    "In-app notification created"
                );
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::error!(
                    user_id = notification.user_id,
                    channel = CHANNEL_IN_APP,
                    notification_type = %notification.notification_type,
                    error = %e,
                    "Failed to create in-app notification"
                );
                DeliveryOutcome::Failed
            }
        }
    }
}
