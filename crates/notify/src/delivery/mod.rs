//! Delivery channels: the in-app sink and the email sink.

pub mod email;
pub mod in_app;

/// Outcome of one channel attempt for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The channel accepted the notification.
    Delivered,
    /// The recipient was not deliverable on this channel (no address,
    /// preference gate). Not an error.
    Skipped,
    /// The channel attempt failed or timed out.
    Failed,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}
