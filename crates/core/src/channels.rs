//! Well-known delivery channel name constants.
//!
//! These appear in log fields and gate decisions; in-app is the only channel
//! persisted to the `notifications` table.

/// In-app notification stored for the notification bell UI.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Email notification delivered via the configured transport.
pub const CHANNEL_EMAIL: &str = "email";
