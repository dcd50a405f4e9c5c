//! Shopfloor notification dispatch engine.
//!
//! Turns business events (project created, project assigned, work session
//! completed, deadline approaching, announcement posted) into per-user-gated,
//! multi-channel notifications: a persisted in-app record plus a templated
//! email. The building blocks:
//!
//! - [`TriggerEvent`] — the closed set of business events.
//! - [`TemplateRegistry`] — immutable type-to-template mapping.
//! - [`audience`] — resolves an event to its ordered recipient set.
//! - [`gate`] — per-user email preference gate (fail open).
//! - [`delivery`] — the in-app and email sinks; email transports are
//!   pluggable (console, SMTP, HTTP relay).
//! - [`Dispatcher`] — bounded concurrent fan-out with count aggregation;
//!   channel failures never propagate to the triggering business operation.
//! - [`DeadlineScanner`] — periodic scan feeding synthetic deadline events.
//! - [`Notifier`] — fire-and-forget trigger entry points for the CRUD layer.

pub mod audience;
pub mod delivery;
pub mod dispatcher;
pub mod event;
pub mod gate;
pub mod scanner;
pub mod store;
pub mod template;
pub mod triggers;

pub use dispatcher::{DispatchConfig, DispatchError, DispatchResult, Dispatcher};
pub use event::{AnnouncementAudience, NotificationType, TriggerEvent};
pub use scanner::{DeadlineScanner, ScanSummary, ScannerConfig};
pub use template::TemplateRegistry;
pub use triggers::Notifier;
