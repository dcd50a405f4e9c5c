//! In-memory fakes for the store and transport seams.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use shopfloor_core::preference::Preference;
use shopfloor_core::types::DbId;
use shopfloor_db::models::notification::NewNotification;
use shopfloor_db::models::project::DeadlineProject;
use shopfloor_db::models::user::User;
use shopfloor_notify::delivery::email::{EmailError, EmailSink, EmailTransport, OutboundEmail};
use shopfloor_notify::delivery::in_app::InAppSink;
use shopfloor_notify::dispatcher::{DispatchConfig, Dispatcher};
use shopfloor_notify::store::{
    NotificationStore, PreferenceStore, ProjectDirectory, StoreError, UserDirectory,
};
use shopfloor_notify::template::TemplateRegistry;

pub fn user(id: DbId, role: &str, email: &str) -> User {
    User {
        id,
        username: format!("user-{id}"),
        email: email.to_string(),
        display_name: format!("User {id}"),
        role: role.to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub struct FakeDirectory {
    pub users: Vec<User>,
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Preference store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePrefs {
    /// Users not present here get the all-enabled default, mirroring the
    /// lazy-create behaviour of the real store.
    pub prefs: HashMap<DbId, Preference>,
    /// When set, every read fails, exercising the fail-open path.
    pub fail: bool,
}

#[async_trait]
impl PreferenceStore for FakePrefs {
    async fn get_or_default(&self, user_id: DbId) -> Result<Preference, StoreError> {
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(self
            .prefs
            .get(&user_id)
            .cloned()
            .unwrap_or_else(Preference::default_enabled))
    }
}

// ---------------------------------------------------------------------------
// Notification store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifications {
    pub created: Mutex<Vec<NewNotification>>,
    /// Writes for these users fail.
    pub fail_for: HashSet<DbId>,
}

impl RecordingNotifications {
    pub fn records(&self) -> Vec<NewNotification> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for RecordingNotifications {
    async fn create(&self, notification: &NewNotification) -> Result<DbId, StoreError> {
        if self.fail_for.contains(&notification.user_id) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut created = self.created.lock().unwrap();
        created.push(notification.clone());
        Ok(created.len() as DbId)
    }
}

// ---------------------------------------------------------------------------
// Email transport
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutboundEmail>>,
    /// Sends to these addresses fail.
    pub fail_for: HashSet<String>,
}

impl RecordingTransport {
    pub fn emails(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        if self.fail_for.contains(&email.to_address) {
            return Err(EmailError::Build("simulated transport failure".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Project directory
// ---------------------------------------------------------------------------

pub struct FakeProjects {
    pub due: Vec<DeadlineProject>,
}

#[async_trait]
impl ProjectDirectory for FakeProjects {
    async fn find_approaching_deadlines(
        &self,
        _horizon_days: i64,
    ) -> Result<Vec<DeadlineProject>, StoreError> {
        Ok(self.due.clone())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn dispatcher(
    directory: FakeDirectory,
    prefs: FakePrefs,
    notifications: Arc<RecordingNotifications>,
    transport: Arc<RecordingTransport>,
) -> Dispatcher {
    Dispatcher::new(
        Arc::new(directory),
        Arc::new(prefs),
        TemplateRegistry::new(),
        InAppSink::new(notifications),
        EmailSink::new(transport),
        DispatchConfig::default(),
    )
}
