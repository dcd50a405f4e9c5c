//! Per-user email gate.
//!
//! In-app delivery is unconditional; email is gated by the recipient's
//! preference record. A record that cannot be loaded fails open (all
//! enabled) so a broken preference row never silently suppresses wanted
//! notifications.

use chrono::NaiveTime;
use shopfloor_core::preference::{EmailGate, Preference};
use shopfloor_core::types::DbId;
use shopfloor_core::Category;

use crate::store::PreferenceStore;

/// Evaluate the email gate for one recipient at local send time `now`.
pub async fn evaluate(
    prefs: &dyn PreferenceStore,
    user_id: DbId,
    category: Category,
    now: NaiveTime,
) -> EmailGate {
    let preference = match prefs.get_or_default(user_id).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                user_id,
                error = %e,
                "Failed to load notification preference, failing open"
            );
            Preference::default_enabled()
        }
    };

    let gate = preference.email_gate(category, now);
    if gate != EmailGate::Allow {
        tracing::debug!(user_id, category = %category, gate = ?gate, "Email suppressed");
    }
    gate
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;

    struct FailingPrefs;

    #[async_trait]
    impl PreferenceStore for FailingPrefs {
        async fn get_or_default(&self, _user_id: DbId) -> Result<Preference, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    struct DisabledPrefs;

    #[async_trait]
    impl PreferenceStore for DisabledPrefs {
        async fn get_or_default(&self, _user_id: DbId) -> Result<Preference, StoreError> {
            let mut pref = Preference::default_enabled();
            pref.email_enabled = false;
            Ok(pref)
        }
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn read_failure_fails_open() {
        let gate = evaluate(&FailingPrefs, 1, Category::Project, noon()).await;
        assert_eq!(gate, EmailGate::Allow);
    }

    #[tokio::test]
    async fn master_switch_is_honoured() {
        let gate = evaluate(&DisabledPrefs, 1, Category::Project, noon()).await;
        assert_eq!(gate, EmailGate::MasterDisabled);
    }
}
