//! Persisted session state.

use std::sync::{Arc, PoisonError, RwLock};

use jiff::Timestamp;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    auth::{AuthSession, AuthUser, is_expired},
    storage::{KeyValueStore, StorageError, keys, load_document, save_document},
};

/// The current session, mirrored to the key-value store.
///
/// Changes are broadcast on a watch channel carrying the signed-in user, so a UI can react when
/// the backend ends a session.
#[derive(Debug)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<AuthSession>>,
    changes: watch::Sender<Option<AuthUser>>,
}

impl SessionStore {
    /// Restore the persisted session, discarding it if unreadable or expired.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let session = restore(store.as_ref(), Timestamp::now());
        let changes = watch::Sender::new(session.as_ref().map(|session| session.user.clone()));

        Self {
            store,
            current: RwLock::new(session),
            changes,
        }
    }

    /// Token to attach to outgoing requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|session| session.token.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.read().as_ref().map(|session| session.user.clone())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|session| session.user.is_admin())
    }

    /// Persist and activate `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted; the previous session is kept.
    pub fn establish(&self, session: AuthSession) -> Result<(), StorageError> {
        save_document(self.store.as_ref(), keys::SESSION, &session)?;

        let user = session.user.clone();
        *self.write() = Some(session);
        self.changes.send_replace(Some(user));

        Ok(())
    }

    /// Remove the session (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed. The in-memory session is
    /// cleared regardless.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.write() = None;
        self.changes.send_replace(None);

        self.store.remove(keys::SESSION)
    }

    /// End the session identified by `token` after the backend rejected it.
    ///
    /// A session established since the rejected request was sent is left alone.
    pub fn invalidate(&self, token: &str) {
        {
            let mut current = self.write();

            if current
                .as_ref()
                .is_none_or(|session| session.token != token)
            {
                debug!("rejected token no longer current, keeping session");
                return;
            }

            *current = None;
        }

        info!("session rejected by backend, signing out");
        self.changes.send_replace(None);

        if let Err(error) = self.store.remove(keys::SESSION) {
            warn!(%error, "failed to remove persisted session");
        }
    }

    /// Receiver notified whenever the signed-in user changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.changes.subscribe()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthSession>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn restore(store: &dyn KeyValueStore, now: Timestamp) -> Option<AuthSession> {
    let session = match load_document::<AuthSession>(store, keys::SESSION) {
        Ok(session) => session?,
        Err(error) => {
            warn!(%error, "discarding unreadable session");
            return None;
        }
    };

    match is_expired(&session.token, now) {
        Ok(false) => Some(session),
        Ok(true) => {
            info!(user = %session.user.email, "discarding expired session");
            discard(store);
            None
        }
        Err(error) => {
            warn!(%error, "discarding session with unreadable token");
            discard(store);
            None
        }
    }
}

fn discard(store: &dyn KeyValueStore) {
    if let Err(error) = store.remove(keys::SESSION) {
        warn!(%error, "failed to remove persisted session");
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        auth::token::jwt_expiring_at,
        storage::MemoryStore,
        test::fixtures::{customer_session, session_with_token},
    };

    use super::*;

    #[test]
    fn session_survives_reload() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        SessionStore::load(Arc::clone(&store)).establish(customer_session())?;

        let reloaded = SessionStore::load(store);

        assert_eq!(reloaded.token().as_deref(), Some("opaque-token"));
        assert_eq!(reloaded.user().map(|user| user.email), Some("amel@example.com".to_string()));

        Ok(())
    }

    #[test]
    fn expired_sessions_are_discarded_on_load() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let expired = session_with_token(&jwt_expiring_at(1_000));

        save_document(store.as_ref(), keys::SESSION, &expired)?;

        let sessions = SessionStore::load(Arc::clone(&store));

        assert_eq!(sessions.token(), None);
        assert_eq!(store.get(keys::SESSION)?, None);

        Ok(())
    }

    #[test]
    fn unexpired_jwt_is_kept() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let token = jwt_expiring_at(Timestamp::now().as_second() + 3600);

        save_document(store.as_ref(), keys::SESSION, &session_with_token(&token))?;

        assert_eq!(SessionStore::load(store).token(), Some(token));

        Ok(())
    }

    #[test]
    fn invalidate_notifies_subscribers() -> TestResult {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let sessions = SessionStore::load(Arc::clone(&store));
        sessions.establish(customer_session())?;

        let mut changes = sessions.subscribe();
        assert!(changes.borrow_and_update().is_some());

        sessions.invalidate("opaque-token");

        assert!(changes.has_changed()?);
        assert!(changes.borrow_and_update().is_none());
        assert_eq!(store.get(keys::SESSION)?, None);

        Ok(())
    }

    #[test]
    fn invalidate_ignores_superseded_tokens() -> TestResult {
        let sessions = SessionStore::load(Arc::new(MemoryStore::new()));
        sessions.establish(customer_session())?;

        sessions.invalidate("an-older-token");

        assert_eq!(sessions.token().as_deref(), Some("opaque-token"));

        Ok(())
    }

    #[test]
    fn clear_signs_out() -> TestResult {
        let sessions = SessionStore::load(Arc::new(MemoryStore::new()));
        sessions.establish(customer_session())?;

        sessions.clear()?;

        assert_eq!(sessions.user(), None);
        assert!(!sessions.is_admin());

        Ok(())
    }
}
