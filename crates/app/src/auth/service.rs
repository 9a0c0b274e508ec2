//! Auth service.

use std::{fmt, sync::Arc};

use tracing::info;

use crate::{
    api::StorefrontApi,
    auth::{AuthError, AuthSession, AuthUser, LoginRequest, RegisterRequest, SessionStore},
};

/// Signs shoppers in and out.
pub struct AuthService {
    api: Arc<dyn StorefrontApi>,
    sessions: Arc<SessionStore>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>, sessions: Arc<SessionStore>) -> Self {
        Self { api, sessions }
    }

    /// Sign in with email and password, persisting the returned session.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is blank, the backend rejects them, or the session
    /// cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();

        if email.is_empty() {
            return Err(AuthError::MissingCredential("email"));
        }

        if password.is_empty() {
            return Err(AuthError::MissingCredential("password"));
        }

        let session = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.activate(session)
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank, the backend rejects the registration, or
    /// the session cannot be persisted.
    pub async fn register(&self, details: RegisterRequest) -> Result<AuthUser, AuthError> {
        for (field, value) in [
            ("name", &details.name),
            ("email", &details.email),
            ("password", &details.password),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::MissingCredential(field));
            }
        }

        let session = self.api.register(&details).await?;

        self.activate(session)
    }

    /// Sign out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear()?;

        info!("signed out");

        Ok(())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.sessions.user()
    }

    fn activate(&self, session: AuthSession) -> Result<AuthUser, AuthError> {
        let user = session.user.clone();

        self.sessions.establish(session)?;

        info!(user = %user.email, role = ?user.role, "signed in");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::{ApiError, MockStorefrontApi},
        storage::MemoryStore,
        test::fixtures::customer_session,
    };

    use super::*;

    fn service(api: MockStorefrontApi) -> AuthService {
        AuthService::new(
            Arc::new(api),
            Arc::new(SessionStore::load(Arc::new(MemoryStore::new()))),
        )
    }

    #[tokio::test]
    async fn login_establishes_session() -> TestResult {
        let mut api = MockStorefrontApi::new();

        api.expect_login()
            .once()
            .withf(|request| request.email == "amel@example.com" && request.password == "secret")
            .return_once(|_| Ok(customer_session()));

        let auth = service(api);
        let user = auth.login(" amel@example.com ", "secret").await?;

        assert_eq!(user.email, "amel@example.com");
        assert_eq!(auth.current_user(), Some(user));

        Ok(())
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_backend() {
        let mut api = MockStorefrontApi::new();
        api.expect_login().never();

        let result = service(api).login("amel@example.com", "").await;

        assert!(matches!(result, Err(AuthError::MissingCredential("password"))));
    }

    #[tokio::test]
    async fn rejected_login_leaves_no_session() {
        let mut api = MockStorefrontApi::new();

        api.expect_login().once().return_once(|_| {
            Err(ApiError::Client {
                status: 401,
                message: String::new(),
            })
        });

        let auth = service(api);
        let result = auth.login("amel@example.com", "wrong").await;

        assert!(
            matches!(&result, Err(error) if error.user_message() == "Incorrect email or password.")
        );
        assert_eq!(auth.current_user(), None);
    }

    #[tokio::test]
    async fn logout_clears_user() -> TestResult {
        let mut api = MockStorefrontApi::new();
        api.expect_login()
            .once()
            .return_once(|_| Ok(customer_session()));

        let auth = service(api);
        auth.login("amel@example.com", "secret").await?;

        auth.logout()?;

        assert_eq!(auth.current_user(), None);

        Ok(())
    }
}
