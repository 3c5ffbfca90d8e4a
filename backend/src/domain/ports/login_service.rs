//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. This makes HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::user::User;

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated account.
    ///
    /// The full user is returned (not just the id) so callers can route by
    /// role immediately after login without a second lookup.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// In-memory authenticator used in handler tests.
///
/// `admin@school.com` / `password` authenticates as a fixed admin account;
/// everything else is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// Fixed user id produced by [`FixtureLoginService`].
pub const FIXTURE_ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        use crate::domain::user::{DisplayName, Email, Role, UserId};

        if credentials.email().as_ref() != "admin@school.com"
            || credentials.password() != "password"
        {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let id = UserId::new(FIXTURE_ADMIN_ID)
            .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
        let email = Email::new("admin@school.com")
            .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
        let display_name = DisplayName::new("Site Admin")
            .map_err(|err| Error::internal(format!("invalid fixture display name: {err}")))?;
        Ok(User::new(id, email, display_name, Role::Admin))
    }
}
