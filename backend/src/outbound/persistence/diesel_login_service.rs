//! Diesel-backed `LoginService` adapter built on `DieselUserRepository`.
//!
//! Looks up the account by email and verifies the salted password digest.
//! Unknown emails and wrong passwords produce the same `Unauthorized`
//! message, so callers cannot probe which addresses are registered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LoginService, UserPersistenceError, UserRepository};
use crate::domain::{Error, LoginCredentials, User};

use super::diesel_user_repository::DieselUserRepository;

/// Diesel-backed `LoginService` verifying stored password digests.
#[derive(Clone)]
pub struct DieselLoginService {
    users: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    /// Create a new service backed by a Diesel user repository.
    pub fn new(users: DieselUserRepository) -> Self {
        Self {
            users: Arc::new(users),
        }
    }

    /// Create a service over any user repository (used by tests).
    pub fn from_repository(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email during login: {email}"))
        }
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let found = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?;

        let Some((user, digest)) = found else {
            debug!(email = %credentials.email(), "login for unknown email");
            return Err(Error::unauthorized("invalid credentials"));
        };

        if !digest.verify(credentials.password()) {
            debug!(user = %user.id, "login with wrong password");
            return Err(Error::unauthorized("invalid credentials"));
        }

        Ok(user)
    }
}
