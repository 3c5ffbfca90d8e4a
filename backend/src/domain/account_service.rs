//! Account domain service: signup, directory listing, and role management.

use std::sync::Arc;

use tracing::info;

use super::access::{RoleSet, authorize};
use super::auth::{PasswordDigest, validate_new_password};
use super::error::Error;
use super::ports::{UserPersistenceError, UserRepository};
use super::user::{Actor, DisplayName, Email, Role, User, UserId};

const DIRECTORY_ROLES: RoleSet = RoleSet::of(&[Role::Admin]);
const ROLE_EDITORS: RoleSet = RoleSet::of(&[Role::Admin]);

/// Domain service for account administration.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
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
            Error::invalid_request(format!("email already registered: {email}"))
                .with_details(serde_json::json!({ "field": "email", "code": "email_taken" }))
        }
    }
}

fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(serde_json::json!({ "field": field }))
}

impl AccountService {
    /// Create a new service over the given repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// Public (no actor): every new signup starts as a student; an admin
    /// promotes teachers afterwards via [`AccountService::update_role`].
    pub async fn signup(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<User, Error> {
        let email = Email::new(email).map_err(|err| invalid_field("email", err.to_string()))?;
        let display_name = DisplayName::new(display_name)
            .map_err(|err| invalid_field("displayName", err.to_string()))?;
        validate_new_password(password)
            .map_err(|err| invalid_field("password", err.to_string()))?;

        let user = User::new(UserId::random(), email, display_name, Role::Student);
        let digest = PasswordDigest::derive(password);
        self.users
            .insert(&user, &digest)
            .await
            .map_err(map_user_error)?;
        info!(user = %user.id, "account created");
        Ok(user)
    }

    /// Resolve the account behind an authenticated session id.
    ///
    /// A session naming a since-deleted account resolves to `Unauthorized`,
    /// which sends the caller back through login.
    pub async fn current(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    /// List every account for the admin directory.
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, Error> {
        authorize(actor, DIRECTORY_ROLES, "list accounts")?;
        self.users.list().await.map_err(map_user_error)
    }

    /// Overwrite a user's role.
    pub async fn update_role(
        &self,
        actor: &Actor,
        user_id: &UserId,
        role: Role,
    ) -> Result<(), Error> {
        authorize(actor, ROLE_EDITORS, "change account roles")?;
        let found = self
            .users
            .update_role(user_id, role)
            .await
            .map_err(map_user_error)?;
        if !found {
            return Err(Error::not_found("user not found"));
        }
        info!(user = %user_id, role = %role, "role updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserRepository;
    use rstest::rstest;

    fn actor(role: Role) -> Actor {
        Actor {
            id: UserId::random(),
            role,
        }
    }

    fn service(users: MockUserRepository) -> AccountService {
        AccountService::new(Arc::new(users))
    }

    #[tokio::test]
    async fn signup_creates_a_student_account() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|user: &User, digest: &PasswordDigest| {
                user.role == Role::Student && digest.verify("hunter2hunter2")
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let user = service(users)
            .signup("newbie@school.com", "New Student", "hunter2hunter2")
            .await
            .expect("signup succeeds");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email.as_ref(), "newbie@school.com");
    }

    #[rstest]
    #[case("bad-email", "Name", "longenough", "email")]
    #[case("ok@school.com", "  ", "longenough", "displayName")]
    #[case("ok@school.com", "Name", "short", "password")]
    #[tokio::test]
    async fn signup_rejects_invalid_fields(
        #[case] email: &str,
        #[case] name: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let mut users = MockUserRepository::new();
        users.expect_insert().times(0);

        let err = service(users)
            .signup(email, name, password)
            .await
            .expect_err("invalid signup rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details()
                .and_then(|d| d.get("field"))
                .and_then(serde_json::Value::as_str),
            Some(field)
        );
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_as_invalid_request() {
        let mut users = MockUserRepository::new();
        users.expect_insert().times(1).return_once(|_, _| {
            Err(UserPersistenceError::duplicate_email("taken@school.com"))
        });

        let err = service(users)
            .signup("taken@school.com", "Name", "longenough")
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details()
                .and_then(|d| d.get("code"))
                .and_then(serde_json::Value::as_str),
            Some("email_taken")
        );
    }

    #[tokio::test]
    async fn current_maps_a_vanished_account_to_unauthorized() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(None));

        let err = service(users)
            .current(&UserId::random())
            .await
            .expect_err("vanished account");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case(Role::Student)]
    #[case(Role::Teacher)]
    #[tokio::test]
    async fn directory_and_role_edits_are_admin_only(#[case] role: Role) {
        let mut users = MockUserRepository::new();
        users.expect_list().times(0);
        users.expect_update_role().times(0);
        let svc = service(users);

        let list_err = svc
            .list_users(&actor(role))
            .await
            .expect_err("listing forbidden");
        assert_eq!(list_err.code(), ErrorCode::Forbidden);

        let role_err = svc
            .update_role(&actor(role), &UserId::random(), Role::Teacher)
            .await
            .expect_err("role edit forbidden");
        assert_eq!(role_err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn promoting_an_unknown_user_reports_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_role()
            .times(1)
            .return_once(|_, _| Ok(false));

        let err = service(users)
            .update_role(&actor(Role::Admin), &UserId::random(), Role::Teacher)
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
