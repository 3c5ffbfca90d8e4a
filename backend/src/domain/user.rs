//! User identity, roles, and account data.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the account constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was empty or not a UUID.
    InvalidId,
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Email lacks the expected `local@domain` shape.
    InvalidEmail,
    /// Display name was blank once trimmed.
    EmptyDisplayName,
    /// Display name exceeds [`DISPLAY_NAME_MAX`] characters.
    DisplayNameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Role tag is not one of `student`, `teacher`, `admin`.
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::UnknownRole => write!(f, "role must be student, teacher, or admin"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated email address used as the login identifier.
///
/// ## Invariants
/// - Trimmed, non-empty, and contains exactly one `@` with text on each side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum permitted display name length.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name shown on rosters and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role driving the capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May browse the catalogue and manage their own enrollments.
    Student,
    /// May create courses, claim unassigned ones, and manage rosters.
    Teacher,
    /// Full administrative access.
    Admin,
}

impl Role {
    /// Stable tag used in the database and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    /// Parse the stable tag back into a role.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Login identifier, unique across accounts.
    pub email: Email,
    /// Name shown on rosters and dashboards.
    pub display_name: DisplayName,
    /// Role driving capability checks.
    pub role: Role,
}

impl User {
    /// Assemble a user from already-validated parts.
    pub const fn new(id: UserId, email: Email, display_name: DisplayName, role: Role) -> Self {
        Self {
            id,
            email,
            display_name,
            role,
        }
    }

    /// The actor view of this user, as consumed by capability checks.
    pub const fn as_actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// Resolved caller identity: who is acting and with which role.
///
/// Produced by the identity resolution step at the adapter boundary; every
/// domain operation takes one and performs its capability check against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Acting user's identifier.
    pub id: UserId,
    /// Acting user's role.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::InvalidId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    fn rejects_bad_user_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = UserId::new(raw).expect_err("invalid id must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn accepts_canonical_user_id() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("@school.com", UserValidationError::InvalidEmail)]
    #[case("student1@", UserValidationError::InvalidEmail)]
    #[case("a@b@c", UserValidationError::InvalidEmail)]
    fn rejects_bad_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = Email::new(raw).expect_err("invalid email must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn emails_are_trimmed_and_lowercased() {
        let email = Email::new("  Student1@School.com ").expect("valid email");
        assert_eq!(email.as_ref(), "student1@school.com");
    }

    #[rstest]
    fn display_name_rejects_overlong_input() {
        let raw = "x".repeat(DISPLAY_NAME_MAX + 1);
        let err = DisplayName::new(raw).expect_err("overlong name must fail");
        assert_eq!(
            err,
            UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            }
        );
    }

    #[rstest]
    #[case(Role::Student, "student")]
    #[case(Role::Teacher, "teacher")]
    #[case(Role::Admin, "admin")]
    fn role_tags_round_trip(#[case] role: Role, #[case] tag: &str) {
        assert_eq!(role.as_str(), tag);
        assert_eq!(Role::parse(tag).expect("known tag"), role);
    }

    #[rstest]
    fn unknown_role_tag_is_rejected() {
        let err = Role::parse("principal").expect_err("unknown tag must fail");
        assert_eq!(err, UserValidationError::UnknownRole);
    }

    #[rstest]
    fn actor_mirrors_user_identity() {
        let user = User::new(
            UserId::random(),
            Email::new("t1@school.com").expect("valid email"),
            DisplayName::new("Teacher One").expect("valid name"),
            Role::Teacher,
        );
        let actor = user.as_actor();
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.role, Role::Teacher);
    }
}
