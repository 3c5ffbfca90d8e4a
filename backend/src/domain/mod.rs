//! Domain primitives, services, and ports.
//!
//! Purpose: strongly typed entities, the enrollment/catalogue/account
//! services that own the business rules, and the port traits adapters
//! implement. Types are immutable; invariants and serialisation contracts
//! are documented on each type.

pub mod access;
pub mod auth;
pub mod course;
pub mod error;
pub mod ports;
pub mod user;

mod account_service;
mod course_admin_service;
mod enrollment_service;

pub use self::access::{RoleSet, authorize};
pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN, PasswordDigest,
    validate_new_password,
};
pub use self::course::{
    CapacityMode, Category, CategoryId, Course, CourseDraft, CourseId, CourseOverview,
    CourseValidationError, DEFAULT_FACE_TO_FACE_SEATS, Delivery,
};
pub use self::course_admin_service::CourseAdminService;
pub use self::enrollment_service::{EnrollmentService, EnrollmentStatus};
pub use self::error::{Error, ErrorCode};
pub use self::user::{
    Actor, DISPLAY_NAME_MAX, DisplayName, Email, Role, User, UserId, UserValidationError,
};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn denied() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
