//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend on
//! the domain services and the login port only and remain testable without
//! real I/O behind them.

use std::sync::Arc;

use crate::domain::ports::LoginService;
use crate::domain::{AccountService, CourseAdminService, EnrollmentService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication port.
    pub login: Arc<dyn LoginService>,
    /// Account service (signup, directory, roles, identity resolution).
    pub accounts: AccountService,
    /// Enrollment service (enroll, drop, roster, catalogue).
    pub enrollment: EnrollmentService,
    /// Catalogue administration service.
    pub course_admin: CourseAdminService,
}

impl HttpState {
    /// Bundle the services the handlers need.
    pub fn new(
        login: Arc<dyn LoginService>,
        accounts: AccountService,
        enrollment: EnrollmentService,
        course_admin: CourseAdminService,
    ) -> Self {
        Self {
            login,
            accounts,
            enrollment,
            course_admin,
        }
    }
}
