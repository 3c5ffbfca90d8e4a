//! Domain ports and supporting types for the hexagonal boundary.

mod course_repository;
mod enrollment_repository;
mod login_service;
mod user_repository;

#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CoursePersistenceError, CourseRepository, CourseWithCount};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    EnrollmentPersistenceError, EnrollmentRepository, SeatReservation,
};
pub use login_service::{FIXTURE_ADMIN_ID, FixtureLoginService, LoginService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
