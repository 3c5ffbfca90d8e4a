//! Enrollment domain service: seat-aware enroll/drop and the catalogue view.
//!
//! This service owns the enrollment invariants:
//!
//! - a seat-limited course never holds more enrollments than seats, even
//!   under concurrent callers (delegated to the repository's atomic reserve);
//! - at most one enrollment row exists per (user, course) pair;
//! - enroll and drop are idempotent closures onto Present/Absent.
//!
//! It never caches counts across calls; every reservation re-reads state
//! inside the repository's atomic unit.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::access::{RoleSet, authorize};
use super::course::{CourseId, CourseOverview};
use super::error::Error;
use super::ports::{
    CoursePersistenceError, CourseRepository, EnrollmentPersistenceError, EnrollmentRepository,
    SeatReservation,
};
use super::user::{Actor, Role, UserId};

/// Roles permitted to enroll in and drop courses.
///
/// Enrollment is deliberately restricted to students; teachers and admins
/// manage rosters through [`EnrollmentService::remove_student`] instead.
const ENROLLMENT_ROLES: RoleSet = RoleSet::of(&[Role::Student]);

/// Roles permitted to remove a student from a roster.
const ROSTER_ROLES: RoleSet = RoleSet::of(&[Role::Teacher, Role::Admin]);

/// Successful enrollment outcomes.
///
/// Both variants are success: re-enrolling an already-enrolled student is a
/// no-op, not an error, because enrollment is set membership rather than an
/// event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStatus {
    /// A seat was reserved and the enrollment row created.
    Enrolled,
    /// The student already held this enrollment; nothing changed.
    AlreadyEnrolled,
}

/// Domain service coordinating enrollments against the catalogue.
#[derive(Clone)]
pub struct EnrollmentService {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

fn map_course_error(error: CoursePersistenceError) -> Error {
    match error {
        CoursePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CoursePersistenceError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

fn map_enrollment_error(error: EnrollmentPersistenceError) -> Error {
    match error {
        EnrollmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("enrollment repository unavailable: {message}"))
        }
        EnrollmentPersistenceError::Query { message } => {
            Error::internal(format!("enrollment repository error: {message}"))
        }
    }
}

impl EnrollmentService {
    /// Create a new service over the given repositories.
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            courses,
            enrollments,
        }
    }

    /// Enroll the acting student in a course.
    ///
    /// The capacity check and row insertion run as one atomic unit inside the
    /// repository, so concurrent enrollments into the last seat resolve to
    /// exactly one success.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when the actor is not a student.
    /// - `NotFound` when the course does not exist.
    /// - `CourseFull` when the course is seat-limited and at capacity.
    /// - `ServiceUnavailable` / `InternalError` on store failures.
    pub async fn enroll(
        &self,
        actor: &Actor,
        course_id: &CourseId,
    ) -> Result<EnrollmentStatus, Error> {
        authorize(actor, ENROLLMENT_ROLES, "enroll in a course")?;

        let reservation = self
            .enrollments
            .reserve_seat(&actor.id, course_id)
            .await
            .map_err(map_enrollment_error)?;

        match reservation {
            SeatReservation::Inserted => {
                debug!(user = %actor.id, course = %course_id, "seat reserved");
                Ok(EnrollmentStatus::Enrolled)
            }
            SeatReservation::AlreadyEnrolled => Ok(EnrollmentStatus::AlreadyEnrolled),
            SeatReservation::CourseFull => Err(Error::course_full("course is full")
                .with_details(serde_json::json!({ "courseId": course_id }))),
            SeatReservation::CourseMissing => Err(Error::not_found("course not found")),
        }
    }

    /// Drop the acting student's enrollment in a course.
    ///
    /// Dropping an enrollment that does not exist is a silent no-op success;
    /// capacity never plays a part.
    pub async fn drop_course(&self, actor: &Actor, course_id: &CourseId) -> Result<(), Error> {
        authorize(actor, ENROLLMENT_ROLES, "drop a course")?;
        self.release(&actor.id, course_id).await
    }

    /// Remove a student from a course roster on their behalf.
    pub async fn remove_student(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        student_id: &UserId,
    ) -> Result<(), Error> {
        authorize(actor, ROSTER_ROLES, "remove a student from a roster")?;
        self.release(student_id, course_id).await
    }

    async fn release(&self, user_id: &UserId, course_id: &CourseId) -> Result<(), Error> {
        let removed = self
            .enrollments
            .release_seat(user_id, course_id)
            .await
            .map_err(map_enrollment_error)?;
        if !removed {
            debug!(user = %user_id, course = %course_id, "no enrollment row to release");
        }
        Ok(())
    }

    /// Capacity-aware view of a single course for the acting user.
    ///
    /// Same read-only contract as the catalogue listing, scoped to one
    /// course.
    pub async fn course_overview(
        &self,
        actor: &Actor,
        course_id: &CourseId,
    ) -> Result<CourseOverview, Error> {
        authorize(actor, RoleSet::ANY, "view a course")?;

        let course = self
            .courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("course not found"))?;
        let enrolled_count = self
            .enrollments
            .count_for_course(course_id)
            .await
            .map_err(map_enrollment_error)?;
        let enrolled = self
            .enrollments
            .course_ids_for_user(&actor.id)
            .await
            .map_err(map_enrollment_error)?
            .contains(course_id);

        Ok(CourseOverview {
            course,
            enrolled_count,
            enrolled,
        })
    }

    /// Capacity-aware catalogue snapshot for the acting user.
    ///
    /// Read-only: returns every course with its current enrollment count and
    /// whether the actor is enrolled. The snapshot is advisory for display;
    /// enrollment truth is re-derived inside each mutation.
    pub async fn catalogue_for(&self, actor: &Actor) -> Result<Vec<CourseOverview>, Error> {
        authorize(actor, RoleSet::ANY, "browse the catalogue")?;

        let listed = self
            .courses
            .list_with_counts()
            .await
            .map_err(map_course_error)?;
        let mine: HashSet<CourseId> = self
            .enrollments
            .course_ids_for_user(&actor.id)
            .await
            .map_err(map_enrollment_error)?
            .into_iter()
            .collect();

        Ok(listed
            .into_iter()
            .map(|entry| {
                let enrolled = mine.contains(&entry.course.id);
                CourseOverview {
                    course: entry.course,
                    enrolled_count: entry.enrolled_count,
                    enrolled,
                }
            })
            .collect())
    }
}
