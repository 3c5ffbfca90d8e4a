//! Port abstraction for enrollment persistence adapters.
//!
//! This is the boundary that carries the seat-accounting contract: the
//! reserve operation must execute its capacity check and row insertion as one
//! atomic unit per course, so that concurrent callers can never overfill a
//! seat-limited course.

use async_trait::async_trait;

use crate::domain::course::CourseId;
use crate::domain::user::UserId;

/// Persistence errors raised by enrollment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentPersistenceError {
    /// Repository connection could not be established.
    #[error("enrollment repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("enrollment repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl EnrollmentPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Outcome of an atomic seat reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatReservation {
    /// A new enrollment row was created.
    Inserted,
    /// The (user, course) row already existed; nothing was written.
    AlreadyEnrolled,
    /// The course is seat-limited and at capacity; nothing was written.
    CourseFull,
    /// The course does not exist.
    CourseMissing,
}

/// Port for enrollment storage with atomic seat accounting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Atomically reserve a seat for `user` on `course`.
    ///
    /// # Atomicity contract
    ///
    /// Implementations must serialise the capacity check and the row insert
    /// per course — via a transaction that locks the course row, or an
    /// equivalent mutual-exclusion gate — and must re-read the current count
    /// inside that atomic unit rather than trusting any cached value. The
    /// (user, course) pair is unique; re-reserving an existing pair reports
    /// [`SeatReservation::AlreadyEnrolled`] without writing.
    async fn reserve_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<SeatReservation, EnrollmentPersistenceError>;

    /// Delete the (user, course) row. Returns `false` when no row existed;
    /// that is not an error.
    async fn release_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError>;

    /// Current enrollment count for a course.
    async fn count_for_course(
        &self,
        course: &CourseId,
    ) -> Result<u64, EnrollmentPersistenceError>;

    /// Identifiers of every course the user is enrolled in.
    async fn course_ids_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentPersistenceError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn error_messages_carry_the_adapter_detail() {
        let err = EnrollmentPersistenceError::connection("pool exhausted");
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[rstest]
    fn reservation_outcomes_are_distinguishable() {
        assert_ne!(SeatReservation::Inserted, SeatReservation::AlreadyEnrolled);
        assert_ne!(SeatReservation::CourseFull, SeatReservation::CourseMissing);
    }
}
