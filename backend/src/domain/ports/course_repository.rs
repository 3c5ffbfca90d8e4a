//! Port abstraction for catalogue persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::course::{Category, Course, CourseId};
use crate::domain::user::UserId;

/// Persistence errors raised by course repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoursePersistenceError {
    /// Repository connection could not be established.
    #[error("course repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("course repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl CoursePersistenceError {
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

/// A course together with its current enrollment count.
///
/// The count is a read-only snapshot; seat accounting during enrollment never
/// relies on it (see the enrollment repository's atomic reserve operation).
#[derive(Debug, Clone, PartialEq)]
pub struct CourseWithCount {
    /// Course metadata.
    pub course: Course,
    /// Number of students enrolled at snapshot time.
    pub enrolled_count: u64,
}

/// Port for catalogue storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a new course.
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Fetch a course by identifier.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError>;

    /// Snapshot every course with its enrollment count, newest first.
    async fn list_with_counts(&self) -> Result<Vec<CourseWithCount>, CoursePersistenceError>;

    /// Delete a course; its enrollments cascade. Returns `false` when the
    /// course does not exist.
    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError>;

    /// Overwrite a course's owning teacher (`None` unassigns). Returns
    /// `false` when the course does not exist. Never touches enrollments.
    async fn set_teacher(
        &self,
        id: &CourseId,
        teacher: Option<UserId>,
    ) -> Result<bool, CoursePersistenceError>;

    /// List every category, sorted by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CoursePersistenceError>;
}
