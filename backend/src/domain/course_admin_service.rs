//! Administrative catalogue operations: course lifecycle and teacher
//! assignment.
//!
//! Enrollment never mutates a course; every mutation here is an explicit
//! administrative action with its own capability check.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::access::{RoleSet, authorize};
use super::course::{Category, Course, CourseDraft, CourseId};
use super::error::Error;
use super::ports::{
    CoursePersistenceError, CourseRepository, UserPersistenceError, UserRepository,
};
use super::user::{Actor, Role, UserId};

const COURSE_CREATORS: RoleSet = RoleSet::of(&[Role::Teacher, Role::Admin]);
const COURSE_DELETERS: RoleSet = RoleSet::of(&[Role::Admin]);
const TEACHER_ASSIGNERS: RoleSet = RoleSet::of(&[Role::Admin]);
const COURSE_CLAIMERS: RoleSet = RoleSet::of(&[Role::Teacher]);

/// Domain service for catalogue administration.
#[derive(Clone)]
pub struct CourseAdminService {
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
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

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::DuplicateEmail { email: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

impl CourseAdminService {
    /// Create a new service over the given repositories.
    pub fn new(courses: Arc<dyn CourseRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { courses, users }
    }

    /// Create a course from a validated draft.
    ///
    /// A teacher always owns the course they create; an admin may name
    /// another teacher via `requested_teacher` or leave the course
    /// unassigned.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for students.
    /// - `InvalidAssignee` when `requested_teacher` is not a teacher-role
    ///   user.
    pub async fn create_course(
        &self,
        actor: &Actor,
        draft: CourseDraft,
        requested_teacher: Option<UserId>,
    ) -> Result<Course, Error> {
        authorize(actor, COURSE_CREATORS, "create a course")?;

        let owner = if actor.role == Role::Admin {
            if let Some(teacher_id) = requested_teacher {
                self.require_teacher(&teacher_id).await?;
            }
            requested_teacher
        } else {
            Some(actor.id)
        };

        let course = draft.into_course(owner, Utc::now());
        self.courses
            .insert(&course)
            .await
            .map_err(map_course_error)?;
        info!(course = %course.id, teacher = ?course.teacher_id, "course created");
        Ok(course)
    }

    /// Delete a course; dependent enrollments cascade with it.
    pub async fn delete_course(&self, actor: &Actor, course_id: &CourseId) -> Result<(), Error> {
        authorize(actor, COURSE_DELETERS, "delete a course")?;
        let deleted = self
            .courses
            .delete(course_id)
            .await
            .map_err(map_course_error)?;
        if !deleted {
            return Err(Error::not_found("course not found"));
        }
        info!(course = %course_id, "course deleted");
        Ok(())
    }

    /// Overwrite a course's owning teacher; `None` unassigns.
    ///
    /// Student enrollments are untouched: the teacher link is independent of
    /// enrollment existence.
    ///
    /// # Errors
    ///
    /// - `InvalidAssignee` when the target is missing or not teacher-role.
    /// - `NotFound` when the course does not exist.
    pub async fn assign_teacher(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        teacher: Option<UserId>,
    ) -> Result<(), Error> {
        authorize(actor, TEACHER_ASSIGNERS, "assign a teacher")?;
        if let Some(teacher_id) = teacher {
            self.require_teacher(&teacher_id).await?;
        }
        self.overwrite_teacher(course_id, teacher).await
    }

    /// Assign the acting teacher to a course (self-service claim).
    pub async fn claim_course(&self, actor: &Actor, course_id: &CourseId) -> Result<(), Error> {
        authorize(actor, COURSE_CLAIMERS, "claim a course")?;
        self.overwrite_teacher(course_id, Some(actor.id)).await
    }

    /// List every category for catalogue grouping and course creation.
    pub async fn list_categories(&self, actor: &Actor) -> Result<Vec<Category>, Error> {
        authorize(actor, RoleSet::ANY, "list categories")?;
        self.courses
            .list_categories()
            .await
            .map_err(map_course_error)
    }

    async fn overwrite_teacher(
        &self,
        course_id: &CourseId,
        teacher: Option<UserId>,
    ) -> Result<(), Error> {
        let found = self
            .courses
            .set_teacher(course_id, teacher)
            .await
            .map_err(map_course_error)?;
        if !found {
            return Err(Error::not_found("course not found"));
        }
        info!(course = %course_id, teacher = ?teacher, "course teacher updated");
        Ok(())
    }

    async fn require_teacher(&self, teacher_id: &UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(teacher_id)
            .await
            .map_err(map_user_error)?;
        match user {
            Some(user) if user.role == Role::Teacher => Ok(()),
            Some(user) => Err(Error::invalid_assignee(format!(
                "user {} holds role {}, not teacher",
                user.id, user.role
            ))),
            None => Err(Error::invalid_assignee("assignee not found")),
        }
    }
}
