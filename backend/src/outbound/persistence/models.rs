//! Diesel row models and their conversions to domain types.
//!
//! Row structs mirror the table definitions in [`super::schema`]; conversion
//! into domain types re-validates tags (role, delivery) so a corrupt row
//! surfaces as a query error instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    CapacityMode, Category, CategoryId, Course, CourseId, Delivery, DisplayName, Email,
    PasswordDigest, Role, User, UserId,
};

use super::schema::{categories, courses, enrollments, users};

/// Raised when a stored row no longer satisfies domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored row failed domain validation: {message}")]
pub struct RowConversionError {
    /// What failed to validate.
    pub message: String,
}

impl RowConversionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account row as selected from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Role tag.
    pub role: String,
    /// Password digest salt.
    pub password_salt: String,
    /// Password digest, lowercase hex.
    pub password_digest: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert into the domain user, discarding credential material.
    pub fn into_user(self) -> Result<User, RowConversionError> {
        let (user, _) = self.into_user_with_digest()?;
        Ok(user)
    }

    /// Convert into the domain user plus its stored password digest.
    pub fn into_user_with_digest(self) -> Result<(User, PasswordDigest), RowConversionError> {
        let id = UserId::from_uuid(self.id);
        let email = Email::new(&self.email)
            .map_err(|err| RowConversionError::new(format!("user {id} email: {err}")))?;
        let display_name = DisplayName::new(&self.display_name)
            .map_err(|err| RowConversionError::new(format!("user {id} display name: {err}")))?;
        let role = Role::parse(&self.role)
            .map_err(|err| RowConversionError::new(format!("user {id} role: {err}")))?;
        let digest = PasswordDigest::from_stored(self.password_salt, self.password_digest);
        Ok((User::new(id, email, display_name, role), digest))
    }
}

/// Insertable account row.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Login email.
    pub email: &'a str,
    /// Display name.
    pub display_name: &'a str,
    /// Role tag.
    pub role: &'a str,
    /// Password digest salt.
    pub password_salt: &'a str,
    /// Password digest, lowercase hex.
    pub password_digest: &'a str,
}

/// Category row as selected from `categories`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    /// Primary key.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

/// Course row as selected from `courses`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseRow {
    /// Primary key.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Summary.
    pub summary: String,
    /// Curriculum outline.
    pub curriculum: String,
    /// Subject grouping.
    pub category_id: Uuid,
    /// Owning teacher, if assigned.
    pub teacher_id: Option<Uuid>,
    /// Delivery tag.
    pub delivery: String,
    /// Seat count; null means unlimited.
    pub capacity: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CourseRow {
    /// Convert into the domain course.
    pub fn into_course(self) -> Result<Course, RowConversionError> {
        let id = CourseId::from_uuid(self.id);
        let delivery = Delivery::parse(&self.delivery)
            .map_err(|err| RowConversionError::new(format!("course {id} delivery: {err}")))?;
        let capacity = CapacityMode::from_stored(delivery, stored_capacity(self.capacity));
        Ok(Course {
            id,
            title: self.title,
            description: self.description,
            summary: self.summary,
            curriculum: self.curriculum,
            category_id: CategoryId::from_uuid(self.category_id),
            teacher_id: self.teacher_id.map(UserId::from_uuid),
            delivery,
            capacity,
            created_at: self.created_at,
        })
    }
}

/// Normalise the stored capacity column.
///
/// The SQL check keeps the column positive, so a non-positive value only
/// appears if the constraint was bypassed; treat it as unlimited rather than
/// failing the whole listing.
fn stored_capacity(raw: Option<i32>) -> Option<u32> {
    raw.and_then(|seats| match u32::try_from(seats) {
        Ok(seats) if seats > 0 => Some(seats),
        _ => {
            tracing::warn!(seats, "non-positive capacity column, treating as unlimited");
            None
        }
    })
}

/// Insertable course row.
#[derive(Debug, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourseRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Title.
    pub title: &'a str,
    /// Description.
    pub description: &'a str,
    /// Summary.
    pub summary: &'a str,
    /// Curriculum outline.
    pub curriculum: &'a str,
    /// Subject grouping.
    pub category_id: Uuid,
    /// Owning teacher, if assigned.
    pub teacher_id: Option<Uuid>,
    /// Delivery tag.
    pub delivery: &'a str,
    /// Seat count; null means unlimited.
    pub capacity: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl<'a> NewCourseRow<'a> {
    /// Build the insertable row for a domain course.
    pub fn from_course(course: &'a Course) -> Self {
        let capacity = course
            .capacity
            .seats()
            .map(|seats| i32::try_from(seats).unwrap_or(i32::MAX));
        Self {
            id: *course.id.as_uuid(),
            title: &course.title,
            description: &course.description,
            summary: &course.summary,
            curriculum: &course.curriculum,
            category_id: *course.category_id.as_uuid(),
            teacher_id: course.teacher_id.map(|id| *id.as_uuid()),
            delivery: course.delivery.as_str(),
            capacity,
            created_at: course.created_at,
        }
    }
}

/// Insertable enrollment row.
#[derive(Debug, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollmentRow {
    /// Enrolled student.
    pub user_id: Uuid,
    /// Course enrolled in.
    pub course_id: Uuid,
}
