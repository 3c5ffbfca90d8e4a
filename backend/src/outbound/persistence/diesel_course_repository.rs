//! PostgreSQL-backed `CourseRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CoursePersistenceError, CourseRepository, CourseWithCount};
use crate::domain::{Category, Course, CourseId, UserId};

use super::error_mapping::{StoreFault, classify_diesel_error, classify_pool_error};
use super::models::{CategoryRow, CourseRow, NewCourseRow, RowConversionError};
use super::pool::DbPool;
use super::schema::{categories, courses, enrollments};

/// Diesel-backed implementation of the `CourseRepository` port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_fault(fault: StoreFault) -> CoursePersistenceError {
    match fault {
        StoreFault::Connection(message) => CoursePersistenceError::connection(message),
        StoreFault::Query(message) => CoursePersistenceError::query(message),
    }
}

fn map_conversion(error: RowConversionError) -> CoursePersistenceError {
    CoursePersistenceError::query(error.to_string())
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        diesel::insert_into(courses::table)
            .values(&NewCourseRow::from_course(course))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_fault(classify_diesel_error(&err)))
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let row: Option<CourseRow> = courses::table
            .find(id.as_uuid())
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        row.map(|row| row.into_course().map_err(map_conversion))
            .transpose()
    }

    async fn list_with_counts(&self) -> Result<Vec<CourseWithCount>, CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let rows: Vec<CourseRow> = courses::table
            .order(courses::created_at.desc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        let counts: Vec<(Uuid, i64)> = enrollments::table
            .group_by(enrollments::course_id)
            .select((enrollments::course_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;
        let counts: HashMap<Uuid, u64> = counts
            .into_iter()
            .map(|(course_id, count)| (course_id, u64::try_from(count).unwrap_or_default()))
            .collect();

        rows.into_iter()
            .map(|row| {
                let enrolled_count = counts.get(&row.id).copied().unwrap_or(0);
                row.into_course()
                    .map(|course| CourseWithCount {
                        course,
                        enrolled_count,
                    })
                    .map_err(map_conversion)
            })
            .collect()
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let deleted = diesel::delete(courses::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(deleted > 0)
    }

    async fn set_teacher(
        &self,
        id: &CourseId,
        teacher: Option<UserId>,
    ) -> Result<bool, CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let updated = diesel::update(courses::table.find(id.as_uuid()))
            .set(courses::teacher_id.eq(teacher.map(|id| *id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(updated > 0)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoursePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let rows: Vec<CategoryRow> = categories::table
            .order(categories::name.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}
