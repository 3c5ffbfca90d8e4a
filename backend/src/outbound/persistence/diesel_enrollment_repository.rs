//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel.
//!
//! The reserve operation is the one place in the system that must be atomic:
//! it runs inside a transaction that locks the course row with
//! `SELECT ... FOR UPDATE`, which serialises concurrent reservations per
//! course. The capacity count is re-read under that lock, so two callers
//! racing for the last seat resolve to exactly one insert. The composite
//! primary key on `(user_id, course_id)` independently guarantees row
//! uniqueness; `ON CONFLICT DO NOTHING` turns a lost uniqueness race into the
//! already-enrolled outcome instead of an error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    EnrollmentPersistenceError, EnrollmentRepository, SeatReservation,
};
use crate::domain::{CapacityMode, CourseId, Delivery, UserId};

use super::error_mapping::{StoreFault, classify_diesel_error, classify_pool_error};
use super::models::NewEnrollmentRow;
use super::pool::DbPool;
use super::schema::{courses, enrollments};

/// Diesel-backed implementation of the `EnrollmentRepository` port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_fault(fault: StoreFault) -> EnrollmentPersistenceError {
    match fault {
        StoreFault::Connection(message) => EnrollmentPersistenceError::connection(message),
        StoreFault::Query(message) => EnrollmentPersistenceError::query(message),
    }
}

/// Transaction-internal error: either Diesel failed, or the locked course row
/// carried a delivery tag the domain no longer recognises.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    CorruptRow(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> EnrollmentPersistenceError {
    match error {
        TxError::Diesel(err) => map_fault(classify_diesel_error(&err)),
        TxError::CorruptRow(message) => EnrollmentPersistenceError::query(message),
    }
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn reserve_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<SeatReservation, EnrollmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let user_uuid = *user.as_uuid();
        let course_uuid = *course.as_uuid();

        conn.transaction::<SeatReservation, TxError, _>(|conn| {
            async move {
                // Lock the course row for the duration of the transaction.
                // Concurrent reservations for the same course queue here.
                let locked: Option<(String, Option<i32>)> = courses::table
                    .find(course_uuid)
                    .for_update()
                    .select((courses::delivery, courses::capacity))
                    .first(conn)
                    .await
                    .optional()?;

                let Some((delivery, capacity)) = locked else {
                    return Ok(SeatReservation::CourseMissing);
                };

                let already_enrolled: bool = diesel::select(diesel::dsl::exists(
                    enrollments::table.filter(
                        enrollments::user_id
                            .eq(user_uuid)
                            .and(enrollments::course_id.eq(course_uuid)),
                    ),
                ))
                .get_result(conn)
                .await?;
                if already_enrolled {
                    return Ok(SeatReservation::AlreadyEnrolled);
                }

                let delivery = Delivery::parse(&delivery).map_err(|err| {
                    TxError::CorruptRow(format!("course {course_uuid} delivery: {err}"))
                })?;
                let capacity = capacity.and_then(|seats| u32::try_from(seats).ok());
                if let CapacityMode::Limited(seats) =
                    CapacityMode::from_stored(delivery, capacity)
                {
                    let count: i64 = enrollments::table
                        .filter(enrollments::course_id.eq(course_uuid))
                        .count()
                        .get_result(conn)
                        .await?;
                    if count >= i64::from(seats) {
                        return Ok(SeatReservation::CourseFull);
                    }
                }

                let inserted = diesel::insert_into(enrollments::table)
                    .values(&NewEnrollmentRow {
                        user_id: user_uuid,
                        course_id: course_uuid,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;

                Ok(if inserted == 0 {
                    SeatReservation::AlreadyEnrolled
                } else {
                    SeatReservation::Inserted
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn release_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let deleted = diesel::delete(
            enrollments::table.filter(
                enrollments::user_id
                    .eq(user.as_uuid())
                    .and(enrollments::course_id.eq(course.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(deleted > 0)
    }

    async fn count_for_course(
        &self,
        course: &CourseId,
    ) -> Result<u64, EnrollmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let count: i64 = enrollments::table
            .filter(enrollments::course_id.eq(course.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn course_ids_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_fault(classify_pool_error(&err)))?;

        let ids: Vec<uuid::Uuid> = enrollments::table
            .filter(enrollments::user_id.eq(user.as_uuid()))
            .select(enrollments::course_id)
            .load(&mut conn)
            .await
            .map_err(|err| map_fault(classify_diesel_error(&err)))?;

        Ok(ids.into_iter().map(CourseId::from_uuid).collect())
    }
}
