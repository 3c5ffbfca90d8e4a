//! Enrollment API handlers.
//!
//! ```text
//! POST   /api/v1/courses/{id}/enroll                 Take a seat
//! DELETE /api/v1/courses/{id}/enroll                 Give the seat back
//! DELETE /api/v1/courses/{id}/students/{student_id}  Roster removal
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{CourseId, EnrollmentStatus, Error, UserId};

use super::error::ApiResult;
use super::identity::resolve_actor;
use super::session::SessionContext;
use super::state::HttpState;

/// Enrollment response body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    /// `enrolled` for a fresh seat, `already_enrolled` for the idempotent
    /// repeat.
    pub status: &'static str,
}

const fn status_label(status: EnrollmentStatus) -> &'static str {
    match status {
        EnrollmentStatus::Enrolled => "enrolled",
        EnrollmentStatus::AlreadyEnrolled => "already_enrolled",
    }
}

/// Enroll the acting student in a course.
///
/// Idempotent: enrolling twice reports `already_enrolled` and leaves a single
/// enrollment in place. A full course answers `409 Conflict`; the seat may
/// free up later, so clients can retry after a drop.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Seat held", body = EnrollResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 409, description = "Course is full", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["enrollments"],
    operation_id = "enroll"
)]
#[post("/courses/{id}/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<EnrollResponse>> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    let status = state.enrollment.enroll(&actor, &course_id).await?;
    Ok(web::Json(EnrollResponse {
        status: status_label(status),
    }))
}

/// Drop the acting student's enrollment.
///
/// Idempotent: dropping an enrollment that does not exist still answers
/// `204 No Content`.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Enrollment absent after the call"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["enrollments"],
    operation_id = "dropCourse"
)]
#[delete("/courses/{id}/enroll")]
pub async fn drop_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    state.enrollment.drop_course(&actor, &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a student from a course roster.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/students/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Course identifier"),
        ("student_id" = Uuid, Path, description = "Student to remove")
    ),
    responses(
        (status = 204, description = "Enrollment absent after the call"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["enrollments"],
    operation_id = "removeStudent"
)]
#[delete("/courses/{id}/students/{student_id}")]
pub async fn remove_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let (course_id, student_id) = path.into_inner();
    state
        .enrollment
        .remove_student(
            &actor,
            &CourseId::from_uuid(course_id),
            &UserId::from_uuid(student_id),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
