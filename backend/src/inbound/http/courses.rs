//! Catalogue API handlers.
//!
//! ```text
//! GET    /api/v1/courses              Capacity-aware catalogue listing
//! GET    /api/v1/categories           Category listing
//! POST   /api/v1/courses              Create a course (teacher/admin)
//! DELETE /api/v1/courses/{id}         Delete a course (admin)
//! PUT    /api/v1/courses/{id}/teacher Assign or unassign a teacher (admin)
//! POST   /api/v1/courses/{id}/claim   Claim an unassigned course (teacher)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Category, Course, CourseDraft, CourseId, CourseOverview, CourseValidationError, Delivery,
    Error, UserId,
};

use super::error::ApiResult;
use super::identity::resolve_actor;
use super::session::SessionContext;
use super::state::HttpState;

/// Course creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    /// Course title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Short summary for card views.
    #[serde(default)]
    pub summary: String,
    /// Week-by-week outline.
    #[serde(default)]
    pub curriculum: String,
    /// Subject grouping.
    pub category_id: Uuid,
    /// Delivery tag: `face_to_face` or `online`.
    pub delivery: Delivery,
    /// Seat count; omitted means the delivery default (40 for face-to-face,
    /// unlimited for online).
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Owning teacher; only honoured for admin callers.
    #[serde(default)]
    pub teacher_id: Option<Uuid>,
}

/// Teacher assignment request body; `teacherId: null` unassigns.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeacherRequest {
    /// Assignment target, or `null` to unassign.
    pub teacher_id: Option<Uuid>,
}

fn map_course_validation_error(err: CourseValidationError) -> Error {
    let field = match err {
        CourseValidationError::InvalidId => "id",
        CourseValidationError::EmptyTitle | CourseValidationError::TitleTooLong { .. } => "title",
        CourseValidationError::ZeroCapacity => "capacity",
        CourseValidationError::UnknownDelivery => "delivery",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Capacity-aware catalogue listing for the acting user.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Catalogue with seat counts", body = [CourseOverview]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseOverview>>> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let catalogue = state.enrollment.catalogue_for(&actor).await?;
    Ok(web::Json(catalogue))
}

/// Capacity-aware view of one course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course with seat count", body = CourseOverview),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CourseOverview>> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    let overview = state.enrollment.course_overview(&actor, &course_id).await?;
    Ok(web::Json(overview))
}

/// Category listing for catalogue grouping and the course creation form.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [Category]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Category>>> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let categories = state.course_admin.list_categories(&actor).await?;
    Ok(web::Json(categories))
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 422, description = "Assignee is not a teacher", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCourseRequest>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let payload = payload.into_inner();
    let draft = CourseDraft::new(
        payload.title,
        payload.description,
        payload.summary,
        payload.curriculum,
        crate::domain::CategoryId::from_uuid(payload.category_id),
        payload.delivery,
        payload.capacity,
    )
    .map_err(map_course_validation_error)?;
    let requested_teacher = payload.teacher_id.map(UserId::from_uuid);

    let course = state
        .course_admin
        .create_course(&actor, draft, requested_teacher)
        .await?;
    Ok(HttpResponse::Created().json(course))
}

/// Delete a course and, with it, every enrollment it holds.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    state.course_admin.delete_course(&actor, &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign or unassign a course's teacher.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/teacher",
    params(("id" = Uuid, Path, description = "Course identifier")),
    request_body = AssignTeacherRequest,
    responses(
        (status = 204, description = "Teacher updated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 422, description = "Assignee is not a teacher", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "assignTeacher"
)]
#[put("/courses/{id}/teacher")]
pub async fn assign_teacher(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignTeacherRequest>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    let teacher = payload.into_inner().teacher_id.map(UserId::from_uuid);
    state
        .course_admin
        .assign_teacher(&actor, &course_id, teacher)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Claim an unassigned course for the acting teacher.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/claim",
    params(("id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course claimed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "claimCourse"
)]
#[post("/courses/{id}/claim")]
pub async fn claim_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = resolve_actor(&session, &state.accounts).await?;
    let course_id = CourseId::from_uuid(path.into_inner());
    state.course_admin.claim_course(&actor, &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Email, Role};
    use crate::inbound::http::auth::LoginRequest;
    use crate::inbound::http::test_utils::{in_memory_state, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;
    use std::sync::Arc;

    use crate::outbound::persistence::InMemoryStore;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(crate::inbound::http::auth::login)
                    .service(list_courses)
                    .service(get_course)
                    .service(list_categories)
                    .service(create_course)
                    .service(delete_course)
                    .service(assign_teacher)
                    .service(claim_course),
            )
    }

    async fn login_as(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        email: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(&LoginRequest {
                    email: email.into(),
                    password: "password".into(),
                })
                .to_request(),
        )
        .await;
        assert!(res.status().is_success(), "login failed: {}", res.status());
        res.response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn seed(store: &Arc<InMemoryStore>, email: &str, role: Role) {
        store
            .seed_user(
                &Email::new(email).expect("valid email"),
                "Fixture",
                role,
                "password",
            )
            .expect("seed user");
    }

    #[actix_web::test]
    async fn teacher_creates_a_course_they_own() {
        let (state, store) = in_memory_state();
        seed(&store, "t@school.com", Role::Teacher);
        let category = store.seed_category("Mathematics");
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "t@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "title": "Algebra I",
                    "categoryId": category.id,
                    "delivery": "face_to_face",
                    "capacity": 25,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("title").and_then(Value::as_str), Some("Algebra I"));
        assert!(body.get("teacherId").and_then(Value::as_str).is_some());
    }

    #[actix_web::test]
    async fn student_may_not_create_courses() {
        let (state, store) = in_memory_state();
        seed(&store, "s@school.com", Role::Student);
        let category = store.seed_category("Mathematics");
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "s@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "title": "Algebra I",
                    "categoryId": category.id,
                    "delivery": "online",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn zero_capacity_course_is_rejected_with_field_details() {
        let (state, store) = in_memory_state();
        seed(&store, "t@school.com", Role::Teacher);
        let category = store.seed_category("Mathematics");
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "t@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "title": "Algebra I",
                    "categoryId": category.id,
                    "delivery": "face_to_face",
                    "capacity": 0,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("details")
                .and_then(|d| d.get("field"))
                .and_then(Value::as_str),
            Some("capacity")
        );
    }

    #[actix_web::test]
    async fn admin_assigns_and_unassigns_a_teacher() {
        let (state, store) = in_memory_state();
        seed(&store, "a@school.com", Role::Admin);
        let teacher = store
            .seed_user(
                &Email::new("t@school.com").expect("valid email"),
                "Teacher",
                Role::Teacher,
                "password",
            )
            .expect("seed teacher");
        let category = store.seed_category("Science");
        let course = store.seed_course(
            "Physics",
            category.id,
            None,
            crate::domain::CapacityMode::Limited(10),
        );
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "a@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/courses/{}/teacher", course.id))
                .cookie(cookie.clone())
                .set_json(&AssignTeacherRequest {
                    teacher_id: Some(*teacher.id.as_uuid()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/courses/{}/teacher", course.id))
                .cookie(cookie)
                .set_json(&AssignTeacherRequest { teacher_id: None })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn assigning_a_student_as_teacher_is_unprocessable() {
        let (state, store) = in_memory_state();
        seed(&store, "a@school.com", Role::Admin);
        let student = store
            .seed_user(
                &Email::new("s@school.com").expect("valid email"),
                "Student",
                Role::Student,
                "password",
            )
            .expect("seed student");
        let category = store.seed_category("Science");
        let course = store.seed_course(
            "Physics",
            category.id,
            None,
            crate::domain::CapacityMode::Limited(10),
        );
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "a@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/courses/{}/teacher", course.id))
                .cookie(cookie)
                .set_json(&AssignTeacherRequest {
                    teacher_id: Some(*student.id.as_uuid()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn deleting_an_unknown_course_is_not_found() {
        let (state, store) = in_memory_state();
        seed(&store, "a@school.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "a@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/courses/{}", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn course_detail_reports_the_seat_count() {
        let (state, store) = in_memory_state();
        seed(&store, "s@school.com", Role::Student);
        let category = store.seed_category("Technology");
        let course = store.seed_course(
            "Robotics",
            category.id,
            None,
            crate::domain::CapacityMode::Limited(12),
        );
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_as(&app, "s@school.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/courses/{}", course.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("title").and_then(Value::as_str), Some("Robotics"));
        assert_eq!(body.get("enrolledCount").and_then(Value::as_u64), Some(0));
        assert_eq!(body.get("enrolled").and_then(Value::as_bool), Some(false));
    }

    #[actix_web::test]
    async fn catalogue_requires_authentication() {
        let (state, _store) = in_memory_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/courses")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
