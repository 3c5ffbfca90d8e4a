//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::domain::{
    CapacityMode, Category, Course, CourseOverview, Delivery, Error, ErrorCode, Role, User,
};
use crate::inbound::http;

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Enrollment API",
        description = "Role-based course catalogue, enrollment, and roster management."
    ),
    paths(
        http::auth::login,
        http::auth::logout,
        http::auth::signup,
        http::auth::me,
        http::courses::list_courses,
        http::courses::get_course,
        http::courses::list_categories,
        http::courses::create_course,
        http::courses::delete_course,
        http::courses::assign_teacher,
        http::courses::claim_course,
        http::enrollments::enroll,
        http::enrollments::drop_course,
        http::enrollments::remove_student,
        http::users::list_users,
        http::users::update_role,
        http::health::live,
        http::health::ready,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Course,
        CourseOverview,
        Category,
        CapacityMode,
        Delivery,
        http::auth::LoginRequest,
        http::auth::SignupRequest,
        http::courses::CreateCourseRequest,
        http::courses::AssignTeacherRequest,
        http::enrollments::EnrollResponse,
        http::users::UpdateRoleRequest,
    )),
    tags(
        (name = "auth", description = "Session management"),
        (name = "courses", description = "Catalogue administration"),
        (name = "enrollments", description = "Seat accounting"),
        (name = "users", description = "Account directory"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
