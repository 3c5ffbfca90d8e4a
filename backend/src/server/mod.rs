//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;

use backend::domain::ports::{CourseRepository, EnrollmentRepository, LoginService, UserRepository};
use backend::domain::{AccountService, CourseAdminService, Email, EnrollmentService, Role};
use backend::inbound::http::auth::{login, logout, me, signup};
use backend::inbound::http::courses::{
    assign_teacher, claim_course, create_course, delete_course, get_course, list_categories,
    list_courses,
};
use backend::inbound::http::enrollments::{drop_course, enroll, remove_student};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{list_users, update_role};
use backend::outbound::persistence::{
    DieselCourseRepository, DieselEnrollmentRepository, DieselLoginService, DieselUserRepository,
    InMemoryStore,
};
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Category names seeded into the development store so course creation works
/// without a database.
const DEV_CATEGORIES: &[&str] = &[
    "Mathematics",
    "Science",
    "History",
    "Language Arts",
    "Technology",
    "Art",
    "Music",
    "Physical Education",
];

/// Development login seeded into the in-memory store.
const DEV_ADMIN_EMAIL: &str = "admin@school.com";
const DEV_ADMIN_PASSWORD: &str = "password";

/// Wire handler state from the configuration.
///
/// With a pool, every port is backed by Diesel; without one the in-memory
/// store backs all of them and a development admin account is seeded.
fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            let users = DieselUserRepository::new(pool.clone());
            let courses: Arc<dyn CourseRepository> =
                Arc::new(DieselCourseRepository::new(pool.clone()));
            let enrollments: Arc<dyn EnrollmentRepository> =
                Arc::new(DieselEnrollmentRepository::new(pool.clone()));
            let login_svc: Arc<dyn LoginService> = Arc::new(DieselLoginService::new(users.clone()));
            let users: Arc<dyn UserRepository> = Arc::new(users);
            Ok(HttpState::new(
                login_svc,
                AccountService::new(Arc::clone(&users)),
                EnrollmentService::new(Arc::clone(&courses), enrollments),
                CourseAdminService::new(courses, users),
            ))
        }
        None => {
            warn!("no database configured; using the in-memory store (development only)");
            let store = Arc::new(InMemoryStore::new());
            let admin_email = Email::new(DEV_ADMIN_EMAIL)
                .map_err(|err| std::io::Error::other(format!("dev admin email: {err}")))?;
            store
                .seed_user(&admin_email, "Site Admin", Role::Admin, DEV_ADMIN_PASSWORD)
                .map_err(|err| std::io::Error::other(format!("dev admin account: {err}")))?;
            for name in DEV_CATEGORIES {
                store.seed_category(name);
            }
            Ok(HttpState::new(
                Arc::clone(&store) as Arc<dyn LoginService>,
                AccountService::new(Arc::clone(&store) as Arc<dyn UserRepository>),
                EnrollmentService::new(
                    Arc::clone(&store) as Arc<dyn CourseRepository>,
                    Arc::clone(&store) as Arc<dyn EnrollmentRepository>,
                ),
                CourseAdminService::new(
                    Arc::clone(&store) as Arc<dyn CourseRepository>,
                    Arc::clone(&store) as Arc<dyn UserRepository>,
                ),
            ))
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(signup)
        .service(me)
        .service(list_courses)
        .service(get_course)
        .service(list_categories)
        .service(create_course)
        .service(delete_course)
        .service(assign_teacher)
        .service(claim_course)
        .service(enroll)
        .service(drop_course)
        .service(remove_student)
        .service(list_users)
        .service(update_role);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the dev store cannot be seeded or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
