//! End-to-end enrollment flow over the HTTP surface with the in-memory
//! store: session login, capacity-aware enrollment, drops, and the
//! catalogue view.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use backend::domain::ports::{
    CourseRepository, EnrollmentRepository, LoginService, UserRepository,
};
use backend::domain::{AccountService, CourseAdminService, Email, EnrollmentService, Role};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::InMemoryStore;

fn app_over(
    store: &Arc<InMemoryStore>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let state = HttpState::new(
        Arc::clone(store) as Arc<dyn LoginService>,
        AccountService::new(Arc::clone(store) as Arc<dyn UserRepository>),
        EnrollmentService::new(
            Arc::clone(store) as Arc<dyn CourseRepository>,
            Arc::clone(store) as Arc<dyn EnrollmentRepository>,
        ),
        CourseAdminService::new(
            Arc::clone(store) as Arc<dyn CourseRepository>,
            Arc::clone(store) as Arc<dyn UserRepository>,
        ),
    );
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();

    App::new()
        .app_data(web::Data::new(state))
        .wrap(session)
        .service(
            web::scope("/api/v1")
                .service(backend::inbound::http::auth::login)
                .service(backend::inbound::http::auth::logout)
                .service(backend::inbound::http::auth::signup)
                .service(backend::inbound::http::auth::me)
                .service(backend::inbound::http::courses::list_courses)
                .service(backend::inbound::http::courses::get_course)
                .service(backend::inbound::http::courses::list_categories)
                .service(backend::inbound::http::courses::create_course)
                .service(backend::inbound::http::courses::delete_course)
                .service(backend::inbound::http::courses::assign_teacher)
                .service(backend::inbound::http::courses::claim_course)
                .service(backend::inbound::http::enrollments::enroll)
                .service(backend::inbound::http::enrollments::drop_course)
                .service(backend::inbound::http::enrollments::remove_student)
                .service(backend::inbound::http::users::list_users)
                .service(backend::inbound::http::users::update_role),
        )
}

async fn login_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": password }))
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

async fn signup(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
    name: &str,
) {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "email": email,
                "displayName": name,
                "password": "longenough",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

fn seed_admin(store: &Arc<InMemoryStore>) {
    store
        .seed_user(
            &Email::new("admin@school.com").expect("valid email"),
            "Site Admin",
            Role::Admin,
            "password",
        )
        .expect("seed admin");
}

#[actix_web::test]
async fn last_seat_contention_resolves_through_the_full_stack() {
    let store = Arc::new(InMemoryStore::new());
    seed_admin(&store);
    let category = store.seed_category("Music");
    let app = actix_test::init_service(app_over(&store)).await;

    // Admin creates a single-seat course.
    let admin = login_as(&app, "admin@school.com", "password").await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(admin)
            .set_json(json!({
                "title": "Choir",
                "categoryId": category.id,
                "delivery": "face_to_face",
                "capacity": 1,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let course: Value = actix_test::read_body_json(res).await;
    let course_id = course
        .get("id")
        .and_then(Value::as_str)
        .expect("course id")
        .to_owned();

    signup(&app, "alice@school.com", "Alice").await;
    signup(&app, "bob@school.com", "Bob").await;
    let alice = login_as(&app, "alice@school.com", "longenough").await;
    let bob = login_as(&app, "bob@school.com", "longenough").await;

    // Alice takes the only seat.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/enroll"))
            .cookie(alice.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Bob is turned away.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/enroll"))
            .cookie(bob.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Alice drops; the seat frees up for Bob.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{course_id}/enroll"))
            .cookie(alice)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{course_id}/enroll"))
            .cookie(bob.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // The catalogue reflects Bob's seat.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/courses")
            .cookie(bob)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let catalogue: Value = actix_test::read_body_json(res).await;
    let entry = catalogue
        .as_array()
        .expect("catalogue array")
        .iter()
        .find(|c| c.get("id").and_then(Value::as_str) == Some(course_id.as_str()))
        .expect("course listed");
    assert_eq!(entry.get("enrolledCount").and_then(Value::as_u64), Some(1));
    assert_eq!(entry.get("enrolled").and_then(Value::as_bool), Some(true));
}

#[actix_web::test]
async fn promotion_takes_effect_without_a_fresh_login() {
    let store = Arc::new(InMemoryStore::new());
    seed_admin(&store);
    store.seed_category("Science");
    let app = actix_test::init_service(app_over(&store)).await;

    signup(&app, "carol@school.com", "Carol").await;
    let carol = login_as(&app, "carol@school.com", "longenough").await;

    // As a student Carol cannot see the directory.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .cookie(carol.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The admin promotes her to admin; the same session now passes the
    // capability check because identity is re-resolved per request.
    let admin = login_as(&app, "admin@school.com", "password").await;
    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(carol.clone())
            .to_request(),
    )
    .await;
    let me_body: Value = actix_test::read_body_json(me).await;
    let carol_id = me_body.get("id").and_then(Value::as_str).expect("id");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{carol_id}/role"))
            .cookie(admin)
            .set_json(json!({ "role": "admin" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .cookie(carol)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn deleting_a_course_takes_its_enrollments_with_it() {
    let store = Arc::new(InMemoryStore::new());
    seed_admin(&store);
    let category = store.seed_category("History");
    let course = store.seed_course(
        "World History",
        category.id,
        None,
        backend::domain::CapacityMode::Limited(10),
    );
    let app = actix_test::init_service(app_over(&store)).await;

    signup(&app, "dave@school.com", "Dave").await;
    let dave = login_as(&app, "dave@school.com", "longenough").await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{}/enroll", course.id))
            .cookie(dave.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let admin = login_as(&app, "admin@school.com", "password").await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", course.id))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Dave's catalogue no longer lists the course, and his enrollment went
    // with it.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/courses")
            .cookie(dave)
            .to_request(),
    )
    .await;
    let catalogue: Value = actix_test::read_body_json(res).await;
    assert!(
        catalogue
            .as_array()
            .expect("catalogue array")
            .iter()
            .all(|c| c.get("id").and_then(Value::as_str) != Some(&course.id.to_string()))
    );
    let dave_id = user_id_of(&store, "dave@school.com").await;
    assert_eq!(
        store.course_ids_for_user(&dave_id).await.expect("ids"),
        Vec::new()
    );
}

async fn user_id_of(store: &Arc<InMemoryStore>, email: &str) -> backend::domain::UserId {
    store
        .find_credentials(&Email::new(email).expect("valid email"))
        .await
        .expect("lookup")
        .expect("user exists")
        .0
        .id
}
