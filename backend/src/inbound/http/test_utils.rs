//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::ports::{CourseRepository, EnrollmentRepository, LoginService, UserRepository};
use crate::domain::{AccountService, CourseAdminService, EnrollmentService};
use crate::outbound::persistence::InMemoryStore;

use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build handler state over a fresh in-memory store.
///
/// Returns the store alongside the state so tests can seed fixtures and
/// inspect rows directly.
pub fn in_memory_state() -> (HttpState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = HttpState::new(
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
    );
    (state, store)
}
