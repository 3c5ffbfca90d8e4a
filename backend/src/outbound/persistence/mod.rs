//! Persistence adapters: Diesel/PostgreSQL implementations of the domain
//! ports, the shared connection pool, and the in-memory fallback store.

mod diesel_course_repository;
mod diesel_enrollment_repository;
mod diesel_login_service;
mod diesel_user_repository;
mod error_mapping;
mod in_memory;
mod models;
mod pool;
pub mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_user_repository::DieselUserRepository;
pub use in_memory::InMemoryStore;
pub use pool::{DbPool, PoolConfig, PoolError};
