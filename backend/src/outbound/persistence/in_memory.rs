//! In-memory store implementing every persistence port plus login.
//!
//! Used by the development server when no database URL is configured, and by
//! tests that need a real (stateful) store instead of per-call mocks. One
//! mutex guards the whole store, so the reserve operation's check-and-insert
//! is trivially atomic — the same contract the Diesel adapter provides with
//! row locks.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    CoursePersistenceError, CourseRepository, CourseWithCount, EnrollmentPersistenceError,
    EnrollmentRepository, LoginService, SeatReservation, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CapacityMode, Category, CategoryId, Course, CourseId, Delivery, DisplayName, Email, Error,
    LoginCredentials, PasswordDigest, Role, User, UserId, UserValidationError,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, (User, PasswordDigest)>,
    user_order: Vec<Uuid>,
    categories: Vec<Category>,
    courses: HashMap<Uuid, Course>,
    course_order: Vec<Uuid>,
    enrollments: HashSet<(Uuid, Uuid)>,
}

/// Shared in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a category directly, bypassing the port layer.
    pub fn seed_category(&self, name: &str) -> Category {
        let category = Category {
            id: CategoryId::random(),
            name: name.to_owned(),
            description: format!("{name} courses"),
        };
        self.locked().categories.push(category.clone());
        category
    }

    /// Seed a user directly, bypassing the port layer.
    pub fn seed_user(
        &self,
        email: &Email,
        display_name: &str,
        role: Role,
        password: &str,
    ) -> Result<User, UserValidationError> {
        let user = User::new(
            UserId::random(),
            email.clone(),
            DisplayName::new(display_name)?,
            role,
        );
        let digest = PasswordDigest::derive(password);
        let mut state = self.locked();
        state.users.insert(*user.id.as_uuid(), (user.clone(), digest));
        state.user_order.push(*user.id.as_uuid());
        Ok(user)
    }

    /// Seed a course directly, bypassing the port layer.
    ///
    /// The delivery mode is derived from the capacity: limited courses are
    /// face-to-face, unlimited courses are online.
    pub fn seed_course(
        &self,
        title: &str,
        category: CategoryId,
        teacher: Option<UserId>,
        capacity: CapacityMode,
    ) -> Course {
        let delivery = match capacity {
            CapacityMode::Limited(_) => Delivery::FaceToFace,
            CapacityMode::Unlimited => Delivery::Online,
        };
        let course = Course {
            id: CourseId::random(),
            title: title.to_owned(),
            description: format!("A comprehensive course: {title}."),
            summary: format!("Key concepts in {title}."),
            curriculum: "Week 1: Intro".to_owned(),
            category_id: category,
            teacher_id: teacher,
            delivery,
            capacity,
            created_at: Utc::now(),
        };
        let mut state = self.locked();
        state.courses.insert(*course.id.as_uuid(), course.clone());
        state.course_order.push(*course.id.as_uuid());
        course
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.locked();
        if state
            .users
            .values()
            .any(|(existing, _)| existing.email == user.email)
        {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        state
            .users
            .insert(*user.id.as_uuid(), (user.clone(), digest.clone()));
        state.user_order.push(*user.id.as_uuid());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .locked()
            .users
            .get(id.as_uuid())
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, UserPersistenceError> {
        Ok(self
            .locked()
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.locked();
        Ok(state
            .user_order
            .iter()
            .rev()
            .filter_map(|id| state.users.get(id).map(|(user, _)| user.clone()))
            .collect())
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<bool, UserPersistenceError> {
        let mut state = self.locked();
        match state.users.get_mut(id.as_uuid()) {
            Some((user, _)) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut state = self.locked();
        state.courses.insert(*course.id.as_uuid(), course.clone());
        state.course_order.push(*course.id.as_uuid());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        Ok(self.locked().courses.get(id.as_uuid()).cloned())
    }

    async fn list_with_counts(&self) -> Result<Vec<CourseWithCount>, CoursePersistenceError> {
        let state = self.locked();
        Ok(state
            .course_order
            .iter()
            .rev()
            .filter_map(|id| state.courses.get(id))
            .map(|course| {
                let enrolled_count = state
                    .enrollments
                    .iter()
                    .filter(|(_, course_id)| course_id == course.id.as_uuid())
                    .count() as u64;
                CourseWithCount {
                    course: course.clone(),
                    enrolled_count,
                }
            })
            .collect())
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError> {
        let mut state = self.locked();
        let existed = state.courses.remove(id.as_uuid()).is_some();
        if existed {
            // Cascade, mirroring the SQL foreign key.
            state
                .enrollments
                .retain(|(_, course_id)| course_id != id.as_uuid());
            state.course_order.retain(|other| other != id.as_uuid());
        }
        Ok(existed)
    }

    async fn set_teacher(
        &self,
        id: &CourseId,
        teacher: Option<UserId>,
    ) -> Result<bool, CoursePersistenceError> {
        let mut state = self.locked();
        match state.courses.get_mut(id.as_uuid()) {
            Some(course) => {
                course.teacher_id = teacher;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoursePersistenceError> {
        let mut categories = self.locked().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn reserve_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<SeatReservation, EnrollmentPersistenceError> {
        // The store-wide mutex is held across the whole check-and-insert,
        // which is exactly the atomic unit the port contract requires.
        let mut state = self.locked();
        let Some(found) = state.courses.get(course.as_uuid()) else {
            return Ok(SeatReservation::CourseMissing);
        };
        let key = (*user.as_uuid(), *course.as_uuid());
        if state.enrollments.contains(&key) {
            return Ok(SeatReservation::AlreadyEnrolled);
        }
        let enrolled = state
            .enrollments
            .iter()
            .filter(|(_, course_id)| course_id == course.as_uuid())
            .count() as u64;
        if found.capacity.is_full_at(enrolled) {
            return Ok(SeatReservation::CourseFull);
        }
        state.enrollments.insert(key);
        Ok(SeatReservation::Inserted)
    }

    async fn release_seat(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError> {
        Ok(self
            .locked()
            .enrollments
            .remove(&(*user.as_uuid(), *course.as_uuid())))
    }

    async fn count_for_course(
        &self,
        course: &CourseId,
    ) -> Result<u64, EnrollmentPersistenceError> {
        Ok(self
            .locked()
            .enrollments
            .iter()
            .filter(|(_, course_id)| course_id == course.as_uuid())
            .count() as u64)
    }

    async fn course_ids_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseId>, EnrollmentPersistenceError> {
        Ok(self
            .locked()
            .enrollments
            .iter()
            .filter(|(user_id, _)| user_id == user.as_uuid())
            .map(|(_, course_id)| CourseId::from_uuid(*course_id))
            .collect())
    }
}

#[async_trait]
impl LoginService for InMemoryStore {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let found = self
            .locked()
            .users
            .values()
            .find(|(user, _)| user.email == *credentials.email())
            .cloned();
        match found {
            Some((user, digest)) if digest.verify(credentials.password()) => Ok(user),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
