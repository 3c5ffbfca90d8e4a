//! Course catalogue entities and seat-capacity rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Default seat count applied to face-to-face courses created without an
/// explicit capacity.
pub const DEFAULT_FACE_TO_FACE_SEATS: u32 = 40;

/// Maximum permitted course title length.
pub const TITLE_MAX: usize = 120;

/// Validation errors returned by the course constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    /// Identifier was not a UUID.
    InvalidId,
    /// Title was blank once trimmed.
    EmptyTitle,
    /// Title exceeds [`TITLE_MAX`] characters.
    TitleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// A limited course must have at least one seat.
    ZeroCapacity,
    /// Delivery tag is not one of `face_to_face`, `online`.
    UnknownDelivery,
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "course id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "course title must not be empty"),
            Self::TitleTooLong { max } => {
                write!(f, "course title must be at most {max} characters")
            }
            Self::ZeroCapacity => write!(f, "course capacity must be at least one seat"),
            Self::UnknownDelivery => write!(f, "delivery must be face_to_face or online"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

/// Stable course identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Validate and construct a [`CourseId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| CourseValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable category identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Subject grouping for catalogue display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Stable category identifier.
    pub id: CategoryId,
    /// Unique category name, e.g. `Mathematics`.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// How a course is delivered.
///
/// Delivery determines the capacity default: face-to-face courses are
/// seat-limited unless stated otherwise, online courses are unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Taught in a physical classroom.
    FaceToFace,
    /// Taught remotely with no room constraint.
    Online,
}

impl Delivery {
    /// Stable tag used in the database and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FaceToFace => "face_to_face",
            Self::Online => "online",
        }
    }

    /// Parse the stable tag back into a delivery mode.
    pub fn parse(raw: &str) -> Result<Self, CourseValidationError> {
        match raw {
            "face_to_face" => Ok(Self::FaceToFace),
            "online" => Ok(Self::Online),
            _ => Err(CourseValidationError::UnknownDelivery),
        }
    }
}

/// Seat-accounting mode for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "mode", content = "seats")]
pub enum CapacityMode {
    /// Any number of students may enroll.
    Unlimited,
    /// Enrollment count is bounded by the seat count.
    Limited(u32),
}

impl CapacityMode {
    /// Construct a limited mode, rejecting a zero seat count.
    pub const fn limited(seats: u32) -> Result<Self, CourseValidationError> {
        if seats == 0 {
            Err(CourseValidationError::ZeroCapacity)
        } else {
            Ok(Self::Limited(seats))
        }
    }

    /// Derive the mode from the stored delivery tag and capacity column.
    ///
    /// Mirrors the catalogue rule: a course is seat-limited exactly when it is
    /// face-to-face and carries a capacity value. An online course's capacity
    /// column is ignored.
    pub const fn from_stored(delivery: Delivery, capacity: Option<u32>) -> Self {
        match (delivery, capacity) {
            (Delivery::FaceToFace, Some(seats)) if seats > 0 => Self::Limited(seats),
            _ => Self::Unlimited,
        }
    }

    /// Seat count for limited courses, `None` when unlimited.
    pub const fn seats(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(seats) => Some(seats),
        }
    }

    /// Whether a course at `enrolled` students has no seat left.
    pub const fn is_full_at(self, enrolled: u64) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limited(seats) => enrolled >= seats as u64,
        }
    }
}

/// Catalogue course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Stable course identifier.
    pub id: CourseId,
    /// Course title shown in the catalogue.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Short summary for card views.
    pub summary: String,
    /// Week-by-week outline.
    pub curriculum: String,
    /// Subject grouping.
    pub category_id: CategoryId,
    /// Owning teacher; `None` when unassigned.
    pub teacher_id: Option<UserId>,
    /// Delivery mode.
    pub delivery: Delivery,
    /// Seat-accounting mode.
    pub capacity: CapacityMode,
    /// Creation timestamp, newest-first ordering in listings.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    title: String,
    description: String,
    summary: String,
    curriculum: String,
    category_id: CategoryId,
    delivery: Delivery,
    capacity: Option<u32>,
}

impl CourseDraft {
    /// Validate raw input into a draft.
    ///
    /// An explicit capacity of zero is rejected; an omitted capacity falls
    /// back to [`DEFAULT_FACE_TO_FACE_SEATS`] for face-to-face delivery and
    /// to unlimited for online delivery.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        summary: impl Into<String>,
        curriculum: impl Into<String>,
        category_id: CategoryId,
        delivery: Delivery,
        capacity: Option<u32>,
    ) -> Result<Self, CourseValidationError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CourseValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(CourseValidationError::TitleTooLong { max: TITLE_MAX });
        }
        if capacity == Some(0) {
            return Err(CourseValidationError::ZeroCapacity);
        }
        Ok(Self {
            title,
            description: description.into(),
            summary: summary.into(),
            curriculum: curriculum.into(),
            category_id,
            delivery,
            capacity,
        })
    }

    /// Seat-accounting mode this draft resolves to.
    pub const fn capacity_mode(&self) -> CapacityMode {
        match (self.delivery, self.capacity) {
            (Delivery::Online, _) => CapacityMode::Unlimited,
            (Delivery::FaceToFace, Some(seats)) => CapacityMode::Limited(seats),
            (Delivery::FaceToFace, None) => CapacityMode::Limited(DEFAULT_FACE_TO_FACE_SEATS),
        }
    }

    /// Materialise the draft into a course owned by `teacher_id`.
    pub fn into_course(self, teacher_id: Option<UserId>, created_at: DateTime<Utc>) -> Course {
        let capacity = self.capacity_mode();
        Course {
            id: CourseId::random(),
            title: self.title,
            description: self.description,
            summary: self.summary,
            curriculum: self.curriculum,
            category_id: self.category_id,
            teacher_id,
            delivery: self.delivery,
            capacity,
            created_at,
        }
    }
}

/// Catalogue entry as presented to a student: course metadata plus live seat
/// accounting and the caller's own enrollment flag.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseOverview {
    /// Course metadata.
    #[serde(flatten)]
    pub course: Course,
    /// Number of students currently enrolled.
    pub enrolled_count: u64,
    /// Whether the requesting user holds an enrollment.
    pub enrolled: bool,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn draft(delivery: Delivery, capacity: Option<u32>) -> CourseDraft {
        CourseDraft::new(
            "Algebra I",
            "A comprehensive algebra course.",
            "Key algebra concepts.",
            "Week 1: Intro",
            CategoryId::random(),
            delivery,
            capacity,
        )
        .expect("valid draft")
    }

    #[rstest]
    fn limited_mode_rejects_zero_seats() {
        let err = CapacityMode::limited(0).expect_err("zero seats must fail");
        assert_eq!(err, CourseValidationError::ZeroCapacity);
    }

    #[rstest]
    #[case(Delivery::FaceToFace, Some(25), CapacityMode::Limited(25))]
    #[case(Delivery::FaceToFace, None, CapacityMode::Unlimited)]
    #[case(Delivery::Online, Some(25), CapacityMode::Unlimited)]
    #[case(Delivery::Online, None, CapacityMode::Unlimited)]
    fn stored_columns_map_onto_capacity_mode(
        #[case] delivery: Delivery,
        #[case] capacity: Option<u32>,
        #[case] expected: CapacityMode,
    ) {
        assert_eq!(CapacityMode::from_stored(delivery, capacity), expected);
    }

    #[rstest]
    #[case(CapacityMode::Limited(2), 1, false)]
    #[case(CapacityMode::Limited(2), 2, true)]
    #[case(CapacityMode::Limited(2), 3, true)]
    #[case(CapacityMode::Unlimited, u64::MAX, false)]
    fn fullness_tracks_seat_count(
        #[case] mode: CapacityMode,
        #[case] enrolled: u64,
        #[case] full: bool,
    ) {
        assert_eq!(mode.is_full_at(enrolled), full);
    }

    #[rstest]
    fn face_to_face_draft_defaults_to_forty_seats() {
        assert_eq!(
            draft(Delivery::FaceToFace, None).capacity_mode(),
            CapacityMode::Limited(DEFAULT_FACE_TO_FACE_SEATS)
        );
    }

    #[rstest]
    fn online_draft_ignores_requested_capacity() {
        assert_eq!(
            draft(Delivery::Online, Some(10)).capacity_mode(),
            CapacityMode::Unlimited
        );
    }

    #[rstest]
    fn draft_rejects_blank_title() {
        let err = CourseDraft::new(
            "   ",
            "",
            "",
            "",
            CategoryId::random(),
            Delivery::Online,
            None,
        )
        .expect_err("blank title must fail");
        assert_eq!(err, CourseValidationError::EmptyTitle);
    }

    #[rstest]
    fn draft_rejects_explicit_zero_capacity() {
        let err = CourseDraft::new(
            "Geometry",
            "",
            "",
            "",
            CategoryId::random(),
            Delivery::FaceToFace,
            Some(0),
        )
        .expect_err("zero capacity must fail");
        assert_eq!(err, CourseValidationError::ZeroCapacity);
    }

    #[rstest]
    #[case(Delivery::FaceToFace, "face_to_face")]
    #[case(Delivery::Online, "online")]
    fn delivery_tags_round_trip(#[case] delivery: Delivery, #[case] tag: &str) {
        assert_eq!(delivery.as_str(), tag);
        assert_eq!(Delivery::parse(tag).expect("known tag"), delivery);
    }
}
