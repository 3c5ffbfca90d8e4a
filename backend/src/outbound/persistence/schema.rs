//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema` when
//! the migrations change.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier (matches the identity provider id).
        id -> Uuid,
        /// Login email, unique across accounts.
        email -> Varchar,
        /// Name shown on rosters and dashboards.
        display_name -> Varchar,
        /// Role tag: `student`, `teacher`, or `admin`.
        role -> Varchar,
        /// Per-account salt for the password digest.
        password_salt -> Varchar,
        /// Salted SHA-256 password digest, lowercase hex.
        password_digest -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subject groupings for catalogue display.
    categories (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique category name.
        name -> Varchar,
        /// Free-form description.
        description -> Text,
    }
}

diesel::table! {
    /// Catalogue courses.
    ///
    /// `teacher_id` is a weak reference: deleting a teacher leaves their
    /// courses unassigned (`ON DELETE SET NULL`), never cascading into
    /// enrollments.
    courses (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Course title shown in the catalogue.
        title -> Varchar,
        /// Long-form description.
        description -> Text,
        /// Short summary for card views.
        summary -> Text,
        /// Week-by-week outline.
        curriculum -> Text,
        /// Subject grouping.
        category_id -> Uuid,
        /// Owning teacher; null when unassigned.
        teacher_id -> Nullable<Uuid>,
        /// Delivery tag: `face_to_face` or `online`.
        delivery -> Varchar,
        /// Seat count; null means unlimited. Checked positive in SQL.
        capacity -> Nullable<Int4>,
        /// Record creation timestamp, newest-first ordering in listings.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Enrollment rows: one per (user, course) membership.
    ///
    /// The composite primary key enforces at most one row per pair; both
    /// foreign keys cascade on delete so removing a user or course removes
    /// the membership rows with it.
    enrollments (user_id, course_id) {
        /// Enrolled student.
        user_id -> Uuid,
        /// Course enrolled in.
        course_id -> Uuid,
        /// When the seat was taken.
        enrolled_at -> Timestamptz,
    }
}

diesel::joinable!(courses -> categories (category_id));
diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(enrollments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, categories, courses, enrollments);
