//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `username` and `email` are unique.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        is_staff -> Bool,
        /// Encoded salted digest; see `domain::password`.
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Staff-managed request categories. `name` is unique.
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Design requests.
    applications (id) {
        id -> Uuid,
        applicant_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category_id -> Uuid,
        /// Reference image location, e.g. `applications/<uuid>.jpg`.
        image -> Varchar,
        design_image -> Nullable<Varchar>,
        /// One of `N`, `P`, `D`.
        status -> Varchar,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
        favorite -> Bool,
    }
}

diesel::joinable!(applications -> users (applicant_id));
diesel::joinable!(applications -> categories (category_id));

diesel::allow_tables_to_appear_in_same_query!(applications, categories, users);
