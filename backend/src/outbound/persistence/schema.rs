//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` and `email` carry the unique constraints
    /// `users_username_key` and `users_email_key`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        #[max_length = 64]
        username -> Varchar,
        /// Stored lower-cased.
        #[max_length = 254]
        email -> Varchar,
        /// Argon2id hash in PHC string format.
        password_hash -> Text,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 100]
        surname -> Varchar,
        #[max_length = 32]
        phone -> Varchar,
        created_at -> Timestamptz,
    }
}
