//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; `diesel print-schema` against a
//! migrated database regenerates it.

diesel::table! {
    /// Registered users. `username` and `email` carry unique constraints
    /// `users_username_key` and `users_email_key`.
    users (id) {
        id -> Int4,
        username -> Varchar,
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Calculations, removed with their owner via `ON DELETE CASCADE`.
    calculations (id) {
        id -> Int4,
        operation -> Varchar,
        operand_a -> Float8,
        operand_b -> Float8,
        result -> Float8,
        timestamp -> Timestamptz,
        user_id -> Int4,
    }
}

diesel::joinable!(calculations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(calculations, users);
