//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Incident reports with geocoded coordinates.
    incidents (id) {
        /// Store-assigned identifier (`SERIAL`).
        id -> Int4,
        /// Location description used for geocoding (max 255 characters).
        title -> Varchar,
        /// Free-text details (max 1000 characters).
        info -> Varchar,
        lat -> Float8,
        lng -> Float8,
        created_at -> Timestamptz,
        /// Refreshed on every update; never earlier than `created_at`.
        updated_at -> Timestamptz,
    }
}
