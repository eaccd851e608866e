//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in step with the migrations; `diesel print-schema` against a
//! migrated database regenerates the same shape.

diesel::table! {
    /// Registered users. `email` is unique (`users_email_key`).
    users (id) {
        id -> Uuid,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 64]
        first_name -> Varchar,
        #[max_length = 64]
        last_name -> Varchar,
        onboarding_complete -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wellness plans. At most one `active` row per user
    /// (`plans_one_active_per_user`).
    plans (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 80]
        title -> Varchar,
        /// Ordered milestone objects: `[{"title", "completedAt"?}]`.
        milestones -> Jsonb,
        current_stage -> Int4,
        #[max_length = 16]
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Daily check-ins, one per user and day (`checkins_user_day_key`).
    checkins (id) {
        id -> Uuid,
        user_id -> Uuid,
        day -> Date,
        energy -> Int2,
        mood -> Int2,
        sleep_hours -> Int2,
        activity_minutes -> Int2,
        #[max_length = 500]
        note -> Nullable<Varchar>,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login sessions. Which nullable columns are set depends on `state`.
    sessions (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 32]
        state -> Varchar,
        #[max_length = 64]
        code_hash -> Nullable<Varchar>,
        attempts -> Int2,
        verified_at -> Nullable<Timestamptz>,
        revoked_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(checkins -> users (user_id));
diesel::joinable!(plans -> users (user_id));
diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(checkins, plans, sessions, users);
