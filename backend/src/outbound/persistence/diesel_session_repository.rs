//! PostgreSQL-backed [`SessionRepository`].
//!
//! The session state enum is flattened into a label plus the nullable
//! columns that belong to each state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::{Session, SessionId, SessionState, UserId};

use super::diesel_error_mapping::DieselFailure;
use super::models::{SessionChangeset, SessionRow};
use super::pool::DbPool;
use super::schema::sessions;

/// Diesel implementation of the session port.
#[derive(Debug, Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<DieselFailure>) -> SessionRepositoryError {
    match failure.into() {
        DieselFailure::Connection(message) => SessionRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            SessionRepositoryError::query("session already exists")
        }
        DieselFailure::Query(message) => SessionRepositoryError::query(message),
    }
}

struct StateColumns<'a> {
    label: &'static str,
    code_hash: Option<&'a str>,
    attempts: i16,
    verified_at: Option<chrono::DateTime<chrono::Utc>>,
    revoked_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn state_columns(state: &SessionState) -> StateColumns<'_> {
    let mut columns = StateColumns {
        label: state.label(),
        code_hash: None,
        attempts: 0,
        verified_at: None,
        revoked_at: None,
    };
    match state {
        SessionState::PendingVerification {
            code_hash,
            attempts,
        } => {
            columns.code_hash = Some(code_hash.as_str());
            columns.attempts = i16::from(*attempts);
        }
        SessionState::Active { verified_at } => columns.verified_at = Some(*verified_at),
        SessionState::Revoked { revoked_at } => columns.revoked_at = Some(*revoked_at),
    }
    columns
}

fn decode_error(id: uuid::Uuid, reason: &str) -> SessionRepositoryError {
    SessionRepositoryError::query(format!("stored session {id} is invalid: {reason}"))
}

fn row_to_session(row: SessionRow) -> Result<Session, SessionRepositoryError> {
    let state = match row.state.as_str() {
        "pending_verification" => SessionState::PendingVerification {
            code_hash: row
                .code_hash
                .ok_or_else(|| decode_error(row.id, "pending session without code"))?,
            attempts: u8::try_from(row.attempts)
                .map_err(|_| decode_error(row.id, "attempt counter out of range"))?,
        },
        "active" => SessionState::Active {
            verified_at: row
                .verified_at
                .ok_or_else(|| decode_error(row.id, "active session without verification time"))?,
        },
        "revoked" => SessionState::Revoked {
            revoked_at: row
                .revoked_at
                .ok_or_else(|| decode_error(row.id, "revoked session without revocation time"))?,
        },
        _ => return Err(decode_error(row.id, "unknown state")),
    };
    Session::restore(
        SessionId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        state,
        row.created_at,
        row.expires_at,
    )
    .ok_or_else(|| decode_error(row.id, "timestamps or attempts out of bounds"))
}

fn session_to_row(session: &Session) -> SessionRow {
    let columns = state_columns(session.state());
    SessionRow {
        id: *session.id().as_uuid(),
        user_id: *session.user_id().as_uuid(),
        state: columns.label.to_owned(),
        code_hash: columns.code_hash.map(str::to_owned),
        attempts: columns.attempts,
        verified_at: columns.verified_at,
        revoked_at: columns.revoked_at,
        created_at: session.created_at(),
        expires_at: session.expires_at(),
    }
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = diesel::insert_into(sessions::table)
            .values(&session_to_row(session))
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;
        row_to_session(row)
    }

    async fn update(&self, session: &Session) -> Result<Session, SessionRepositoryError> {
        let columns = state_columns(session.state());
        let changes = SessionChangeset {
            state: columns.label,
            code_hash: columns.code_hash,
            attempts: columns.attempts,
            verified_at: columns.verified_at,
            revoked_at: columns.revoked_at,
            expires_at: session.expires_at(),
        };
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = diesel::update(sessions::table.find(session.id().as_uuid()))
            .set(&changes)
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .ok_or_else(|| SessionRepositoryError::not_found(session.id().to_string()))?;
        row_to_session(row)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        sessions::table
            .find(id.as_uuid())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(row_to_session)
            .transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        sessions::table
            .filter(sessions::user_id.eq(user_id.as_uuid()))
            .order(sessions::created_at.desc())
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?
            .into_iter()
            .map(row_to_session)
            .collect()
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let deleted = diesel::delete(sessions::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_failure)?;
        Ok(deleted > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
            .execute(&mut conn)
            .await
            .map_err(map_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerificationCode;
    use crate::test_support::fixture_now;
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    #[fixture]
    fn code() -> VerificationCode {
        VerificationCode::parse("314159").expect("valid code")
    }

    #[fixture]
    fn pending(code: VerificationCode) -> Session {
        Session::pending(SessionId::random(), UserId::random(), &code, fixture_now())
    }

    #[rstest]
    fn every_state_survives_storage(mut pending: Session, code: VerificationCode) {
        let restored = row_to_session(session_to_row(&pending)).expect("pending row");
        assert_eq!(restored, pending);

        pending
            .verify(&code, fixture_now() + TimeDelta::minutes(1))
            .expect("verify");
        let restored = row_to_session(session_to_row(&pending)).expect("active row");
        assert_eq!(restored, pending);

        pending.revoke(fixture_now() + TimeDelta::hours(1));
        let restored = row_to_session(session_to_row(&pending)).expect("revoked row");
        assert_eq!(restored, pending);
    }

    #[rstest]
    fn pending_row_without_code_is_rejected(pending: Session) {
        let mut row = session_to_row(&pending);
        row.code_hash = None;
        let err = row_to_session(row).expect_err("missing code hash");
        assert!(matches!(err, SessionRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case("suspended")]
    #[case("")]
    fn unknown_state_is_rejected(pending: Session, #[case] state: &str) {
        let mut row = session_to_row(&pending);
        row.state = state.to_owned();
        assert!(row_to_session(row).is_err());
    }
}
