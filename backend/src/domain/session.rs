//! Login sessions and their email verification lifecycle.
//!
//! A session starts pending, holding only the SHA-256 digest of a six-digit
//! code sent to the user. Presenting the right code before expiry activates
//! it; too many wrong codes lock it for good.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroize;

use super::UserId;

/// Wrong codes tolerated before a pending session locks.
pub const MAX_VERIFICATION_ATTEMPTS: u8 = 5;
/// Minutes a pending session waits for its code.
pub const PENDING_SESSION_MINUTES: i64 = 15;
/// Days an active session stays valid.
pub const ACTIVE_SESSION_DAYS: i64 = 30;

const CODE_LEN: usize = 6;

/// Reasons verification can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// Input was not exactly six ASCII digits.
    #[error("verification code must be six digits")]
    MalformedCode,
    /// Code did not match.
    #[error("verification code is incorrect")]
    WrongCode {
        /// Attempts left before the session locks.
        remaining: u8,
    },
    /// Attempt budget exhausted.
    #[error("too many verification attempts")]
    TooManyAttempts,
    /// Pending window elapsed.
    #[error("verification code has expired")]
    Expired,
    /// Session is already active.
    #[error("session is already verified")]
    AlreadyVerified,
    /// Session was logged out.
    #[error("session has been revoked")]
    Revoked,
}

/// Session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Parse an identifier from cookie text. Returns `None` when malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext six-digit verification code. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Draw a uniformly random code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value: u32 = rng.gen_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Parse user input, tolerating surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use retire_strong_backend::domain::VerificationCode;
    ///
    /// assert!(VerificationCode::parse(" 012345 ").is_ok());
    /// assert!(VerificationCode::parse("12345").is_err());
    /// assert!(VerificationCode::parse("12345a").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, VerificationError> {
        let trimmed = raw.trim();
        if trimmed.len() != CODE_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VerificationError::MalformedCode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Plaintext digits, for delivery to the user only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 digest stored in place of the code.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

impl Drop for VerificationCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the emailed code.
    PendingVerification {
        /// Hex SHA-256 digest of the expected code.
        code_hash: String,
        /// Wrong codes presented so far.
        attempts: u8,
    },
    /// Verified and usable until expiry.
    Active {
        /// When the code was accepted.
        verified_at: DateTime<Utc>,
    },
    /// Logged out.
    Revoked {
        /// When the session was revoked.
        revoked_at: DateTime<Utc>,
    },
}

impl SessionState {
    /// Storage label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PendingVerification { .. } => "pending_verification",
            Self::Active { .. } => "active",
            Self::Revoked { .. } => "revoked",
        }
    }
}

/// A login session.
///
/// ## Invariants
/// - `expires_at` is after `created_at`.
/// - Pending sessions never record more than [`MAX_VERIFICATION_ATTEMPTS`]
///   attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    state: SessionState,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a pending session awaiting `code`.
    pub fn pending(
        id: SessionId,
        user_id: UserId,
        code: &VerificationCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            state: SessionState::PendingVerification {
                code_hash: code.digest(),
                attempts: 0,
            },
            created_at: now,
            expires_at: now + Duration::minutes(PENDING_SESSION_MINUTES),
        }
    }

    /// Rehydrate a stored session. Returns `None` when the stored fields
    /// break an invariant.
    pub fn restore(
        id: SessionId,
        user_id: UserId,
        state: SessionState,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Option<Self> {
        if expires_at <= created_at {
            return None;
        }
        if let SessionState::PendingVerification { attempts, .. } = &state {
            if *attempts > MAX_VERIFICATION_ATTEMPTS {
                return None;
            }
        }
        Some(Self {
            id,
            user_id,
            state,
            created_at,
            expires_at,
        })
    }

    /// Identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Owner.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Expiry time.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session authenticates its user at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state, SessionState::Active { .. }) && now < self.expires_at
    }

    /// Check `code`, activating the session on success.
    ///
    /// A wrong code consumes one attempt; callers must persist the session
    /// whether or not this succeeds.
    pub fn verify(
        &mut self,
        code: &VerificationCode,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let (code_hash, attempts) = match &mut self.state {
            SessionState::PendingVerification {
                code_hash,
                attempts,
            } => (code_hash, attempts),
            SessionState::Active { .. } => return Err(VerificationError::AlreadyVerified),
            SessionState::Revoked { .. } => return Err(VerificationError::Revoked),
        };

        if *attempts >= MAX_VERIFICATION_ATTEMPTS {
            return Err(VerificationError::TooManyAttempts);
        }
        if now >= self.expires_at {
            return Err(VerificationError::Expired);
        }
        if code.digest() != *code_hash {
            *attempts += 1;
            let remaining = MAX_VERIFICATION_ATTEMPTS - *attempts;
            return Err(if remaining == 0 {
                VerificationError::TooManyAttempts
            } else {
                VerificationError::WrongCode { remaining }
            });
        }

        self.state = SessionState::Active { verified_at: now };
        self.expires_at = now + Duration::days(ACTIVE_SESSION_DAYS);
        Ok(())
    }

    /// Revoke the session. Revoking twice keeps the first timestamp.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !matches!(self.state, SessionState::Revoked { .. }) {
            self.state = SessionState::Revoked { revoked_at: now };
        }
    }
}
