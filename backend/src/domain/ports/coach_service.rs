//! Driving port for the coach conversation.

use async_trait::async_trait;

use crate::domain::{CoachPrompt, CoachReply, Error, UserId};

/// Coach use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoachService: Send + Sync {
    /// Reply to the user's prompt. Forbidden until onboarding is complete.
    async fn ask(&self, user_id: &UserId, prompt: CoachPrompt) -> Result<CoachReply, Error>;
}
