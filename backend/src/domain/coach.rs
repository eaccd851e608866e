//! Coach conversation values and reply composition.
//!
//! Replies are composed deterministically from what the app already knows
//! about the user: their active plan and their recent check-ins.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{Checkin, Plan};

/// Maximum characters in a coach prompt.
pub const COACH_PROMPT_MAX: usize = 1000;
const MAX_SUGGESTIONS: usize = 3;
const LOW_ENERGY: u8 = 2;
const HIGH_ENERGY: u8 = 4;
const SHORT_SLEEP_HOURS: u8 = 6;
const STREAK_PRAISE_DAYS: u32 = 3;

const TOPICS: &[(&str, &str)] = &[
    ("sleep", "Keep the same wake-up time every day, weekends included."),
    ("walk", "Add a five-minute walk after one meal each day."),
    ("balance", "Practise standing on one leg while holding a counter."),
    ("strength", "Try two sets of ten chair stands."),
    ("stress", "Take three slow breaths before your next meal."),
];

/// Errors raised when a prompt is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoachPromptValidationError {
    /// Prompt was blank.
    #[error("message must not be empty")]
    Empty,
    /// Prompt exceeded [`COACH_PROMPT_MAX`] characters.
    #[error("message must be at most {max} characters")]
    TooLong {
        /// Permitted maximum.
        max: usize,
    },
}

/// Trimmed question or remark addressed to the coach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachPrompt(String);

impl CoachPrompt {
    /// Validate and trim a prompt.
    pub fn new(raw: &str) -> Result<Self, CoachPromptValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoachPromptValidationError::Empty);
        }
        if trimmed.chars().count() > COACH_PROMPT_MAX {
            return Err(CoachPromptValidationError::TooLong {
                max: COACH_PROMPT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CoachPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything the coach may draw on when replying.
#[derive(Debug, Clone)]
pub struct CoachContext {
    /// Name to greet the user by.
    pub first_name: String,
    /// The user's active plan, if any.
    pub active_plan: Option<Plan>,
    /// Recent check-ins, newest first.
    pub recent_checkins: Vec<Checkin>,
    /// Current check-in streak in days.
    pub streak: u32,
    /// The user's current calendar day.
    pub today: NaiveDate,
}

/// Coach response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoachReply {
    /// Conversational reply.
    #[schema(example = "Hi Ada. Your next milestone is \"Chair squats\".")]
    pub message: String,
    /// Concrete next actions, most relevant first.
    pub suggestions: Vec<String>,
}

impl CoachReply {
    /// Compose a reply to `prompt` from `context`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use retire_strong_backend::domain::{CoachContext, CoachPrompt, CoachReply};
    ///
    /// let context = CoachContext {
    ///     first_name: "Ada".into(),
    ///     active_plan: None,
    ///     recent_checkins: Vec::new(),
    ///     streak: 0,
    ///     today: NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid date"),
    /// };
    /// let prompt = CoachPrompt::new("How do I sleep better?").expect("valid prompt");
    /// let reply = CoachReply::compose(&prompt, &context);
    /// assert!(reply.message.starts_with("Hi Ada."));
    /// assert!(!reply.suggestions.is_empty());
    /// ```
    pub fn compose(prompt: &CoachPrompt, context: &CoachContext) -> Self {
        let mut sentences = vec![format!("Hi {}.", context.first_name)];
        let mut suggestions = Vec::new();

        let lowered = prompt.as_ref().to_lowercase();
        suggestions.extend(
            TOPICS
                .iter()
                .filter(|(keyword, _)| lowered.contains(keyword))
                .map(|(_, tip)| (*tip).to_owned()),
        );

        if let Some(latest) = context.recent_checkins.first() {
            let answers = latest.answers();
            let energy = answers.energy().get();
            if energy <= LOW_ENERGY {
                sentences.push("Your energy has been low, so keep today gentle.".to_owned());
            } else if energy >= HIGH_ENERGY {
                sentences.push("Your energy looks good, so today suits a step forward.".to_owned());
            }
            if answers.sleep_hours() < SHORT_SLEEP_HOURS {
                suggestions.push("Aim for an earlier bedtime tonight.".to_owned());
            }
        }

        if context.streak >= STREAK_PRAISE_DAYS {
            sentences.push(format!(
                "You have checked in {} days in a row.",
                context.streak
            ));
        }

        match context.active_plan.as_ref().and_then(Plan::next_milestone) {
            Some(milestone) => {
                sentences.push(format!("Your next milestone is \"{}\".", milestone.title));
                suggestions.push(format!("Spend ten minutes on \"{}\".", milestone.title));
            }
            None => suggestions.push("Create a plan with one small first step.".to_owned()),
        }

        let checked_in_today = context
            .recent_checkins
            .iter()
            .any(|checkin| checkin.day() == context.today);
        if !checked_in_today {
            suggestions.push("Record today's check-in.".to_owned());
        }

        suggestions.truncate(MAX_SUGGESTIONS);
        Self {
            message: sentences.join(" "),
            suggestions,
        }
    }
}
