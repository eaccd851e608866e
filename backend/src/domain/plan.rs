//! Wellness plan aggregate: an ordered list of milestones worked through one
//! stage at a time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Maximum characters in a plan or milestone title.
pub const PLAN_TITLE_MAX: usize = 80;
/// Maximum milestones in one plan.
pub const PLAN_MILESTONES_MAX: usize = 12;

/// Errors raised when plan input or stored state breaks an invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanValidationError {
    /// Plan title was blank.
    #[error("plan title must not be empty")]
    EmptyTitle,
    /// Plan title exceeded [`PLAN_TITLE_MAX`].
    #[error("plan title must be at most {max} characters")]
    TitleTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// No milestones were supplied.
    #[error("plan must contain at least one milestone")]
    NoMilestones,
    /// More than [`PLAN_MILESTONES_MAX`] milestones were supplied.
    #[error("plan must contain at most {max} milestones")]
    TooManyMilestones {
        /// Permitted maximum.
        max: usize,
    },
    /// A milestone title was blank.
    #[error("milestone {index} title must not be empty")]
    EmptyMilestoneTitle {
        /// Zero-based milestone position.
        index: usize,
    },
    /// A milestone title exceeded [`PLAN_TITLE_MAX`].
    #[error("milestone {index} title must be at most {max} characters")]
    MilestoneTitleTooLong {
        /// Zero-based milestone position.
        index: usize,
        /// Permitted maximum.
        max: usize,
    },
    /// Stage, completion stamps and status disagree.
    #[error("plan progress is inconsistent with its milestones")]
    InconsistentProgress,
}

/// Errors raised when progressing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlanProgressError {
    /// Every milestone is already done.
    #[error("plan is already completed")]
    AlreadyCompleted,
}

/// Plan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(Uuid);

impl PlanId {
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

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Milestones remain.
    Active,
    /// Every milestone is complete.
    Completed,
}

impl PlanStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// What the user should work towards.
    #[schema(example = "Walk 20 minutes three times a week")]
    pub title: String,
    /// When the milestone was reached, if it has been.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn check_title(raw: &str) -> Result<String, TitleProblem> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TitleProblem::Empty);
    }
    if trimmed.chars().count() > PLAN_TITLE_MAX {
        return Err(TitleProblem::TooLong);
    }
    Ok(trimmed.to_owned())
}

enum TitleProblem {
    Empty,
    TooLong,
}

/// Validated input for a new plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    title: String,
    milestones: Vec<String>,
}

impl PlanDraft {
    /// Validate a title and milestone titles; all are trimmed.
    ///
    /// # Examples
    /// ```
    /// use retire_strong_backend::domain::PlanDraft;
    ///
    /// let draft = PlanDraft::new(" Stronger legs ", ["Chair squats", "Stairs"])
    ///     .expect("valid draft");
    /// assert_eq!(draft.title(), "Stronger legs");
    /// assert_eq!(draft.milestones().len(), 2);
    /// ```
    pub fn new<I, S>(title: &str, milestones: I) -> Result<Self, PlanValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let title = check_title(title).map_err(|problem| match problem {
            TitleProblem::Empty => PlanValidationError::EmptyTitle,
            TitleProblem::TooLong => PlanValidationError::TitleTooLong {
                max: PLAN_TITLE_MAX,
            },
        })?;

        let milestones = milestones
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                check_title(raw.as_ref()).map_err(|problem| match problem {
                    TitleProblem::Empty => PlanValidationError::EmptyMilestoneTitle { index },
                    TitleProblem::TooLong => PlanValidationError::MilestoneTitleTooLong {
                        index,
                        max: PLAN_TITLE_MAX,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if milestones.is_empty() {
            return Err(PlanValidationError::NoMilestones);
        }
        if milestones.len() > PLAN_MILESTONES_MAX {
            return Err(PlanValidationError::TooManyMilestones {
                max: PLAN_MILESTONES_MAX,
            });
        }

        Ok(Self { title, milestones })
    }

    /// Trimmed plan title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed milestone titles in order.
    pub fn milestones(&self) -> &[String] {
        &self.milestones
    }
}

/// Stored plan fields, used when rehydrating from persistence.
#[derive(Debug, Clone)]
pub struct PlanParts {
    /// Plan identifier.
    pub id: PlanId,
    /// Owner.
    pub user_id: UserId,
    /// Plan title.
    pub title: String,
    /// Milestones in order.
    pub milestones: Vec<Milestone>,
    /// Index of the next milestone.
    pub current_stage: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A user's wellness plan.
///
/// ## Invariants
/// - Milestones before `current_stage` are completed; the rest are not.
/// - `status` is [`PlanStatus::Completed`] iff every milestone is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[schema(value_type = String, example = "5b3c1d0e-2f4a-4c2e-9d61-0f1e2d3c4b5a")]
    plan_id: PlanId,
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    user_id: UserId,
    #[schema(example = "Stronger legs")]
    title: String,
    milestones: Vec<Milestone>,
    current_stage: usize,
    status: PlanStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Plan {
    /// Start a plan from a validated draft.
    pub fn start(id: PlanId, owner: UserId, draft: PlanDraft, now: DateTime<Utc>) -> Self {
        let PlanDraft { title, milestones } = draft;
        Self {
            plan_id: id,
            user_id: owner,
            title,
            milestones: milestones
                .into_iter()
                .map(|title| Milestone {
                    title,
                    completed_at: None,
                })
                .collect(),
            current_stage: 0,
            status: PlanStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a stored plan, checking every invariant.
    pub fn restore(parts: PlanParts) -> Result<Self, PlanValidationError> {
        let PlanParts {
            id,
            user_id,
            title,
            milestones,
            current_stage,
            created_at,
            updated_at,
        } = parts;

        let draft = PlanDraft::new(&title, milestones.iter().map(|m| m.title.as_str()))?;
        if current_stage > milestones.len() {
            return Err(PlanValidationError::InconsistentProgress);
        }
        let consistent = milestones
            .iter()
            .enumerate()
            .all(|(index, milestone)| milestone.completed_at.is_some() == (index < current_stage));
        if !consistent {
            return Err(PlanValidationError::InconsistentProgress);
        }

        let status = if current_stage == milestones.len() {
            PlanStatus::Completed
        } else {
            PlanStatus::Active
        };
        let milestones = draft
            .milestones
            .into_iter()
            .zip(milestones)
            .map(|(title, stored)| Milestone {
                title,
                completed_at: stored.completed_at,
            })
            .collect();

        Ok(Self {
            plan_id: id,
            user_id,
            title: draft.title,
            milestones,
            current_stage,
            status,
            created_at,
            updated_at,
        })
    }

    /// Plan identifier.
    pub fn id(&self) -> &PlanId {
        &self.plan_id
    }

    /// Owner.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Plan title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Milestones in order.
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Index of the next milestone; equals the milestone count when done.
    pub fn current_stage(&self) -> usize {
        self.current_stage
    }

    /// Lifecycle status.
    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// Whether the plan still has milestones to reach.
    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The milestone the user is working on, if any remain.
    pub fn next_milestone(&self) -> Option<&Milestone> {
        self.milestones.get(self.current_stage)
    }

    /// Complete the current milestone and move to the next stage.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use retire_strong_backend::domain::{Plan, PlanDraft, PlanId, PlanStatus, UserId};
    ///
    /// let draft = PlanDraft::new("Balance", ["Stand on one leg"]).expect("valid draft");
    /// let mut plan = Plan::start(PlanId::random(), UserId::random(), draft, Utc::now());
    /// plan.advance(Utc::now()).expect("first advance succeeds");
    /// assert_eq!(plan.status(), PlanStatus::Completed);
    /// assert!(plan.advance(Utc::now()).is_err());
    /// ```
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<&Milestone, PlanProgressError> {
        let stage = self.current_stage;
        let milestone = self
            .milestones
            .get_mut(stage)
            .ok_or(PlanProgressError::AlreadyCompleted)?;
        milestone.completed_at = Some(now);

        self.current_stage = stage + 1;
        if self.current_stage == self.milestones.len() {
            self.status = PlanStatus::Completed;
        }
        self.updated_at = now.max(self.created_at);
        self.milestones
            .get(stage)
            .ok_or(PlanProgressError::AlreadyCompleted)
    }
}
