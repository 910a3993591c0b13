//! State transition logic
//!
//! Pure functions applying one guarded transition to a journey. They never
//! mutate their input; persisting the result is the caller's job.

use chrono::{DateTime, Utc};

use crate::errors::ParcoursError;
use crate::schemas::{Journey, JourneyState, Status};

use super::guards::{can_advance, can_create_dossier, can_validate_dossier, is_complete};
use super::steps::next_step;

/// Result of a state transition attempt
#[derive(Debug)]
pub enum TransitionResult {
    /// Successful transition with the new journey
    Success {
        next_journey: Journey,
        /// Whether the journey is complete after the transition
        complete: bool,
    },
    /// Failed transition
    Error { error: ParcoursError },
}

impl TransitionResult {
    /// Check if the transition was successful
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionResult::Success { .. })
    }

    /// Check if the transition failed
    pub fn is_error(&self) -> bool {
        matches!(self, TransitionResult::Error { .. })
    }

    /// Get the next journey if the transition was successful
    pub fn journey(self) -> Option<Journey> {
        match self {
            TransitionResult::Success { next_journey, .. } => Some(next_journey),
            TransitionResult::Error { .. } => None,
        }
    }

    /// Convert into a `Result` of the next journey and completion flag
    pub fn into_result(self) -> Result<(Journey, bool), ParcoursError> {
        match self {
            TransitionResult::Success {
                next_journey,
                complete,
            } => Ok((next_journey, complete)),
            TransitionResult::Error { error } => Err(error),
        }
    }
}

fn rejected(state: JourneyState, action: &'static str) -> TransitionResult {
    TransitionResult::Error {
        error: ParcoursError::InvalidTransition {
            step: state.step,
            status: state.status,
            action,
        },
    }
}

/// `Todo → Pending`: a dossier was filed for the current step
pub fn apply_dossier_filed(journey: &Journey) -> TransitionResult {
    let state = journey.state();
    if !can_create_dossier(state) {
        return rejected(state, "create dossier");
    }
    TransitionResult::Success {
        next_journey: journey.clone().with_status(Status::Pending),
        complete: false,
    }
}

/// `Pending → Validated` on the current step
pub fn apply_validation(journey: &Journey) -> TransitionResult {
    let state = journey.state();
    if !can_validate_dossier(state) {
        return rejected(state, "validate");
    }
    let next_journey = journey.clone().with_status(Status::Validated);
    let complete = is_complete(next_journey.state());
    TransitionResult::Success {
        next_journey,
        complete,
    }
}

/// `Validated → Todo` on the next step, or close a finished journey.
///
/// On a complete journey `completed_at` is stamped with `now` the first
/// time and left untouched afterwards.
pub fn apply_advance(journey: &Journey, now: DateTime<Utc>) -> TransitionResult {
    let state = journey.state();
    if is_complete(state) {
        return TransitionResult::Success {
            next_journey: journey.clone().with_completed_at(now),
            complete: true,
        };
    }
    if !can_advance(state) {
        return rejected(state, "advance");
    }
    let Some(next) = next_step(state.step) else {
        return TransitionResult::Error {
            error: ParcoursError::NoNextStep(state.step),
        };
    };
    TransitionResult::Success {
        next_journey: journey
            .clone()
            .with_state(JourneyState::new(next, Status::Todo)),
        complete: false,
    }
}
