//! Transition guards
//!
//! Pure predicates over a [`JourneyState`]. Every actor-initiated transition
//! consults them before writing anything.

use serde::Serialize;

use crate::schemas::{JourneyState, Status};

use super::steps::is_last_step;

/// A dossier may be filed while the current step has nothing filed
pub fn can_create_dossier(state: JourneyState) -> bool {
    state.status == Status::Todo
}

/// The current step may be validated once its dossier is pending
pub fn can_validate_dossier(state: JourneyState) -> bool {
    state.status == Status::Pending
}

/// A validated step other than the last one may be left
pub fn can_advance(state: JourneyState) -> bool {
    state.status == Status::Validated && !is_last_step(state.step)
}

/// The whole journey is done
pub fn is_complete(state: JourneyState) -> bool {
    state.status == Status::Validated && is_last_step(state.step)
}

/// Hint for the citizen about what to do next
pub fn next_action_label(state: JourneyState) -> String {
    if is_complete(state) {
        return "Parcours terminé".to_string();
    }
    if can_advance(state) {
        return "Passer à l'étape suivante".to_string();
    }
    if can_validate_dossier(state) {
        return format!("Dossier « {} » en cours d'instruction", state.step.title());
    }
    format!("Déposer le dossier « {} »", state.step.title())
}

/// Legal transitions for a journey state, for callers that render them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub can_create_dossier: bool,
    pub can_validate_dossier: bool,
    pub can_advance: bool,
    pub is_complete: bool,
}

pub fn permissions(state: JourneyState) -> Permissions {
    Permissions {
        can_create_dossier: can_create_dossier(state),
        can_validate_dossier: can_validate_dossier(state),
        can_advance: can_advance(state),
        is_complete: is_complete(state),
    }
}
