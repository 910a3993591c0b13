//! Domain logic for journey steps, guards and transitions

mod guards;
mod status_map;
mod steps;
mod transitions;


pub use guards::{
    can_advance, can_create_dossier, can_validate_dossier, is_complete, next_action_label,
    permissions, Permissions,
};
pub use status_map::internal_status_for;
pub use steps::{
    is_after, is_before, is_last_step, next_step, previous_step, step_order, STEPS,
};
pub use transitions::{apply_advance, apply_dossier_filed, apply_validation, TransitionResult};
