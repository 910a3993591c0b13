//! Step ordering
//!
//! The journey follows a linear progression:
//! choix_amo → eligibilite → diagnostic → devis → factures

use crate::schemas::Step;

/// The canonical ordering of journey steps.
///
/// IMPORTANT: This is the source of truth for step ordering.
pub const STEPS: &[Step] = &[
    Step::ChoixAmo,
    Step::Eligibilite,
    Step::Diagnostic,
    Step::Devis,
    Step::Factures,
];

/// Get the 0-based index of a step in the journey progression.
pub fn step_order(step: Step) -> usize {
    match step {
        Step::ChoixAmo => 0,
        Step::Eligibilite => 1,
        Step::Diagnostic => 2,
        Step::Devis => 3,
        Step::Factures => 4,
    }
}

/// Whether `a` comes strictly before `b`
pub fn is_before(a: Step, b: Step) -> bool {
    step_order(a) < step_order(b)
}

/// Whether `a` comes strictly after `b`
pub fn is_after(a: Step, b: Step) -> bool {
    step_order(a) > step_order(b)
}

/// Returns the next step, or None for the last step.
pub fn next_step(current: Step) -> Option<Step> {
    STEPS.get(step_order(current) + 1).copied()
}

/// Returns the previous step, or None for the first step.
pub fn previous_step(current: Step) -> Option<Step> {
    step_order(current)
        .checked_sub(1)
        .and_then(|index| STEPS.get(index).copied())
}

/// Check if a step is the last one (invoicing).
pub fn is_last_step(step: Step) -> bool {
    next_step(step).is_none()
}
