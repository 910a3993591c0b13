//! Journey schema - One citizen's progression through the program

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::{JourneyState, Status, Step};

/// A citizen's journey through the five program steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    /// Unique identifier for the journey
    pub id: Uuid,

    /// Opaque identity of the citizen owning the journey
    pub owner_id: String,

    /// Step the citizen is currently on
    pub current_step: Step,

    /// Progress of the current step
    pub current_status: Status,

    /// Simulation inputs captured once at intake (write-once)
    #[serde(default)]
    pub intake_snapshot: Option<serde_json::Value>,

    /// Set once, when the last step is validated and the journey closed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Journey {
    /// Create a new journey at the first step
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Journey {
            schema_version: 1,
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            current_step: Step::ChoixAmo,
            current_status: Status::Todo,
            intake_snapshot: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The `(step, status)` pair guards operate on
    pub fn state(&self) -> JourneyState {
        JourneyState::new(self.current_step, self.current_status)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    // ===== IMMUTABLE BUILDER METHODS =====

    /// Return a new Journey at the given step and status, updating the timestamp
    pub fn with_state(mut self, state: JourneyState) -> Self {
        self.current_step = state.step;
        self.current_status = state.status;
        self.touch_returning()
    }

    /// Return a new Journey with the given status on the current step
    pub fn with_status(mut self, status: Status) -> Self {
        self.current_status = status;
        self.touch_returning()
    }

    /// Return a new Journey carrying the intake snapshot.
    ///
    /// An already recorded snapshot is kept as-is.
    pub fn with_intake_snapshot(mut self, snapshot: serde_json::Value) -> Self {
        if self.intake_snapshot.is_some() {
            return self;
        }
        self.intake_snapshot = Some(snapshot);
        self.touch_returning()
    }

    /// Return a new Journey marked completed at `at`, keeping an earlier mark
    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        if self.completed_at.is_some() {
            return self;
        }
        self.completed_at = Some(at);
        self.touch_returning()
    }

    fn touch_returning(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}
