//! Generation cycle state machine.
//!
//! ```text
//!            submit                 create ok                 last slot resolved
//!  Idle ─────────────> Generating ───────────> PartiallyReady ──────────────────> Ready
//!  Ready/Failed ──┘        │
//!                          └── create failed ──> Failed
//! ```
//!
//! Transitions are pure: each takes the current state and returns the next
//! one, leaving the old value untouched. Transitions tagged with a stale
//! cycle number are ignored.

use serde::Serialize;

use super::models::{AdvertorialVariant, Artifact, GeneratedIds, GenerationRequest};
use crate::errors::{GenerationError, TransportError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    #[default]
    Idle,
    Generating,
    PartiallyReady,
    Ready,
    Failed,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::PartiallyReady => "partially_ready",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// A cycle is running; new submits are rejected.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Generating | Self::PartiallyReady)
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advertorial slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Absent,
    Pending,
    Loaded(Artifact),
    Failed(TransportError),
}

impl Slot {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Failed(_))
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Loaded(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// The three-variant bundle of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvertorialSet {
    pub story: Slot,
    pub value: Slot,
    pub info: Slot,
}

impl AdvertorialSet {
    fn all_pending() -> Self {
        Self {
            story: Slot::Pending,
            value: Slot::Pending,
            info: Slot::Pending,
        }
    }

    pub fn slot(&self, variant: AdvertorialVariant) -> &Slot {
        match variant {
            AdvertorialVariant::Story => &self.story,
            AdvertorialVariant::Value => &self.value,
            AdvertorialVariant::Info => &self.info,
        }
    }

    fn slot_mut(&mut self, variant: AdvertorialVariant) -> &mut Slot {
        match variant {
            AdvertorialVariant::Story => &mut self.story,
            AdvertorialVariant::Value => &mut self.value,
            AdvertorialVariant::Info => &mut self.info,
        }
    }

    pub fn pending_count(&self) -> usize {
        AdvertorialVariant::ALL
            .iter()
            .filter(|v| matches!(self.slot(**v), Slot::Pending))
            .count()
    }

    pub fn all_resolved(&self) -> bool {
        AdvertorialVariant::ALL
            .iter()
            .all(|v| self.slot(*v).is_resolved())
    }
}

/// Results reported back by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    CreateSucceeded {
        cycle: u64,
        ids: GeneratedIds,
    },
    CreateFailed {
        cycle: u64,
        error: TransportError,
    },
    SlotResolved {
        cycle: u64,
        variant: AdvertorialVariant,
        outcome: Result<Artifact, TransportError>,
    },
}

impl Transition {
    pub fn cycle(&self) -> u64 {
        match self {
            Self::CreateSucceeded { cycle, .. }
            | Self::CreateFailed { cycle, .. }
            | Self::SlotResolved { cycle, .. } => *cycle,
        }
    }
}

/// Immutable snapshot of the orchestrator, handed to the view layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationState {
    /// Monotonic cycle counter; 0 before the first submit.
    pub cycle: u64,
    pub phase: GenerationPhase,
    pub request: Option<GenerationRequest>,
    pub ids: Option<GeneratedIds>,
    pub set: AdvertorialSet,
    pub error: Option<TransportError>,
}

impl GenerationState {
    /// Start a fresh cycle, discarding the previous set.
    pub fn submit(&self, request: GenerationRequest) -> Result<Self, GenerationError> {
        if self.phase.is_in_flight() {
            return Err(GenerationError::CycleInFlight {
                phase: self.phase.to_string(),
            });
        }
        request.validate().map_err(GenerationError::InvalidRequest)?;
        Ok(Self {
            cycle: self.cycle + 1,
            phase: GenerationPhase::Generating,
            request: Some(request),
            ids: None,
            set: AdvertorialSet::default(),
            error: None,
        })
    }

    /// Apply a transition. Returns `None` when it does not apply to this
    /// state (stale cycle, wrong phase, slot already resolved).
    pub fn reduce(&self, transition: Transition) -> Option<Self> {
        if transition.cycle() != self.cycle {
            return None;
        }
        match (self.phase, transition) {
            (GenerationPhase::Generating, Transition::CreateSucceeded { ids, .. }) => Some(Self {
                phase: GenerationPhase::PartiallyReady,
                ids: Some(ids),
                set: AdvertorialSet::all_pending(),
                ..self.clone()
            }),
            (GenerationPhase::Generating, Transition::CreateFailed { error, .. }) => Some(Self {
                phase: GenerationPhase::Failed,
                set: AdvertorialSet::default(),
                error: Some(error),
                ..self.clone()
            }),
            (
                GenerationPhase::PartiallyReady,
                Transition::SlotResolved {
                    variant, outcome, ..
                },
            ) => {
                if !matches!(self.set.slot(variant), Slot::Pending) {
                    return None;
                }
                let mut next = self.clone();
                *next.set.slot_mut(variant) = match outcome {
                    Ok(artifact) => Slot::Loaded(artifact),
                    Err(e) => Slot::Failed(e),
                };
                if next.set.all_resolved() {
                    next.phase = GenerationPhase::Ready;
                }
                Some(next)
            }
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == GenerationPhase::Ready
    }
}
