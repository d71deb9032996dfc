//! Advertorial generation: one create call fanning out into three fetches.
//!
//! | Module         | Responsibility                                        |
//! |----------------|-------------------------------------------------------|
//! | `models`       | Request, variant ids, artifacts                       |
//! | `state`        | `GenerationState` and its pure transitions            |
//! | `orchestrator` | `AdvertorialOrchestrator` driving cycles on tokio     |

pub mod models;
pub mod orchestrator;
pub mod state;

pub use models::{AdvertorialVariant, Artifact, GeneratedIds, GenerationRequest};
pub use orchestrator::{AdvertorialOrchestrator, CycleHandle, GenerationEvent};
pub use state::{AdvertorialSet, GenerationPhase, GenerationState, Slot, Transition};
