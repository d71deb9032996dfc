//! Drives generation cycles against an [`AdvertorialBackend`].
//!
//! A cycle runs on its own task: the create call, then the three fetches
//! issued together and awaited in completion order. Only the cycle task
//! writes state; each result goes through [`GenerationState::reduce`] under
//! the write lock, so concurrent completions never lose an update.
//!
//! Once [`AdvertorialOrchestrator::detach`] is called, results still in
//! flight are dropped on arrival and no further events are sent.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::models::{AdvertorialVariant, GenerationRequest};
use super::state::{GenerationPhase, GenerationState, Transition};
use crate::errors::GenerationError;
use crate::transport::AdvertorialBackend;

/// Broadcast to views observing a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    PhaseChanged {
        cycle: u64,
        phase: GenerationPhase,
    },
    SlotResolved {
        cycle: u64,
        variant: AdvertorialVariant,
        ok: bool,
    },
}

/// Shared between the orchestrator and its cycle tasks.
struct Shared {
    state: RwLock<GenerationState>,
    attached: AtomicBool,
    events: broadcast::Sender<GenerationEvent>,
}

impl Shared {
    fn emit(&self, event: GenerationEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    /// Apply a transition if the owner is still attached. Returns the new
    /// state when it was accepted.
    async fn apply(&self, transition: Transition) -> Option<GenerationState> {
        if !self.attached.load(Ordering::Acquire) {
            debug!(cycle = transition.cycle(), "detached; dropping result");
            return None;
        }
        let mut state = self.state.write().await;
        let next = state.reduce(transition)?;
        *state = next.clone();
        Some(next)
    }
}

pub struct AdvertorialOrchestrator<B: AdvertorialBackend + 'static> {
    backend: Arc<B>,
    shared: Arc<Shared>,
}

impl<B: AdvertorialBackend + 'static> AdvertorialOrchestrator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            backend,
            shared: Arc::new(Shared {
                state: RwLock::new(GenerationState::default()),
                attached: AtomicBool::new(true),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.shared.events.subscribe()
    }

    pub async fn snapshot(&self) -> GenerationState {
        self.shared.state.read().await.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::Acquire)
    }

    /// Stop accepting results. Cycles already running finish their calls but
    /// leave state untouched.
    pub fn detach(&self) {
        self.shared.attached.store(false, Ordering::Release);
    }

    /// Start a cycle. Rejected without side effects while another cycle is
    /// in flight or when the request is invalid.
    pub async fn submit(&self, request: GenerationRequest) -> Result<CycleHandle, GenerationError> {
        let cycle = {
            let mut state = self.shared.state.write().await;
            let next = state.submit(request.clone())?;
            let cycle = next.cycle;
            *state = next;
            cycle
        };
        info!(cycle, project_id = %request.project_id, "generation started");
        self.shared.emit(GenerationEvent::PhaseChanged {
            cycle,
            phase: GenerationPhase::Generating,
        });

        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_cycle(backend, Arc::clone(&shared), cycle, request));
        Ok(CycleHandle {
            cycle,
            handle,
            shared,
        })
    }
}

async fn run_cycle<B: AdvertorialBackend>(
    backend: Arc<B>,
    shared: Arc<Shared>,
    cycle: u64,
    request: GenerationRequest,
) {
    let created = backend
        .generate_advertorials(&request.project_id, &request.description)
        .await;
    let transition = match created {
        Ok(ids) => Transition::CreateSucceeded { cycle, ids },
        Err(error) => {
            warn!(cycle, error = %error, "advertorial creation failed");
            Transition::CreateFailed { cycle, error }
        }
    };
    let Some(state) = shared.apply(transition).await else {
        return;
    };
    shared.emit(GenerationEvent::PhaseChanged {
        cycle,
        phase: state.phase,
    });
    let Some(ids) = state.ids else {
        return;
    };

    let mut fetches: FuturesUnordered<_> = AdvertorialVariant::ALL
        .into_iter()
        .map(|variant| {
            let backend = Arc::clone(&backend);
            let project_id = request.project_id.clone();
            let id = ids.id_for(variant).clone();
            async move {
                let outcome = backend.fetch_advertorial(&project_id, &id).await;
                (variant, outcome)
            }
        })
        .collect();

    while let Some((variant, outcome)) = fetches.next().await {
        let ok = outcome.is_ok();
        if let Err(e) = &outcome {
            warn!(cycle, variant = %variant, error = %e, "advertorial fetch failed");
        }
        let Some(state) = shared
            .apply(Transition::SlotResolved {
                cycle,
                variant,
                outcome,
            })
            .await
        else {
            continue;
        };
        shared.emit(GenerationEvent::SlotResolved { cycle, variant, ok });
        if state.phase == GenerationPhase::Ready {
            info!(cycle, "generation ready");
            shared.emit(GenerationEvent::PhaseChanged {
                cycle,
                phase: GenerationPhase::Ready,
            });
        }
    }
}

/// Handle to a running cycle.
pub struct CycleHandle {
    cycle: u64,
    handle: JoinHandle<()>,
    shared: Arc<Shared>,
}

impl CycleHandle {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Wait for every call of the cycle to resolve and return the state.
    pub async fn finished(self) -> GenerationState {
        if let Err(e) = self.handle.await {
            warn!(cycle = self.cycle, error = %e, "generation task aborted");
        }
        self.shared.state.read().await.clone()
    }
}
