use crate::error::AppError;
use crate::models::classify_types::{ClassifyRequest, ClassifyResponse};
use crate::models::session_types::{EncodedImage, RenderedResult, SessionState, WorkflowPhase};
use crate::services::counter_store::CounterStore;
use crate::services::transport::Transport;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

pub const FUN_FACTS: [&str; 8] = [
    "Recycling one aluminum can saves enough energy to run a TV for 3 hours!",
    "Plastic bottles take 450 years to decompose in a landfill.",
    "Glass is 100% recyclable and can be recycled endlessly without loss in quality.",
    "Composting organic waste reduces methane emissions from landfills.",
    "Up to 60% of the rubbish that ends up in the dustbin could be recycled.",
    "The energy saved from recycling one glass bottle can power a light bulb for 4 hours.",
    "Cardboard boxes can be recycled at least 7 times.",
    "Every ton of recycled paper saves 17 trees and 7,000 gallons of water.",
];

/// Issued by [`WorkflowController::begin_analysis`]; hand it back with the outcome.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    generation: u64,
    pub request: ClassifyRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Trigger arrived in a state that does not accept it.
    Ignored,
    Rendered(RenderedResult),
    /// Back in `Previewing` with the image kept; the notice is for the user.
    Failed { notice: String },
    /// The outcome belonged to a cycle that was reset.
    Discarded,
}

/// Client-side state machine: Idle → Previewing → Classifying → Result.
pub struct WorkflowController<T, S> {
    transport: T,
    store: S,
    session: SessionState,
    phase: WorkflowPhase,
    result: Option<RenderedResult>,
    last_error: Option<String>,
    generation: u64,
}

impl<T: Transport, S: CounterStore> WorkflowController<T, S> {
    /// Reads the persisted counter; a failing store starts the session at zero.
    pub fn new(transport: T, store: S) -> Self {
        let items_sorted = store.get().unwrap_or_else(|e| {
            warn!(error = %e, "could not read items-sorted counter, starting at 0");
            0
        });
        Self {
            transport,
            store,
            session: SessionState::new(items_sorted),
            phase: WorkflowPhase::Idle,
            result: None,
            last_error: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn items_sorted(&self) -> u64 {
        self.session.items_sorted
    }

    pub fn current_image(&self) -> Option<&EncodedImage> {
        self.session.current_image.as_ref()
    }

    pub fn result(&self) -> Option<&RenderedResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// A completed upload or capture. Ignored while a request is in flight.
    pub fn acquire(&mut self, image: EncodedImage) -> bool {
        if self.phase == WorkflowPhase::Classifying {
            debug!("image acquired during classification, ignoring");
            return false;
        }
        if image.is_empty() {
            return false;
        }
        self.session.current_image = Some(image);
        self.result = None;
        self.last_error = None;
        self.phase = WorkflowPhase::Previewing;
        true
    }

    /// User confirmation. Returns `None` without an image or while already classifying.
    pub fn begin_analysis(&mut self) -> Option<PendingAnalysis> {
        if self.phase != WorkflowPhase::Previewing {
            return None;
        }
        let image = self.session.current_image.as_ref()?;

        self.phase = WorkflowPhase::Classifying;
        self.result = None;
        self.last_error = None;
        Some(PendingAnalysis {
            generation: self.generation,
            request: ClassifyRequest::new(image.as_str()),
        })
    }

    pub fn complete(
        &mut self,
        pending: PendingAnalysis,
        outcome: Result<ClassifyResponse, AppError>,
    ) -> Transition {
        if pending.generation != self.generation || self.phase != WorkflowPhase::Classifying {
            debug!("dropping outcome of a reset cycle");
            return Transition::Discarded;
        }

        match outcome {
            Ok(response) => {
                self.record_sorted_item();
                let fun_fact = FUN_FACTS
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(FUN_FACTS[0]);
                let rendered = RenderedResult { response, fun_fact };
                info!(
                    category = %rendered.response.category,
                    items_sorted = self.session.items_sorted,
                    "item sorted"
                );
                self.result = Some(rendered.clone());
                self.phase = WorkflowPhase::Result;
                Transition::Rendered(rendered)
            }
            Err(err) => {
                warn!(error = %err, "classification failed");
                let notice = err.user_notice();
                self.last_error = Some(notice.clone());
                self.phase = WorkflowPhase::Previewing;
                Transition::Failed { notice }
            }
        }
    }

    /// Confirm and run one round trip through the transport.
    pub async fn analyze(&mut self) -> Transition {
        let Some(pending) = self.begin_analysis() else {
            return Transition::Ignored;
        };
        let outcome = self.transport.submit(&pending.request).await;
        self.complete(pending, outcome)
    }

    /// Back to `Idle`. The persisted counter is untouched.
    pub fn reset(&mut self) {
        self.session.current_image = None;
        self.result = None;
        self.last_error = None;
        self.phase = WorkflowPhase::Idle;
        self.generation += 1;
    }

    // Single read-modify-write; the store wins over the in-memory copy when readable.
    fn record_sorted_item(&mut self) {
        let current = self.store.get().unwrap_or_else(|e| {
            warn!(error = %e, "could not read items-sorted counter");
            self.session.items_sorted
        });
        let next = current.saturating_add(1);
        if let Err(e) = self.store.set(next) {
            warn!(error = %e, "could not persist items-sorted counter");
        }
        self.session.items_sorted = next;
    }
}
