//! Explicit session state container.
//!
//! One struct owns the active form, the visible result slot, the loading
//! gate, and the history cache. The session controller is its only writer;
//! presentation layers read it.

use crate::history::HistoryCache;
use crate::model::{normalize, EstimateOutcome, EstimateRequest, RawFields};

/// What the result panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSlot {
    /// A completed exchange: a report or the service's own error.
    Outcome(EstimateOutcome),
    /// The exchange itself failed before a body could be parsed.
    ExchangeFailed(String),
}

pub struct AppState {
    /// Normalized inputs the next estimate will send.
    pub form: EstimateRequest,
    pub result: Option<ResultSlot>,
    /// True while a call is outstanding. A gate, not a lock: overlapping
    /// calls are legal.
    pub loading: bool,
    pub history: HistoryCache,
    generation: u64,
}

impl AppState {
    pub fn new(history: HistoryCache) -> Self {
        Self {
            form: normalize(&RawFields::default()),
            result: None,
            loading: false,
            history,
            generation: 0,
        }
    }

    /// Enter the loading state for a new call and hand back its generation.
    /// The previous result is cleared, matching the display contract.
    pub(crate) fn begin_call(&mut self) -> u64 {
        self.loading = true;
        self.result = None;
        self.generation += 1;
        self.generation
    }

    /// Whether `generation` belongs to the most recently started call.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}
