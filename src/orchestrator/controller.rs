//! Estimate lifecycle controller.
//!
//! Runs one exchange at a time from the caller's point of view, folds the
//! outcome back into the state container, and gates history recording on a
//! fully parsed body.

use crate::engine::{EstimateError, EstimationClient};
use crate::history::HistoryCache;
use crate::model::{normalize, EstimateOutcome, EstimateRequest, HistoryEntry, RawFields};
use crate::state::{AppState, ResultSlot};
use anyhow::{Context, Result};

pub struct SessionController {
    client: EstimationClient,
    pub state: AppState,
}

impl SessionController {
    pub fn new(client: EstimationClient, history: HistoryCache) -> Self {
        Self {
            client,
            state: AppState::new(history),
        }
    }

    /// Replace the active form with freshly normalized user input.
    pub fn set_form(&mut self, raw: &RawFields) {
        self.state.form = normalize(raw);
    }

    /// Run one estimate against the active form.
    ///
    /// Overlapping calls are legal and race; the generation counter makes the
    /// visible result last-started-wins instead of last-completed-wins. There
    /// is no cancellation: a superseded call still runs to completion.
    pub async fn run_estimate(&mut self) {
        let request = self.state.form.clone();
        let generation = self.state.begin_call();
        let result = self.client.estimate(&request).await;
        self.finish_call(generation, request, result);
    }

    /// Fold a finished exchange back into the session state.
    ///
    /// Any fully parsed body, reports and service errors alike, is appended
    /// to history; transport and parse failures never are. A stale call
    /// (one superseded by a newer `begin_call`) keeps its history append but
    /// must not touch the visible result or the loading gate.
    pub(crate) fn finish_call(
        &mut self,
        generation: u64,
        request: EstimateRequest,
        result: Result<EstimateOutcome, EstimateError>,
    ) {
        let current = self.state.is_current(generation);
        match result {
            Ok(outcome) => {
                self.state
                    .history
                    .append(HistoryEntry::record(request, outcome.clone()));
                if current {
                    self.state.loading = false;
                    self.state.result = Some(ResultSlot::Outcome(outcome));
                }
            }
            Err(err) => {
                if current {
                    self.state.loading = false;
                    self.state.result = Some(ResultSlot::ExchangeFailed(err.to_string()));
                }
            }
        }
    }

    /// Replay a cached run into the active form and result slots, verbatim.
    /// No network, no validation, no history mutation.
    pub fn restore(&mut self, entry: &HistoryEntry) {
        self.state.form = entry.input.clone();
        self.state.result = Some(ResultSlot::Outcome(entry.data.clone()));
    }

    /// Replay by 1-based index as printed in the history listing.
    pub fn restore_index(&mut self, index: usize) -> Result<HistoryEntry> {
        let entry = index
            .checked_sub(1)
            .and_then(|i| self.state.history.entries().get(i))
            .cloned()
            .with_context(|| format!("no history entry #{index}"))?;
        self.restore(&entry);
        Ok(entry)
    }
}
