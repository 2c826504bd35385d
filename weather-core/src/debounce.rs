//! Keystroke-driven suggestion fetching.
//!
//! Every change of the input text restarts a quiet-period timer; only when the
//! timer expires is the geocoder asked. Each keystroke bumps a generation
//! counter, and a response whose generation is no longer current is dropped,
//! so a slow earlier lookup can never replace the suggestions of a later one.
//! Requests already in flight are left to finish.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};

use crate::{LocationSuggestion, suggest::LocationSuggester};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Observable state of one suggestion input.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    PendingDebounce {
        query: String,
    },
    AwaitingResponse {
        query: String,
    },
    ShowingSuggestions {
        query: String,
        results: Vec<LocationSuggestion>,
    },
}

impl SuggestionState {
    pub fn suggestions(&self) -> &[LocationSuggestion] {
        match self {
            SuggestionState::ShowingSuggestions { results, .. } => results,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SuggestionState::PendingDebounce { .. } | SuggestionState::AwaitingResponse { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    text: String,
    /// Timer task, present only while it has not fired yet.
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct SuggestionDebouncer {
    suggester: LocationSuggester,
    delay: Duration,
    limit: usize,
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl SuggestionDebouncer {
    pub fn new(suggester: LocationSuggester, delay: Duration, runtime: Handle) -> Self {
        let (state, _) = watch::channel(SuggestionState::Idle);
        Self {
            suggester,
            delay,
            limit: LocationSuggester::DEFAULT_LIMIT,
            runtime,
            slot: Arc::new(Mutex::new(Slot::default())),
            state: Arc::new(state),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Feed the current input text. Unchanged text is ignored.
    pub fn keystroke(&self, text: &str) {
        let mut slot = self.slot.lock();
        if slot.text == text {
            return;
        }

        slot.text = text.to_string();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }

        let query = text.trim().to_string();
        if !LocationSuggester::is_searchable(&query) {
            self.state.send_replace(SuggestionState::Idle);
            return;
        }

        self.state.send_replace(SuggestionState::PendingDebounce {
            query: query.clone(),
        });

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let state = Arc::clone(&self.state);
        let suggester = self.suggester.clone();
        let delay = self.delay;
        let limit = self.limit;

        slot.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut slot = shared.lock();
                if slot.generation != generation {
                    return;
                }
                // Fired: from here on the lookup is no longer cancellable.
                slot.timer = None;
                state.send_replace(SuggestionState::AwaitingResponse {
                    query: query.clone(),
                });
            }

            let outcome = suggester.suggest_with_limit(&query, limit).await;

            let slot = shared.lock();
            if slot.generation != generation {
                tracing::debug!(%query, "discarding suggestions for superseded input");
                return;
            }

            let next = match outcome {
                Ok(results) if !results.is_empty() => {
                    SuggestionState::ShowingSuggestions { query, results }
                }
                Ok(_) => SuggestionState::Idle,
                Err(e) => {
                    tracing::warn!(%query, error = %e, "suggestion lookup failed");
                    SuggestionState::Idle
                }
            };
            state.send_replace(next);
        }));
    }

    /// Close the suggestion list: click outside, selection or submit.
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        self.state.send_replace(SuggestionState::Idle);
    }
}

impl Drop for SuggestionDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.slot.lock().timer.take() {
            timer.abort();
        }
    }
}
