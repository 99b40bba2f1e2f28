//! The page-sequencing state machine
//!
//! A pure reducer: `(state, event) -> (state', effects)`. It never performs
//! I/O; the paginator task applies the effects (publishing updates and
//! dispatching loads) in the order they are returned.

use super::concat::ConcatPolicy;
use super::types::{Page, PageRequest, PaginationState, PaginatorUpdate};
use crate::error::Error;
use std::sync::Arc;
use tracing::{debug, warn};

/// Inputs to the state machine, serialized onto one timeline
#[derive(Debug)]
pub enum Event<P, I> {
    /// Restart the listing from page 1 with these parameters
    StartOver(P),
    /// Load the next page, if allowed
    NextPage,
    /// A load tagged with `generation` produced a page
    Loaded { generation: u64, page: Page<I> },
    /// A load tagged with `generation` failed
    Failed { generation: u64, error: Error },
}

/// Side effects requested by a transition
#[derive(Debug)]
pub enum Effect<P, I> {
    /// Publish an update to subscribers
    Publish(PaginatorUpdate<I>),
    /// Start a load tagged with `generation`
    Dispatch {
        generation: u64,
        request: PageRequest<P>,
    },
}

/// Result of one reduction
#[derive(Debug)]
pub struct Transition<P, I> {
    /// The replacement state
    pub state: PaginationState<I>,
    /// Effects to apply, in order
    pub effects: Vec<Effect<P, I>>,
}

impl<P, I> Transition<P, I> {
    fn unchanged(state: &PaginationState<I>) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// Reducer configuration
#[derive(Debug, Clone)]
pub struct Reducer<I> {
    /// Clear accumulated items when a restart arrives
    pub clear_accumulated_on_restart: bool,
    /// How a page joins the accumulated items
    pub concat: ConcatPolicy<I>,
    /// Treat a page with no items as the last one, whatever its token says
    pub stop_on_empty_page: bool,
}

impl<I: Clone + 'static> Default for Reducer<I> {
    fn default() -> Self {
        Self {
            clear_accumulated_on_restart: true,
            concat: ConcatPolicy::append(),
            stop_on_empty_page: false,
        }
    }
}

impl<I> Reducer<I> {
    /// Reduce one event against the current state
    pub fn reduce<P>(&self, state: &PaginationState<I>, event: Event<P, I>) -> Transition<P, I> {
        match event {
            Event::StartOver(params) => self.start_over(state, params),
            Event::NextPage => Self::next_page(state),
            Event::Loaded { generation, page } => self.loaded(state, generation, page),
            Event::Failed { generation, error } => Self::failed(state, generation, &error),
        }
    }

    fn start_over<P>(&self, state: &PaginationState<I>, params: P) -> Transition<P, I> {
        let generation = state.generation + 1;
        let accumulated = if self.clear_accumulated_on_restart {
            Arc::new(Vec::new())
        } else {
            Arc::clone(&state.accumulated)
        };

        debug!(
            generation,
            superseded = state.is_fetching,
            "Starting listing over"
        );

        Transition {
            state: PaginationState {
                accumulated,
                continuation_token: None,
                generation,
                is_fetching: true,
                current_page: 0,
            },
            effects: vec![
                Effect::Publish(PaginatorUpdate::Fetching(true)),
                Effect::Publish(PaginatorUpdate::LoadingPage(1)),
                Effect::Dispatch {
                    generation,
                    request: PageRequest::FirstPage(params),
                },
            ],
        }
    }

    fn next_page<P>(state: &PaginationState<I>) -> Transition<P, I> {
        if state.is_fetching {
            debug!(
                generation = state.generation,
                "Load in flight, dropping next page trigger"
            );
            return Transition::unchanged(state);
        }
        let Some(token) = state.continuation_token.clone() else {
            debug!(
                generation = state.generation,
                "No continuation token, ignoring next page trigger"
            );
            return Transition::unchanged(state);
        };

        let page = state.current_page + 1;
        Transition {
            state: PaginationState {
                is_fetching: true,
                ..state.clone()
            },
            effects: vec![
                Effect::Publish(PaginatorUpdate::Fetching(true)),
                Effect::Publish(PaginatorUpdate::LoadingPage(page)),
                Effect::Dispatch {
                    generation: state.generation,
                    request: PageRequest::NextPage(token),
                },
            ],
        }
    }

    fn loaded<P>(
        &self,
        state: &PaginationState<I>,
        generation: u64,
        page: Page<I>,
    ) -> Transition<P, I> {
        if generation != state.generation {
            debug!(
                generation,
                current = state.generation,
                "Discarding page from superseded listing"
            );
            return Transition::unchanged(state);
        }

        let received = page.items.len();
        let continuation = if self.stop_on_empty_page && received == 0 {
            None
        } else {
            page.continuation
        };
        // Items kept across a restart are replaced by the new first page
        let base: &[I] = if state.current_page == 0 {
            &[]
        } else {
            &state.accumulated
        };
        let accumulated = Arc::new(self.concat.concat(base, page.items));
        let current_page = state.current_page + 1;

        debug!(
            generation,
            page = current_page,
            received,
            total = accumulated.len(),
            has_more = continuation.is_some(),
            "Page loaded"
        );

        Transition {
            state: PaginationState {
                accumulated: Arc::clone(&accumulated),
                continuation_token: continuation,
                generation,
                is_fetching: false,
                current_page,
            },
            effects: vec![
                Effect::Publish(PaginatorUpdate::Items(accumulated)),
                Effect::Publish(PaginatorUpdate::Fetching(false)),
            ],
        }
    }

    fn failed<P>(state: &PaginationState<I>, generation: u64, error: &Error) -> Transition<P, I> {
        if generation != state.generation {
            debug!(
                generation,
                current = state.generation,
                "Ignoring failure from superseded listing: {error}"
            );
            return Transition::unchanged(state);
        }

        warn!(
            generation,
            page = state.current_page + 1,
            kind = ?error.load_failure_kind(),
            "Page load failed: {error}"
        );

        Transition {
            state: PaginationState {
                is_fetching: false,
                ..state.clone()
            },
            effects: vec![Effect::Publish(PaginatorUpdate::Fetching(false))],
        }
    }
}
