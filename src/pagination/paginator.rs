//! The paginator task and its handle
//!
//! Building a [`Paginator`] spawns one tokio task that owns the
//! [`PaginationState`]. Restart triggers, next-page triggers and load
//! completions all arrive on a single mpsc channel, so transitions never
//! interleave. Loads run on their own tasks and post their result back
//! into that channel tagged with the generation they were issued for.
//!
//! Subscribers get ordered updates through a broadcast channel and the
//! latest state through a watch channel.

use super::concat::ConcatPolicy;
use super::machine::{Effect, Event, Reducer};
use super::source::{page_source, EnvelopeDecoder, FnDecoder, FnLoader, PageLoader, PageSource};
use super::types::{PageRequest, PaginationState, PaginatorSnapshot, PaginatorUpdate};
use crate::error::{Error, Result};
use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Default capacity of the update broadcast channel
pub const DEFAULT_UPDATE_CAPACITY: usize = 256;

enum Command<P, I> {
    Event(Event<P, I>),
    Shutdown,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`Paginator`]
///
/// A loader and a decoder are required; everything else has a default.
pub struct PaginatorBuilder<P, E, I> {
    loader: Option<Arc<dyn PageLoader<P, E>>>,
    decoder: Option<Arc<dyn EnvelopeDecoder<E, I>>>,
    next_page_triggers: Vec<BoxStream<'static, ()>>,
    start_over_triggers: Vec<BoxStream<'static, P>>,
    clear_accumulated_on_restart: bool,
    stop_on_empty_page: bool,
    concat: ConcatPolicy<I>,
    update_capacity: usize,
}

impl<P, E, I> Default for PaginatorBuilder<P, E, I>
where
    I: Clone + 'static,
{
    fn default() -> Self {
        Self {
            loader: None,
            decoder: None,
            next_page_triggers: Vec::new(),
            start_over_triggers: Vec::new(),
            clear_accumulated_on_restart: true,
            stop_on_empty_page: false,
            concat: ConcatPolicy::append(),
            update_capacity: DEFAULT_UPDATE_CAPACITY,
        }
    }
}

impl<P, E, I> PaginatorBuilder<P, E, I>
where
    P: Send + 'static,
    E: Send + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page loader
    #[must_use]
    pub fn loader(mut self, loader: impl PageLoader<P, E> + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Set the page loader from two async closures
    #[must_use]
    pub fn load_with<F, FFut, N, NFut>(self, load_first_page: F, load_next_page: N) -> Self
    where
        F: Fn(P) -> FFut + Send + Sync + 'static,
        FFut: Future<Output = Result<E>> + Send + 'static,
        N: Fn(String) -> NFut + Send + Sync + 'static,
        NFut: Future<Output = Result<E>> + Send + 'static,
    {
        self.loader(FnLoader::new(load_first_page, load_next_page))
    }

    /// Set the envelope decoder
    #[must_use]
    pub fn decoder(mut self, decoder: impl EnvelopeDecoder<E, I> + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Set the envelope decoder from two closures
    #[must_use]
    pub fn decode_with<F, T>(self, envelope_to_items: F, envelope_to_token: T) -> Self
    where
        F: Fn(&E) -> Result<Vec<I>> + Send + Sync + 'static,
        T: Fn(&E) -> Option<String> + Send + Sync + 'static,
    {
        self.decoder(FnDecoder::new(envelope_to_items, envelope_to_token))
    }

    /// Add a stream whose every element requests the next page
    #[must_use]
    pub fn next_page_trigger(mut self, trigger: impl Stream<Item = ()> + Send + 'static) -> Self {
        self.next_page_triggers.push(trigger.boxed());
        self
    }

    /// Add a stream whose every element restarts the listing with new params
    #[must_use]
    pub fn start_over_trigger(mut self, trigger: impl Stream<Item = P> + Send + 'static) -> Self {
        self.start_over_triggers.push(trigger.boxed());
        self
    }

    /// Keep or clear accumulated items when the listing restarts (default: clear)
    ///
    /// When kept, the old items stay visible until the new first page
    /// arrives and replaces them.
    #[must_use]
    pub fn clear_accumulated_on_restart(mut self, clear: bool) -> Self {
        self.clear_accumulated_on_restart = clear;
        self
    }

    /// Treat an empty page as the end of the listing (default: off)
    ///
    /// For endpoints that keep handing out a token past the last item.
    #[must_use]
    pub fn stop_on_empty_page(mut self, stop: bool) -> Self {
        self.stop_on_empty_page = stop;
        self
    }

    /// Set the concatenation policy (default: append)
    #[must_use]
    pub fn concat(mut self, policy: ConcatPolicy<I>) -> Self {
        self.concat = policy;
        self
    }

    /// Set the capacity of the update channel
    #[must_use]
    pub fn update_capacity(mut self, capacity: usize) -> Self {
        self.update_capacity = capacity.max(1);
        self
    }

    /// Build the paginator and spawn its task
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Paginator<P, I>> {
        let loader = self.loader.ok_or_else(|| Error::missing_field("loader"))?;
        let decoder = self.decoder.ok_or_else(|| Error::missing_field("decoder"))?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (updates_tx, _) = broadcast::channel(self.update_capacity);
        let state = PaginationState::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let mut triggers = Vec::new();
        for trigger in self.next_page_triggers {
            triggers.push(forward_trigger(trigger, commands_tx.clone(), |()| {
                Event::NextPage
            }));
        }
        for trigger in self.start_over_triggers {
            triggers.push(forward_trigger(
                trigger,
                commands_tx.clone(),
                Event::StartOver,
            ));
        }

        debug!(
            concat = self.concat.name(),
            clear_accumulated_on_restart = self.clear_accumulated_on_restart,
            triggers = triggers.len(),
            "Starting paginator"
        );

        let task = PaginatorTask {
            state,
            reducer: Reducer {
                clear_accumulated_on_restart: self.clear_accumulated_on_restart,
                concat: self.concat,
                stop_on_empty_page: self.stop_on_empty_page,
            },
            source: page_source(loader, decoder),
            commands: commands_rx,
            completions: commands_tx.downgrade(),
            updates: updates_tx.clone(),
            snapshot: snapshot_tx,
            triggers,
        };
        tokio::spawn(task.run());

        Ok(Paginator {
            commands: commands_tx,
            updates: updates_tx,
            snapshot: snapshot_rx,
        })
    }
}

/// Forward a trigger stream into the command channel until either side closes
fn forward_trigger<T, P, I>(
    mut trigger: BoxStream<'static, T>,
    commands: mpsc::UnboundedSender<Command<P, I>>,
    to_event: impl Fn(T) -> Event<P, I> + Send + 'static,
) -> JoinHandle<()>
where
    T: Send + 'static,
    P: Send + 'static,
    I: Send + 'static,
{
    tokio::spawn(async move {
        while let Some(value) = trigger.next().await {
            if commands.send(Command::Event(to_event(value))).is_err() {
                break;
            }
        }
    })
}

// ============================================================================
// Task
// ============================================================================

struct PaginatorTask<P, I> {
    state: PaginationState<I>,
    reducer: Reducer<I>,
    source: PageSource<P, I>,
    commands: mpsc::UnboundedReceiver<Command<P, I>>,
    completions: mpsc::WeakUnboundedSender<Command<P, I>>,
    updates: broadcast::Sender<PaginatorUpdate<I>>,
    snapshot: watch::Sender<PaginatorSnapshot<I>>,
    triggers: Vec<JoinHandle<()>>,
}

impl<P, I> PaginatorTask<P, I>
where
    P: Send + 'static,
    I: Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Event(event) => self.handle(event),
                Command::Shutdown => {
                    debug!(generation = self.state.generation, "Paginator shutting down");
                    break;
                }
            }
        }
        for trigger in self.triggers.drain(..) {
            trigger.abort();
        }
    }

    fn handle(&mut self, event: Event<P, I>) {
        let transition = self.reducer.reduce(&self.state, event);
        self.state = transition.state;
        self.snapshot.send_replace(self.state.snapshot());

        for effect in transition.effects {
            match effect {
                Effect::Publish(update) => {
                    // No subscribers is not an error
                    let _ = self.updates.send(update);
                }
                Effect::Dispatch {
                    generation,
                    request,
                } => self.dispatch(generation, request),
            }
        }
    }

    fn dispatch(&self, generation: u64, request: PageRequest<P>) {
        let Some(completions) = self.completions.upgrade() else {
            // Every handle and trigger is gone; nobody can observe the result
            return;
        };
        trace!(generation, first_page = request.is_first_page(), "Dispatching load");

        let load = (self.source)(request);
        tokio::spawn(async move {
            let event = match load.await {
                Ok(page) => Event::Loaded { generation, page },
                Err(error) => Event::Failed { generation, error },
            };
            let _ = completions.send(Command::Event(event));
        });
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Handle to a running paginator
///
/// Cheap to clone. The task stops on [`Paginator::shutdown`], or once every
/// handle, trigger stream and in-flight load is gone.
pub struct Paginator<P, I> {
    commands: mpsc::UnboundedSender<Command<P, I>>,
    updates: broadcast::Sender<PaginatorUpdate<I>>,
    snapshot: watch::Receiver<PaginatorSnapshot<I>>,
}

impl<P, I> Clone for Paginator<P, I> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            updates: self.updates.clone(),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<P, I> Paginator<P, I>
where
    P: Send + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Create a builder
    pub fn builder<E: Send + 'static>() -> PaginatorBuilder<P, E, I> {
        PaginatorBuilder::new()
    }

    /// Restart the listing from page 1 with fresh parameters
    pub fn start_over_with(&self, params: P) -> Result<()> {
        self.send(Event::StartOver(params))
    }

    /// Request the next page
    ///
    /// Dropped while a load is in flight or when no further page exists.
    pub fn next_page(&self) -> Result<()> {
        self.send(Event::NextPage)
    }

    /// Stop the paginator task
    ///
    /// Loads already in flight run to completion but their results are
    /// dropped.
    pub fn shutdown(&self) -> Result<()> {
        self.commands
            .send(Command::Shutdown)
            .map_err(|_| Error::PaginatorClosed)
    }

    /// Check if the paginator task has stopped
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Latest state
    pub fn snapshot(&self) -> PaginatorSnapshot<I> {
        self.snapshot.borrow().clone()
    }

    /// Raw receiver of ordered updates published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PaginatorUpdate<I>> {
        self.updates.subscribe()
    }

    /// All updates published after this call, in order
    pub fn updates(&self) -> impl Stream<Item = PaginatorUpdate<I>> + Send + 'static {
        futures::stream::unfold(self.subscribe(), |mut updates| async move {
            loop {
                match updates.recv().await {
                    Ok(update) => return Some((update, updates)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Paginator subscriber lagged, updates dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    /// Accumulated list after every successful page load
    pub fn items(&self) -> impl Stream<Item = Arc<Vec<I>>> + Send + 'static {
        self.updates().filter_map(|update| {
            future::ready(match update {
                PaginatorUpdate::Items(items) => Some(items),
                _ => None,
            })
        })
    }

    /// `true` when a load begins, `false` when the current load terminates
    pub fn is_fetching(&self) -> impl Stream<Item = bool> + Send + 'static {
        self.updates().filter_map(|update| {
            future::ready(match update {
                PaginatorUpdate::Fetching(fetching) => Some(fetching),
                _ => None,
            })
        })
    }

    /// 1-based number of each page as its load is dispatched
    pub fn loading_page(&self) -> impl Stream<Item = u32> + Send + 'static {
        self.updates().filter_map(|update| {
            future::ready(match update {
                PaginatorUpdate::LoadingPage(page) => Some(page),
                _ => None,
            })
        })
    }

    fn send(&self, event: Event<P, I>) -> Result<()> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| Error::PaginatorClosed)
    }
}

impl<P, I> std::fmt::Debug for Paginator<P, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.borrow();
        f.debug_struct("Paginator")
            .field("generation", &snapshot.generation)
            .field("current_page", &snapshot.current_page)
            .field("is_fetching", &snapshot.is_fetching)
            .field("items", &snapshot.items.len())
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}
