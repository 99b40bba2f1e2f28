//! Pagination types
//!
//! Defines the values that flow through the paginator: page requests,
//! decoded pages, the per-listing state and the updates published to
//! subscribers.

use std::sync::Arc;

/// One unit of work for the page loader
///
/// Only the paginator constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest<P> {
    /// Load the first page of a listing from fresh parameters
    FirstPage(P),
    /// Load the page behind a continuation token
    NextPage(String),
}

impl<P> PageRequest<P> {
    /// Check if this is a first-page request
    pub fn is_first_page(&self) -> bool {
        matches!(self, Self::FirstPage(_))
    }

    /// Continuation token, for next-page requests
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::FirstPage(_) => None,
            Self::NextPage(token) => Some(token),
        }
    }
}

/// A decoded envelope: the page's items and the token for the page after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<I> {
    /// Items in listing order (may be empty)
    pub items: Vec<I>,
    /// Token for the next page; `None` means the listing is exhausted
    pub continuation: Option<String>,
}

impl<I> Page<I> {
    /// Create a page
    pub fn new(items: Vec<I>, continuation: Option<String>) -> Self {
        Self {
            items,
            continuation,
        }
    }

    /// Create a final page (no continuation)
    pub fn last(items: Vec<I>) -> Self {
        Self::new(items, None)
    }

    /// Check if another page follows this one
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// State of one paginator
///
/// Owned by the paginator task and replaced wholesale on every transition;
/// nothing mutates a published value.
#[derive(Debug)]
pub struct PaginationState<I> {
    /// Items fetched so far for the current generation
    pub accumulated: Arc<Vec<I>>,
    /// Token for the next page; `None` after a restart until the first page lands
    pub continuation_token: Option<String>,
    /// Incremented on every restart
    pub generation: u64,
    /// True exactly while a load for the current generation is outstanding
    pub is_fetching: bool,
    /// Pages loaded in the current generation
    pub current_page: u32,
}

impl<I> PaginationState<I> {
    /// Create the initial state (nothing started yet)
    pub fn new() -> Self {
        Self {
            accumulated: Arc::new(Vec::new()),
            continuation_token: None,
            generation: 0,
            is_fetching: false,
            current_page: 0,
        }
    }

    /// Check if a next-page trigger would dispatch a load
    pub fn can_load_next(&self) -> bool {
        !self.is_fetching && self.continuation_token.is_some()
    }

    /// Take a read-only snapshot for subscribers
    pub fn snapshot(&self) -> PaginatorSnapshot<I> {
        PaginatorSnapshot {
            items: Arc::clone(&self.accumulated),
            is_fetching: self.is_fetching,
            current_page: self.current_page,
            generation: self.generation,
            has_more: self.continuation_token.is_some(),
        }
    }
}

impl<I> Default for PaginationState<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for PaginationState<I> {
    fn clone(&self) -> Self {
        Self {
            accumulated: Arc::clone(&self.accumulated),
            continuation_token: self.continuation_token.clone(),
            generation: self.generation,
            is_fetching: self.is_fetching,
            current_page: self.current_page,
        }
    }
}

/// An update published by the paginator, in timeline order
#[derive(Debug)]
pub enum PaginatorUpdate<I> {
    /// The full accumulated list after a successful page load
    Items(Arc<Vec<I>>),
    /// A load began (`true`) or the current load terminated (`false`)
    Fetching(bool),
    /// 1-based page number of the load being dispatched
    LoadingPage(u32),
}

impl<I> PaginatorUpdate<I> {
    /// Items carried by this update, if any
    pub fn items(&self) -> Option<&Arc<Vec<I>>> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }
}

impl<I> Clone for PaginatorUpdate<I> {
    fn clone(&self) -> Self {
        match self {
            Self::Items(items) => Self::Items(Arc::clone(items)),
            Self::Fetching(fetching) => Self::Fetching(*fetching),
            Self::LoadingPage(page) => Self::LoadingPage(*page),
        }
    }
}

impl<I: PartialEq> PartialEq for PaginatorUpdate<I> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Items(a), Self::Items(b)) => a == b,
            (Self::Fetching(a), Self::Fetching(b)) => a == b,
            (Self::LoadingPage(a), Self::LoadingPage(b)) => a == b,
            _ => false,
        }
    }
}

/// Latest paginator state, readable without subscribing
#[derive(Debug)]
pub struct PaginatorSnapshot<I> {
    /// Accumulated items
    pub items: Arc<Vec<I>>,
    /// Whether a load for the current generation is outstanding
    pub is_fetching: bool,
    /// Pages loaded in the current generation
    pub current_page: u32,
    /// Current listing generation (0 before the first restart)
    pub generation: u64,
    /// Whether a continuation token is held
    pub has_more: bool,
}

impl<I> Clone for PaginatorSnapshot<I> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            is_fetching: self.is_fetching,
            current_page: self.current_page,
            generation: self.generation,
            has_more: self.has_more,
        }
    }
}
