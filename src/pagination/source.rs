//! Page loader and envelope decoder contracts
//!
//! The paginator never talks to the network or inspects a response. It is
//! handed a [`PageLoader`] that produces raw envelopes and an
//! [`EnvelopeDecoder`] that turns an envelope into items and a continuation
//! token. Closures can stand in for either through [`FnLoader`] and
//! [`FnDecoder`].

use super::types::{Page, PageRequest};
use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Loads raw envelopes for a remote listing
#[async_trait]
pub trait PageLoader<P, E>: Send + Sync
where
    P: Send + 'static,
    E: Send + 'static,
{
    /// Load the first page of a listing
    async fn load_first_page(&self, params: P) -> Result<E>;

    /// Load the page behind a continuation token
    async fn load_next_page(&self, token: String) -> Result<E>;
}

/// Extracts items and the continuation token from an envelope
pub trait EnvelopeDecoder<E, I>: Send + Sync {
    /// Items of this page, in listing order
    fn items(&self, envelope: &E) -> Result<Vec<I>>;

    /// Token for the next page; `None` when the listing is exhausted
    fn continuation_token(&self, envelope: &E) -> Option<String>;
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Page loader built from two async closures
pub struct FnLoader<F, N> {
    first: F,
    next: N,
}

impl<F, N> FnLoader<F, N> {
    /// Create a loader from a first-page closure and a next-page closure
    pub fn new(first: F, next: N) -> Self {
        Self { first, next }
    }
}

#[async_trait]
impl<P, E, F, FFut, N, NFut> PageLoader<P, E> for FnLoader<F, N>
where
    P: Send + 'static,
    E: Send + 'static,
    F: Fn(P) -> FFut + Send + Sync,
    FFut: Future<Output = Result<E>> + Send,
    N: Fn(String) -> NFut + Send + Sync,
    NFut: Future<Output = Result<E>> + Send,
{
    async fn load_first_page(&self, params: P) -> Result<E> {
        (self.first)(params).await
    }

    async fn load_next_page(&self, token: String) -> Result<E> {
        (self.next)(token).await
    }
}

/// Envelope decoder built from two closures
pub struct FnDecoder<F, T> {
    items: F,
    token: T,
}

impl<F, T> FnDecoder<F, T> {
    /// Create a decoder from an items closure and a token closure
    pub fn new(items: F, token: T) -> Self {
        Self { items, token }
    }
}

impl<E, I, F, T> EnvelopeDecoder<E, I> for FnDecoder<F, T>
where
    F: Fn(&E) -> Result<Vec<I>> + Send + Sync,
    T: Fn(&E) -> Option<String> + Send + Sync,
{
    fn items(&self, envelope: &E) -> Result<Vec<I>> {
        (self.items)(envelope)
    }

    fn continuation_token(&self, envelope: &E) -> Option<String> {
        (self.token)(envelope)
    }
}

// ============================================================================
// Composed page source
// ============================================================================

/// Loader and decoder fused into one call: request in, decoded page out
pub(crate) type PageSource<P, I> =
    Arc<dyn Fn(PageRequest<P>) -> BoxFuture<'static, Result<Page<I>>> + Send + Sync>;

/// Fuse a loader and a decoder, erasing the envelope type
pub(crate) fn page_source<P, E, I>(
    loader: Arc<dyn PageLoader<P, E>>,
    decoder: Arc<dyn EnvelopeDecoder<E, I>>,
) -> PageSource<P, I>
where
    P: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    Arc::new(move |request| {
        let loader = Arc::clone(&loader);
        let decoder = Arc::clone(&decoder);
        Box::pin(async move {
            let envelope = match request {
                PageRequest::FirstPage(params) => loader.load_first_page(params).await?,
                PageRequest::NextPage(token) => loader.load_next_page(token).await?,
            };
            let items = decoder.items(&envelope)?;
            let continuation = decoder.continuation_token(&envelope);
            Ok(Page::new(items, continuation))
        })
    })
}
