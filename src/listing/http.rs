//! HTTP listing loader
//!
//! A page loader for JSON listing endpoints: the first page is a GET with
//! the start-over parameters as query string. Every response remembers the
//! URL that produced it, and [`ListingDecoder`] renders the continuation
//! token into the complete URL of the next page. The loader itself keeps no
//! per-listing state, so loads of a superseded listing cannot leak into the
//! current one.

use crate::decode::JsonEnvelopeDecoder;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{EnvelopeDecoder, PageLoader};
use crate::types::StringMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// How a continuation token turns into the next request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenStyle {
    /// The token is the next page URL, absolute or relative to the listing URL
    #[default]
    NextUrl,
    /// The token is a cursor sent as a query parameter alongside the
    /// first-page parameters
    QueryParam {
        /// Query parameter name for the cursor
        param: String,
    },
}

impl TokenStyle {
    /// URL of the page after the one fetched from `url`
    pub fn next_url(&self, url: &Url, token: &str) -> std::result::Result<Url, url::ParseError> {
        match self {
            Self::NextUrl => url.join(token),
            Self::QueryParam { param } => {
                let mut next = url.clone();
                let kept: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(key, _)| key != param.as_str())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect();
                next.query_pairs_mut()
                    .clear()
                    .extend_pairs(kept)
                    .append_pair(param, token);
                Ok(next)
            }
        }
    }
}

/// A listing response and the URL it was fetched from
#[derive(Debug, Clone, PartialEq)]
pub struct ListingResponse {
    /// Request URL, query string included
    pub url: Url,
    /// Parsed JSON body
    pub body: Value,
}

/// Page loader for a JSON listing endpoint
///
/// Continuation tokens handed to [`PageLoader::load_next_page`] are URLs,
/// absolute or relative to the listing path.
#[derive(Debug, Clone)]
pub struct HttpListingLoader {
    client: HttpClient,
    path: String,
    default_params: StringMap,
}

impl HttpListingLoader {
    /// Create a loader for `path` on the client's base URL
    pub fn new(client: HttpClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            default_params: StringMap::new(),
        }
    }

    /// Parameters sent with every first page; start-over parameters win
    #[must_use]
    pub fn default_params(mut self, params: StringMap) -> Self {
        self.default_params = params;
        self
    }

    /// The listing path
    pub fn path(&self) -> &str {
        &self.path
    }

    async fn fetch(&self, url: Url) -> Result<ListingResponse> {
        let body = self.client.get_json(url.as_str(), &StringMap::new()).await?;
        Ok(ListingResponse { url, body })
    }
}

#[async_trait]
impl PageLoader<StringMap, ListingResponse> for HttpListingLoader {
    async fn load_first_page(&self, params: StringMap) -> Result<ListingResponse> {
        let mut query = self.default_params.clone();
        query.extend(params);

        let mut url = self.client.build_url(&self.path)?;
        if !query.is_empty() {
            // Sorted so equal parameters always give the same URL
            let mut pairs: Vec<_> = query.iter().collect();
            pairs.sort();
            url.query_pairs_mut().extend_pairs(pairs);
        }

        debug!(url = %url, "Loading first page");
        self.fetch(url).await
    }

    async fn load_next_page(&self, token: String) -> Result<ListingResponse> {
        let url = self.client.build_url(&self.path)?.join(&token)?;
        debug!(url = %url, "Loading next page");
        self.fetch(url).await
    }
}

/// Envelope decoder for [`ListingResponse`]s
///
/// Items come from the wrapped JSON decoder. The continuation token it
/// finds is rendered against the response URL, so the token the paginator
/// stores is the full URL of the next page.
#[derive(Debug, Clone)]
pub struct ListingDecoder<D = JsonEnvelopeDecoder> {
    inner: D,
    token_style: TokenStyle,
}

impl<D> ListingDecoder<D> {
    /// Wrap a JSON decoder
    pub fn new(inner: D, token_style: TokenStyle) -> Self {
        Self { inner, token_style }
    }
}

impl<I, D> EnvelopeDecoder<ListingResponse, I> for ListingDecoder<D>
where
    D: EnvelopeDecoder<Value, I>,
{
    fn items(&self, envelope: &ListingResponse) -> Result<Vec<I>> {
        self.inner.items(&envelope.body)
    }

    fn continuation_token(&self, envelope: &ListingResponse) -> Option<String> {
        let token = self.inner.continuation_token(&envelope.body)?;
        match self.token_style.next_url(&envelope.url, &token) {
            Ok(next) => Some(next.into()),
            Err(e) => {
                // The next-page load reports the bad URL as a failure
                warn!(token = %token, error = %e, "Continuation token is not a valid URL");
                Some(token)
            }
        }
    }
}
