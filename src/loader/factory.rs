//! Paginator assembly from a listing definition

use crate::decode::{identity_key, JsonEnvelopeDecoder};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::listing::{HttpListingLoader, ListingDecoder, ListingResponse};
use crate::loader::types::{ListingDefinition, StopConditionDefinition};
use crate::pagination::{ConcatPolicy, Paginator, PaginatorBuilder};
use crate::types::StringMap;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Paginator over a JSON listing, restarted with query parameters
pub type JsonPaginator = Paginator<StringMap, Value>;

impl ListingDefinition {
    /// HTTP client for this listing
    pub fn http_client(&self) -> Result<HttpClient> {
        let defaults = HttpClientConfig::default();
        HttpClient::with_config(HttpClientConfig {
            base_url: Some(self.base_url.clone()),
            timeout: Duration::from_secs(self.http.timeout_secs),
            max_retries: self.http.max_retries,
            initial_backoff: Duration::from_millis(self.http.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.http.max_backoff_ms),
            backoff_type: self.http.backoff,
            default_headers: self.headers.clone(),
            user_agent: self.http.user_agent.clone().unwrap_or(defaults.user_agent),
        })
    }

    /// Page loader for this listing
    pub fn listing_loader(&self) -> Result<HttpListingLoader> {
        Ok(HttpListingLoader::new(self.http_client()?, &self.path)
            .default_params(self.params.clone()))
    }

    /// Envelope decoder for this listing
    pub fn decoder(&self) -> JsonEnvelopeDecoder {
        let mut decoder = match &self.items_path {
            Some(path) => JsonEnvelopeDecoder::with_items_path(path),
            None => JsonEnvelopeDecoder::new(),
        };
        if let Some(path) = &self.token_path {
            decoder = decoder.token_path(path);
        }
        if let Some(StopConditionDefinition::Field { path, value }) = &self.stop_when {
            decoder = decoder.stop_when(path, value.clone());
        }
        decoder
    }

    /// Decoder that turns this listing's continuation tokens into next-page URLs
    pub fn listing_decoder(&self) -> ListingDecoder {
        ListingDecoder::new(self.decoder(), self.token_style.clone())
    }

    /// Concatenation policy: identity de-duplication when a dedup path is set
    pub fn concat_policy(&self) -> ConcatPolicy<Value> {
        match &self.dedup_path {
            Some(path) => {
                let path = path.clone();
                ConcatPolicy::distinct_by(move |item: &Value| identity_key(item, &path))
            }
            None => ConcatPolicy::append(),
        }
    }

    /// Paginator builder with every setting from this definition applied
    ///
    /// Triggers can still be attached before building.
    pub fn paginator_builder(
        &self,
    ) -> Result<PaginatorBuilder<StringMap, ListingResponse, Value>> {
        debug!(
            listing = %self.name,
            concat = self.concat_policy().name(),
            "Assembling paginator"
        );
        Ok(Paginator::builder()
            .loader(self.listing_loader()?)
            .decoder(self.listing_decoder())
            .concat(self.concat_policy())
            .clear_accumulated_on_restart(self.clear_on_restart)
            .stop_on_empty_page(matches!(
                self.stop_when,
                Some(StopConditionDefinition::EmptyPage)
            )))
    }

    /// Build and start a paginator for this listing
    ///
    /// Must be called from within a tokio runtime.
    pub fn paginator(&self) -> Result<JsonPaginator> {
        self.paginator_builder()?.build()
    }
}
