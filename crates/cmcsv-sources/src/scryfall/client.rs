//! HTTP client for the Scryfall card API.
//!
//! Two endpoints are used: the marketplace-id lookup
//! (`/cards/cardmarket/{id}`) and exact-name search (`/cards/search`). Scryfall
//! answers 404 both for an unknown id and for a search without results; both
//! are reported as "nothing found" rather than as errors.

use std::time::Duration;

use cmcsv_core::CatalogCard;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::types::{ScryfallCard, ScryfallList};
use crate::error::SourceError;
use crate::retry::{retry_after_secs, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://api.scryfall.com/";

/// Upper bound on followed `next_page` links for one name search.
/// Prevents runaway loops on a misbehaving server.
const MAX_SEARCH_PAGES: usize = 10;

/// Client for the Scryfall REST API.
///
/// Use [`ScryfallClient::new`] for production or
/// [`ScryfallClient::with_base_url`] to point at a mock server in tests.
pub struct ScryfallClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl ScryfallClient {
    /// Creates a client pointed at the production Scryfall API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str, retry: RetryPolicy) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent, retry)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`SourceError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    /// Looks up the printing registered under a marketplace product id.
    ///
    /// Returns `Ok(None)` when Scryfall has no card for that id.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`] / [`SourceError::UnexpectedStatus`] /
    ///   [`SourceError::Http`] once retries are exhausted.
    /// - [`SourceError::Deserialize`] if the body is not a card object.
    pub async fn card_by_cardmarket_id(
        &self,
        product_id: &str,
    ) -> Result<Option<CatalogCard>, SourceError> {
        let url = self.cardmarket_url(product_id)?;
        let card: Option<ScryfallCard> = self
            .get_json(url, &format!("cards/cardmarket/{product_id}"))
            .await?;
        Ok(card.map(CatalogCard::from))
    }

    /// Returns every printing whose name is exactly `name`, in every language,
    /// in Scryfall's relevance order.
    ///
    /// Follows `next_page` links up to [`MAX_SEARCH_PAGES`]; further pages are
    /// dropped with a warning.
    ///
    /// # Errors
    ///
    /// Same as [`Self::card_by_cardmarket_id`].
    pub async fn search_exact_name(&self, name: &str) -> Result<Vec<CatalogCard>, SourceError> {
        let mut cards = Vec::new();
        let mut next = Some(self.search_url(name)?);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_SEARCH_PAGES {
                tracing::warn!(
                    name,
                    max_pages = MAX_SEARCH_PAGES,
                    collected = cards.len(),
                    "search result pagination limit reached, remaining pages dropped"
                );
                break;
            }

            let Some(list) = self
                .get_json::<ScryfallList>(url, &format!("cards/search(name={name})"))
                .await?
            else {
                break;
            };

            cards.extend(list.data.into_iter().map(CatalogCard::from));
            if list.has_more {
                next = list
                    .next_page
                    .as_deref()
                    .map(|raw| {
                        Url::parse(raw).map_err(|e| SourceError::InvalidBaseUrl {
                            url: raw.to_owned(),
                            reason: e.to_string(),
                        })
                    })
                    .transpose()?;
            }
        }

        tracing::debug!(name, candidates = cards.len(), pages, "exact-name search finished");
        Ok(cards)
    }

    fn cardmarket_url(&self, product_id: &str) -> Result<Url, SourceError> {
        let mut url = self.join("cards/cardmarket/")?;
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .push(product_id);
        Ok(url)
    }

    fn search_url(&self, name: &str) -> Result<Url, SourceError> {
        let mut url = self.join("cards/search")?;
        url.query_pairs_mut()
            .append_pair("q", &format!("!\"{name}\""))
            .append_pair("unique", "prints")
            .append_pair("include_multilingual", "true");
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// GETs `url` under the retry policy and parses the body as `T`.
    ///
    /// 404 yields `Ok(None)`; 429 and other non-2xx statuses become typed
    /// errors so the retry policy can classify them.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<Option<T>, SourceError> {
        self.retry
            .run(|| {
                let url = url.clone();
                async move {
                    let response = self
                        .client
                        .get(url.clone())
                        .header(reqwest::header::ACCEPT, "application/json")
                        .send()
                        .await?;
                    let status = response.status();

                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(SourceError::RateLimited {
                            url: url.to_string(),
                            retry_after_secs: retry_after_secs(response.headers()).unwrap_or(1),
                        });
                    }

                    if !status.is_success() {
                        return Err(SourceError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let body = response.text().await?;
                    serde_json::from_str::<T>(&body)
                        .map(Some)
                        .map_err(|e| SourceError::Deserialize {
                            context: context.to_owned(),
                            source: e,
                        })
                }
            })
            .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
