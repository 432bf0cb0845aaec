//! Run-scoped catalog resolution with per-key memoization.

use std::collections::HashMap;
use std::sync::Arc;

use cmcsv_core::{CatalogMatch, Finish, RawLineItem};
use tokio::sync::{Mutex, OnceCell};

use super::client::ScryfallClient;
use super::disambiguate::disambiguate;
use crate::error::CatalogUnavailable;

/// Everything that can change the outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub product_id: String,
    pub name: String,
    pub finish: Finish,
    pub language: Option<String>,
    pub set_hint: Option<String>,
}

impl LookupKey {
    #[must_use]
    pub fn for_item(item: &RawLineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            finish: item.finish,
            language: item.language.clone(),
            set_hint: item.set_hint.clone(),
        }
    }
}

/// Resolves line items to catalog printings, querying Scryfall at most once
/// per [`LookupKey`] for the lifetime of the resolver.
///
/// Safe to share between concurrent tasks: a second lookup for a key that is
/// still in flight waits for the first and reuses its result.
pub struct CatalogResolver {
    client: ScryfallClient,
    cache: Mutex<HashMap<LookupKey, Arc<OnceCell<CatalogMatch>>>>,
}

impl CatalogResolver {
    #[must_use]
    pub fn new(client: ScryfallClient) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `item`, never failing.
    ///
    /// A lookup that is still failing after retries is logged and recorded
    /// as a non-match, so the row ends up flagged for manual review.
    pub async fn resolve(&self, item: &RawLineItem) -> CatalogMatch {
        let key = LookupKey::for_item(item);
        let cell = {
            let mut cache = self.cache.lock().await;
            Arc::clone(cache.entry(key).or_default())
        };

        cell.get_or_init(|| async {
            match self.try_lookup(item).await {
                Ok(matched) => matched,
                Err(err) => {
                    tracing::warn!(
                        product_id = %err.product_id,
                        name = %item.name,
                        error = %err.source,
                        "catalog lookup failed, marking item unresolved"
                    );
                    CatalogMatch::no_match()
                }
            }
        })
        .await
        .clone()
    }

    /// Number of distinct lookup keys seen so far.
    pub async fn cached_keys(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Resolves `item` against Scryfall without touching the cache.
    ///
    /// The marketplace product id is tried first and is authoritative when
    /// found. Otherwise every printing with the exact name is fetched and
    /// narrowed with [`disambiguate`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogUnavailable`] when either request still fails after
    /// the client's retries.
    pub async fn try_lookup(&self, item: &RawLineItem) -> Result<CatalogMatch, CatalogUnavailable> {
        let unavailable = |source| CatalogUnavailable {
            product_id: item.product_id.clone(),
            source,
        };

        if let Some(card) = self
            .client
            .card_by_cardmarket_id(&item.product_id)
            .await
            .map_err(unavailable)?
        {
            tracing::debug!(product_id = %item.product_id, scryfall_id = %card.id, "matched by product id");
            return Ok(CatalogMatch::exact(card));
        }

        let candidates = self
            .client
            .search_exact_name(&item.name)
            .await
            .map_err(unavailable)?;
        let matched = disambiguate(item, candidates);
        tracing::debug!(
            product_id = %item.product_id,
            name = %item.name,
            confidence = %matched.confidence(),
            "matched by name search"
        );
        Ok(matched)
    }
}
