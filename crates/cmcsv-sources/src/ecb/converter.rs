//! Lazily fetched, run-scoped exchange rate.

use chrono::Utc;
use cmcsv_core::currency::{SOURCE_CURRENCY, TARGET_CURRENCY};
use cmcsv_core::{ExchangeRate, RateOrigin};
use rust_decimal::Decimal;
use tokio::sync::OnceCell;

use super::client::EcbClient;
use crate::error::RateUnavailable;

/// Fetches the EUR→USD rate on first use and reuses it for the rest of the
/// run. When the feed is unreachable, the configured fallback rate is used
/// instead; without one the failure is returned to the caller.
pub struct RateConverter {
    client: EcbClient,
    fallback: Option<Decimal>,
    rate: OnceCell<ExchangeRate>,
}

impl RateConverter {
    #[must_use]
    pub fn new(client: EcbClient, fallback: Option<Decimal>) -> Self {
        Self {
            client,
            fallback,
            rate: OnceCell::new(),
        }
    }

    /// The run's rate, fetching it on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`RateUnavailable`] when the feed fails and no fallback rate
    /// is configured. A failed fetch is not memoized, so a later call tries
    /// again.
    pub async fn rate(&self) -> Result<&ExchangeRate, RateUnavailable> {
        self.rate
            .get_or_try_init(|| async {
                match self.client.fetch_eur_usd().await {
                    Ok(rate) => {
                        tracing::info!(%rate, "using ECB exchange rate: 1 {SOURCE_CURRENCY} = {rate} {TARGET_CURRENCY}");
                        Ok(ExchangeRate::live(rate, Utc::now()))
                    }
                    Err(source) => match self.fallback {
                        Some(rate) => {
                            tracing::warn!(
                                %rate,
                                error = %source,
                                "exchange rate feed unavailable, using fallback rate: 1 {SOURCE_CURRENCY} = {rate} {TARGET_CURRENCY}"
                            );
                            Ok(ExchangeRate::fallback(rate))
                        }
                        None => Err(RateUnavailable { source }),
                    },
                }
            })
            .await
    }

    /// The rate if it has already been resolved.
    #[must_use]
    pub fn resolved(&self) -> Option<&ExchangeRate> {
        self.rate.get()
    }

    /// `true` if the run fell back to the configured rate.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.resolved()
            .is_some_and(|rate| rate.origin == RateOrigin::Fallback)
    }
}
