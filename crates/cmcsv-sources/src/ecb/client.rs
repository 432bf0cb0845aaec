//! HTTP client for the ECB data API's daily EUR/USD reference rate.

use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;

use super::types::EcbResponse;
use crate::error::SourceError;
use crate::retry::{retry_after_secs, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://data-api.ecb.europa.eu/";

/// Daily USD per EUR, reference rate, average.
const SERIES_PATH: &str = "service/data/EXR/D.USD.EUR.SP00.A";

/// Days of history requested so weekends and holidays still return an
/// observation.
const LOOKBACK_DAYS: i64 = 3;

pub struct EcbClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl EcbClient {
    /// Creates a client pointed at the production ECB data API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str, retry: RetryPolicy) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent, retry)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
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

    /// Fetches the most recent EUR→USD reference rate.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] / [`SourceError::UnexpectedStatus`] once
    ///   retries are exhausted.
    /// - [`SourceError::Deserialize`] if the body is not SDMX-JSON.
    /// - [`SourceError::NoObservation`] if the window holds no usable rate.
    pub async fn fetch_eur_usd(&self) -> Result<Decimal, SourceError> {
        let start = Utc::now().date_naive() - TimeDelta::days(LOOKBACK_DAYS);
        let url = self.rate_url(start)?;

        let data: EcbResponse = self
            .retry
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
                    serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                        context: "ECB EUR/USD series".to_owned(),
                        source: e,
                    })
                }
            })
            .await?;

        let raw = data
            .latest_value()
            .ok_or_else(|| SourceError::NoObservation(format!("no observations since {start}")))?;
        let rate = Decimal::from_str(&raw.to_string())
            .ok()
            .filter(|r| *r > Decimal::ZERO)
            .ok_or_else(|| SourceError::NoObservation(format!("unusable rate value {raw}")))?;

        tracing::debug!(%rate, since = %start, "fetched EUR/USD reference rate");
        Ok(rate)
    }

    fn rate_url(&self, start: NaiveDate) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join(SERIES_PATH)
            .map_err(|e| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("format", "jsondata")
            .append_pair("startPeriod", &start.format("%Y-%m-%d").to_string());
        Ok(url)
    }
}
