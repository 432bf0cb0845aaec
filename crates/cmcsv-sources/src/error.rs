use thiserror::Error;

/// Failure talking to an external data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The rate feed answered but carried no usable observation.
    #[error("no usable observation in rate response: {0}")]
    NoObservation(String),
}

/// A catalog lookup failed after every retry.
#[derive(Debug, Error)]
#[error("catalog unavailable for product {product_id}: {source}")]
pub struct CatalogUnavailable {
    pub product_id: String,
    #[source]
    pub source: SourceError,
}

/// The exchange rate could not be fetched and no fallback is configured.
#[derive(Debug, Error)]
#[error("exchange rate unavailable: {source}")]
pub struct RateUnavailable {
    #[source]
    pub source: SourceError,
}
