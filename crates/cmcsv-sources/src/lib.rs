//! Clients for the external services the pipeline depends on: the Scryfall
//! card catalog and the ECB exchange-rate feed.

pub mod ecb;
pub mod error;
mod retry;
pub mod scryfall;

pub use ecb::{EcbClient, RateConverter};
pub use error::{CatalogUnavailable, RateUnavailable, SourceError};
pub use retry::RetryPolicy;
pub use scryfall::{CatalogResolver, LookupKey, ScryfallClient};
