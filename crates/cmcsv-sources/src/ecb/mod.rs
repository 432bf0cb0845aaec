//! ECB reference-rate feed and the run-scoped converter built on it.

mod client;
mod converter;
mod types;

pub use client::EcbClient;
pub use converter::RateConverter;
pub use types::EcbResponse;
