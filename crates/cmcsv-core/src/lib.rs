mod app_config;
pub mod catalog;
mod config;
pub mod currency;
pub mod items;
pub mod record;

pub use app_config::AppConfig;
pub use catalog::{CatalogCard, CatalogMatch, MatchConfidence};
pub use config::{load_app_config, load_app_config_from_env};
pub use currency::{convert, ExchangeRate, RateOrigin};
pub use items::{normalize_language, split_set_hint, Condition, Finish, RawLineItem};
pub use record::{assemble, merge_duplicates, OutputRecord, CSV_HEADER, PLACEHOLDER_ID};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
