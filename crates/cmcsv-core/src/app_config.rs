use std::path::PathBuf;

use rust_decimal::Decimal;

/// Process-scoped settings for one conversion run.
///
/// Built once at startup (see [`crate::load_app_config`]) and passed by
/// reference into every component that needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub completed_dir: PathBuf,
    /// File extension (without the dot) of saved order pages.
    pub input_extension: String,
    pub log_level: String,
    /// EUR→USD factor used when the live rate cannot be fetched. `None`
    /// makes a rate outage fatal for any run that has prices to convert.
    pub fallback_rate: Option<Decimal>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure of an external call.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_concurrent_lookups: usize,
    pub merge_duplicates: bool,
    pub scryfall_base_url: String,
    pub ecb_base_url: String,
}
