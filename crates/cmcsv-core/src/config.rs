use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config. Tests drive this with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let input_dir = PathBuf::from(or_default("CMCSV_INPUT_DIR", "./data/input"));
    let output_dir = PathBuf::from(or_default("CMCSV_OUTPUT_DIR", "./data/records"));
    let completed_dir = PathBuf::from(or_default("CMCSV_COMPLETED_DIR", "./data/completed"));
    let input_extension = or_default("CMCSV_INPUT_EXTENSION", "html")
        .trim_start_matches('.')
        .to_string();
    let log_level = or_default("CMCSV_LOG_LEVEL", "info");

    let fallback_rate = parse_fallback_rate(&or_default("CMCSV_FALLBACK_RATE", "1.16"))
        .map_err(|reason| invalid("CMCSV_FALLBACK_RATE", reason))?;

    let http_timeout_secs = parse_u64("CMCSV_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CMCSV_USER_AGENT", "cmcsv/0.1 (collection-import)");
    let max_retries = parse_u32("CMCSV_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("CMCSV_RETRY_BACKOFF_BASE_MS", "500")?;

    let max_concurrent_lookups = or_default("CMCSV_MAX_CONCURRENT_LOOKUPS", "4")
        .parse::<usize>()
        .map_err(|e| invalid("CMCSV_MAX_CONCURRENT_LOOKUPS", e.to_string()))?;
    if max_concurrent_lookups == 0 {
        return Err(invalid(
            "CMCSV_MAX_CONCURRENT_LOOKUPS",
            "must be at least 1".to_string(),
        ));
    }

    let merge_duplicates = parse_bool(&or_default("CMCSV_MERGE_DUPLICATES", "false"))
        .ok_or_else(|| invalid("CMCSV_MERGE_DUPLICATES", "expected true or false".to_string()))?;

    let scryfall_base_url = or_default("CMCSV_SCRYFALL_BASE_URL", "https://api.scryfall.com");
    let ecb_base_url = or_default("CMCSV_ECB_BASE_URL", "https://data-api.ecb.europa.eu");

    Ok(AppConfig {
        input_dir,
        output_dir,
        completed_dir,
        input_extension,
        log_level,
        fallback_rate,
        http_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_lookups,
        merge_duplicates,
        scryfall_base_url,
        ecb_base_url,
    })
}

/// `"none"` or an empty value disables the fallback; anything else must be a
/// positive decimal.
fn parse_fallback_rate(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let rate = Decimal::from_str(trimmed).map_err(|e| e.to_string())?;
    if rate <= Decimal::ZERO {
        return Err(format!("rate must be positive, got {rate}"));
    }
    Ok(Some(rate))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
