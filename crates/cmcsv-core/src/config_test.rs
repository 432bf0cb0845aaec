use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.input_dir, PathBuf::from("./data/input"));
    assert_eq!(cfg.output_dir, PathBuf::from("./data/records"));
    assert_eq!(cfg.completed_dir, PathBuf::from("./data/completed"));
    assert_eq!(cfg.input_extension, "html");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.fallback_rate, Some(Decimal::new(116, 2)));
    assert_eq!(cfg.http_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "cmcsv/0.1 (collection-import)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.max_concurrent_lookups, 4);
    assert!(!cfg.merge_duplicates);
    assert_eq!(cfg.scryfall_base_url, "https://api.scryfall.com");
    assert_eq!(cfg.ecb_base_url, "https://data-api.ecb.europa.eu");
}

#[test]
fn input_extension_strips_leading_dot() {
    let mut map = HashMap::new();
    map.insert("CMCSV_INPUT_EXTENSION", ".htm");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.input_extension, "htm");
}

#[test]
fn fallback_rate_override() {
    let mut map = HashMap::new();
    map.insert("CMCSV_FALLBACK_RATE", "1.0825");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fallback_rate, Some(Decimal::new(10825, 4)));
}

#[test]
fn fallback_rate_none_disables_fallback() {
    let mut map = HashMap::new();
    map.insert("CMCSV_FALLBACK_RATE", "none");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.fallback_rate.is_none());
}

#[test]
fn fallback_rate_empty_disables_fallback() {
    let mut map = HashMap::new();
    map.insert("CMCSV_FALLBACK_RATE", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.fallback_rate.is_none());
}

#[test]
fn fallback_rate_invalid() {
    let mut map = HashMap::new();
    map.insert("CMCSV_FALLBACK_RATE", "one-ish");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_FALLBACK_RATE"),
        "expected InvalidEnvVar(CMCSV_FALLBACK_RATE), got: {result:?}"
    );
}

#[test]
fn fallback_rate_must_be_positive() {
    let mut map = HashMap::new();
    map.insert("CMCSV_FALLBACK_RATE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_FALLBACK_RATE"),
        "expected InvalidEnvVar(CMCSV_FALLBACK_RATE), got: {result:?}"
    );
}

#[test]
fn max_retries_override() {
    let mut map = HashMap::new();
    map.insert("CMCSV_MAX_RETRIES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 5);
}

#[test]
fn max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("CMCSV_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_MAX_RETRIES"),
        "expected InvalidEnvVar(CMCSV_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn http_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("CMCSV_HTTP_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CMCSV_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_concurrent_lookups_rejects_zero() {
    let mut map = HashMap::new();
    map.insert("CMCSV_MAX_CONCURRENT_LOOKUPS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_MAX_CONCURRENT_LOOKUPS"),
        "expected InvalidEnvVar(CMCSV_MAX_CONCURRENT_LOOKUPS), got: {result:?}"
    );
}

#[test]
fn merge_duplicates_accepts_common_spellings() {
    for raw in ["true", "1", "yes", "ON"] {
        let mut map = HashMap::new();
        map.insert("CMCSV_MERGE_DUPLICATES", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.merge_duplicates, "{raw} should enable merging");
    }
}

#[test]
fn merge_duplicates_invalid() {
    let mut map = HashMap::new();
    map.insert("CMCSV_MERGE_DUPLICATES", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CMCSV_MERGE_DUPLICATES"),
        "expected InvalidEnvVar(CMCSV_MERGE_DUPLICATES), got: {result:?}"
    );
}

#[test]
fn base_url_overrides() {
    let mut map = HashMap::new();
    map.insert("CMCSV_SCRYFALL_BASE_URL", "http://127.0.0.1:9000");
    map.insert("CMCSV_ECB_BASE_URL", "http://127.0.0.1:9001");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scryfall_base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.ecb_base_url, "http://127.0.0.1:9001");
}
