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

/// Returns a map with a fully configured backend.
fn backend_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SUPABASE_URL", "https://project.supabase.co");
    m.insert("SUPABASE_ANON_KEY", "anon-key");
    m.insert("SUPABASE_SERVICE_ROLE_KEY", "service-key");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "NOVITA_ENV"));
}

#[test]
fn build_app_config_succeeds_with_empty_environment() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.products_table, "produtos");
    assert_eq!(cfg.backend_timeout_secs, 10);
    assert_eq!(cfg.backend_max_retries, 2);
    assert_eq!(cfg.backend_retry_backoff_ms, 250);
    assert_eq!(cfg.rate_limit_max_requests, 120);
    assert_eq!(cfg.rate_limit_window_secs, 60);
    assert!(cfg.site_config_path.is_none());
    assert!(cfg.backend_settings().is_none());
}

#[test]
fn backend_settings_present_with_url_and_anon_key() {
    let map = backend_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let backend = cfg.backend_settings().expect("backend configured");
    assert_eq!(backend.base_url, "https://project.supabase.co");
    assert_eq!(backend.anon_key, "anon-key");
    assert_eq!(backend.service_key.as_deref(), Some("service-key"));
    assert_eq!(backend.table, "produtos");
}

#[test]
fn backend_settings_absent_without_anon_key() {
    let mut map = backend_env();
    map.remove("SUPABASE_ANON_KEY");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.backend_settings().is_none());
}

#[test]
fn blank_backend_values_count_as_unset() {
    let mut map = backend_env();
    map.insert("SUPABASE_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.backend_url.is_none());
    assert!(cfg.backend_settings().is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = backend_env();
    map.insert("NOVITA_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_BIND_ADDR"),
        "expected InvalidEnvVar(NOVITA_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_table_with_path_characters() {
    let mut map = backend_env();
    map.insert("NOVITA_PRODUCTS_TABLE", "produtos?select=*");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_PRODUCTS_TABLE"),
        "expected InvalidEnvVar(NOVITA_PRODUCTS_TABLE), got: {result:?}"
    );
}

#[test]
fn build_app_config_backend_timeout_override() {
    let mut map = backend_env();
    map.insert("NOVITA_BACKEND_TIMEOUT_SECS", "30");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.backend_timeout_secs, 30);
}

#[test]
fn build_app_config_backend_timeout_zero_fails() {
    let mut map = backend_env();
    map.insert("NOVITA_BACKEND_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_BACKEND_TIMEOUT_SECS"),
        "expected InvalidEnvVar(NOVITA_BACKEND_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_backend_max_retries_invalid() {
    let mut map = backend_env();
    map.insert("NOVITA_BACKEND_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_BACKEND_MAX_RETRIES"),
        "expected InvalidEnvVar(NOVITA_BACKEND_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rate_limit_zero_fails() {
    let mut map = backend_env();
    map.insert("NOVITA_RATE_LIMIT_MAX_REQUESTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_RATE_LIMIT_MAX_REQUESTS"),
        "expected InvalidEnvVar(NOVITA_RATE_LIMIT_MAX_REQUESTS), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_on_invalid_env() {
    let mut map = backend_env();
    map.insert("NOVITA_ENV", "producton");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NOVITA_ENV"),
        "expected InvalidEnvVar(NOVITA_ENV), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_keys() {
    let map = backend_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("anon-key"));
    assert!(!rendered.contains("service-key"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn plain_table_names() {
    assert!(is_plain_table_name("produtos"));
    assert!(is_plain_table_name("catalog_v2"));
    assert!(!is_plain_table_name(""));
    assert!(!is_plain_table_name("produtos; drop"));
    assert!(!is_plain_table_name("public.produtos"));
}
