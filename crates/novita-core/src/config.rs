use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// True for names made only of ASCII alphanumerics and underscores.
#[must_use]
pub fn is_plain_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Build application configuration using the provided env-var lookup function.
///
/// Nothing is strictly required: without backend credentials the service runs
/// on its in-memory sample catalog.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset, so `SUPABASE_URL=` in a .env file does not
    // produce a half-configured backend.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("NOVITA_ENV", "development"))?;
    let bind_addr = parse_addr("NOVITA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("NOVITA_LOG_LEVEL", "info");

    let backend_url = optional("SUPABASE_URL");
    let backend_anon_key = optional("SUPABASE_ANON_KEY");
    let backend_service_key = optional("SUPABASE_SERVICE_ROLE_KEY");

    let products_table = or_default("NOVITA_PRODUCTS_TABLE", "produtos");
    if !is_plain_table_name(&products_table) {
        return Err(ConfigError::InvalidEnvVar {
            var: "NOVITA_PRODUCTS_TABLE".to_string(),
            reason: format!("'{products_table}' is not a plain table name"),
        });
    }

    let backend_timeout_secs = parse_u64("NOVITA_BACKEND_TIMEOUT_SECS", "10")?;
    if backend_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NOVITA_BACKEND_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let backend_max_retries = parse_u32("NOVITA_BACKEND_MAX_RETRIES", "2")?;
    let backend_retry_backoff_ms = parse_u64("NOVITA_BACKEND_RETRY_BACKOFF_MS", "250")?;

    let site_config_path = optional("NOVITA_SITE_CONFIG_PATH").map(PathBuf::from);

    let rate_limit_max_requests = parse_usize("NOVITA_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("NOVITA_RATE_LIMIT_WINDOW_SECS", "60")?;
    if rate_limit_max_requests == 0 || rate_limit_window_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NOVITA_RATE_LIMIT_MAX_REQUESTS".to_string(),
            reason: "rate limit requests and window must both be non-zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        backend_url,
        backend_anon_key,
        backend_service_key,
        products_table,
        backend_timeout_secs,
        backend_max_retries,
        backend_retry_backoff_ms,
        site_config_path,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NOVITA_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
