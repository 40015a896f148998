use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub backend_url: Option<String>,
    pub backend_anon_key: Option<String>,
    pub backend_service_key: Option<String>,
    pub products_table: String,
    pub backend_timeout_secs: u64,
    pub backend_max_retries: u32,
    pub backend_retry_backoff_ms: u64,
    pub site_config_path: Option<PathBuf>,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

/// Everything the backend client needs to reach the hosted products table.
#[derive(Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub anon_key: String,
    pub service_key: Option<String>,
    pub table: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl AppConfig {
    /// Backend settings, present only when both the URL and the anonymous key
    /// are configured. A service key alone is not enough to talk to the backend.
    #[must_use]
    pub fn backend_settings(&self) -> Option<BackendSettings> {
        let base_url = self.backend_url.clone()?;
        let anon_key = self.backend_anon_key.clone()?;
        Some(BackendSettings {
            base_url,
            anon_key,
            service_key: self.backend_service_key.clone(),
            table: self.products_table.clone(),
            timeout_secs: self.backend_timeout_secs,
            max_retries: self.backend_max_retries,
            retry_backoff_ms: self.backend_retry_backoff_ms,
        })
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("backend_url", &self.backend_url)
            .field(
                "backend_anon_key",
                &self.backend_anon_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "backend_service_key",
                &self.backend_service_key.as_ref().map(|_| "[redacted]"),
            )
            .field("products_table", &self.products_table)
            .field("backend_timeout_secs", &self.backend_timeout_secs)
            .field("backend_max_retries", &self.backend_max_retries)
            .field("backend_retry_backoff_ms", &self.backend_retry_backoff_ms)
            .field("site_config_path", &self.site_config_path)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[redacted]")
            .field(
                "service_key",
                &self.service_key.as_ref().map(|_| "[redacted]"),
            )
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}
