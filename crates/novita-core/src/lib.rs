pub mod app_config;
pub mod catalog;
pub mod config;
pub mod fallback;
pub mod products;
pub mod site;

pub use app_config::{AppConfig, BackendSettings, Environment};
pub use catalog::{category_counts, unique_brands, CatalogFilter, CategoryCount};
pub use config::{is_plain_table_name, load_app_config, load_app_config_from_env};
pub use fallback::FallbackCatalog;
pub use products::{
    validate_product_id, Category, ColorVariant, NewProduct, Product, ProductInput, ProductPatch,
};
pub use site::{load_site_config, SiteConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read site config file {path}: {source}")]
    SiteConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse site config: {0}")]
    SiteConfigParse(#[from] serde_yaml::Error),

    #[error("invalid site config: {0}")]
    InvalidSiteConfig(String),
}

/// Errors raised while turning loose request input into catalog writes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid product id '{0}'")]
    InvalidId(String),

    #[error("update contains no fields")]
    EmptyPatch,
}
