use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::products::is_hex_color;
use crate::ConfigError;

/// Storefront branding and contact settings edited from the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub site_name: String,
    pub site_description: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_image: String,
    /// Digits only, country code first (e.g. `5518981100463`).
    pub whatsapp_number: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Novita".to_string(),
            site_description: "Seu catálogo esportivo online".to_string(),
            hero_title: "Encontre o produto perfeito".to_string(),
            hero_subtitle: "Explore nossa coleção completa de produtos esportivos com design \
                            moderno e qualidade garantida"
                .to_string(),
            hero_image:
                "https://images.unsplash.com/photo-1556906781-9a412961c28c?w=1200&h=600&fit=crop"
                    .to_string(),
            whatsapp_number: "5518981100463".to_string(),
            primary_color: "#2563eb".to_string(),
            secondary_color: "#0891b2".to_string(),
        }
    }
}

impl SiteConfig {
    /// Checks the fields the storefront renders without further escaping.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.site_name.trim().is_empty() {
            return Err("siteName must not be blank".to_string());
        }
        if !is_hex_color(&self.primary_color) {
            return Err(format!(
                "primaryColor must be #rgb or #rrggbb, got '{}'",
                self.primary_color
            ));
        }
        if !is_hex_color(&self.secondary_color) {
            return Err(format!(
                "secondaryColor must be #rgb or #rrggbb, got '{}'",
                self.secondary_color
            ));
        }
        let digits = self.whatsapp_number.len();
        if !(8..=15).contains(&digits) || !self.whatsapp_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!(
                "whatsappNumber must be 8-15 digits, got '{}'",
                self.whatsapp_number
            ));
        }
        Ok(())
    }
}

/// Load site settings from a YAML file. Keys missing from the file keep their
/// defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SiteConfigIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_site_config(&content)
}

fn parse_site_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = serde_yaml::from_str(content)?;
    config.validate().map_err(ConfigError::InvalidSiteConfig)?;
    Ok(config)
}
