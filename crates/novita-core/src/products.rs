use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CoreError;

/// Stock assigned when a write omits `estoque` or sends something unparseable.
pub const DEFAULT_STOCK: i32 = 100;

/// Category assigned when a new product arrives without one.
pub const DEFAULT_CATEGORY: &str = "tenis";

/// Storefront categories. Products store them as slugs in `categorias`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Tenis,
    CamisetaTime,
    Society,
    Chuteira,
    Bolsa,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tenis,
        Category::CamisetaTime,
        Category::Society,
        Category::Chuteira,
        Category::Bolsa,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Category::Tenis => "tenis",
            Category::CamisetaTime => "camiseta-time",
            Category::Society => "society",
            Category::Chuteira => "chuteira",
            Category::Bolsa => "bolsa",
        }
    }

    /// Display label shown on the storefront tabs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Tenis => "Tênis",
            Category::CamisetaTime => "Camisetas de Time",
            Category::Society => "Society",
            Category::Chuteira => "Chuteiras",
            Category::Bolsa => "Bolsas",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// One purchasable color of a product, with its own photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    pub id: String,
    pub nome: String,
    pub hex: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub imagem_url: String,
}

/// A row of the hosted `produtos` table, as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub nome: String,
    pub marca: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descricao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub imagem_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estoque: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categorias: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cores: Vec<ColorVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Known categories of this product; unknown slugs are skipped.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categorias.iter().filter_map(|c| Category::from_slug(c))
    }
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub nome: String,
    pub marca: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    pub descricao: String,
    pub imagem_url: String,
    pub estoque: i32,
    pub categorias: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cores: Vec<ColorVariant>,
}

impl NewProduct {
    /// Materializes the insert as a stored product with the given id.
    #[must_use]
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            nome: self.nome,
            marca: self.marca,
            preco: self.preco,
            descricao: self.descricao,
            imagem_url: self.imagem_url,
            estoque: self.estoque,
            categorias: self.categorias,
            cores: self.cores,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// A validated partial update. Only `Some` fields are sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub preco: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagem_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estoque: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorias: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<Vec<ColorVariant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductPatch {
    /// `true` when no product field is set. `updated_at` alone does not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.marca.is_none()
            && self.preco.is_none()
            && self.descricao.is_none()
            && self.imagem_url.is_none()
            && self.estoque.is_none()
            && self.categorias.is_none()
            && self.cores.is_none()
    }

    #[must_use]
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.updated_at = Some(now);
        self
    }

    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(ref v) = self.nome {
            product.nome.clone_from(v);
        }
        if let Some(ref v) = self.marca {
            product.marca.clone_from(v);
        }
        if let Some(v) = self.preco {
            product.preco = v;
        }
        if let Some(ref v) = self.descricao {
            product.descricao.clone_from(v);
        }
        if let Some(ref v) = self.imagem_url {
            product.imagem_url.clone_from(v);
        }
        if let Some(v) = self.estoque {
            product.estoque = v;
        }
        if let Some(ref v) = self.categorias {
            product.categorias.clone_from(v);
        }
        if let Some(ref v) = self.cores {
            product.cores.clone_from(v);
        }
        product.updated_at = Some(self.updated_at.unwrap_or(now));
    }
}

/// Loose request body accepted by the product write routes.
///
/// Admin forms post whatever their inputs hold, so `preco` and `estoque` may
/// arrive as numbers or strings, and `categorias` as an array or one string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub nome: Option<String>,
    pub marca: Option<String>,
    pub preco: Option<Value>,
    pub descricao: Option<String>,
    pub imagem_url: Option<String>,
    pub estoque: Option<Value>,
    pub categorias: Option<Value>,
    pub cores: Option<Vec<ColorVariant>>,
}

impl ProductInput {
    /// Validates a create request.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingFields`] if any of `nome`, `marca`, `preco`,
    ///   `imagem_url` is absent or blank.
    /// - [`CoreError::InvalidField`] if a value cannot be coerced.
    pub fn into_new_product(self) -> Result<NewProduct, CoreError> {
        let mut missing = Vec::new();
        if is_blank(self.nome.as_deref()) {
            missing.push("nome");
        }
        if is_blank(self.marca.as_deref()) {
            missing.push("marca");
        }
        if self.preco.as_ref().is_none_or(is_blank_value) {
            missing.push("preco");
        }
        if is_blank(self.imagem_url.as_deref()) {
            missing.push("imagem_url");
        }
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }

        let preco = parse_price(self.preco.as_ref().unwrap_or(&Value::Null))?;
        let estoque = parse_stock(self.estoque.as_ref())?;
        let categorias = match self.categorias.as_ref() {
            Some(value) => parse_categories(value)?,
            None => Vec::new(),
        };
        let categorias = if categorias.is_empty() {
            vec![DEFAULT_CATEGORY.to_string()]
        } else {
            categorias
        };
        let cores = validate_colors(self.cores.unwrap_or_default())?;

        Ok(NewProduct {
            nome: trimmed(self.nome),
            marca: trimmed(self.marca),
            preco,
            descricao: self.descricao.map(|d| d.trim().to_string()).unwrap_or_default(),
            imagem_url: trimmed(self.imagem_url),
            estoque,
            categorias,
            cores,
        })
    }

    /// Validates an update request. Absent fields are left untouched.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyPatch`] if no field is present.
    /// - [`CoreError::InvalidField`] if a present value is blank or cannot be coerced.
    pub fn into_patch(self) -> Result<ProductPatch, CoreError> {
        let patch = ProductPatch {
            nome: required_if_present("nome", self.nome)?,
            marca: required_if_present("marca", self.marca)?,
            preco: self.preco.as_ref().map(parse_price).transpose()?,
            descricao: self.descricao.map(|d| d.trim().to_string()),
            imagem_url: required_if_present("imagem_url", self.imagem_url)?,
            estoque: self
                .estoque
                .as_ref()
                .map(|v| parse_stock(Some(v)))
                .transpose()?,
            categorias: match self.categorias.as_ref() {
                Some(value) => {
                    let categorias = parse_categories(value)?;
                    if categorias.is_empty() {
                        return Err(CoreError::InvalidField {
                            field: "categorias",
                            reason: "must contain at least one category".to_string(),
                        });
                    }
                    Some(categorias)
                }
                None => None,
            },
            cores: self.cores.map(validate_colors).transpose()?,
            updated_at: None,
        };

        if patch.is_empty() {
            return Err(CoreError::EmptyPatch);
        }
        Ok(patch)
    }
}

/// Checks that an id is safe to embed in a backend filter.
///
/// Backend ids are UUIDs and fallback ids are small integers; both fit
/// `[A-Za-z0-9-]{1,64}`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidId`] otherwise.
pub fn validate_product_id(id: &str) -> Result<(), CoreError> {
    if !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        Ok(())
    } else {
        Err(CoreError::InvalidId(id.to_string()))
    }
}

/// `#rgb` or `#rrggbb`.
pub(crate) fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn required_if_present(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CoreError::InvalidField {
            field,
            reason: "must not be blank".to_string(),
        }),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a price from a JSON number or a numeric string (`"299.99"` or
/// `"299,99"`), rounded to cents.
fn parse_price(value: &Value) -> Result<Decimal, CoreError> {
    let invalid = |reason: String| CoreError::InvalidField {
        field: "preco",
        reason,
    };

    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| invalid(e.to_string()))?,
        Value::String(s) => Decimal::from_str(&s.trim().replace(',', "."))
            .map_err(|_| invalid(format!("'{s}' is not a number")))?,
        other => return Err(invalid(format!("expected a number, got {other}"))),
    };

    // Upper bound of the backend's DECIMAL(10,2) column.
    let max_price = Decimal::new(9_999_999_999, 2);
    let price = parsed.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if price <= Decimal::ZERO {
        return Err(invalid("must be greater than zero".to_string()));
    }
    if price > max_price {
        return Err(invalid(format!("must not exceed {max_price}")));
    }
    Ok(price)
}

/// Parses stock like an integer form field: numbers and numeric strings are
/// truncated, and anything unparseable falls back to [`DEFAULT_STOCK`].
/// Negative stock is rejected.
fn parse_stock(value: Option<&Value>) -> Result<i32, CoreError> {
    let raw: Option<i64> = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        Some(_) => None,
    };

    let Some(raw) = raw else {
        return Ok(DEFAULT_STOCK);
    };
    if raw < 0 {
        return Err(CoreError::InvalidField {
            field: "estoque",
            reason: "must not be negative".to_string(),
        });
    }
    i32::try_from(raw).map_err(|_| CoreError::InvalidField {
        field: "estoque",
        reason: format!("{raw} is out of range"),
    })
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> Option<i64> {
    value.is_finite().then_some(value.trunc() as i64)
}

/// Normalizes `categorias`: an array of strings, or a single comma-separated
/// string. Slugs are trimmed and lowercased; empties and duplicates dropped.
fn parse_categories(value: &Value) -> Result<Vec<String>, CoreError> {
    let raw: Vec<&str> = match value {
        Value::Null => Vec::new(),
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| CoreError::InvalidField {
                    field: "categorias",
                    reason: format!("expected strings, got {item}"),
                })
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(CoreError::InvalidField {
                field: "categorias",
                reason: format!("expected an array or a string, got {other}"),
            })
        }
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for slug in raw.into_iter().map(|s| s.trim().to_lowercase()) {
        if !slug.is_empty() && !out.contains(&slug) {
            out.push(slug);
        }
    }
    Ok(out)
}

fn validate_colors(colors: Vec<ColorVariant>) -> Result<Vec<ColorVariant>, CoreError> {
    for color in &colors {
        if color.id.trim().is_empty() || color.nome.trim().is_empty() {
            return Err(CoreError::InvalidField {
                field: "cores",
                reason: "each color needs an id and a name".to_string(),
            });
        }
        if !is_hex_color(&color.hex) {
            return Err(CoreError::InvalidField {
                field: "cores",
                reason: format!("'{}' is not a hex color", color.hex),
            });
        }
    }
    Ok(colors)
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
