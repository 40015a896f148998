//! Storefront filtering over a product list: category tabs, brand dropdown
//! and free-text search.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::products::{Category, Product};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    /// Category slug, e.g. `"chuteira"`.
    pub categoria: Option<String>,
    /// Exact brand name as listed by [`unique_brands`].
    pub marca: Option<String>,
    /// Case-insensitive search over name, brand and category label.
    pub busca: Option<String>,
}

impl CatalogFilter {
    /// Drops blank values so `?marca=` behaves like no brand filter.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && s != "all")
        };
        Self {
            categoria: clean(self.categoria).map(|s| s.to_lowercase()),
            marca: clean(self.marca),
            busca: clean(self.busca).map(|s| s.to_lowercase()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categoria.is_none() && self.marca.is_none() && self.busca.is_none()
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref categoria) = self.categoria {
            if !product.categorias.iter().any(|c| c == categoria) {
                return false;
            }
        }
        if let Some(ref marca) = self.marca {
            if &product.marca != marca {
                return false;
            }
        }
        if let Some(ref busca) = self.busca {
            let needle = busca.to_lowercase();
            let hit = product.nome.to_lowercase().contains(&needle)
                || product.marca.to_lowercase().contains(&needle)
                || product
                    .categories()
                    .any(|c| c.label().to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Keeps matching products, preserving order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_empty() {
            return products;
        }
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct brand names, sorted.
#[must_use]
pub fn unique_brands(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.marca.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub slug: &'static str,
    pub label: &'static str,
    pub product_count: usize,
}

/// Product count per known category, in storefront tab order.
#[must_use]
pub fn category_counts(products: &[Product]) -> Vec<CategoryCount> {
    Category::ALL
        .into_iter()
        .map(|category| CategoryCount {
            slug: category.slug(),
            label: category.label(),
            product_count: products
                .iter()
                .filter(|p| p.categorias.iter().any(|c| c == category.slug()))
                .count(),
        })
        .collect()
}
