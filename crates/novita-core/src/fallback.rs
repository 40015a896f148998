//! In-memory catalog served when the hosted backend is unconfigured or
//! unreachable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::products::{ColorVariant, NewProduct, Product, ProductPatch};

const UNSPLASH: &str = "https://images.unsplash.com";

#[derive(Debug, Clone, Default)]
pub struct FallbackCatalog {
    products: Vec<Product>,
}

impl FallbackCatalog {
    /// The sample catalog: the two sneakers the API has always shipped with,
    /// plus one product for each remaining storefront category.
    #[must_use]
    pub fn sample() -> Self {
        let now = Utc::now();
        let products = sample_products()
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.into_product((i + 1).to_string(), now))
            .collect();
        Self { products }
    }

    #[must_use]
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Stores a new product under the next free numeric id.
    pub fn insert(&mut self, product: NewProduct, now: DateTime<Utc>) -> Product {
        let stored = product.into_product(self.next_id(), now);
        self.products.push(stored.clone());
        stored
    }

    pub fn update(&mut self, id: &str, patch: &ProductPatch, now: DateTime<Utc>) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;
        patch.apply(product, now);
        Some(product.clone())
    }

    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    // Ids are one past the largest numeric id, so a delete followed by an
    // insert never reuses a live id.
    fn next_id(&self) -> String {
        let max = self
            .products
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

/// Sample products as inserts, in catalog order. Also used to seed a fresh
/// backend table.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            nome: "Nike Air Max 90".to_string(),
            marca: "Nike".to_string(),
            preco: Decimal::new(29_999, 2),
            descricao: "Tênis Nike Air Max 90 com tecnologia de amortecimento".to_string(),
            imagem_url: image("photo-1542291026-7eec264c27ff"),
            estoque: 100,
            categorias: vec!["tenis".to_string()],
            cores: vec![],
        },
        NewProduct {
            nome: "Adidas Ultraboost".to_string(),
            marca: "Adidas".to_string(),
            preco: Decimal::new(39_999, 2),
            descricao: "Tênis Adidas Ultraboost com tecnologia Boost".to_string(),
            imagem_url: image("photo-1595950653106-6c9ebd614d3a"),
            estoque: 100,
            categorias: vec!["tenis".to_string()],
            cores: vec![],
        },
        NewProduct {
            nome: "Camisa Brasil 2024".to_string(),
            marca: "Nike".to_string(),
            preco: Decimal::new(34_990, 2),
            descricao: "Camisa oficial da seleção brasileira".to_string(),
            imagem_url: image("photo-1551698618-1dfe5d97d256"),
            estoque: 50,
            categorias: vec!["camiseta-time".to_string()],
            cores: vec![
                color("3-1", "Amarelo", "#FFD700", "photo-1551698618-1dfe5d97d256"),
                color("3-2", "Azul", "#0066CC", "photo-1571019613454-1cb2f99b2d8b"),
            ],
        },
        NewProduct {
            nome: "Camisa Society Premium".to_string(),
            marca: "Nike".to_string(),
            preco: Decimal::new(12_990, 2),
            descricao: "Camisa leve para futebol society".to_string(),
            imagem_url: image("photo-1503342217505-b0a15ec3261c"),
            estoque: 80,
            categorias: vec!["society".to_string()],
            cores: vec![
                color("5-1", "Preto", "#000000", "photo-1503342217505-b0a15ec3261c"),
                color("5-2", "Branco", "#ffffff", "photo-1489987707025-afc232f7ea0f"),
            ],
        },
        NewProduct {
            nome: "Predator Edge".to_string(),
            marca: "Adidas".to_string(),
            preco: Decimal::new(89_990, 2),
            descricao: "Chuteira de campo com cabedal texturizado".to_string(),
            imagem_url: image("photo-1511886929837-354d827aae26"),
            estoque: 30,
            categorias: vec!["chuteira".to_string()],
            cores: vec![color(
                "8-1",
                "Preto/Vermelho",
                "#000000",
                "photo-1511886929837-354d827aae26",
            )],
        },
        NewProduct {
            nome: "Mochila Brasília".to_string(),
            marca: "Nike".to_string(),
            preco: Decimal::new(19_990, 2),
            descricao: "Mochila esportiva com compartimento para tênis".to_string(),
            imagem_url: image("photo-1553062407-98eeb64c6a62"),
            estoque: 40,
            categorias: vec!["bolsa".to_string()],
            cores: vec![
                color("9-1", "Preto", "#000000", "photo-1553062407-98eeb64c6a62"),
                color("9-2", "Azul", "#0066CC", "photo-1581605669-fcdf81165afa"),
            ],
        },
    ]
}

fn image(photo: &str) -> String {
    format!("{UNSPLASH}/{photo}?w=400&h=400&fit=crop")
}

fn color(id: &str, nome: &str, hex: &str, photo: &str) -> ColorVariant {
    ColorVariant {
        id: id.to_string(),
        nome: nome.to_string(),
        hex: hex.to_string(),
        imagem_url: image(photo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(nome: &str) -> NewProduct {
        NewProduct {
            nome: nome.to_string(),
            marca: "Puma".to_string(),
            preco: Decimal::new(15_000, 2),
            descricao: String::new(),
            imagem_url: "https://img.example.com/x.jpg".to_string(),
            estoque: 100,
            categorias: vec!["tenis".to_string()],
            cores: vec![],
        }
    }

    #[test]
    fn sample_has_sequential_ids_and_timestamps() {
        let catalog = FallbackCatalog::sample();
        let ids: Vec<&str> = catalog.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
        assert!(catalog.list().iter().all(|p| p.created_at.is_some()));
        assert_eq!(catalog.get("1").map(|p| p.nome.as_str()), Some("Nike Air Max 90"));
    }

    #[test]
    fn insert_assigns_next_id() {
        let mut catalog = FallbackCatalog::sample();
        let stored = catalog.insert(new_product("Suede Classic"), Utc::now());
        assert_eq!(stored.id, "7");
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.get("7"), Some(&stored));
    }

    #[test]
    fn insert_after_remove_does_not_reuse_live_id() {
        let mut catalog = FallbackCatalog::sample();
        catalog.remove("2").expect("sample product 2");
        let stored = catalog.insert(new_product("Suede Classic"), Utc::now());
        assert_eq!(stored.id, "7");
    }

    #[test]
    fn insert_into_empty_catalog_starts_at_one() {
        let mut catalog = FallbackCatalog::default();
        assert!(catalog.is_empty());
        let stored = catalog.insert(new_product("Suede Classic"), Utc::now());
        assert_eq!(stored.id, "1");
    }

    #[test]
    fn update_merges_patch() {
        let mut catalog = FallbackCatalog::sample();
        let patch = ProductPatch {
            estoque: Some(3),
            ..Default::default()
        };
        let now = Utc::now();
        let updated = catalog.update("1", &patch, now).expect("product 1");
        assert_eq!(updated.estoque, 3);
        assert_eq!(updated.updated_at, Some(now));
        assert_eq!(catalog.get("1").map(|p| p.estoque), Some(3));
    }

    #[test]
    fn update_and_remove_unknown_id_return_none() {
        let mut catalog = FallbackCatalog::sample();
        assert!(catalog
            .update("404", &ProductPatch::default(), Utc::now())
            .is_none());
        assert!(catalog.remove("404").is_none());
        assert_eq!(catalog.len(), 6);
    }
}
