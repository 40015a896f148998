//! Catalog command handlers for the CLI.
//!
//! Each handler builds its own backend client from the loaded config. `list`
//! works without one; `check` and `seed` need the backend configured.

use novita_backend::BackendClient;
use novita_core::{fallback::sample_products, AppConfig, CatalogFilter, FallbackCatalog, Product};

fn backend_client(config: &AppConfig) -> anyhow::Result<Option<BackendClient>> {
    config
        .backend_settings()
        .map(|settings| BackendClient::new(&settings))
        .transpose()
        .map_err(Into::into)
}

fn require_backend(config: &AppConfig) -> anyhow::Result<BackendClient> {
    backend_client(config)?.ok_or_else(|| {
        anyhow::anyhow!("backend not configured; set SUPABASE_URL and SUPABASE_ANON_KEY")
    })
}

/// Probe the backend by counting rows in the products table.
///
/// # Errors
///
/// Returns an error if the backend is unconfigured or the count fails. The
/// backend's code and hint are printed before the error is returned.
pub(crate) async fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let client = require_backend(config)?;
    match client.count_products().await {
        Ok(count) => {
            println!("backend ok: {} has {count} products", client.table_url());
            Ok(())
        }
        Err(e) => {
            if let Some(code) = e.code() {
                eprintln!("code: {code}");
            }
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            Err(e.into())
        }
    }
}

/// Print products as aligned rows.
///
/// # Errors
///
/// Returns an error if the backend is configured but the query fails.
pub(crate) async fn run_list(config: &AppConfig, filter: CatalogFilter) -> anyhow::Result<()> {
    let products = match backend_client(config)? {
        Some(client) => client.list_products().await?,
        None => {
            tracing::warn!("backend not configured; listing the sample catalog");
            FallbackCatalog::sample().list().to_vec()
        }
    };

    let products = filter.normalized().apply(products);
    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    println!("{}", header_row());
    for product in &products {
        println!("{}", product_row(product));
    }
    Ok(())
}

/// Insert the sample catalog with the service role key.
///
/// When `dry_run` is `true` the products are printed and nothing is written.
///
/// # Errors
///
/// Returns an error if the backend or its service key is missing, or the
/// insert fails.
pub(crate) async fn run_seed(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let products = sample_products();

    if dry_run {
        println!("dry-run: would insert {} products", products.len());
        for p in &products {
            println!("  {} ({}) R$ {}", p.nome, p.marca, p.preco);
        }
        return Ok(());
    }

    let client = require_backend(config)?;
    let stored = client.insert_products(&products).await?;
    tracing::info!(count = stored.len(), "sample catalog seeded");
    println!("inserted {} products into {}", stored.len(), client.table_url());
    Ok(())
}

fn header_row() -> String {
    format!(
        "{:<38}{:<10}{:>11}{:>8}  {:<16}NAME",
        "ID", "BRAND", "PRICE", "STOCK", "CATEGORIES"
    )
}

fn product_row(product: &Product) -> String {
    let name = if product.nome.chars().count() > 40 {
        format!("{}...", product.nome.chars().take(40).collect::<String>())
    } else {
        product.nome.clone()
    };
    let price = format!("{:.2}", product.preco);
    format!(
        "{:<38}{:<10}{:>11}{:>8}  {:<16}{}",
        product.id,
        product.marca,
        price,
        product.estoque,
        product.categorias.join(","),
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_row_aligns_with_header() {
        let catalog = FallbackCatalog::sample();
        let product = catalog.get("1").expect("sample product");
        let row = product_row(product);
        let header = header_row();
        assert_eq!(row.find("Nike Air Max 90"), header.find("NAME"));
        assert!(row.contains("299.99"));
        assert!(row.contains("tenis"));
    }

    #[test]
    fn long_names_are_truncated() {
        let mut product = FallbackCatalog::sample().list()[0].clone();
        product.nome = "x".repeat(60);
        assert!(product_row(&product).ends_with(&format!("{}...", "x".repeat(40))));
    }
}
