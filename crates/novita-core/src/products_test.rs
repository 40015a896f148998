use chrono::TimeZone;
use serde_json::json;

use super::*;

fn input(value: serde_json::Value) -> ProductInput {
    serde_json::from_value(value).expect("valid product input json")
}

fn stored_product() -> Product {
    Product {
        id: "1".to_string(),
        nome: "Nike Air Max 90".to_string(),
        marca: "Nike".to_string(),
        preco: Decimal::new(29_999, 2),
        descricao: String::new(),
        imagem_url: "https://img.example.com/1.jpg".to_string(),
        estoque: 100,
        categorias: vec!["tenis".to_string()],
        cores: vec![],
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn category_slugs_round_trip() {
    for category in Category::ALL {
        assert_eq!(Category::from_slug(category.slug()), Some(category));
    }
    assert_eq!(Category::from_slug("raquete"), None);
}

#[test]
fn category_serializes_as_kebab_slug() {
    let json = serde_json::to_string(&Category::CamisetaTime).expect("serialize");
    assert_eq!(json, "\"camiseta-time\"");
}

#[test]
fn product_deserializes_backend_row_with_nulls() {
    let row = json!({
        "id": "5d0c3a9e-6c1f-4f5e-9a53-0d8f1d7e6b11",
        "nome": "Predator Edge",
        "marca": "Adidas",
        "preco": 449.9,
        "descricao": null,
        "imagem_url": "https://img.example.com/p.jpg",
        "estoque": null,
        "categorias": null,
        "created_at": "2025-03-01T12:00:00+00:00",
        "updated_at": "2025-03-02T08:30:00+00:00"
    });
    let product: Product = serde_json::from_value(row).expect("deserialize row");
    assert_eq!(product.preco, Decimal::new(4499, 1));
    assert_eq!(product.descricao, "");
    assert_eq!(product.estoque, 0);
    assert!(product.categorias.is_empty());
    assert!(product.cores.is_empty());
    assert_eq!(
        product.created_at,
        Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    );
}

#[test]
fn product_serializes_price_as_number_and_omits_empty_colors() {
    let json = serde_json::to_value(stored_product()).expect("serialize");
    assert_eq!(json["preco"].as_f64(), Some(299.99));
    assert!(json.get("cores").is_none());
    assert!(json.get("created_at").is_none());
}

#[test]
fn new_product_requires_core_fields() {
    let err = input(json!({ "descricao": "sem nome" }))
        .into_new_product()
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::MissingFields(vec!["nome", "marca", "preco", "imagem_url"])
    );
}

#[test]
fn new_product_treats_blank_strings_as_missing() {
    let err = input(json!({
        "nome": "  ",
        "marca": "Nike",
        "preco": "",
        "imagem_url": "https://img.example.com/a.jpg"
    }))
    .into_new_product()
    .unwrap_err();
    assert_eq!(err, CoreError::MissingFields(vec!["nome", "preco"]));
}

#[test]
fn new_product_applies_defaults() {
    let product = input(json!({
        "nome": " Mercurial Vapor 15 ",
        "marca": "Nike",
        "preco": 899.9,
        "imagem_url": "https://img.example.com/m.jpg"
    }))
    .into_new_product()
    .expect("valid product");

    assert_eq!(product.nome, "Mercurial Vapor 15");
    assert_eq!(product.preco, Decimal::new(89_990, 2));
    assert_eq!(product.descricao, "");
    assert_eq!(product.estoque, DEFAULT_STOCK);
    assert_eq!(product.categorias, vec!["tenis".to_string()]);
}

#[test]
fn new_product_coerces_string_price_and_stock() {
    let product = input(json!({
        "nome": "Camisa Brasil 2024",
        "marca": "Nike",
        "preco": "349,90",
        "imagem_url": "https://img.example.com/c.jpg",
        "estoque": "12",
        "categorias": "Camiseta-Time"
    }))
    .into_new_product()
    .expect("valid product");

    assert_eq!(product.preco, Decimal::new(34_990, 2));
    assert_eq!(product.estoque, 12);
    assert_eq!(product.categorias, vec!["camiseta-time".to_string()]);
}

#[test]
fn new_product_keeps_explicit_zero_stock() {
    let product = input(json!({
        "nome": "Mochila Brasília",
        "marca": "Nike",
        "preco": 199,
        "imagem_url": "https://img.example.com/b.jpg",
        "estoque": 0
    }))
    .into_new_product()
    .expect("valid product");
    assert_eq!(product.estoque, 0);
}

#[test]
fn new_product_truncates_decimal_stock_strings() {
    for (raw, expected) in [("5.0", 5), (" 7.9 ", 7), ("3", 3)] {
        let product = input(json!({
            "nome": "Mochila Brasília",
            "marca": "Nike",
            "preco": 199,
            "imagem_url": "https://img.example.com/b.jpg",
            "estoque": raw
        }))
        .into_new_product()
        .expect("valid product");
        assert_eq!(product.estoque, expected, "estoque {raw:?}");
    }
}

#[test]
fn decimal_stock_string_matches_decimal_number() {
    let from_string = input(json!({ "estoque": "5.0" })).into_patch().expect("patch");
    let from_number = input(json!({ "estoque": 5.0 })).into_patch().expect("patch");
    assert_eq!(from_string.estoque, Some(5));
    assert_eq!(from_string.estoque, from_number.estoque);
}

#[test]
fn new_product_unparseable_stock_falls_back_to_default() {
    let product = input(json!({
        "nome": "Mochila Brasília",
        "marca": "Nike",
        "preco": 199,
        "imagem_url": "https://img.example.com/b.jpg",
        "estoque": "muitos"
    }))
    .into_new_product()
    .expect("valid product");
    assert_eq!(product.estoque, DEFAULT_STOCK);
}

#[test]
fn new_product_rejects_negative_stock() {
    let err = input(json!({
        "nome": "Mochila Brasília",
        "marca": "Nike",
        "preco": 199,
        "imagem_url": "https://img.example.com/b.jpg",
        "estoque": -3
    }))
    .into_new_product()
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "estoque", .. }));
}

#[test]
fn new_product_rejects_non_numeric_and_zero_price() {
    for preco in [json!("abc"), json!(0), json!(-10.5), json!(true)] {
        let err = input(json!({
            "nome": "Air Max",
            "marca": "Nike",
            "preco": preco,
            "imagem_url": "https://img.example.com/a.jpg"
        }))
        .into_new_product()
        .unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidField { field: "preco", .. }),
            "expected invalid preco for {preco}, got {err:?}"
        );
    }
}

#[test]
fn new_product_rounds_price_to_cents() {
    let product = input(json!({
        "nome": "Air Max",
        "marca": "Nike",
        "preco": "10.005",
        "imagem_url": "https://img.example.com/a.jpg"
    }))
    .into_new_product()
    .expect("valid product");
    assert_eq!(product.preco, Decimal::new(1001, 2));
}

#[test]
fn new_product_normalizes_category_array() {
    let product = input(json!({
        "nome": "Bolsa Esportiva Classic",
        "marca": "Adidas",
        "preco": 159.9,
        "imagem_url": "https://img.example.com/b.jpg",
        "categorias": [" Bolsa ", "bolsa", "", "society"]
    }))
    .into_new_product()
    .expect("valid product");
    assert_eq!(
        product.categorias,
        vec!["bolsa".to_string(), "society".to_string()]
    );
}

#[test]
fn new_product_splits_comma_separated_category_string() {
    let product = input(json!({
        "nome": "Chuteira Society Pro",
        "marca": "Nike",
        "preco": 299.9,
        "imagem_url": "https://img.example.com/c.jpg",
        "categorias": "tenis,society"
    }))
    .into_new_product()
    .expect("valid product");
    assert_eq!(
        product.categorias,
        vec!["tenis".to_string(), "society".to_string()]
    );
}

#[test]
fn new_product_rejects_non_string_categories() {
    let err = input(json!({
        "nome": "Bolsa",
        "marca": "Adidas",
        "preco": 159.9,
        "imagem_url": "https://img.example.com/b.jpg",
        "categorias": [1, 2]
    }))
    .into_new_product()
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "categorias", .. }));
}

#[test]
fn new_product_validates_color_hex() {
    let err = input(json!({
        "nome": "Air Max 270",
        "marca": "Nike",
        "preco": 599,
        "imagem_url": "https://img.example.com/a.jpg",
        "cores": [{ "id": "1-1", "nome": "Preto", "hex": "black", "imagem_url": "" }]
    }))
    .into_new_product()
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "cores", .. }));
}

#[test]
fn patch_with_no_fields_is_rejected() {
    let err = input(json!({})).into_patch().unwrap_err();
    assert_eq!(err, CoreError::EmptyPatch);
}

#[test]
fn patch_rejects_blank_name() {
    let err = input(json!({ "nome": "" })).into_patch().unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "nome", .. }));
}

#[test]
fn patch_rejects_empty_categories() {
    let err = input(json!({ "categorias": [] })).into_patch().unwrap_err();
    assert!(matches!(err, CoreError::InvalidField { field: "categorias", .. }));
}

#[test]
fn patch_serializes_only_present_fields() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let patch = input(json!({ "preco": "249.90", "estoque": 7 }))
        .into_patch()
        .expect("valid patch")
        .stamped(now);

    let json = serde_json::to_value(&patch).expect("serialize");
    let obj = json.as_object().expect("object");
    assert_eq!(obj.len(), 3, "unexpected keys: {obj:?}");
    assert_eq!(json["preco"].as_f64(), Some(249.9));
    assert_eq!(json["estoque"], 7);
    assert!(json["updated_at"].is_string());
}

#[test]
fn patch_apply_merges_and_stamps() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let mut product = stored_product();
    let patch = input(json!({ "marca": "Nike SB", "categorias": ["tenis", "society"] }))
        .into_patch()
        .expect("valid patch");

    patch.apply(&mut product, now);

    assert_eq!(product.marca, "Nike SB");
    assert_eq!(product.nome, "Nike Air Max 90");
    assert_eq!(product.categorias.len(), 2);
    assert_eq!(product.updated_at, Some(now));
}

#[test]
fn product_id_validation() {
    assert!(validate_product_id("1").is_ok());
    assert!(validate_product_id("5d0c3a9e-6c1f-4f5e-9a53-0d8f1d7e6b11").is_ok());
    assert!(validate_product_id("").is_err());
    assert!(validate_product_id("1,2").is_err());
    assert!(validate_product_id("eq.1").is_err());
    assert!(validate_product_id(&"a".repeat(65)).is_err());
}

#[test]
fn hex_color_forms() {
    assert!(is_hex_color("#fff"));
    assert!(is_hex_color("#2563eb"));
    assert!(!is_hex_color("2563eb"));
    assert!(!is_hex_color("#2563e"));
    assert!(!is_hex_color("#zzzzzz"));
}
