use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use novita_backend::Credential;
use novita_core::{validate_product_id, CatalogFilter, CoreError, Product, ProductInput};
use serde::Serialize;

use crate::middleware::{RequestId, UserToken};

use super::{map_backend_error, ApiError, ApiResponse, AppState, DataSource, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DeletedProduct {
    message: &'static str,
    id: String,
}

/// The full catalog: backend rows when reachable, otherwise the fallback list.
pub(super) async fn load_catalog(state: &AppState) -> (Vec<Product>, DataSource) {
    if let Some(backend) = state.backend.as_ref() {
        match backend.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "catalog loaded from backend");
                return (products, DataSource::Backend);
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend list failed; serving fallback catalog");
            }
        }
    }
    let products = state.fallback.read().await.list().to_vec();
    (products, DataSource::Fallback)
}

/// GET /api/v1/products: list products, optionally filtered.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<CatalogFilter>,
) -> Json<ApiResponse<Vec<Product>>> {
    let (products, source) = load_catalog(&state).await;
    let data = filter.normalized().apply(products);

    Json(ApiResponse {
        data,
        meta: ResponseMeta::with_source(req_id.0, source),
    })
}

/// GET /api/v1/products/:id
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = req_id.0;
    validate_product_id(&id).map_err(|e| validation_error(rid.clone(), &e))?;

    let (product, source) = match state.backend.as_ref() {
        Some(backend) => {
            let found = backend.get_product(&id).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, id = %id, "backend lookup failed");
                None
            });
            (found, DataSource::Backend)
        }
        None => (
            state.fallback.read().await.get(&id).cloned(),
            DataSource::Fallback,
        ),
    };

    let product = product.ok_or_else(|| not_found(rid.clone()))?;
    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::with_source(rid, source),
    }))
}

/// POST /api/v1/products: create a product.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    UserToken(token): UserToken,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = req_id.0;
    let Json(input) = payload.map_err(|e| body_error(rid.clone(), &e))?;
    let new_product = input
        .into_new_product()
        .map_err(|e| validation_error(rid.clone(), &e))?;

    let (product, source) = match state.backend.as_ref() {
        Some(backend) => {
            let credential = Credential::select(Some(token.as_str()), backend.has_service_key());
            let product = backend
                .insert_product(credential, &new_product)
                .await
                .map_err(|e| map_backend_error(rid.clone(), "create", &e))?;
            (product, DataSource::Backend)
        }
        None => {
            let product = state.fallback.write().await.insert(new_product, Utc::now());
            (product, DataSource::Fallback)
        }
    };

    tracing::info!(id = %product.id, source = ?source, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: product,
            meta: ResponseMeta::with_source(rid, source),
        }),
    ))
}

/// PUT /api/v1/products/:id: sparse update.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    UserToken(token): UserToken,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = req_id.0;
    validate_product_id(&id).map_err(|e| validation_error(rid.clone(), &e))?;
    let Json(input) = payload.map_err(|e| body_error(rid.clone(), &e))?;
    let now = Utc::now();
    let patch = input
        .into_patch()
        .map_err(|e| validation_error(rid.clone(), &e))?
        .stamped(now);

    let (product, source) = match state.backend.as_ref() {
        Some(backend) => {
            let credential = Credential::select(Some(token.as_str()), backend.has_service_key());
            let product = backend
                .update_product(credential, &id, &patch)
                .await
                .map_err(|e| map_backend_error(rid.clone(), "update", &e))?;
            (product, DataSource::Backend)
        }
        None => (
            state.fallback.write().await.update(&id, &patch, now),
            DataSource::Fallback,
        ),
    };

    let product = product.ok_or_else(|| not_found(rid.clone()))?;
    tracing::info!(id = %product.id, source = ?source, "product updated");
    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::with_source(rid, source),
    }))
}

/// DELETE /api/v1/products/:id
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    UserToken(token): UserToken,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedProduct>>, ApiError> {
    let rid = req_id.0;
    validate_product_id(&id).map_err(|e| validation_error(rid.clone(), &e))?;

    let (deleted, source) = match state.backend.as_ref() {
        Some(backend) => {
            let credential = Credential::select(Some(token.as_str()), backend.has_service_key());
            let deleted = backend
                .delete_product(credential, &id)
                .await
                .map_err(|e| map_backend_error(rid.clone(), "delete", &e))?;
            (deleted, DataSource::Backend)
        }
        None => (
            state.fallback.write().await.remove(&id).is_some(),
            DataSource::Fallback,
        ),
    };

    if !deleted {
        return Err(not_found(rid));
    }
    tracing::info!(id = %id, source = ?source, "product deleted");
    Ok(Json(ApiResponse {
        data: DeletedProduct {
            message: "product deleted",
            id,
        },
        meta: ResponseMeta::with_source(rid, source),
    }))
}

fn not_found(request_id: String) -> ApiError {
    ApiError::new(request_id, "not_found", "product not found")
}

fn validation_error(request_id: String, error: &CoreError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

fn body_error(request_id: String, rejection: &JsonRejection) -> ApiError {
    ApiError::new(request_id, "bad_request", rejection.body_text())
}
