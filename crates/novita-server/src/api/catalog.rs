use axum::{extract::State, Extension, Json};
use novita_core::{category_counts, unique_brands, CategoryCount};

use crate::middleware::RequestId;

use super::{products::load_catalog, ApiResponse, AppState, ResponseMeta};

/// GET /api/v1/brands: distinct brands for the storefront dropdown.
pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<String>>> {
    let (products, source) = load_catalog(&state).await;
    Json(ApiResponse {
        data: unique_brands(&products),
        meta: ResponseMeta::with_source(req_id.0, source),
    })
}

/// GET /api/v1/categories: category tabs with product counts.
pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryCount>>> {
    let (products, source) = load_catalog(&state).await;
    Json(ApiResponse {
        data: category_counts(&products),
        meta: ResponseMeta::with_source(req_id.0, source),
    })
}
