use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use novita_core::SiteConfig;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_site_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SiteConfig>> {
    let site = state.site.read().await.clone();
    Json(ApiResponse {
        data: site,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// PUT /api/v1/site-config: replace the site settings. Keys missing from the
/// body take their defaults.
pub(super) async fn update_site_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SiteConfig>, JsonRejection>,
) -> Result<Json<ApiResponse<SiteConfig>>, ApiError> {
    let rid = req_id.0;
    let Json(site) =
        payload.map_err(|e| ApiError::new(rid.clone(), "bad_request", e.body_text()))?;
    site.validate()
        .map_err(|reason| ApiError::new(rid.clone(), "validation_error", reason))?;

    *state.site.write().await = site.clone();
    tracing::info!(site_name = %site.site_name, "site config updated");

    Ok(Json(ApiResponse {
        data: site,
        meta: ResponseMeta::new(rid),
    }))
}
