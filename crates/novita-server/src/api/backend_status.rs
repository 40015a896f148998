use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, BackendPresence, ResponseMeta};

/// Result of the connectivity probe. Always served with `200`; `success`
/// carries the outcome.
#[derive(Debug, Serialize)]
pub(super) struct BackendStatus {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<StatusDetails>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum StatusDetails {
    Unconfigured(BackendPresence),
    Backend {
        code: Option<String>,
        message: String,
        hint: Option<String>,
    },
}

/// GET /api/v1/backend/status: counts rows to prove the backend answers.
pub(super) async fn backend_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<BackendStatus>> {
    let data = match state.backend.as_ref() {
        None => BackendStatus {
            success: false,
            message: "backend environment variables are not configured".to_owned(),
            count: None,
            details: Some(StatusDetails::Unconfigured(state.backend_presence)),
        },
        Some(backend) => match backend.count_products().await {
            Ok(count) => BackendStatus {
                success: true,
                message: "backend connection is working".to_owned(),
                count: Some(count),
                details: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "backend connectivity probe failed");
                BackendStatus {
                    success: false,
                    message: "backend connection failed".to_owned(),
                    count: None,
                    details: Some(StatusDetails::Backend {
                        code: e.code().map(ToOwned::to_owned),
                        message: e.backend_message(),
                        hint: e.hint().map(ToOwned::to_owned),
                    }),
                }
            }
        },
    };

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
