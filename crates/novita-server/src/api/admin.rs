use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct AdminSession {
    admin: bool,
}

/// GET /api/v1/admin/session: reachable only past the admin key check, so a
/// UI can probe whether its key unlocks admin mode.
pub(super) async fn session(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AdminSession>> {
    Json(ApiResponse {
        data: AdminSession { admin: true },
        meta: ResponseMeta::new(req_id.0),
    })
}
