mod admin;
mod backend_status;
mod catalog;
mod products;
mod site;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use novita_backend::{BackendClient, BackendError};
use novita_core::{FallbackCatalog, SiteConfig};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_admin_auth, AuthState, RateLimitState, RequestId,
};

/// Which backend settings were present at startup, reported by the
/// connectivity probe when the backend is unconfigured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendPresence {
    pub url: bool,
    pub key: bool,
}

#[derive(Clone)]
pub struct AppState {
    /// `None` when the backend is unconfigured; every route then uses `fallback`.
    pub backend: Option<Arc<BackendClient>>,
    pub backend_presence: BackendPresence,
    pub fallback: Arc<RwLock<FallbackCatalog>>,
    pub site: Arc<RwLock<SiteConfig>>,
}

impl AppState {
    /// State seeded with the sample fallback catalog.
    #[must_use]
    pub fn new(
        backend: Option<BackendClient>,
        backend_presence: BackendPresence,
        site: SiteConfig,
    ) -> Self {
        Self {
            backend: backend.map(Arc::new),
            backend_presence,
            fallback: Arc::new(RwLock::new(FallbackCatalog::sample())),
            site: Arc::new(RwLock::new(site)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

/// Where catalog data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Backend,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    backend: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub(super) fn with_source(request_id: String, source: DataSource) -> Self {
        Self {
            source: Some(source),
            ..Self::new(request_id)
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.error.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a failed backend write: privilege refusals become `403 forbidden`,
/// everything else `500` with the backend's message as `details`.
pub(super) fn map_backend_error(request_id: String, action: &str, error: &BackendError) -> ApiError {
    if error.is_permission_denied() {
        tracing::warn!(error = %error, action, "backend refused product write");
        return ApiError::new(
            request_id,
            "forbidden",
            "not authorized: check your permissions on the backend",
        )
        .with_details(error.backend_message());
    }

    tracing::error!(error = %error, code = ?error.code(), action, "backend request failed");
    ApiError::new(
        request_id,
        "internal_error",
        format!("failed to {action} product; check the backend connection"),
    )
    .with_details(error.backend_message())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/backend/status", get(backend_status::backend_status))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{id}", get(products::get_product))
        .route("/api/v1/brands", get(catalog::list_brands))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/site-config", get(site::get_site_config))
}

/// Product writes carry the caller's own token, checked by the backend.
fn product_write_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", post(products::create_product))
        .route(
            "/api/v1/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/site-config", put(site::update_site_config))
        .route("/api/v1/admin/session", get(admin::session))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_admin_auth,
                )),
        )
}

/// Product writes and admin routes each count against their own window.
pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let admin_limit = rate_limit.separate();
    Router::new()
        .merge(public_router())
        .merge(product_write_router(rate_limit))
        .merge(admin_router(auth, admin_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    let Some(backend) = state.backend.as_ref() else {
        return (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    backend: "fallback",
                },
                meta,
            }),
        );
    };

    match backend.count_products().await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    backend: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: backend unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        backend: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
