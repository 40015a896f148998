//! HTTP client for the hosted products table.
//!
//! Wraps `reqwest` with credential selection, backend error decoding and
//! typed row deserialization. Reads are retried on transient failures;
//! writes are sent once.

use std::time::Duration;

use novita_core::{BackendSettings, NewProduct, Product, ProductPatch};
use reqwest::{header::HeaderValue, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::credential::Credential;
use crate::error::BackendError;
use crate::retry::retry_with_backoff;

const REST_PATH: &str = "rest/v1";

/// Shape of the backend's JSON error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Client for one products table on the hosted backend.
///
/// Build it with [`BackendClient::new`] from [`BackendSettings`]; point
/// `base_url` at a mock server in tests.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    table_url: Url,
    anon_key: String,
    service_key: Option<String>,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("table_url", &self.table_url.as_str())
            .field("has_service_key", &self.service_key.is_some())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`BackendError::Http`] if the `reqwest::Client` cannot
    /// be constructed.
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent("novita/0.1 (catalog)")
            .build()?;

        let table_url = table_url(&settings.base_url, &settings.table)?;

        Ok(Self {
            client,
            table_url,
            anon_key: settings.anon_key.clone(),
            service_key: settings.service_key.clone(),
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    #[must_use]
    pub fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    #[must_use]
    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    /// Credential used for reads: the service key when present, else anonymous.
    #[must_use]
    pub fn read_credential(&self) -> Credential<'static> {
        Credential::select(None, self.has_service_key())
    }

    /// Lists every product, newest first.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Api`] if the backend rejects the query.
    /// - [`BackendError::Http`] on network failure.
    /// - [`BackendError::Deserialize`] if rows do not match [`Product`].
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.build_url(&[("select", "*"), ("order", "created_at.desc")]);
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            let url = url.clone();
            async move {
                let request = self.request(Method::GET, url, self.read_credential());
                let response = send(request).await?;
                decode_json::<Vec<Product>>(response, "list products").await
            }
        })
        .await
    }

    /// Fetches one product by id. `Ok(None)` when no row matches.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::list_products`].
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, BackendError> {
        let filter = eq(id);
        let url = self.build_url(&[("select", "*"), ("id", &filter), ("limit", "1")]);
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            let url = url.clone();
            async move {
                let request = self.request(Method::GET, url, self.read_credential());
                let response = send(request).await?;
                let rows = decode_json::<Vec<Product>>(response, "get product").await?;
                Ok(rows.into_iter().next())
            }
        })
        .await
    }

    /// Counts rows via `Prefer: count=exact` and the total in `Content-Range`.
    /// At most one id is transferred; a `GET` keeps error bodies readable.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Api`] / [`BackendError::Http`] as for reads.
    /// - [`BackendError::UnexpectedResponse`] if `Content-Range` is missing
    ///   or carries no total.
    pub async fn count_products(&self) -> Result<u64, BackendError> {
        let url = self.build_url(&[("select", "id"), ("limit", "1")]);
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            let url = url.clone();
            async move {
                let request = self
                    .request(Method::GET, url, self.read_credential())
                    .header("Prefer", "count=exact");
                let response = send(request).await?;
                response
                    .headers()
                    .get("content-range")
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_range_total)
                    .ok_or_else(|| {
                        BackendError::UnexpectedResponse(
                            "count request returned no Content-Range total".to_owned(),
                        )
                    })
            }
        })
        .await
    }

    /// Inserts one product signed with `credential` and returns the stored row.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Api`] if the backend rejects the insert; check
    ///   [`BackendError::is_permission_denied`] for row-level security refusals.
    /// - [`BackendError::Http`] on network failure.
    /// - [`BackendError::UnexpectedResponse`] if no row comes back.
    pub async fn insert_product(
        &self,
        credential: Credential<'_>,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        let url = self.build_url(&[("select", "*")]);
        let request = self
            .request(Method::POST, url, credential)
            .header("Prefer", "return=representation")
            .json(&[product]);
        let response = send(request).await?;
        let rows = decode_json::<Vec<Product>>(response, "insert product").await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::UnexpectedResponse("insert returned no representation".to_owned())
        })
    }

    /// Bulk insert signed with the service role key.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingServiceKey`] when no service key is
    /// configured, otherwise as [`BackendClient::insert_product`].
    pub async fn insert_products(
        &self,
        products: &[NewProduct],
    ) -> Result<Vec<Product>, BackendError> {
        if !self.has_service_key() {
            return Err(BackendError::MissingServiceKey);
        }
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.build_url(&[("select", "*")]);
        let request = self
            .request(Method::POST, url, Credential::Service)
            .header("Prefer", "return=representation")
            .json(products);
        let response = send(request).await?;
        decode_json::<Vec<Product>>(response, "insert products").await
    }

    /// Applies `patch` to the product with `id`. `Ok(None)` when no row matched.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::insert_product`].
    pub async fn update_product(
        &self,
        credential: Credential<'_>,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, BackendError> {
        let filter = eq(id);
        let url = self.build_url(&[("id", &filter), ("select", "*")]);
        let request = self
            .request(Method::PATCH, url, credential)
            .header("Prefer", "return=representation")
            .json(patch);
        let response = send(request).await?;
        let rows = decode_json::<Vec<Product>>(response, "update product").await?;
        Ok(rows.into_iter().next())
    }

    /// Deletes the product with `id`. Returns `false` when no row matched.
    ///
    /// # Errors
    ///
    /// As [`BackendClient::insert_product`].
    pub async fn delete_product(
        &self,
        credential: Credential<'_>,
        id: &str,
    ) -> Result<bool, BackendError> {
        let filter = eq(id);
        let url = self.build_url(&[("id", &filter), ("select", "id")]);
        let request = self
            .request(Method::DELETE, url, credential)
            .header("Prefer", "return=representation");
        let response = send(request).await?;
        let rows = decode_json::<Vec<serde_json::Value>>(response, "delete product").await?;
        Ok(!rows.is_empty())
    }

    /// Builds the table URL with percent-encoded query parameters.
    fn build_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.table_url.clone();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Starts a request signed with `credential`: the `apikey` header names the
    /// project key, the bearer carries the identity row-level security sees.
    fn request(&self, method: Method, url: Url, credential: Credential<'_>) -> RequestBuilder {
        let (api_key, bearer) = match credential {
            Credential::User(token) => (self.anon_key.as_str(), token),
            Credential::Service => {
                let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
                (key, key)
            }
            Credential::Anonymous => (self.anon_key.as_str(), self.anon_key.as_str()),
        };

        tracing::debug!(
            method = %method,
            path = url.path(),
            credential = credential.kind(),
            "backend request"
        );

        self.client
            .request(method, url)
            .header("apikey", api_key)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, HeaderValue::from_static("application/json"))
    }
}

/// Sends a request and turns non-2xx answers into [`BackendError::Api`].
async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_owned()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });

    Err(BackendError::Api {
        status: status.as_u16(),
        code: body.code,
        message,
        details: body.details,
        hint: body.hint,
    })
}

/// `{base}/rest/v1/{table}`, tolerating a trailing slash on `base`.
fn table_url(base_url: &str, table: &str) -> Result<Url, BackendError> {
    let invalid = |reason: String| BackendError::InvalidUrl {
        url: base_url.to_owned(),
        reason,
    };

    let normalised = format!("{}/{REST_PATH}/{table}", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

fn eq(id: &str) -> String {
    format!("eq.{id}")
}

/// Total from a `Content-Range` value such as `0-24/57` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

async fn decode_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, BackendError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
