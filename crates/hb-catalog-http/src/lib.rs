use async_trait::async_trait;
use hb_api_types::{
    ErrorResponse, LoginRequest, LoginResponse, ProductFields, ProductId, RemoteProduct,
};
use hb_catalog_client::{AdminCredential, ApiError, ProductApi};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://herbalbackend-production.up.railway.app";
pub const DEFAULT_PRODUCTS_PATH: &str = "/api/products";
pub const LEGACY_PRODUCTS_PATH: &str = "/products";
pub const LOGIN_PATH: &str = "/api/auth/login";

/// HTTP adapter for the herbal storefront backend.
///
/// Reads `HERBAL_API_URL` and `HERBAL_API_PREFIX` from environment at
/// construction time when no explicit values are given.
pub struct HttpProductApi {
    endpoint: String,
    products_path: String,
    http: reqwest::Client,
}

impl Default for HttpProductApi {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl HttpProductApi {
    pub fn new(endpoint: Option<String>, products_path: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("HERBAL_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let products_path = products_path
            .or_else(|| std::env::var("HERBAL_API_PREFIX").ok())
            .unwrap_or_else(|| DEFAULT_PRODUCTS_PATH.to_string());

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            products_path: normalize_path(&products_path),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn products_url(&self) -> String {
        format!("{}{}", self.endpoint, self.products_path)
    }

    fn product_url(&self, id: &ProductId) -> String {
        format!("{}{}/{}", self.endpoint, self.products_path, id.as_str())
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn transport(context: &str, err: reqwest::Error) -> ApiError {
    ApiError::Transport(format!("{context}: {err}"))
}

/// Turns a non-success response into an [`ApiError`], preferring the
/// backend's structured `{"error": ...}` body when there is one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(err) => err.error,
        Err(_) => text,
    };
    Err(ApiError::from_status(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(
    context: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|err| transport(context, err))?;
    serde_json::from_str(&text).map_err(|err| ApiError::Decode(format!("{context}: {err}")))
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ApiError> {
        let url = self.products_url();
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| transport("list_products", err))?;

        let response = check_status(response).await?;
        decode("list_products", response).await
    }

    async fn create_product(
        &self,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        let url = self.products_url();
        let (header, value) = credential.header();
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(header, value)
            .json(fields)
            .send()
            .await
            .map_err(|err| transport("create_product", err))?;

        let response = check_status(response).await?;
        decode("create_product", response).await
    }

    async fn update_product(
        &self,
        id: &ProductId,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        let url = self.product_url(id);
        let (header, value) = credential.header();
        debug!("PUT {}", url);

        let response = self
            .http
            .put(&url)
            .header(header, value)
            .json(fields)
            .send()
            .await
            .map_err(|err| transport("update_product", err))?;

        let response = check_status(response).await?;
        decode("update_product", response).await
    }

    async fn delete_product(
        &self,
        id: &ProductId,
        credential: &AdminCredential,
    ) -> Result<(), ApiError> {
        let url = self.product_url(id);
        let (header, value) = credential.header();
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .header(header, value)
            .send()
            .await
            .map_err(|err| transport("delete_product", err))?;

        // The acknowledgement body differs between backend revisions; only the status matters.
        check_status(response).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = format!("{}{}", self.endpoint, LOGIN_PATH);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| transport("login", err))?;

        let response = check_status(response).await?;
        decode("login", response).await
    }
}
