use async_trait::async_trait;
use hb_api_types::{LoginRequest, LoginResponse, ProductFields, ProductId, RemoteProduct};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

#[cfg(feature = "fake")]
pub mod fake;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 || status == 403 {
            Self::Unauthorized {
                status,
                message: body,
            }
        } else {
            Self::Status { status, body }
        }
    }
}

/// Secret attached to mutating calls.
///
/// Held in memory only; the secret is wiped when the value is dropped.
#[derive(Clone)]
pub enum AdminCredential {
    SharedPassword(Zeroizing<String>),
    Bearer {
        token: Zeroizing<String>,
        expires_at_epoch_secs: Option<u64>,
    },
}

impl AdminCredential {
    pub fn shared_password(password: impl Into<String>) -> Self {
        Self::SharedPassword(Zeroizing::new(password.into()))
    }

    pub fn bearer(token: impl Into<String>, expires_at_epoch_secs: Option<u64>) -> Self {
        Self::Bearer {
            token: Zeroizing::new(token.into()),
            expires_at_epoch_secs,
        }
    }

    /// Header name and value to send with a mutating request.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::SharedPassword(password) => (ADMIN_PASSWORD_HEADER, password.as_str().to_owned()),
            Self::Bearer { token, .. } => ("authorization", format!("Bearer {}", token.as_str())),
        }
    }

    pub fn is_expired_at(&self, now_epoch_secs: u64) -> bool {
        match self {
            Self::SharedPassword(_) => false,
            Self::Bearer {
                expires_at_epoch_secs,
                ..
            } => expires_at_epoch_secs.is_some_and(|exp| exp <= now_epoch_secs),
        }
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedPassword(_) => f.write_str("SharedPassword(<redacted>)"),
            Self::Bearer {
                expires_at_epoch_secs,
                ..
            } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .field("expires_at_epoch_secs", expires_at_epoch_secs)
                .finish(),
        }
    }
}

/// Remote product catalog.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ApiError>;

    async fn create_product(
        &self,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError>;

    async fn update_product(
        &self,
        id: &ProductId,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError>;

    async fn delete_product(
        &self,
        id: &ProductId,
        credential: &AdminCredential,
    ) -> Result<(), ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
}

#[async_trait]
impl<T> ProductApi for Arc<T>
where
    T: ProductApi + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ApiError> {
        (**self).list_products().await
    }

    async fn create_product(
        &self,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        (**self).create_product(fields, credential).await
    }

    async fn update_product(
        &self,
        id: &ProductId,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        (**self).update_product(id, fields, credential).await
    }

    async fn delete_product(
        &self,
        id: &ProductId,
        credential: &AdminCredential,
    ) -> Result<(), ApiError> {
        (**self).delete_product(id, credential).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        (**self).login(request).await
    }
}
