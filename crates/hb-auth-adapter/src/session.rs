use hb_api_types::{LoginRequest, ProductFields, ProductId};
use hb_catalog::{CatalogError, ProductStore};
use hb_catalog_client::{AdminCredential, ApiError, ProductApi};
use hb_storage::LocalStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::token::{now_epoch_secs, token_expiry};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("login as admin first")]
    NotAuthenticated,
    #[error("admin credentials were rejected; log in again")]
    ReauthRequired,
    #[error("incorrect admin password")]
    InvalidPassword,
    #[error("invalid login token: {0}")]
    InvalidToken(String),
    #[error("login token has expired")]
    TokenExpired,
    #[error("{0}")]
    Validation(String),
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error(transparent)]
    Api(ApiError),
}

enum SessionState {
    Anonymous,
    Authenticated(AdminCredential),
}

/// Admin login state. Starts anonymous on every run.
pub struct AdminSession {
    state: SessionState,
}

impl Default for AdminSession {
    fn default() -> Self {
        Self::new()
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

impl AdminSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Shared-password login. With no configured password every attempt fails.
    pub fn login_with_password(
        &mut self,
        candidate: &str,
        expected: Option<&str>,
    ) -> Result<(), AdminError> {
        let candidate = candidate.trim();
        let accepted = match expected {
            Some(expected) if !expected.is_empty() => {
                constant_time_eq(candidate.as_bytes(), expected.as_bytes())
            }
            _ => false,
        };
        if !accepted {
            warn!("admin password login rejected");
            return Err(AdminError::InvalidPassword);
        }

        self.state = SessionState::Authenticated(AdminCredential::shared_password(candidate));
        info!("admin mode enabled (shared password)");
        Ok(())
    }

    pub fn login_with_token(&mut self, token: &str) -> Result<(), AdminError> {
        self.login_with_token_at(token, now_epoch_secs())
    }

    pub fn login_with_token_at(
        &mut self,
        token: &str,
        now_epoch_secs: u64,
    ) -> Result<(), AdminError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AdminError::InvalidToken("empty token".to_owned()));
        }

        let expires_at = token_expiry(token)?;
        if expires_at.is_some_and(|exp| exp <= now_epoch_secs) {
            return Err(AdminError::TokenExpired);
        }

        self.state = SessionState::Authenticated(AdminCredential::bearer(token, expires_at));
        info!("admin mode enabled (bearer token)");
        Ok(())
    }

    /// Exchanges email and password for a bearer token at the backend.
    pub async fn login<A: ProductApi>(
        &mut self,
        api: &A,
        email: &str,
        password: &str,
    ) -> Result<(), AdminError> {
        let request = LoginRequest {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        let response = api.login(&request).await.map_err(|err| {
            if err.is_unauthorized() {
                AdminError::InvalidPassword
            } else {
                AdminError::Api(err)
            }
        })?;
        self.login_with_token(&response.token)
    }

    pub fn logout(&mut self) {
        if self.is_authenticated() {
            info!("admin mode disabled");
        }
        self.state = SessionState::Anonymous;
    }

    pub fn credential(&mut self) -> Result<&AdminCredential, AdminError> {
        self.credential_at(now_epoch_secs())
    }

    /// The credential to attach to a mutating call. An expired bearer token
    /// ends the session.
    pub fn credential_at(&mut self, now_epoch_secs: u64) -> Result<&AdminCredential, AdminError> {
        let expired = match &self.state {
            SessionState::Anonymous => return Err(AdminError::NotAuthenticated),
            SessionState::Authenticated(credential) => credential.is_expired_at(now_epoch_secs),
        };
        if expired {
            warn!("admin token expired; session ended");
            self.state = SessionState::Anonymous;
            return Err(AdminError::NotAuthenticated);
        }

        match &self.state {
            SessionState::Authenticated(credential) => Ok(credential),
            SessionState::Anonymous => Err(AdminError::NotAuthenticated),
        }
    }

    fn on_failure(&mut self, err: CatalogError) -> AdminError {
        match err {
            CatalogError::NotFound(id) => AdminError::NotFound(id),
            CatalogError::Api(err) if err.is_unauthorized() => {
                warn!("backend rejected admin credential: {}", err);
                self.state = SessionState::Anonymous;
                AdminError::ReauthRequired
            }
            CatalogError::Api(err) => AdminError::Api(err),
        }
    }

    pub async fn create_product<A, S>(
        &mut self,
        store: &mut ProductStore<A, S>,
        fields: ProductFields,
    ) -> Result<ProductId, AdminError>
    where
        A: ProductApi,
        S: LocalStore,
    {
        let credential = self.credential()?.clone();
        let created = store.create(fields, &credential).await.map(|p| p.id.clone());
        created.map_err(|err| self.on_failure(err))
    }

    pub async fn update_product<A, S>(
        &mut self,
        store: &mut ProductStore<A, S>,
        id: &ProductId,
        fields: ProductFields,
    ) -> Result<(), AdminError>
    where
        A: ProductApi,
        S: LocalStore,
    {
        let credential = self.credential()?.clone();
        let updated = store.update(id, fields, &credential).await.map(|_| ());
        updated.map_err(|err| self.on_failure(err))
    }

    pub async fn delete_product<A, S>(
        &mut self,
        store: &mut ProductStore<A, S>,
        id: &ProductId,
    ) -> Result<(), AdminError>
    where
        A: ProductApi,
        S: LocalStore,
    {
        let credential = self.credential()?.clone();
        let removed = store.remove(id, &credential).await.map(|_| ());
        removed.map_err(|err| self.on_failure(err))
    }
}
