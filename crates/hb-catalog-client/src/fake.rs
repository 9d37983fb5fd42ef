//! Scriptable in-memory backend for tests of code built on [`ProductApi`].

use async_trait::async_trait;
use hb_api_types::{LoginRequest, LoginResponse, ProductFields, ProductId, RemoteProduct};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{AdminCredential, ApiError, ProductApi};

pub const FAKE_PASSWORD: &str = "123";
pub const FAKE_EMAIL: &str = "admin@herbal.pk";

struct FakeState {
    products: Vec<Value>,
    offline: bool,
    token: String,
    mutation_calls: usize,
    next_id: u64,
    assign_ids: bool,
}

/// Cloning shares the backend, so a test can keep a handle and flip it offline.
#[derive(Clone)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn with_products(products: Vec<Value>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                products,
                offline: false,
                token: "fake-token".to_owned(),
                mutation_calls: 0,
                next_id: 1,
                assign_ids: true,
            })),
        }
    }

    pub fn offline() -> Self {
        let api = Self::with_products(Vec::new());
        api.set_offline(true);
        api
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Token handed out by `login` and accepted as a bearer credential.
    pub fn set_token(&self, token: impl Into<String>) {
        self.lock().token = token.into();
    }

    /// Makes the backend reject every credential from now on.
    pub fn revoke_credentials(&self) {
        self.lock().token = String::new();
    }

    /// When off, created products are stored and echoed back without an id.
    pub fn set_assign_ids(&self, assign: bool) {
        self.lock().assign_ids = assign;
    }

    pub fn mutation_calls(&self) -> usize {
        self.lock().mutation_calls
    }

    pub fn stored_products(&self) -> Vec<Value> {
        self.lock().products.clone()
    }

    fn begin_mutation(
        &self,
        credential: &AdminCredential,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.lock();
        if state.offline {
            return Err(ApiError::Transport("backend unreachable".to_owned()));
        }
        state.mutation_calls += 1;

        let accepted = !state.token.is_empty()
            && match credential {
                AdminCredential::SharedPassword(password) => password.as_str() == FAKE_PASSWORD,
                AdminCredential::Bearer { token, .. } => token.as_str() == state.token,
            };
        if !accepted {
            return Err(ApiError::from_status(401, "admin credential rejected".to_owned()));
        }
        Ok(state)
    }
}

fn id_of(value: &Value) -> Option<ProductId> {
    serde_json::from_value(value.get("id")?.clone()).ok()
}

fn to_remote(value: Value) -> Result<RemoteProduct, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

fn to_value(fields: &ProductFields) -> Result<Value, ApiError> {
    serde_json::to_value(fields).map_err(|err| ApiError::Decode(err.to_string()))
}

#[async_trait]
impl ProductApi for FakeApi {
    async fn list_products(&self) -> Result<Vec<RemoteProduct>, ApiError> {
        let state = self.lock();
        if state.offline {
            return Err(ApiError::Transport("backend unreachable".to_owned()));
        }
        state.products.iter().cloned().map(to_remote).collect()
    }

    async fn create_product(
        &self,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        let mut state = self.begin_mutation(credential)?;
        let mut value = to_value(fields)?;
        if state.assign_ids {
            value["id"] = Value::String(format!("srv-{}", state.next_id));
            state.next_id += 1;
        }
        state.products.push(value.clone());
        to_remote(value)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        fields: &ProductFields,
        credential: &AdminCredential,
    ) -> Result<RemoteProduct, ApiError> {
        let mut state = self.begin_mutation(credential)?;
        let mut value = to_value(fields)?;
        value["id"] = Value::String(id.as_str().to_owned());

        let slot = state
            .products
            .iter_mut()
            .find(|p| id_of(p).as_ref() == Some(id))
            .ok_or_else(|| ApiError::from_status(404, "not found".to_owned()))?;
        *slot = value.clone();
        to_remote(value)
    }

    async fn delete_product(
        &self,
        id: &ProductId,
        credential: &AdminCredential,
    ) -> Result<(), ApiError> {
        let mut state = self.begin_mutation(credential)?;
        let before = state.products.len();
        state.products.retain(|p| id_of(p).as_ref() != Some(id));
        if state.products.len() == before {
            return Err(ApiError::from_status(404, "not found".to_owned()));
        }
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let state = self.lock();
        if state.offline {
            return Err(ApiError::Transport("backend unreachable".to_owned()));
        }
        if request.email != FAKE_EMAIL || request.password != FAKE_PASSWORD {
            return Err(ApiError::from_status(401, "invalid credentials".to_owned()));
        }
        Ok(LoginResponse {
            token: state.token.clone(),
        })
    }
}
