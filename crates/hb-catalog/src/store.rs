use hb_api_types::{Product, ProductFields, ProductId, RemoteProduct, content_digest};
use hb_catalog_client::{AdminCredential, ApiError, ProductApi};
use hb_storage::{LocalStore, PRODUCTS_KEY, load_json, save_json};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::{info, warn};

use crate::seed::seed_products;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CatalogError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_unauthorized())
    }
}

/// Where the current product list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Cache,
    Seed,
}

/// Identifier for a product the backend returned without a usable id.
///
/// Derived from the product's content, so the same product gets the same id
/// on every load and carts or wishlists that reference it keep resolving.
/// Collisions with `taken` get a `-2`, `-3`, ... suffix.
pub fn synthesize_id(product: &Product, taken: &HashSet<ProductId>) -> ProductId {
    let base = format!(
        "local-{}",
        content_digest(&product.name, product.price, &product.image)
    );
    let mut candidate = ProductId(base.clone());
    let mut suffix = 2u32;
    while taken.contains(&candidate) {
        candidate = ProductId(format!("{base}-{suffix}"));
        suffix += 1;
    }
    candidate
}

/// Unique category names in sorted order.
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Normalizes a remote batch: coerces prices, drops entries whose price is
/// unusable, and gives missing or repeated ids a synthesized one. Backend ids
/// are claimed before any id is synthesized.
fn normalize_all(remote: Vec<RemoteProduct>) -> Vec<Product> {
    let mut taken = HashSet::new();
    let mut normalized = Vec::with_capacity(remote.len());

    for entry in remote {
        if entry.parsed_price().is_none() {
            warn!("skipping product '{}' with an invalid price", entry.name);
            continue;
        }
        let claimed = entry
            .id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty() && taken.insert(id.clone()));
        let has_id = claimed.is_some();
        let placeholder = ProductId::new(String::new());
        if let Some(product) = entry.normalize(claimed.unwrap_or(placeholder)) {
            normalized.push((has_id, product));
        }
    }

    let mut products = Vec::with_capacity(normalized.len());
    for (has_id, mut product) in normalized {
        if !has_id {
            product.id = synthesize_id(&product, &taken);
            taken.insert(product.id.clone());
        }
        products.push(product);
    }
    products
}

/// In-memory product list kept in sync with the backend and mirrored into the
/// local store.
///
/// Mutations touch the local list only after the backend confirmed them.
pub struct ProductStore<A, S> {
    api: A,
    store: S,
    products: Vec<Product>,
}

impl<A, S> ProductStore<A, S>
where
    A: ProductApi,
    S: LocalStore,
{
    /// Starts from the cached snapshot, or the seed list when there is none.
    pub fn new(api: A, store: S) -> Self {
        let products = Self::cached_or_seed(&store).0;
        Self {
            api,
            store,
            products,
        }
    }

    fn cached_or_seed(store: &S) -> (Vec<Product>, LoadSource) {
        match load_json::<Vec<RemoteProduct>, _>(store, PRODUCTS_KEY) {
            Some(cached) => (normalize_all(cached), LoadSource::Cache),
            None => (seed_products(), LoadSource::Seed),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn categories(&self) -> Vec<String> {
        categories(&self.products)
    }

    fn persist(&self) {
        if let Err(err) = save_json(&self.store, PRODUCTS_KEY, &self.products) {
            warn!("failed to cache product list: {:#}", err);
        }
    }

    /// Replaces the list with the backend's, falling back to the cached
    /// snapshot and then to the seed list.
    pub async fn load(&mut self) -> LoadSource {
        match self.api.list_products().await {
            Ok(remote) => {
                self.products = normalize_all(remote);
                self.persist();
                info!("loaded {} products from backend", self.products.len());
                LoadSource::Remote
            }
            Err(err) => {
                let (products, source) = Self::cached_or_seed(&self.store);
                warn!(
                    "product fetch failed ({}); using {:?} with {} products",
                    err,
                    source,
                    products.len()
                );
                self.products = products;
                source
            }
        }
    }

    pub async fn create(
        &mut self,
        fields: ProductFields,
        credential: &AdminCredential,
    ) -> Result<&Product, CatalogError> {
        let created = self.api.create_product(&fields, credential).await?;

        let server_id = created
            .id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty());
        let placeholder = server_id
            .clone()
            .unwrap_or_else(|| ProductId::new(String::new()));
        let mut product = created
            .normalize(placeholder.clone())
            .unwrap_or_else(|| Product::with_fields(placeholder, fields));

        let existing = server_id
            .as_ref()
            .and_then(|id| self.products.iter().position(|p| &p.id == id));
        let index = match (server_id, existing) {
            (Some(id), Some(index)) => {
                warn!("backend returned existing id {} on create; replacing the local entry", id);
                self.products[index] = product;
                index
            }
            (Some(_), None) => {
                self.products.push(product);
                self.products.len() - 1
            }
            (None, _) => {
                let taken: HashSet<ProductId> =
                    self.products.iter().map(|p| p.id.clone()).collect();
                product.id = synthesize_id(&product, &taken);
                self.products.push(product);
                self.products.len() - 1
            }
        };

        info!("created product {}", self.products[index].id);
        self.persist();
        Ok(&self.products[index])
    }

    pub async fn update(
        &mut self,
        id: &ProductId,
        fields: ProductFields,
        credential: &AdminCredential,
    ) -> Result<&Product, CatalogError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        let updated = self.api.update_product(id, &fields, credential).await?;
        let product = updated
            .normalize(id.clone())
            .unwrap_or_else(|| Product::with_fields(id.clone(), fields));

        info!("updated product {}", id);
        self.products[index] = product;
        self.persist();
        Ok(&self.products[index])
    }

    pub async fn remove(
        &mut self,
        id: &ProductId,
        credential: &AdminCredential,
    ) -> Result<Product, CatalogError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        self.api.delete_product(id, credential).await?;

        info!("removed product {}", id);
        let removed = self.products.remove(index);
        self.persist();
        Ok(removed)
    }
}
