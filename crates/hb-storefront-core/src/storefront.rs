use hb_api_types::{Product, ProductId};
use hb_auth_adapter::{AdminError, AdminSession, ProductForm};
use hb_cart::{CartError, CartItem, CartLedger, CartLine, Wishlist, stable_key};
use hb_catalog::{FilterState, LoadSource, ProductStore, SortMode, apply};
use hb_catalog_client::ProductApi;
use hb_storage::LocalStore;
use reqwest::Url;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::checkout::{buy_now_message, cart_checkout_message, whatsapp_link};

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("product {0} not found")]
    UnknownProduct(ProductId),
    #[error("cart is empty")]
    EmptyCart,
    #[error("could not build order link: {0}")]
    Link(String),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Admin(#[from] AdminError),
}

/// Application state of the storefront.
///
/// Every mutation takes `&mut self`, so operations apply one at a time in call
/// order.
pub struct Storefront<A, S> {
    catalog: ProductStore<A, S>,
    cart: CartLedger<S>,
    wishlist: Wishlist<S>,
    filter: FilterState,
    admin: AdminSession,
    whatsapp_number: String,
}

impl<A, S> Storefront<A, S>
where
    A: ProductApi,
    S: LocalStore + Clone,
{
    /// Restores cart, wishlist and cached catalog from `store`. Call
    /// [`Storefront::refresh`] to fetch the live catalog.
    pub fn new(api: A, store: S, whatsapp_number: impl Into<String>) -> Self {
        Self {
            catalog: ProductStore::new(api, store.clone()),
            cart: CartLedger::load(store.clone()),
            wishlist: Wishlist::load(store),
            filter: FilterState::default(),
            admin: AdminSession::new(),
            whatsapp_number: whatsapp_number.into(),
        }
    }

    /// Reloads the catalog and brings cart lines up to date with it.
    pub async fn refresh(&mut self) -> LoadSource {
        let source = self.catalog.load().await;
        let refreshed = self.cart.reconcile(self.catalog.products());
        if refreshed > 0 {
            info!("refreshed {} cart lines from the catalog", refreshed);
        }
        source
    }

    pub fn catalog(&self) -> &ProductStore<A, S> {
        &self.catalog
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    fn product(&self, id: &ProductId) -> Result<&Product, StorefrontError> {
        self.catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.clone()))
    }

    // Filtering

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.filter.active_category = category.into();
        self.filter.wishlist_only = false;
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filter.search_text = text.into();
    }

    pub fn set_price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        self.filter.price_min = min;
        self.filter.price_max = max;
    }

    pub fn set_sort(&mut self, mode: SortMode) {
        self.filter.sort_mode = mode;
    }

    pub fn set_wishlist_only(&mut self, wishlist_only: bool) {
        self.filter.wishlist_only = wishlist_only;
    }

    pub fn reset_filter(&mut self) {
        self.filter = FilterState::default();
    }

    pub fn visible_products(&self) -> Vec<&Product> {
        apply(self.catalog.products(), &self.filter, |product| {
            self.wishlist.contains(&stable_key(&CartItem::from(product)))
        })
    }

    // Cart

    pub fn cart(&self) -> &CartLedger<S> {
        &self.cart
    }

    pub fn add_to_cart(&mut self, id: &ProductId, qty: u32) -> Result<u32, StorefrontError> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.clone()))?;
        Ok(self.cart.add_item(CartItem::from(product), qty))
    }

    pub fn adjust_cart(&mut self, key: &str, delta: i64) -> Result<u32, StorefrontError> {
        Ok(self.cart.adjust_qty(key, delta)?)
    }

    pub fn remove_from_cart(&mut self, key: &str) -> Result<CartLine, StorefrontError> {
        Ok(self.cart.remove_item(key)?)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn checkout_message(&self) -> Result<String, StorefrontError> {
        if self.cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        Ok(cart_checkout_message(self.cart.lines(), self.cart.total()))
    }

    pub fn checkout_link(&self) -> Result<Url, StorefrontError> {
        let message = self.checkout_message()?;
        whatsapp_link(&self.whatsapp_number, &message).map_err(StorefrontError::Link)
    }

    pub fn buy_now_link(&self, id: &ProductId, qty: u32) -> Result<Url, StorefrontError> {
        let message = buy_now_message(self.product(id)?, qty);
        whatsapp_link(&self.whatsapp_number, &message).map_err(StorefrontError::Link)
    }

    // Wishlist

    pub fn wishlist(&self) -> &Wishlist<S> {
        &self.wishlist
    }

    /// Returns whether the product is saved after the toggle.
    pub fn toggle_wishlist(&mut self, id: &ProductId) -> Result<bool, StorefrontError> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.clone()))?;
        let key = stable_key(&CartItem::from(product));
        Ok(self.wishlist.toggle(&key))
    }

    pub fn is_wishlisted(&self, product: &Product) -> bool {
        self.wishlist.contains(&stable_key(&CartItem::from(product)))
    }

    /// Saved products that are still in the catalog, in save order.
    pub fn wishlisted_products(&self) -> Vec<&Product> {
        self.wishlist
            .keys()
            .iter()
            .filter_map(|key| {
                self.catalog
                    .products()
                    .iter()
                    .find(|product| &stable_key(&CartItem::from(*product)) == key)
            })
            .collect()
    }

    // Admin

    pub fn admin(&self) -> &AdminSession {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut AdminSession {
        &mut self.admin
    }

    pub async fn admin_login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), StorefrontError> {
        self.admin.login(self.catalog.api(), email, password).await?;
        Ok(())
    }

    /// Form prefilled with an existing product.
    pub fn edit_form(&self, id: &ProductId) -> Result<ProductForm, StorefrontError> {
        let product = self.product(id)?;
        Ok(ProductForm::from_product(product, &self.categories()))
    }

    /// Creates or updates a product from the admin form, then reloads the
    /// catalog. Returns the id the product was saved under.
    pub async fn submit_product(
        &mut self,
        form: &ProductForm,
    ) -> Result<ProductId, StorefrontError> {
        if !self.admin.is_authenticated() {
            return Err(AdminError::NotAuthenticated.into());
        }
        let fields = form.validate()?;

        let id = match &form.id {
            Some(id) => {
                self.admin.update_product(&mut self.catalog, id, fields).await?;
                id.clone()
            }
            None => self.admin.create_product(&mut self.catalog, fields).await?,
        };

        self.refresh().await;
        Ok(id)
    }

    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), StorefrontError> {
        self.admin.delete_product(&mut self.catalog, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_catalog_client::fake::{FAKE_PASSWORD, FakeApi};
    use hb_storage::InMemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    const NUMBER: &str = "923115121207";

    fn backend() -> FakeApi {
        FakeApi::with_products(vec![
            json!({
                "id": "p1", "name": "Amla Oil", "category": "Hair Oil", "price": 700,
                "image": "amla.jpg", "details": "cold pressed"
            }),
            json!({
                "id": "p2", "name": "Rose Toner", "category": "Skin Toners", "price": "450",
                "details": "rose water"
            }),
            json!({
                "id": "p3", "name": "Charcoal Powder", "category": "Teeth Whitener", "price": 500,
                "image": "teeth.jpg", "details": "whitening"
            }),
        ])
    }

    async fn started(
        api: FakeApi,
        store: Arc<InMemoryStore>,
    ) -> Storefront<FakeApi, Arc<InMemoryStore>> {
        let mut storefront = Storefront::new(api, store, NUMBER);
        storefront.refresh().await;
        storefront
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn offline_start_shows_the_seed_catalog() {
        let mut storefront =
            Storefront::new(FakeApi::offline(), Arc::new(InMemoryStore::new()), NUMBER);
        assert_eq!(storefront.refresh().await, LoadSource::Seed);
        assert_eq!(storefront.visible_products().len(), 4);

        storefront.set_sort(SortMode::PriceAsc);
        let prices: Vec<Decimal> =
            storefront.visible_products().iter().map(|p| p.price).collect();
        assert_eq!(
            prices,
            [500, 700, 750, 800].map(|p| Decimal::new(p, 0)).to_vec()
        );
    }

    #[tokio::test]
    async fn filters_compose_over_the_live_catalog() {
        let mut storefront = started(backend(), Arc::new(InMemoryStore::new())).await;

        storefront.set_category("Hair Oil");
        assert_eq!(ids(&storefront.visible_products()), ["p1"]);

        storefront.reset_filter();
        storefront.set_search("  TONER ");
        assert_eq!(ids(&storefront.visible_products()), ["p2"]);

        storefront.reset_filter();
        storefront.set_price_range(Some(Decimal::new(460, 0)), None);
        storefront.set_sort(SortMode::PriceDesc);
        assert_eq!(ids(&storefront.visible_products()), ["p1", "p3"]);
    }

    #[tokio::test]
    async fn wishlist_view_follows_toggles() -> anyhow::Result<()> {
        let mut storefront = started(backend(), Arc::new(InMemoryStore::new())).await;

        assert!(storefront.toggle_wishlist(&ProductId::new("p3"))?);
        assert!(storefront.toggle_wishlist(&ProductId::new("p1"))?);
        storefront.set_wishlist_only(true);
        assert_eq!(ids(&storefront.visible_products()), ["p1", "p3"]);
        assert_eq!(ids(&storefront.wishlisted_products()), ["p3", "p1"]);

        assert!(!storefront.toggle_wishlist(&ProductId::new("p3"))?);
        assert_eq!(ids(&storefront.visible_products()), ["p1"]);

        storefront.set_category("Skin Toners");
        assert!(!storefront.filter().wishlist_only);
        Ok(())
    }

    #[tokio::test]
    async fn cart_and_wishlist_survive_a_restart() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let api = backend();
        {
            let mut storefront = started(api.clone(), store.clone()).await;
            storefront.add_to_cart(&ProductId::new("p1"), 2)?;
            storefront.add_to_cart(&ProductId::new("p1"), 3)?;
            storefront.add_to_cart(&ProductId::new("p2"), 1)?;
            storefront.toggle_wishlist(&ProductId::new("p2"))?;
        }

        let storefront = started(api, store).await;
        assert_eq!(storefront.cart().lines().len(), 2);
        assert_eq!(storefront.cart().line("p1").map(|l| l.qty), Some(5));
        assert_eq!(storefront.cart().total(), Decimal::new(3950, 0));
        assert!(storefront.wishlist().contains("p2"));
        Ok(())
    }

    #[tokio::test]
    async fn products_without_backend_ids_keep_cart_and_wishlist_after_restart()
    -> anyhow::Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let api = FakeApi::with_products(vec![
            json!({"name": "Henna", "category": "Hair Oil", "price": 250, "image": "henna.jpg"}),
        ]);

        let id = {
            let mut storefront = started(api.clone(), store.clone()).await;
            let id = storefront.products()[0].id.clone();
            storefront.add_to_cart(&id, 1)?;
            assert!(storefront.toggle_wishlist(&id)?);
            id
        };

        let mut storefront = started(api, store).await;
        let henna = storefront.catalog().get(&id).cloned();
        let henna = henna.ok_or_else(|| anyhow::anyhow!("product id changed across restart"))?;
        assert!(storefront.is_wishlisted(&henna));
        assert_eq!(ids(&storefront.wishlisted_products()), [id.to_string()]);

        assert_eq!(storefront.add_to_cart(&id, 1)?, 2);
        assert_eq!(storefront.cart().lines().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn admin_create_without_a_backend_id_returns_the_reloaded_id() -> anyhow::Result<()> {
        let api = FakeApi::with_products(Vec::new());
        api.set_assign_ids(false);
        let mut storefront = started(api, Arc::new(InMemoryStore::new())).await;
        storefront
            .admin_mut()
            .login_with_password(FAKE_PASSWORD, Some(FAKE_PASSWORD))?;

        let form = ProductForm {
            name: "Neem Soap".to_owned(),
            category: "Soaps".to_owned(),
            price: "300".to_owned(),
            image_url: "neem.jpg".to_owned(),
            details: "handmade".to_owned(),
            ..ProductForm::default()
        };
        let id = storefront.submit_product(&form).await?;
        assert!(storefront.catalog().get(&id).is_some());
        storefront.add_to_cart(&id, 1)?;
        Ok(())
    }

    #[tokio::test]
    async fn cart_operations_and_checkout_link() -> anyhow::Result<()> {
        let mut storefront = started(backend(), Arc::new(InMemoryStore::new())).await;
        assert!(matches!(storefront.checkout_link(), Err(StorefrontError::EmptyCart)));
        assert!(matches!(
            storefront.add_to_cart(&ProductId::new("ghost"), 1),
            Err(StorefrontError::UnknownProduct(_))
        ));

        storefront.add_to_cart(&ProductId::new("p1"), 1)?;
        storefront.add_to_cart(&ProductId::new("p3"), 1)?;
        assert_eq!(storefront.adjust_cart("p1", 1)?, 2);
        assert_eq!(storefront.adjust_cart("p3", -5)?, 1);
        assert!(matches!(
            storefront.adjust_cart("ghost", 1),
            Err(StorefrontError::Cart(CartError::UnknownKey(_)))
        ));

        let message = storefront.checkout_message()?;
        assert!(message.contains("- 2 x Amla Oil = Rs 1400"));
        assert!(message.ends_with("Total: Rs 1900"));

        let link = storefront.checkout_link()?;
        assert_eq!(link.host_str(), Some("wa.me"));

        storefront.remove_from_cart("p3")?;
        assert_eq!(storefront.cart().item_count(), 2);
        storefront.clear_cart();
        assert!(storefront.cart().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn buy_now_uses_the_current_price() -> anyhow::Result<()> {
        let storefront = started(backend(), Arc::new(InMemoryStore::new())).await;
        let link = storefront.buy_now_link(&ProductId::new("p2"), 2)?;
        let text = link
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned());
        assert_eq!(
            text.as_deref(),
            Some("Hello, I want to buy 2 x Rose Toner for Rs 900")
        );
        Ok(())
    }

    #[tokio::test]
    async fn admin_submit_creates_then_updates() -> anyhow::Result<()> {
        let api = backend();
        let mut storefront = started(api.clone(), Arc::new(InMemoryStore::new())).await;

        let form = ProductForm {
            name: "Neem Soap".to_owned(),
            category: "Hair Oil".to_owned(),
            new_category: "Soaps".to_owned(),
            price: "300".to_owned(),
            image_url: "neem.jpg".to_owned(),
            details: "handmade".to_owned(),
            ..ProductForm::default()
        };
        assert!(matches!(
            storefront.submit_product(&form).await,
            Err(StorefrontError::Admin(AdminError::NotAuthenticated))
        ));
        assert_eq!(api.mutation_calls(), 0);

        storefront
            .admin_mut()
            .login_with_password(FAKE_PASSWORD, Some(FAKE_PASSWORD))?;
        let id = storefront.submit_product(&form).await?;
        assert_eq!(storefront.products().len(), 4);
        assert!(storefront.categories().contains(&"Soaps".to_owned()));

        let mut edit = storefront.edit_form(&id)?;
        assert_eq!(edit.category, "Soaps");
        edit.price = "350".to_owned();
        storefront.submit_product(&edit).await?;
        let saved = storefront.catalog().get(&id).map(|p| p.price);
        assert_eq!(saved, Some(Decimal::new(350, 0)));

        let invalid = ProductForm {
            price: "free".to_owned(),
            ..form
        };
        assert!(matches!(
            storefront.submit_product(&invalid).await,
            Err(StorefrontError::Admin(AdminError::Validation(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn revoked_admin_must_log_in_again() -> anyhow::Result<()> {
        let api = backend();
        let mut storefront = started(api.clone(), Arc::new(InMemoryStore::new())).await;
        storefront
            .admin_mut()
            .login_with_password(FAKE_PASSWORD, Some(FAKE_PASSWORD))?;

        storefront.add_to_cart(&ProductId::new("p1"), 1)?;
        storefront.delete_product(&ProductId::new("p2")).await?;
        assert_eq!(storefront.products().len(), 2);

        api.revoke_credentials();
        assert!(matches!(
            storefront.delete_product(&ProductId::new("p1")).await,
            Err(StorefrontError::Admin(AdminError::ReauthRequired))
        ));
        assert!(!storefront.admin().is_authenticated());
        assert_eq!(storefront.products().len(), 2);
        assert!(storefront.cart().line("p1").is_some());
        Ok(())
    }
}
