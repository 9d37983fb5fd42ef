use hb_api_types::{Product, ProductId};
use hb_storage::{CART_KEY, LocalStore, load_json, save_json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::key::{CartItem, stable_key};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("no cart line with key {0}")]
    UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: String,
    pub product_ref: Option<ProductId>,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub qty: u32,
}

impl CartLine {
    /// Price times quantity, saturating at `Decimal::MAX`.
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.qty))
    }
}

/// Quantity-keyed line items, at most one per stable key, never below 1.
pub struct CartLedger<S> {
    store: S,
    lines: Vec<CartLine>,
}

impl<S: LocalStore> CartLedger<S> {
    /// Restores the persisted ledger; a missing or unreadable one starts empty.
    pub fn load(store: S) -> Self {
        let persisted: Vec<CartLine> = load_json(&store, CART_KEY).unwrap_or_default();

        let mut lines: Vec<CartLine> = Vec::with_capacity(persisted.len());
        for mut line in persisted {
            line.qty = line.qty.max(1);
            match lines.iter_mut().find(|existing| existing.key == line.key) {
                Some(existing) => existing.qty = existing.qty.saturating_add(line.qty),
                None => lines.push(line),
            }
        }

        Self { store, lines }
    }

    fn persist(&self) {
        if let Err(err) = save_json(&self.store, CART_KEY, &self.lines) {
            warn!("failed to persist cart: {:#}", err);
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, key: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.key == key)
    }

    /// Adds `qty` (at least 1) of the item, merging into an existing line with
    /// the same key. Returns the line's resulting quantity.
    pub fn add_item(&mut self, item: CartItem<'_>, qty: u32) -> u32 {
        let key = stable_key(&item);
        let qty = qty.max(1);

        let resulting = match self.lines.iter_mut().find(|line| line.key == key) {
            Some(line) => {
                line.qty = line.qty.saturating_add(qty);
                line.qty
            }
            None => {
                self.lines.push(CartLine {
                    key: key.clone(),
                    product_ref: item.id.cloned(),
                    name: item.name.to_owned(),
                    price: item.price,
                    image: item.image.to_owned(),
                    qty,
                });
                qty
            }
        };

        debug!("cart line {} now has qty {}", key, resulting);
        self.persist();
        resulting
    }

    /// Shifts a line's quantity by `delta`, clamped to a minimum of 1.
    pub fn adjust_qty(&mut self, key: &str, delta: i64) -> Result<u32, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.key == key)
            .ok_or_else(|| CartError::UnknownKey(key.to_owned()))?;

        let wanted = i64::from(line.qty).saturating_add(delta).max(1);
        line.qty = u32::try_from(wanted).unwrap_or(u32::MAX);
        let qty = line.qty;

        self.persist();
        Ok(qty)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|line| line.key == key)
            .ok_or_else(|| CartError::UnknownKey(key.to_owned()))?;
        let removed = self.lines.remove(index);
        self.persist();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of line totals, saturating at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.qty)).sum()
    }

    /// Refreshes name, price and image of lines whose product is still in the
    /// catalog. Lines for products that disappeared are kept as they are.
    pub fn reconcile(&mut self, products: &[Product]) -> usize {
        let mut changed = 0;
        for line in &mut self.lines {
            let Some(product_ref) = &line.product_ref else {
                continue;
            };
            let Some(product) = products.iter().find(|p| &p.id == product_ref) else {
                continue;
            };
            if line.name != product.name
                || line.price != product.price
                || line.image != product.image
            {
                line.name = product.name.clone();
                line.price = product.price;
                line.image = product.image.clone();
                changed += 1;
            }
        }

        if changed > 0 {
            self.persist();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_storage::InMemoryStore;
    use std::sync::Arc;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Hair Oil".to_owned(),
            price: Decimal::new(price, 0),
            image: format!("{id}.jpg"),
            details: String::new(),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        let p1 = product("p1", 700);

        cart.add_item((&p1).into(), 2);
        let qty = cart.add_item((&p1).into(), 3);

        assert_eq!(qty, 5);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].key, "p1");
        assert_eq!(cart.total(), Decimal::new(3500, 0));
    }

    #[test]
    fn zero_quantities_count_as_one() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        let p1 = product("p1", 100);

        assert_eq!(cart.add_item((&p1).into(), 0), 1);
        assert_eq!(cart.add_item((&p1).into(), 0), 2);
        assert_eq!(cart.add_item((&p1).into(), 4), 6);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn adjusting_never_drops_below_one() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        let p1 = product("p1", 100);
        cart.add_item((&p1).into(), 3);

        assert_eq!(cart.adjust_qty("p1", -1), Ok(2));
        assert_eq!(cart.adjust_qty("p1", -100), Ok(1));
        assert_eq!(cart.adjust_qty("p1", i64::MIN), Ok(1));
        assert_eq!(cart.adjust_qty("p1", 4), Ok(5));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(
            cart.adjust_qty("missing", 1),
            Err(CartError::UnknownKey("missing".to_owned()))
        );
    }

    #[test]
    fn products_without_ids_merge_by_content() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        let item = CartItem {
            id: None,
            name: "Loose Henna",
            price: Decimal::new(250, 0),
            image: "henna.jpg",
        };
        cart.add_item(item, 1);
        cart.add_item(item, 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 2);
        assert!(cart.lines()[0].product_ref.is_none());
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        cart.add_item((&product("p1", 100)).into(), 1);
        cart.add_item((&product("p2", 200)).into(), 2);

        let removed = cart.remove_item("p1").expect("p1 should be in the cart");
        assert_eq!(removed.key, "p1");
        assert!(cart.remove_item("p1").is_err());
        assert_eq!(cart.total(), Decimal::new(400, 0));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn persisted_ledger_reloads_identically() {
        let store = Arc::new(InMemoryStore::new());
        let mut cart = CartLedger::load(store.clone());
        cart.add_item((&product("p3", 500)).into(), 1);
        cart.add_item((&product("p1", 800)).into(), 2);
        cart.add_item(
            CartItem {
                id: None,
                name: "Sample",
                price: Decimal::new(1999, 2),
                image: "",
            },
            4,
        );
        cart.adjust_qty("p3", 2).expect("p3 exists");

        let reloaded = CartLedger::load(store);
        assert_eq!(reloaded.lines(), cart.lines());
    }

    #[test]
    fn duplicate_or_zero_lines_in_storage_are_repaired() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        store.put(
            CART_KEY,
            r#"[
                {"key":"p1","product_ref":"p1","name":"A","price":100,"image":"","qty":0},
                {"key":"p1","product_ref":"p1","name":"A","price":100,"image":"","qty":2}
            ]"#,
        )?;
        let cart = CartLedger::load(store);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 3);
        Ok(())
    }

    #[test]
    fn malformed_storage_starts_empty() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        store.put(CART_KEY, "nope")?;
        assert!(CartLedger::load(store).is_empty());
        Ok(())
    }

    #[test]
    fn reconcile_refreshes_known_products_only() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        cart.add_item((&product("p1", 100)).into(), 1);
        cart.add_item((&product("gone", 50)).into(), 1);

        let mut repriced = product("p1", 120);
        repriced.name = "Product p1 (new)".to_owned();

        assert_eq!(cart.reconcile(&[repriced]), 1);
        assert_eq!(cart.line("p1").map(|l| l.price), Some(Decimal::new(120, 0)));
        assert_eq!(cart.line("gone").map(|l| l.price), Some(Decimal::new(50, 0)));
        assert_eq!(cart.total(), Decimal::new(170, 0));
    }

    #[test]
    fn huge_prices_saturate_instead_of_overflowing() {
        let mut cart = CartLedger::load(InMemoryStore::new());
        let mut pricey = product("p1", 0);
        pricey.price = Decimal::MAX;

        cart.add_item((&pricey).into(), 1);
        assert_eq!(cart.adjust_qty("p1", 1), Ok(2));
        assert_eq!(cart.lines()[0].line_total(), Decimal::MAX);

        cart.add_item((&product("p2", 10)).into(), 3);
        assert_eq!(cart.total(), Decimal::MAX);
    }
}
