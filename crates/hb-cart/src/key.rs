use hb_api_types::{Product, ProductId, content_digest};
use rust_decimal::Decimal;

/// What the cart needs to know about a product being added.
#[derive(Debug, Clone, Copy)]
pub struct CartItem<'a> {
    pub id: Option<&'a ProductId>,
    pub name: &'a str,
    pub price: Decimal,
    pub image: &'a str,
}

impl<'a> From<&'a Product> for CartItem<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            id: Some(&product.id),
            name: &product.name,
            price: product.price,
            image: &product.image,
        }
    }
}

/// Key used to merge repeated additions of the same product.
///
/// The product id when there is one; otherwise `h-` and the first 8 bytes of
/// SHA-256 over name, price and image.
pub fn stable_key(item: &CartItem<'_>) -> String {
    if let Some(id) = item.id.filter(|id| !id.as_str().trim().is_empty()) {
        return id.as_str().to_owned();
    }

    format!("h-{}", content_digest(item.name, item.price, item.image))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous<'a>(name: &'a str, price: Decimal, image: &'a str) -> CartItem<'a> {
        CartItem {
            id: None,
            name,
            price,
            image,
        }
    }

    #[test]
    fn ids_win_over_content() {
        let id = ProductId::new("p1");
        let item = CartItem {
            id: Some(&id),
            ..anonymous("Oil", Decimal::new(700, 0), "oil.jpg")
        };
        assert_eq!(stable_key(&item), "p1");
    }

    #[test]
    fn content_keys_are_deterministic_and_scale_insensitive() {
        let a = stable_key(&anonymous("Oil", Decimal::new(700, 0), "oil.jpg"));
        let b = stable_key(&anonymous("Oil", Decimal::new(70000, 2), "oil.jpg"));
        assert_eq!(a, b);
        assert!(a.starts_with("h-"));
        assert_eq!(a.len(), 2 + 16);

        let other_price = stable_key(&anonymous("Oil", Decimal::new(701, 0), "oil.jpg"));
        let other_image = stable_key(&anonymous("Oil", Decimal::new(700, 0), "oil.png"));
        assert_ne!(a, other_price);
        assert_ne!(a, other_image);
    }

    #[test]
    fn blank_ids_fall_back_to_content() {
        let blank = ProductId::new("  ");
        let item = CartItem {
            id: Some(&blank),
            ..anonymous("Oil", Decimal::new(700, 0), "oil.jpg")
        };
        assert!(stable_key(&item).starts_with("h-"));
    }
}
