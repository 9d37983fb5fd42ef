use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Product identifier.
///
/// Always a string. Older caches and some backend revisions used numeric ids;
/// those deserialize into their decimal string form so existing carts and
/// wishlists keep resolving after the migration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => Self(value),
            RawId::Unsigned(value) => Self(value.to_string()),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Float(value) => Self(value.to_string()),
        })
    }
}

/// Highest accepted unit price (10^12). Keeps line totals and cart sums far
/// inside the range of [`Decimal`].
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// First 8 bytes of SHA-256 over `name|price|image`, hex encoded.
///
/// Identifies a product by content when it has no usable id. The price is
/// normalized first, so `700` and `700.00` give the same digest.
pub fn content_digest(name: &str, price: Decimal, image: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(price.normalize().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(image.as_bytes());
    let digest = hasher.finalize();
    hex_lower(&digest[..8])
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub details: String,
}

impl Product {
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            image: self.image.clone(),
            details: self.details.clone(),
        }
    }

    pub fn with_fields(id: ProductId, fields: ProductFields) -> Self {
        Self {
            id,
            name: fields.name,
            category: fields.category,
            price: fields.price,
            image: fields.image,
            details: fields.details,
        }
    }
}

/// Body of create/update calls: a product without its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub image: String,
    pub details: String,
}

/// Product as it arrives from the backend or an old cache.
///
/// Everything is optional or loosely typed here; `normalize` turns it into a
/// [`Product`] once an identifier is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl RemoteProduct {
    /// Coerces the loosely typed price. Accepts JSON numbers and numeric
    /// strings; anything else, a negative amount or one above [`MAX_PRICE`]
    /// yields `None`.
    pub fn parsed_price(&self) -> Option<Decimal> {
        let price = match &self.price {
            serde_json::Value::Number(number) => Decimal::from_str(&number.to_string())
                .or_else(|_| Decimal::from_scientific(&number.to_string()))
                .ok()?,
            serde_json::Value::String(text) => Decimal::from_str(text.trim()).ok()?,
            _ => return None,
        };

        if (price.is_sign_negative() && !price.is_zero()) || price > MAX_PRICE {
            return None;
        }
        Some(price)
    }

    pub fn normalize(self, id: ProductId) -> Option<Product> {
        let price = self.parsed_price()?;
        Some(Product {
            id,
            name: self.name,
            category: self.category,
            price,
            image: self.image.unwrap_or_default(),
            details: self.details.unwrap_or_default(),
        })
    }
}

impl From<Product> for RemoteProduct {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name,
            category: product.category,
            price: serde_json::Value::String(product.price.to_string()),
            image: Some(product.image),
            details: Some(product.details),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "message")]
    pub error: String,
}
