use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hb_api_types::{MAX_PRICE, Product, ProductFields, ProductId};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::session::AdminError;

const REQUIRED_FIELDS: &str =
    "fill all required fields and provide an image (file name/URL or upload)";

/// Image file picked in the admin form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Guesses the MIME type from the file extension.
    pub fn from_file_name(file_name: &str, bytes: Vec<u8>) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        };
        Self {
            mime_type: mime_type.to_owned(),
            bytes,
        }
    }
}

pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Raw admin form input.
///
/// `id` set means edit mode. `new_category` wins over `category`; an upload
/// wins over `image_url`. `retained_image` carries the image of the product
/// being edited when the URL field was left empty for it.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub id: Option<ProductId>,
    pub name: String,
    pub category: String,
    pub new_category: String,
    pub price: String,
    pub image_url: String,
    pub image_upload: Option<ImageUpload>,
    pub retained_image: Option<String>,
    pub details: String,
}

impl ProductForm {
    /// Prefills the form for editing `product`.
    pub fn from_product(product: &Product, known_categories: &[String]) -> Self {
        let (category, new_category) = if known_categories.iter().any(|c| c == &product.category) {
            (product.category.clone(), String::new())
        } else {
            (String::new(), product.category.clone())
        };

        let (image_url, retained_image) = if product.image.starts_with("data:") {
            (String::new(), Some(product.image.clone()))
        } else {
            (product.image.clone(), None)
        };

        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            category,
            new_category,
            price: product.price.normalize().to_string(),
            image_url,
            image_upload: None,
            retained_image,
            details: product.details.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Checks the input and builds the request body.
    pub fn validate(&self) -> Result<ProductFields, AdminError> {
        let name = self.name.trim();
        let details = self.details.trim();
        let new_category = self.new_category.trim();
        let category = if new_category.is_empty() {
            self.category.trim()
        } else {
            new_category
        };

        let image = match &self.image_upload {
            Some(upload) => data_uri(&upload.mime_type, &upload.bytes),
            None => {
                let url = self.image_url.trim();
                if url.is_empty() {
                    self.retained_image.clone().unwrap_or_default()
                } else {
                    url.to_owned()
                }
            }
        };

        if name.is_empty() || category.is_empty() || details.is_empty() || image.is_empty() {
            return Err(AdminError::Validation(REQUIRED_FIELDS.to_owned()));
        }

        let price_text = self.price.trim();
        let price = Decimal::from_str(price_text)
            .or_else(|_| Decimal::from_scientific(price_text))
            .map_err(|_| AdminError::Validation(format!("price '{price_text}' is not a number")))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(AdminError::Validation("price cannot be negative".to_owned()));
        }
        if price > MAX_PRICE {
            return Err(AdminError::Validation(format!("price cannot exceed {MAX_PRICE}")));
        }

        Ok(ProductFields {
            name: name.to_owned(),
            category: category.to_owned(),
            price,
            image,
            details: details.to_owned(),
        })
    }
}
