use hb_catalog_http::{DEFAULT_ENDPOINT, DEFAULT_PRODUCTS_PATH};
use hb_storefront_core::DEFAULT_WHATSAPP_NUMBER;
use std::path::PathBuf;
use zeroize::Zeroizing;

pub const DEFAULT_DATA_DIR: &str = "./.storefront";

/// Runtime settings, read from `HERBAL_*` environment variables.
pub struct StorefrontConfig {
    pub api_url: String,
    pub products_path: String,
    pub data_dir: PathBuf,
    pub whatsapp_number: String,
    pub admin_password: Option<Zeroizing<String>>,
}

impl StorefrontConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        Self {
            api_url: value("HERBAL_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            products_path: value("HERBAL_API_PREFIX")
                .unwrap_or_else(|| DEFAULT_PRODUCTS_PATH.to_owned()),
            data_dir: value("HERBAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            whatsapp_number: value("HERBAL_WHATSAPP_NUMBER")
                .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_owned()),
            admin_password: value("HERBAL_ADMIN_PASSWORD").map(Zeroizing::new),
        }
    }
}
