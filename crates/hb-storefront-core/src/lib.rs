//! Storefront controller: one owned value holding the catalog, cart,
//! wishlist, filter state and admin session, plus the WhatsApp order links.

mod checkout;
mod storefront;

pub use checkout::{
    DEFAULT_WHATSAPP_NUMBER, PLACEHOLDER_IMAGE, buy_now_message, cart_checkout_message,
    display_image, whatsapp_link,
};
pub use storefront::{Storefront, StorefrontError};
