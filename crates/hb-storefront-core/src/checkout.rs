use hb_api_types::Product;
use hb_cart::CartLine;
use reqwest::Url;
use rust_decimal::Decimal;
use std::fmt::Write;

pub const DEFAULT_WHATSAPP_NUMBER: &str = "923115121207";
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

const CART_GREETING: &str = "Hello, I would like to order:";

/// Image to show for a product, falling back to the placeholder.
pub fn display_image(image: &str) -> &str {
    if image.trim().is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        image
    }
}

/// Single-product order message. A zero quantity counts as one and the
/// amount saturates at `Decimal::MAX`.
pub fn buy_now_message(product: &Product, qty: u32) -> String {
    let qty = qty.max(1);
    let amount = product.price.saturating_mul(Decimal::from(qty));
    format!(
        "Hello, I want to buy {qty} x {} for Rs {}",
        product.name,
        amount.normalize()
    )
}

pub fn cart_checkout_message(lines: &[CartLine], total: Decimal) -> String {
    let mut message = String::from(CART_GREETING);
    for line in lines {
        let _ = write!(
            message,
            "\n- {} x {} = Rs {}",
            line.qty,
            line.name,
            line.line_total().normalize()
        );
    }
    let _ = write!(message, "\nTotal: Rs {}", total.normalize());
    message
}

/// `https://wa.me/{number}?text={message}` with the message form-encoded.
pub fn whatsapp_link(number: &str, message: &str) -> Result<Url, String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(format!("invalid WhatsApp number '{number}'"));
    }
    Url::parse_with_params(&format!("https://wa.me/{digits}"), &[("text", message)])
        .map_err(|err| err.to_string())
}
