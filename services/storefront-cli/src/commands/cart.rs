//! Cart and order link commands.

use hb_api_types::ProductId;
use hb_storefront_core::StorefrontError;

use crate::App;

pub fn show(app: &App) {
    let cart = app.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:<20} {:>3} x {:<40} Rs {}",
            line.key,
            line.qty,
            line.name,
            line.line_total().normalize()
        );
    }
    println!("{} items, total Rs {}", cart.item_count(), cart.total().normalize());
}

pub fn add(app: &mut App, id: &ProductId, qty: u32) -> Result<(), StorefrontError> {
    let qty = app.add_to_cart(id, qty)?;
    println!("{id} is in the cart ({qty} total)");
    Ok(())
}

pub fn adjust(app: &mut App, key: &str, delta: i64) -> Result<(), StorefrontError> {
    let qty = app.adjust_cart(key, delta)?;
    println!("{key}: qty {qty}");
    Ok(())
}

pub fn remove(app: &mut App, key: &str) -> Result<(), StorefrontError> {
    let line = app.remove_from_cart(key)?;
    println!("removed {} x {}", line.qty, line.name);
    Ok(())
}

pub fn clear(app: &mut App) {
    app.clear_cart();
    println!("cart cleared");
}

pub fn checkout(app: &App) -> Result<(), StorefrontError> {
    let link = app.checkout_link()?;
    println!("{}", app.checkout_message()?);
    println!();
    println!("{link}");
    Ok(())
}

pub fn buy_now(app: &App, id: &ProductId, qty: u32) -> Result<(), StorefrontError> {
    println!("{}", app.buy_now_link(id, qty)?);
    Ok(())
}
