//! Catalog browsing commands.

use hb_api_types::{Product, ProductId};
use hb_catalog::ALL_CATEGORIES;
use hb_storefront_core::{StorefrontError, display_image};

use crate::{App, ListArgs};

pub fn print_product_row(app: &App, product: &Product) {
    let saved = if app.is_wishlisted(product) { "*" } else { " " };
    println!(
        "{saved} {:<10} {:<40} {:<16} Rs {}",
        product.id,
        product.name,
        product.category,
        product.price.normalize()
    );
}

pub fn list(app: &mut App, args: &ListArgs) {
    app.reset_filter();
    app.set_category(args.category.clone().unwrap_or_else(|| ALL_CATEGORIES.to_owned()));
    if let Some(search) = &args.search {
        app.set_search(search.clone());
    }
    app.set_price_range(args.min, args.max);
    app.set_sort(args.sort);
    app.set_wishlist_only(args.wishlist);

    let visible = app.visible_products();
    if visible.is_empty() {
        println!("No products match.");
        return;
    }
    for product in &visible {
        print_product_row(app, product);
    }
    println!("{} of {} products", visible.len(), app.products().len());
}

pub fn show(app: &App, id: &ProductId) -> Result<(), StorefrontError> {
    let product = app
        .catalog()
        .get(id)
        .ok_or_else(|| StorefrontError::UnknownProduct(id.clone()))?;

    println!("{}", product.name);
    println!("  id:       {}", product.id);
    println!("  category: {}", product.category);
    println!("  price:    Rs {}", product.price.normalize());
    let image = display_image(&product.image);
    if image.starts_with("data:") {
        println!("  image:    <embedded, {} bytes>", image.len());
    } else {
        println!("  image:    {image}");
    }
    if app.is_wishlisted(product) {
        println!("  saved to wishlist");
    }
    if !product.details.is_empty() {
        println!();
        println!("{}", product.details);
    }
    Ok(())
}

pub fn categories(app: &App) {
    println!("{ALL_CATEGORIES}");
    for category in app.categories() {
        println!("{category}");
    }
}
