use hb_api_types::ProductId;
use hb_storefront_core::StorefrontError;

use crate::App;
use crate::commands::catalog::print_product_row;

pub fn show(app: &App) {
    let saved = app.wishlisted_products();
    if saved.is_empty() {
        println!("No saved products.");
        return;
    }
    for product in saved {
        print_product_row(app, product);
    }
    let missing = app.wishlist().len() - app.wishlisted_products().len();
    if missing > 0 {
        println!("({missing} saved products are no longer in the catalog)");
    }
}

pub fn toggle(app: &mut App, id: &ProductId) -> Result<(), StorefrontError> {
    if app.toggle_wishlist(id)? {
        println!("saved {id}");
    } else {
        println!("removed {id} from the wishlist");
    }
    Ok(())
}
