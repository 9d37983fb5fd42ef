//! Cart ledger and wishlist, both keyed by a stable product key and mirrored
//! into the local store after every change.

mod key;
mod ledger;
mod wishlist;

pub use key::{CartItem, stable_key};
pub use ledger::{CartError, CartLedger, CartLine};
pub use wishlist::Wishlist;
