//! Admin side of the storefront: the login session that gates product
//! mutations, and the product form that feeds them.

mod form;
mod session;
mod token;

pub use form::{ImageUpload, ProductForm, data_uri};
pub use session::{AdminError, AdminSession};
pub use token::{now_epoch_secs, token_expiry};
