//! Product catalog: the synced product list and the pure filter/sort pipeline
//! that turns it into a display list.

pub mod filter;
pub mod seed;
mod store;

pub use filter::{ALL_CATEGORIES, FilterState, SortMode, apply};
pub use store::{CatalogError, LoadSource, ProductStore, categories, synthesize_id};
