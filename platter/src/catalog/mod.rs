//! Catalog container: restaurants, categories and events.
//!
//! `events` collects events created in this session while
//! `restaurant_events` mirrors the restaurant last fetched. Creation appends
//! to both and deletion removes from both; neither is derived from the other.

pub mod reducer;
pub mod types;

pub use reducer::{CatalogEnvironment, CatalogReducer};
pub use types::{
    CatalogAction, CatalogOp, CatalogState, Pagination, RestaurantPageLoaded, Targeted,
};
