//! # Platter
//!
//! Client state layer for the food-ordering REST API.
//!
//! Three containers, each a reducer over its own state driven by a runtime
//! [`Store`](platter_runtime::Store):
//!
//! - [`auth`]: signed-in user, bearer token, favorites
//! - [`cart`]: the order in progress and its derived totals
//! - [`catalog`]: restaurants with pagination, categories, events
//!
//! Every operation follows the same lifecycle: dispatching it marks the
//! container loading, its single HTTP call runs as an effect, and the outcome
//! action either merges the response and records the server message or
//! records the normalized failure. Outcomes of superseded requests are
//! dropped.
//!
//! [`AppStore`] wires the three containers to one API client.
//!
//! ## Example
//!
//! ```no_run
//! use platter::{AppStore, catalog::CatalogAction};
//! use platter_api::{ApiConfig, models::RestaurantQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppStore::connect(&ApiConfig::from_env()?)?;
//!
//! let mut handle = app
//!     .catalog()
//!     .send(CatalogAction::FetchRestaurants(RestaurantQuery::page(1, 10)))
//!     .await?;
//! handle.wait().await;
//!
//! let names: Vec<_> = app
//!     .catalog()
//!     .state(|s| s.restaurants.iter().filter_map(|r| r.name.clone()).collect())
//!     .await;
//! println!("{names:?}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod store;

pub use store::{AppError, AppStore, AuthStore, CartStore, CatalogStore, Snapshot};
