//! Catalog container state and actions.

use platter_api::models::{
    Category, Envelope, Event, Id, NewCategory, NewEvent, Restaurant, RestaurantDraft,
    RestaurantListing, RestaurantQuery,
};
use platter_api::service::Acknowledgement;
use platter_core::lifecycle::{Completion, Fence, Lifecycle};
use serde::Serialize;

/// Operation kinds of the catalog container, used for request fencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOp {
    /// Paginated restaurant list
    List,
    /// Keyword search
    Search,
    /// Restaurant detail
    Detail,
    /// Admin create
    Create,
    /// Admin update
    Update,
    /// Admin delete
    Delete,
    /// Admin open/closed toggle
    Status,
    /// All categories
    Categories,
    /// Categories of one restaurant
    RestaurantCategories,
    /// Admin category create
    CreateCategory,
    /// Events of one restaurant
    RestaurantEvents,
    /// Event detail
    EventDetail,
    /// Admin event create
    CreateEvent,
    /// Admin event delete
    DeleteEvent,
}

/// Pagination of the restaurant list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-indexed page last requested
    pub current_page: u32,
    /// Page size last requested
    pub size: u32,
    /// Number of pages reported by the server
    pub total_pages: u32,
    /// Number of restaurants reported by the server
    pub total_elements: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            size: 10,
            total_pages: 1,
            total_elements: 0,
        }
    }
}

/// State of the catalog container
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    /// Lifecycle of the latest catalog operation
    pub lifecycle: Lifecycle,
    /// Restaurants of the latest list or search
    pub restaurants: Vec<Restaurant>,
    /// Restaurant detail view
    pub restaurant: Option<Restaurant>,
    /// Restaurant most recently created by this admin
    pub owned_restaurant: Option<Restaurant>,
    /// Categories of the latest category fetch, plus local creations
    pub categories: Vec<Category>,
    /// Events created in this session
    pub events: Vec<Event>,
    /// Events of the restaurant last fetched, plus local creations
    pub restaurant_events: Vec<Event>,
    /// Event detail view
    pub event: Option<Event>,
    /// Pagination of `restaurants`
    pub pagination: Pagination,
    #[serde(skip)]
    pub(crate) fence: Fence<CatalogOp>,
}

/// Restaurant list response together with the query that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantPageLoaded {
    /// Query as requested by the caller
    pub query: RestaurantQuery,
    /// Server response
    pub envelope: Envelope<RestaurantListing>,
}

/// Response of an admin mutation addressed by id
#[derive(Debug, Clone, PartialEq)]
pub struct Targeted {
    /// Entity the request addressed
    pub id: Id,
    /// Server response
    pub envelope: Acknowledgement,
}

/// Actions of the catalog container
#[derive(Debug, Clone)]
pub enum CatalogAction {
    // Commands
    /// Load one page of restaurants
    FetchRestaurants(RestaurantQuery),
    /// Search restaurants by keyword
    SearchRestaurants {
        /// Search term
        keyword: String,
    },
    /// Load one restaurant
    FetchRestaurant {
        /// Restaurant to load
        id: Id,
    },
    /// Create a restaurant (admin)
    CreateRestaurant(RestaurantDraft),
    /// Update a restaurant (admin)
    UpdateRestaurant {
        /// Restaurant to update
        id: Id,
        /// New field values
        draft: RestaurantDraft,
    },
    /// Delete a restaurant (admin)
    DeleteRestaurant {
        /// Restaurant to delete
        id: Id,
    },
    /// Toggle a restaurant open/closed (admin)
    ToggleRestaurantStatus {
        /// Restaurant to toggle
        id: Id,
    },
    /// Load every category
    FetchCategories,
    /// Load the categories of one restaurant
    FetchRestaurantCategories {
        /// Owning restaurant
        restaurant: Id,
    },
    /// Create a category (admin)
    CreateCategory(NewCategory),
    /// Load the events of one restaurant
    FetchRestaurantEvents {
        /// Hosting restaurant
        restaurant: Id,
    },
    /// Load one event
    FetchEvent {
        /// Event to load
        id: Id,
    },
    /// Create an event (admin)
    CreateEvent(NewEvent),
    /// Delete an event (admin)
    DeleteEvent {
        /// Event to delete
        id: Id,
    },

    // Outcomes
    /// Restaurant list finished
    RestaurantsLoaded(Completion<RestaurantPageLoaded>),
    /// Search finished
    SearchCompleted(Completion<Envelope<Vec<Restaurant>>>),
    /// Detail fetch finished
    RestaurantLoaded(Completion<Envelope<Restaurant>>),
    /// Create finished
    RestaurantCreated(Completion<Envelope<Restaurant>>),
    /// Update finished
    RestaurantUpdated(Completion<Targeted>),
    /// Delete finished
    RestaurantDeleted(Completion<Targeted>),
    /// Status toggle finished
    RestaurantStatusToggled(Completion<Targeted>),
    /// Category fetch finished
    CategoriesLoaded(Completion<Envelope<Vec<Category>>>),
    /// Per-restaurant category fetch finished
    RestaurantCategoriesLoaded(Completion<Envelope<Vec<Category>>>),
    /// Category create finished
    CategoryCreated(Completion<Envelope<Category>>),
    /// Per-restaurant event fetch finished
    RestaurantEventsLoaded(Completion<Envelope<Vec<Event>>>),
    /// Event detail fetch finished
    EventLoaded(Completion<Envelope<Event>>),
    /// Event create finished
    EventCreated(Completion<Envelope<Event>>),
    /// Event delete finished
    EventDeleted(Completion<Targeted>),
}
