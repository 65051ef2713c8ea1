//! Endpoint paths below the API base URL.

use crate::models::Id;

/// `POST` new account
pub const REGISTER: &str = "/user/register";
/// `POST` credentials
pub const LOGIN: &str = "/user/login";
/// `GET` signed-in profile
pub const PROFILE: &str = "/user/profile";

/// `GET` restaurant list (paginated)
pub const RESTAURANTS: &str = "/restaurants";
/// `GET` keyword search
pub const RESTAURANT_SEARCH: &str = "/restaurants/search";
/// `POST` create restaurant (admin)
pub const ADMIN_RESTAURANTS: &str = "/admin/restaurants";

/// `GET` all categories
pub const CATEGORIES: &str = "/category";
/// `POST` create category (admin)
pub const ADMIN_CATEGORY: &str = "/admin/category";

/// `POST` create event (admin)
pub const ADMIN_EVENTS: &str = "/admin/events";

/// `GET` current cart
pub const CART: &str = "/cart";
/// `POST` add line item
pub const CART_ADD: &str = "/cart/add";
/// `DELETE` every line item
pub const CART_CLEAR: &str = "/cart/clear";
/// `POST` place the order
pub const CART_CHECKOUT: &str = "/cart/checkout";

/// `PUT` toggle a restaurant in the user's favorites
#[must_use]
pub fn favorite_toggle(restaurant: &Id) -> String {
    format!("/restaurants/{restaurant}/add-favorites")
}

/// `GET` restaurant detail
#[must_use]
pub fn restaurant(restaurant: &Id) -> String {
    format!("/restaurants/{restaurant}")
}

/// `PUT` update / `DELETE` remove a restaurant (admin)
#[must_use]
pub fn admin_restaurant(restaurant: &Id) -> String {
    format!("{ADMIN_RESTAURANTS}/{restaurant}")
}

/// `PUT` toggle a restaurant's open status (admin)
#[must_use]
pub fn admin_restaurant_status(restaurant: &Id) -> String {
    format!("{ADMIN_RESTAURANTS}/{restaurant}/status")
}

/// `GET` categories of one restaurant
#[must_use]
pub fn restaurant_categories(restaurant: &Id) -> String {
    format!("/category/restaurant/{restaurant}")
}

/// `GET` events of one restaurant
#[must_use]
pub fn restaurant_events(restaurant: &Id) -> String {
    format!("/events/restaurant/{restaurant}")
}

/// `GET` event detail
#[must_use]
pub fn event(event: &Id) -> String {
    format!("/events/{event}")
}

/// `DELETE` an event (admin)
#[must_use]
pub fn admin_event(event: &Id) -> String {
    format!("{ADMIN_EVENTS}/{event}")
}

/// `PUT` change quantity / `DELETE` remove one cart line
#[must_use]
pub fn cart_item(item: &Id) -> String {
    format!("/cart/items/{item}")
}
