//! Typed operations, one per endpoint.
//!
//! Each method issues exactly one request through the [`Transport`] and
//! decodes the `{message, payload}` envelope. There is no retry, batching or
//! deduplication at this layer.

use crate::{
    endpoints,
    error::ApiError,
    models::{
        AuthPayload, Cart, Category, CheckoutRequest, Credentials, Envelope, Event, Id,
        NewCartItem, NewCategory, NewEvent, RegisterRequest, Restaurant, RestaurantDraft,
        RestaurantListing, RestaurantQuery, User,
    },
    transport::{ApiRequest, Transport},
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Typed facade over the REST API
#[derive(Clone)]
pub struct FoodApi {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for FoodApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodApi").finish_non_exhaustive()
    }
}

/// Result of an operation whose payload the client does not interpret
pub type Acknowledgement = Envelope<Option<Value>>;

impl FoodApi {
    /// Creates the facade over `transport`
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<T>, ApiError> {
        tracing::debug!(method = %request.method, path = %request.path, "Calling API");
        let body = self.transport.execute(request).await?;
        decode(body)
    }

    async fn call_list<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Envelope<Vec<T>>, ApiError> {
        let envelope: Envelope<Option<Vec<T>>> = self.call(request).await?;
        Ok(envelope.map(Option::unwrap_or_default))
    }

    // ----- account -----

    /// `POST /user/register`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn register(&self, form: &RegisterRequest) -> Result<Envelope<AuthPayload>, ApiError> {
        self.call(ApiRequest::post(endpoints::REGISTER).with_body(encode(form)?))
            .await
    }

    /// `POST /user/login`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn login(&self, credentials: &Credentials) -> Result<Envelope<AuthPayload>, ApiError> {
        self.call(ApiRequest::post(endpoints::LOGIN).with_body(encode(credentials)?))
            .await
    }

    /// `GET /user/profile`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn profile(&self) -> Result<Envelope<User>, ApiError> {
        self.call(ApiRequest::get(endpoints::PROFILE)).await
    }

    /// `PUT /restaurants/{id}/add-favorites`, returns the toggled restaurant
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn toggle_favorite(&self, restaurant: &Id) -> Result<Envelope<Restaurant>, ApiError> {
        self.call(ApiRequest::put(endpoints::favorite_toggle(restaurant)))
            .await
    }

    // ----- catalog -----

    /// `GET /restaurants?page=&size=[&category=][&search=]`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn restaurants(
        &self,
        query: &RestaurantQuery,
    ) -> Result<Envelope<RestaurantListing>, ApiError> {
        let mut request = ApiRequest::get(endpoints::RESTAURANTS)
            .with_query("page", query.wire_page())
            .with_query("size", query.size);
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            request = request.with_query("category", category);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            request = request.with_query("search", search);
        }

        let envelope: Envelope<Option<RestaurantListing>> = self.call(request).await?;
        Ok(envelope.map(|listing| listing.unwrap_or(RestaurantListing::List(Vec::new()))))
    }

    /// `GET /restaurants/search?keyword=`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn search_restaurants(
        &self,
        keyword: &str,
    ) -> Result<Envelope<Vec<Restaurant>>, ApiError> {
        self.call_list(ApiRequest::get(endpoints::RESTAURANT_SEARCH).with_query("keyword", keyword))
            .await
    }

    /// `GET /restaurants/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn restaurant(&self, restaurant: &Id) -> Result<Envelope<Restaurant>, ApiError> {
        self.call(ApiRequest::get(endpoints::restaurant(restaurant)))
            .await
    }

    /// `POST /admin/restaurants`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn create_restaurant(
        &self,
        draft: &RestaurantDraft,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        self.call(ApiRequest::post(endpoints::ADMIN_RESTAURANTS).with_body(encode(draft)?))
            .await
    }

    /// `PUT /admin/restaurants/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn update_restaurant(
        &self,
        restaurant: &Id,
        draft: &RestaurantDraft,
    ) -> Result<Acknowledgement, ApiError> {
        let mut body = encode(draft)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("id".to_string(), encode(restaurant)?);
        }
        self.call(ApiRequest::put(endpoints::admin_restaurant(restaurant)).with_body(body))
            .await
    }

    /// `DELETE /admin/restaurants/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn delete_restaurant(&self, restaurant: &Id) -> Result<Acknowledgement, ApiError> {
        self.call(ApiRequest::delete(endpoints::admin_restaurant(restaurant)))
            .await
    }

    /// `PUT /admin/restaurants/{id}/status`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn toggle_restaurant_status(
        &self,
        restaurant: &Id,
    ) -> Result<Acknowledgement, ApiError> {
        self.call(ApiRequest::put(endpoints::admin_restaurant_status(restaurant)))
            .await
    }

    /// `GET /category`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn categories(&self) -> Result<Envelope<Vec<Category>>, ApiError> {
        self.call_list(ApiRequest::get(endpoints::CATEGORIES)).await
    }

    /// `GET /category/restaurant/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn restaurant_categories(
        &self,
        restaurant: &Id,
    ) -> Result<Envelope<Vec<Category>>, ApiError> {
        self.call_list(ApiRequest::get(endpoints::restaurant_categories(restaurant)))
            .await
    }

    /// `POST /admin/category`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn create_category(&self, form: &NewCategory) -> Result<Envelope<Category>, ApiError> {
        self.call(ApiRequest::post(endpoints::ADMIN_CATEGORY).with_body(encode(form)?))
            .await
    }

    /// `GET /events/restaurant/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn restaurant_events(&self, restaurant: &Id) -> Result<Envelope<Vec<Event>>, ApiError> {
        self.call_list(ApiRequest::get(endpoints::restaurant_events(restaurant)))
            .await
    }

    /// `GET /events/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn event(&self, event: &Id) -> Result<Envelope<Event>, ApiError> {
        self.call(ApiRequest::get(endpoints::event(event))).await
    }

    /// `POST /admin/events`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn create_event(&self, form: &NewEvent) -> Result<Envelope<Event>, ApiError> {
        self.call(ApiRequest::post(endpoints::ADMIN_EVENTS).with_body(encode(form)?))
            .await
    }

    /// `DELETE /admin/events/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn delete_event(&self, event: &Id) -> Result<Acknowledgement, ApiError> {
        self.call(ApiRequest::delete(endpoints::admin_event(event)))
            .await
    }

    // ----- cart -----

    /// `GET /cart`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn cart(&self) -> Result<Envelope<Option<Cart>>, ApiError> {
        self.call(ApiRequest::get(endpoints::CART)).await
    }

    /// `POST /cart/add`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn add_to_cart(&self, item: &NewCartItem) -> Result<Envelope<Option<Cart>>, ApiError> {
        self.call(ApiRequest::post(endpoints::CART_ADD).with_body(encode(item)?))
            .await
    }

    /// `PUT /cart/items/{id}` with `{quantity}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn update_cart_item(
        &self,
        item: &Id,
        quantity: u32,
    ) -> Result<Envelope<Option<Cart>>, ApiError> {
        self.call(ApiRequest::put(endpoints::cart_item(item)).with_body(json!({ "quantity": quantity })))
            .await
    }

    /// `DELETE /cart/items/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn remove_cart_item(&self, item: &Id) -> Result<Envelope<Option<Cart>>, ApiError> {
        self.call(ApiRequest::delete(endpoints::cart_item(item)))
            .await
    }

    /// `DELETE /cart/clear`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn clear_cart(&self) -> Result<Acknowledgement, ApiError> {
        self.call(ApiRequest::delete(endpoints::CART_CLEAR)).await
    }

    /// `POST /cart/checkout`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the transport or decoding.
    pub async fn checkout(&self, form: &CheckoutRequest) -> Result<Acknowledgement, ApiError> {
        self.call(ApiRequest::post(endpoints::CART_CHECKOUT).with_body(encode(form)?))
            .await
    }
}

fn encode<T: Serialize + ?Sized>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

/// An empty 2xx body decodes as an envelope without message or payload
fn decode<T: DeserializeOwned>(body: Value) -> Result<Envelope<T>, ApiError> {
    let body = if body.is_null() { json!({}) } else { body };
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}
