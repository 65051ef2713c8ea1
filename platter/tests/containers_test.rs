//! Integration tests driving the containers through their runtime stores
//!
//! HTTP flows run against a `wiremock` server through the real `ApiClient`;
//! ordering scenarios use the scripted `MockTransport` for precise delays.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use platter::AppStore;
use platter::auth::{AuthAction, AuthState};
use platter::cart::CartAction;
use platter::catalog::{CatalogAction, Pagination};
use platter_api::models::{CheckoutRequest, Credentials, Event, Id, Money, NewCartItem, RestaurantQuery};
use platter_api::{ApiClient, ApiConfig, CredentialStore, FoodApi, MemoryCredentialStore, Route};
use platter_core::lifecycle::Status;
use platter_testing::{MockTransport, RecordingNavigator, init_test_tracing};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

fn app_for(server: &MockServer, credentials: Arc<MemoryCredentialStore>) -> AppStore {
    init_test_tracing();
    let config = ApiConfig::default().with_base_url(server.uri());
    AppStore::with_credentials(&config, credentials).unwrap()
}

fn envelope(message: &str, payload: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"message": message, "payload": payload}))
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn login_then_rejected_call_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(envelope(
            "Login successful",
            json!({"jwt": "jwt-1", "email": "ada@example.com", "userName": "ada", "role": "USER"}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(MemoryCredentialStore::new());
    let app = app_for(&server, Arc::clone(&credentials));

    let mut handle = app
        .auth()
        .send(AuthAction::Login(Credentials::new("ada@example.com", "secret")))
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert_eq!(credentials.get().as_deref(), Some("jwt-1"));
    let (authenticated, user_name) = app
        .auth()
        .state(|s| (s.is_authenticated(), s.user.as_ref().and_then(|u| u.user_name.clone())))
        .await;
    assert!(authenticated);
    assert_eq!(user_name.as_deref(), Some("ada"));

    let mut handle = app.cart().send(CartAction::FetchCart).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert_eq!(credentials.get(), None);
    let cart_error = app
        .cart()
        .state(|s| s.lifecycle.error().map(|f| f.summary()))
        .await;
    assert_eq!(cart_error.as_deref(), Some("Token expired"));

    // The sign-out reaches the auth container through the navigation listener
    tokio::time::timeout(WAIT, async {
        while app.auth().state(AuthState::is_authenticated).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("auth container never signed out");
    assert!(app.auth().state(|s| s.user.is_none()).await);
}

#[tokio::test]
async fn rejected_cart_call_requests_login_route() {
    init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(MemoryCredentialStore::with_token("stale"));
    let navigator = RecordingNavigator::new();
    let config = ApiConfig::default().with_base_url(server.uri());
    let client = ApiClient::new(&config, credentials.clone(), Arc::new(navigator.clone())).unwrap();
    let app = AppStore::assemble(FoodApi::new(Arc::new(client)), credentials.clone(), None);

    let mut handle = app.cart().send(CartAction::FetchCart).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert_eq!(navigator.routes(), vec![Route::Login]);
    assert_eq!(credentials.get(), None);
    let status = app.cart().state(|s| s.lifecycle.status()).await;
    assert_eq!(status, Status::Error);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn cart_totals_follow_server_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .and(body_partial_json(json!({"productId": "p1", "quantity": 2})))
        .respond_with(envelope(
            "Added",
            json!({"id": 1, "items": [{"id": "p1", "price": 10, "quantity": 2}]}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .and(body_partial_json(json!({"productId": "p2", "quantity": 1})))
        .respond_with(envelope(
            "Added",
            json!({"id": 1, "items": [
                {"id": "p1", "price": 10, "quantity": 2},
                {"id": "p2", "price": 5, "quantity": 1}
            ]}),
        ))
        .mount(&server)
        .await;

    let app = app_for(&server, Arc::new(MemoryCredentialStore::with_token("t")));

    for (product, quantity) in [("p1", 2), ("p2", 1)] {
        let mut handle = app
            .cart()
            .send(CartAction::AddItem(NewCartItem::new(product, quantity)))
            .await
            .unwrap();
        handle.wait_with_timeout(WAIT).await.unwrap();
    }

    let (total, count, message) = app
        .cart()
        .state(|s| (s.total(), s.item_count(), s.lifecycle.message().map(str::to_owned)))
        .await;
    assert_eq!(total, Money::from_units(25));
    assert_eq!(count, 3);
    assert_eq!(message.as_deref(), Some("Added"));
}

#[tokio::test]
async fn checkout_empties_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(envelope(
            "ok",
            json!({"items": [{"id": "p1", "price": 12.5, "quantity": 2}]}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/checkout"))
        .respond_with(envelope("Order placed", json!({"orderId": 99})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, Arc::new(MemoryCredentialStore::with_token("t")));

    let mut handle = app.cart().send(CartAction::FetchCart).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();
    assert_eq!(app.cart().state(|s| s.total()).await, Money::from_cents(2500));

    let mut handle = app
        .cart()
        .send(CartAction::Checkout(CheckoutRequest::default()))
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let (empty, total, status) = app
        .cart()
        .state(|s| (s.cart.is_none() && s.is_empty(), s.total(), s.lifecycle.status()))
        .await;
    assert!(empty);
    assert_eq!(total, Money::ZERO);
    assert_eq!(status, Status::Success);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn second_page_requests_zero_indexed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .respond_with(envelope(
            "ok",
            json!({"content": [{"id": 11, "name": "Da Mario"}], "totalPages": 3, "totalElements": 21}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, Arc::new(MemoryCredentialStore::new()));
    let mut handle = app
        .catalog()
        .send(CatalogAction::FetchRestaurants(RestaurantQuery::page(2, 10)))
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let (pagination, names) = app
        .catalog()
        .state(|s| {
            (
                s.pagination,
                s.restaurants.iter().filter_map(|r| r.name.clone()).collect::<Vec<_>>(),
            )
        })
        .await;
    assert_eq!(
        pagination,
        Pagination {
            current_page: 2,
            size: 10,
            total_pages: 3,
            total_elements: 21
        }
    );
    assert_eq!(names, vec!["Da Mario".to_string()]);
}

#[tokio::test]
async fn deleted_event_leaves_restaurant_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/restaurant/3"))
        .respond_with(envelope(
            "ok",
            json!([{"id": "ev-1", "title": "Quiz"}, {"id": "ev-2", "title": "Jazz"}]),
        ))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/events/ev-2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, Arc::new(MemoryCredentialStore::with_token("admin")));

    let mut handle = app
        .catalog()
        .send(CatalogAction::FetchRestaurantEvents { restaurant: Id::from(3) })
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let mut handle = app
        .catalog()
        .send(CatalogAction::DeleteEvent { id: Id::from("ev-2") })
        .await
        .unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let (events, status) = app
        .catalog()
        .state(|s| (s.restaurant_events.clone(), s.lifecycle.status()))
        .await;
    assert_eq!(events, vec![Event::new("ev-1", "Quiz")]);
    assert_eq!(status, Status::Success);
}

#[tokio::test]
async fn slow_search_does_not_overwrite_newer_results() {
    let transport = MockTransport::new();
    transport.respond_after(
        "GET",
        "/restaurants/search",
        Duration::from_millis(150),
        Ok(json!({"message": "slow", "payload": [{"id": 1, "name": "Old"}]})),
    );
    transport.respond(
        "GET",
        "/restaurants/search",
        Ok(json!({"message": "fast", "payload": [{"id": 2, "name": "New"}]})),
    );

    let app = AppStore::assemble(
        FoodApi::new(Arc::new(transport.clone())),
        Arc::new(MemoryCredentialStore::new()),
        None,
    );

    let mut first = app
        .catalog()
        .send(CatalogAction::SearchRestaurants { keyword: "o".to_string() })
        .await
        .unwrap();
    // Let the first request claim the delayed response
    tokio::time::sleep(Duration::from_millis(30)).await;
    let mut second = app
        .catalog()
        .send(CatalogAction::SearchRestaurants { keyword: "ne".to_string() })
        .await
        .unwrap();
    second.wait_with_timeout(WAIT).await.unwrap();
    first.wait_with_timeout(WAIT).await.unwrap();

    let (ids, message) = app
        .catalog()
        .state(|s| {
            (
                s.restaurants.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
                s.lifecycle.message().map(str::to_owned),
            )
        })
        .await;
    assert_eq!(ids, vec![Id::from(2)]);
    assert_eq!(message.as_deref(), Some("fast"));
    assert_eq!(transport.requests_to("GET", "/restaurants/search").len(), 2);
}
