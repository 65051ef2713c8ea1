//! Cart reducer.
//!
//! Every successful cart call returns the whole cart, which replaces the local
//! copy. Clear and checkout empty it.

use super::types::{CartAction, CartOp, CartResponse, CartState};
use platter_api::service::Acknowledgement;
use platter_api::FoodApi;
use platter_core::effect::Effect;
use platter_core::lifecycle::{perform, Completion, Failure};
use platter_core::reducer::Reducer;
use platter_core::{smallvec, SmallVec};

/// Dependencies of the cart container
#[derive(Clone, Debug)]
pub struct CartEnvironment {
    /// Typed API facade
    pub api: FoodApi,
}

impl CartEnvironment {
    /// Creates a cart environment
    #[must_use]
    pub const fn new(api: FoodApi) -> Self {
        Self { api }
    }
}

/// Reducer of the cart container
#[derive(Debug, Clone, Copy, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn replace_cart(state: &mut CartState, op: CartOp, completion: Completion<CartResponse>) {
        if !state.fence.admit(&op, completion.request) {
            return;
        }
        match completion.result {
            Ok(envelope) => {
                state.cart_items = envelope
                    .payload
                    .as_ref()
                    .map(|cart| cart.items.clone())
                    .unwrap_or_default();
                state.cart = envelope.payload;
                state.lifecycle.succeed_with_message(envelope.message);
                tracing::debug!(
                    ?op,
                    lines = state.cart_items.len(),
                    total = %state.total(),
                    "Cart replaced"
                );
            },
            Err(failure) => state.lifecycle.fail(failure),
        }
    }

    fn empty_cart(state: &mut CartState, op: CartOp, completion: Completion<Acknowledgement>) {
        if !state.fence.admit(&op, completion.request) {
            return;
        }
        match completion.result {
            Ok(envelope) => {
                state.cart = None;
                state.cart_items.clear();
                state.lifecycle.succeed_with_message(envelope.message);
            },
            Err(failure) => state.lifecycle.fail(failure),
        }
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut CartState,
        action: CartAction,
        env: &CartEnvironment,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        let api = env.api.clone();
        match action {
            CartAction::FetchCart => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Fetch);
                smallvec![perform(
                    request,
                    async move { api.cart().await.map_err(Failure::from) },
                    CartAction::CartLoaded,
                )]
            },

            CartAction::AddItem(item) => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Add);
                smallvec![perform(
                    request,
                    async move { api.add_to_cart(&item).await.map_err(Failure::from) },
                    CartAction::ItemAdded,
                )]
            },

            CartAction::UpdateQuantity { item, quantity } => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Update);
                smallvec![perform(
                    request,
                    async move {
                        api.update_cart_item(&item, quantity)
                            .await
                            .map_err(Failure::from)
                    },
                    CartAction::QuantityUpdated,
                )]
            },

            CartAction::RemoveItem { item } => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Remove);
                smallvec![perform(
                    request,
                    async move { api.remove_cart_item(&item).await.map_err(Failure::from) },
                    CartAction::ItemRemoved,
                )]
            },

            CartAction::ClearCart => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Clear);
                smallvec![perform(
                    request,
                    async move { api.clear_cart().await.map_err(Failure::from) },
                    CartAction::CartCleared,
                )]
            },

            CartAction::Checkout(form) => {
                state.lifecycle.start();
                let request = state.fence.issue(CartOp::Checkout);
                smallvec![perform(
                    request,
                    async move { api.checkout(&form).await.map_err(Failure::from) },
                    CartAction::CheckedOut,
                )]
            },

            CartAction::ClearCartState => {
                state.cart = None;
                state.cart_items.clear();
                state.lifecycle.clear_feedback();
                smallvec![Effect::None]
            },

            CartAction::CartLoaded(completion) => {
                Self::replace_cart(state, CartOp::Fetch, completion);
                smallvec![Effect::None]
            },
            CartAction::ItemAdded(completion) => {
                Self::replace_cart(state, CartOp::Add, completion);
                smallvec![Effect::None]
            },
            CartAction::QuantityUpdated(completion) => {
                Self::replace_cart(state, CartOp::Update, completion);
                smallvec![Effect::None]
            },
            CartAction::ItemRemoved(completion) => {
                Self::replace_cart(state, CartOp::Remove, completion);
                smallvec![Effect::None]
            },
            CartAction::CartCleared(completion) => {
                Self::empty_cart(state, CartOp::Clear, completion);
                smallvec![Effect::None]
            },
            CartAction::CheckedOut(completion) => {
                Self::empty_cart(state, CartOp::Checkout, completion);
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platter_api::models::{Cart, CartItem, CheckoutRequest, Envelope, Money, NewCartItem};
    use platter_core::lifecycle::{RequestId, Status};
    use platter_testing::{assertions, resolve_all, MockTransport, ReducerTest};
    use proptest::prelude::*;
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn env_with(transport: MockTransport) -> CartEnvironment {
        CartEnvironment::new(FoodApi::new(Arc::new(transport)))
    }

    fn cart_of(items: Vec<CartItem>) -> Cart {
        Cart {
            id: None,
            items,
            details: Map::new(),
        }
    }

    async fn drive(state: &mut CartState, action: CartAction, env: &CartEnvironment) {
        let effects = CartReducer.reduce(state, action, env);
        for action in resolve_all(effects).await {
            CartReducer.reduce(state, action, env);
        }
    }

    #[test]
    fn fetch_starts_request() {
        ReducerTest::new(CartReducer::new())
            .with_env(env_with(MockTransport::new()))
            .given_state(CartState::default())
            .when_action(CartAction::FetchCart)
            .then_state(|state| assert_eq!(state.lifecycle.status(), Status::Loading))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn null_payload_empties_lines() {
        let transport = MockTransport::new();
        transport.envelope("GET", "/cart", "No cart yet", json!(null));
        let env = env_with(transport);

        let mut state = CartState::default();
        state.cart_items.push(CartItem::new("old", Money::from_units(3), 1));
        drive(&mut state, CartAction::FetchCart, &env).await;

        assert!(state.cart.is_none());
        assert!(state.is_empty());
        assert_eq!(state.total(), Money::ZERO);
        assert_eq!(state.lifecycle.message(), Some("No cart yet"));
    }

    #[tokio::test]
    async fn remove_failure_keeps_lines() {
        let transport = MockTransport::new();
        transport.fail("DELETE", "/cart/items/p1", 404, json!({"message": "Not in cart"}));
        let env = env_with(transport);

        let mut state = CartState::default();
        state.cart_items.push(CartItem::new("p1", Money::from_units(10), 2));
        drive(&mut state, CartAction::RemoveItem { item: "p1".into() }, &env).await;

        assert_eq!(state.lifecycle.status(), Status::Error);
        assert_eq!(state.item_count(), 2);
        assert_eq!(state.lifecycle.error().map(Failure::summary).as_deref(), Some("Not in cart"));
    }

    #[tokio::test]
    async fn checkout_empties_cart() {
        let transport = MockTransport::new();
        transport.envelope("POST", "/cart/checkout", "Order placed", json!({"orderId": 5}));
        let env = env_with(transport.clone());

        let mut state = CartState::default();
        state.cart = Some(cart_of(vec![CartItem::new("p1", Money::from_units(10), 2)]));
        state.cart_items = state.cart.as_ref().unwrap().items.clone();

        let form = CheckoutRequest {
            delivery_address: Some("1 Main St".to_string()),
            ..CheckoutRequest::default()
        };
        drive(&mut state, CartAction::Checkout(form), &env).await;

        assert!(state.cart.is_none());
        assert_eq!(state.total(), Money::ZERO);
        assert_eq!(state.item_count(), 0);
        assert_eq!(state.lifecycle.message(), Some("Order placed"));
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"deliveryAddress": "1 Main St"}))
        );
    }

    #[tokio::test]
    async fn quantity_update_replaces_lines() {
        let transport = MockTransport::new();
        transport.envelope(
            "PUT",
            "/cart/items/p1",
            "Quantity updated",
            json!({"items": [{"id": "p1", "price": 10, "quantity": 5}]}),
        );
        let env = env_with(transport.clone());

        let mut state = CartState::default();
        state.cart_items.push(CartItem::new("p1", Money::from_units(10), 2));
        drive(
            &mut state,
            CartAction::UpdateQuantity {
                item: "p1".into(),
                quantity: 5,
            },
            &env,
        )
        .await;

        assert_eq!(state.item_count(), 5);
        assert_eq!(state.total(), Money::from_units(50));
        assert_eq!(state.lifecycle.message(), Some("Quantity updated"));
        assert_eq!(transport.requests()[0].body, Some(json!({"quantity": 5})));
    }

    #[tokio::test]
    async fn clear_cart_empties_lines_and_sets_message() {
        let transport = MockTransport::new();
        transport.envelope("DELETE", "/cart/clear", "Cart cleared", json!(null));
        let env = env_with(transport);

        let mut state = CartState::default();
        state.cart = Some(cart_of(vec![CartItem::new("p1", Money::from_units(3), 4)]));
        state.cart_items = state.cart.as_ref().unwrap().items.clone();
        drive(&mut state, CartAction::ClearCart, &env).await;

        assert!(state.cart.is_none());
        assert!(state.is_empty());
        assert_eq!(state.total(), Money::ZERO);
        assert_eq!(state.lifecycle.status(), Status::Success);
        assert_eq!(state.lifecycle.message(), Some("Cart cleared"));
    }

    #[test]
    fn clear_cart_state_resets_feedback() {
        let mut state = CartState::default();
        state.cart_items.push(CartItem::new("p1", Money::from_units(1), 1));
        state.lifecycle.fail(Failure::from("boom"));

        ReducerTest::new(CartReducer::new())
            .with_env(env_with(MockTransport::new()))
            .given_state(state)
            .when_action(CartAction::ClearCartState)
            .then_state(|state| {
                assert!(state.is_empty());
                assert_eq!(state.lifecycle.error(), None);
                assert_eq!(state.lifecycle.message(), None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_add_does_not_overwrite_newer() {
        let env = env_with(MockTransport::new());
        let mut state = CartState::default();
        let _ = CartReducer.reduce(&mut state, CartAction::AddItem(NewCartItem::new("p1", 1)), &env);
        let _ = CartReducer.reduce(&mut state, CartAction::AddItem(NewCartItem::new("p2", 1)), &env);

        let newer = Envelope::new(
            None,
            Some(cart_of(vec![
                CartItem::new("p1", Money::from_units(10), 1),
                CartItem::new("p2", Money::from_units(5), 1),
            ])),
        );
        let older = Envelope::new(
            None,
            Some(cart_of(vec![CartItem::new("p1", Money::from_units(10), 1)])),
        );

        CartReducer.reduce(
            &mut state,
            CartAction::ItemAdded(Completion::new(RequestId::new(2), Ok(newer))),
            &env,
        );
        CartReducer.reduce(
            &mut state,
            CartAction::ItemAdded(Completion::new(RequestId::new(1), Ok(older))),
            &env,
        );

        assert_eq!(state.cart_items.len(), 2);
        assert_eq!(state.total(), Money::from_units(15));
    }

    proptest! {
        #[test]
        fn totals_match_lines(lines in proptest::collection::vec((0i64..100_000, 0u32..50), 0..12)) {
            let items: Vec<CartItem> = lines
                .iter()
                .enumerate()
                .map(|(i, (cents, qty))| CartItem::new(i.to_string(), Money::from_cents(*cents), *qty))
                .collect();

            let env = env_with(MockTransport::new());
            let mut state = CartState::default();
            let _ = CartReducer.reduce(&mut state, CartAction::FetchCart, &env);
            CartReducer.reduce(
                &mut state,
                CartAction::CartLoaded(Completion::new(
                    RequestId::new(1),
                    Ok(Envelope::new(None, Some(cart_of(items)))),
                )),
                &env,
            );

            let expected_total: i64 = lines.iter().map(|(c, q)| c * i64::from(*q)).sum();
            let expected_count: u32 = lines.iter().map(|(_, q)| q).sum();
            prop_assert_eq!(state.total(), Money::from_cents(expected_total));
            prop_assert_eq!(state.item_count(), expected_count);
        }
    }
}
