//! Catalog reducer: restaurants, categories and events.

use super::types::{
    CatalogAction, CatalogOp, CatalogState, Pagination, RestaurantPageLoaded, Targeted,
};
use platter_api::models::{Restaurant, RestaurantListing};
use platter_api::FoodApi;
use platter_core::effect::Effect;
use platter_core::lifecycle::{perform, Completion, Failure, RequestId};
use platter_core::reducer::Reducer;
use platter_core::{smallvec, SmallVec};

/// Dependencies of the catalog container
#[derive(Clone, Debug)]
pub struct CatalogEnvironment {
    /// Typed API facade
    pub api: FoodApi,
}

impl CatalogEnvironment {
    /// Creates a catalog environment
    #[must_use]
    pub const fn new(api: FoodApi) -> Self {
        Self { api }
    }
}

/// Reducer of the catalog container
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a catalog reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn begin(state: &mut CatalogState, op: CatalogOp) -> RequestId {
        state.lifecycle.start();
        state.fence.issue(op)
    }

    /// Apply `merge` to an admitted success, record an admitted failure
    fn settle<T>(
        state: &mut CatalogState,
        op: CatalogOp,
        completion: Completion<T>,
        merge: impl FnOnce(&mut CatalogState, T),
    ) {
        if !state.fence.admit(&op, completion.request) {
            return;
        }
        match completion.result {
            Ok(value) => merge(state, value),
            Err(failure) => {
                tracing::debug!(?op, error = %failure, "Catalog operation failed");
                state.lifecycle.fail(failure);
            },
        }
    }

    fn apply_listing(state: &mut CatalogState, loaded: RestaurantPageLoaded) {
        let RestaurantPageLoaded { query, envelope } = loaded;
        let mut pagination = Pagination {
            current_page: query.page.max(1),
            size: query.size,
            ..state.pagination
        };

        state.restaurants = match envelope.payload {
            RestaurantListing::Page(page) => {
                pagination.total_pages = page.total_pages;
                pagination.total_elements = page.total_elements;
                page.content
            },
            RestaurantListing::List(list) => {
                pagination.total_elements = list.len() as u64;
                pagination.total_pages = pages_for(list.len(), query.size);
                list
            },
        };
        state.pagination = pagination;
        state.lifecycle.succeed_with_message(envelope.message);
    }

    /// Replace every copy of a restaurant returned by an admin mutation
    ///
    /// Payloads that do not describe a restaurant leave the lists alone.
    fn apply_restaurant_change(state: &mut CatalogState, targeted: Targeted) {
        let updated = targeted
            .envelope
            .payload
            .and_then(|value| serde_json::from_value::<Restaurant>(value).ok());

        if let Some(updated) = updated {
            for slot in state
                .restaurants
                .iter_mut()
                .chain(state.restaurant.iter_mut())
                .chain(state.owned_restaurant.iter_mut())
                .filter(|r| r.id == updated.id)
            {
                slot.clone_from(&updated);
            }
        }
        state.lifecycle.succeed_with_message(targeted.envelope.message);
    }

    fn apply_restaurant_removal(state: &mut CatalogState, targeted: Targeted) {
        let id = targeted.id;
        state.restaurants.retain(|r| r.id != id);
        if state.restaurant.as_ref().is_some_and(|r| r.id == id) {
            state.restaurant = None;
        }
        if state.owned_restaurant.as_ref().is_some_and(|r| r.id == id) {
            state.owned_restaurant = None;
        }
        state.lifecycle.succeed_with_message(targeted.envelope.message);
    }

    fn apply_event_removal(state: &mut CatalogState, targeted: Targeted) {
        let id = targeted.id;
        state.events.retain(|e| e.id != id);
        state.restaurant_events.retain(|e| e.id != id);
        if state.event.as_ref().is_some_and(|e| e.id == id) {
            state.event = None;
        }
        state.lifecycle.succeed_with_message(targeted.envelope.message);
    }
}

/// Pages needed to show `len` items `size` at a time, at least one
fn pages_for(len: usize, size: u32) -> u32 {
    let size = usize::try_from(size).unwrap_or(usize::MAX).max(1);
    u32::try_from(len.div_ceil(size)).unwrap_or(u32::MAX).max(1)
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per operation and outcome
    fn reduce(
        &self,
        state: &mut CatalogState,
        action: CatalogAction,
        env: &CatalogEnvironment,
    ) -> SmallVec<[Effect<CatalogAction>; 4]> {
        let api = env.api.clone();
        match action {
            // ----- restaurants -----
            CatalogAction::FetchRestaurants(query) => {
                let request = Self::begin(state, CatalogOp::List);
                smallvec![perform(
                    request,
                    async move {
                        let envelope = api.restaurants(&query).await.map_err(Failure::from)?;
                        Ok::<_, Failure>(RestaurantPageLoaded { query, envelope })
                    },
                    CatalogAction::RestaurantsLoaded,
                )]
            },

            CatalogAction::SearchRestaurants { keyword } => {
                let request = Self::begin(state, CatalogOp::Search);
                smallvec![perform(
                    request,
                    async move { api.search_restaurants(&keyword).await.map_err(Failure::from) },
                    CatalogAction::SearchCompleted,
                )]
            },

            CatalogAction::FetchRestaurant { id } => {
                let request = Self::begin(state, CatalogOp::Detail);
                smallvec![perform(
                    request,
                    async move { api.restaurant(&id).await.map_err(Failure::from) },
                    CatalogAction::RestaurantLoaded,
                )]
            },

            CatalogAction::CreateRestaurant(draft) => {
                let request = Self::begin(state, CatalogOp::Create);
                smallvec![perform(
                    request,
                    async move { api.create_restaurant(&draft).await.map_err(Failure::from) },
                    CatalogAction::RestaurantCreated,
                )]
            },

            CatalogAction::UpdateRestaurant { id, draft } => {
                let request = Self::begin(state, CatalogOp::Update);
                smallvec![perform(
                    request,
                    async move {
                        let envelope = api
                            .update_restaurant(&id, &draft)
                            .await
                            .map_err(Failure::from)?;
                        Ok::<_, Failure>(Targeted { id, envelope })
                    },
                    CatalogAction::RestaurantUpdated,
                )]
            },

            CatalogAction::DeleteRestaurant { id } => {
                let request = Self::begin(state, CatalogOp::Delete);
                smallvec![perform(
                    request,
                    async move {
                        let envelope = api.delete_restaurant(&id).await.map_err(Failure::from)?;
                        Ok::<_, Failure>(Targeted { id, envelope })
                    },
                    CatalogAction::RestaurantDeleted,
                )]
            },

            CatalogAction::ToggleRestaurantStatus { id } => {
                let request = Self::begin(state, CatalogOp::Status);
                smallvec![perform(
                    request,
                    async move {
                        let envelope = api
                            .toggle_restaurant_status(&id)
                            .await
                            .map_err(Failure::from)?;
                        Ok::<_, Failure>(Targeted { id, envelope })
                    },
                    CatalogAction::RestaurantStatusToggled,
                )]
            },

            // ----- categories -----
            CatalogAction::FetchCategories => {
                let request = Self::begin(state, CatalogOp::Categories);
                smallvec![perform(
                    request,
                    async move { api.categories().await.map_err(Failure::from) },
                    CatalogAction::CategoriesLoaded,
                )]
            },

            CatalogAction::FetchRestaurantCategories { restaurant } => {
                let request = Self::begin(state, CatalogOp::RestaurantCategories);
                smallvec![perform(
                    request,
                    async move {
                        api.restaurant_categories(&restaurant)
                            .await
                            .map_err(Failure::from)
                    },
                    CatalogAction::RestaurantCategoriesLoaded,
                )]
            },

            CatalogAction::CreateCategory(form) => {
                let request = Self::begin(state, CatalogOp::CreateCategory);
                smallvec![perform(
                    request,
                    async move { api.create_category(&form).await.map_err(Failure::from) },
                    CatalogAction::CategoryCreated,
                )]
            },

            // ----- events -----
            CatalogAction::FetchRestaurantEvents { restaurant } => {
                let request = Self::begin(state, CatalogOp::RestaurantEvents);
                smallvec![perform(
                    request,
                    async move { api.restaurant_events(&restaurant).await.map_err(Failure::from) },
                    CatalogAction::RestaurantEventsLoaded,
                )]
            },

            CatalogAction::FetchEvent { id } => {
                let request = Self::begin(state, CatalogOp::EventDetail);
                smallvec![perform(
                    request,
                    async move { api.event(&id).await.map_err(Failure::from) },
                    CatalogAction::EventLoaded,
                )]
            },

            CatalogAction::CreateEvent(form) => {
                let request = Self::begin(state, CatalogOp::CreateEvent);
                smallvec![perform(
                    request,
                    async move { api.create_event(&form).await.map_err(Failure::from) },
                    CatalogAction::EventCreated,
                )]
            },

            CatalogAction::DeleteEvent { id } => {
                let request = Self::begin(state, CatalogOp::DeleteEvent);
                smallvec![perform(
                    request,
                    async move {
                        let envelope = api.delete_event(&id).await.map_err(Failure::from)?;
                        Ok::<_, Failure>(Targeted { id, envelope })
                    },
                    CatalogAction::EventDeleted,
                )]
            },

            // ----- outcomes -----
            CatalogAction::RestaurantsLoaded(completion) => {
                Self::settle(state, CatalogOp::List, completion, Self::apply_listing);
                smallvec![Effect::None]
            },

            CatalogAction::SearchCompleted(completion) => {
                Self::settle(state, CatalogOp::Search, completion, |state, envelope| {
                    state.restaurants = envelope.payload;
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantLoaded(completion) => {
                Self::settle(state, CatalogOp::Detail, completion, |state, envelope| {
                    state.restaurant = Some(envelope.payload);
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantCreated(completion) => {
                Self::settle(state, CatalogOp::Create, completion, |state, envelope| {
                    state.owned_restaurant = Some(envelope.payload);
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantUpdated(completion) => {
                Self::settle(
                    state,
                    CatalogOp::Update,
                    completion,
                    Self::apply_restaurant_change,
                );
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantStatusToggled(completion) => {
                Self::settle(
                    state,
                    CatalogOp::Status,
                    completion,
                    Self::apply_restaurant_change,
                );
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantDeleted(completion) => {
                Self::settle(
                    state,
                    CatalogOp::Delete,
                    completion,
                    Self::apply_restaurant_removal,
                );
                smallvec![Effect::None]
            },

            CatalogAction::CategoriesLoaded(completion) => {
                Self::settle(state, CatalogOp::Categories, completion, |state, envelope| {
                    state.categories = envelope.payload;
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantCategoriesLoaded(completion) => {
                Self::settle(
                    state,
                    CatalogOp::RestaurantCategories,
                    completion,
                    |state, envelope| {
                        state.categories = envelope.payload;
                        state.lifecycle.succeed_with_message(envelope.message);
                    },
                );
                smallvec![Effect::None]
            },

            CatalogAction::CategoryCreated(completion) => {
                Self::settle(state, CatalogOp::CreateCategory, completion, |state, envelope| {
                    state.categories.push(envelope.payload);
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::RestaurantEventsLoaded(completion) => {
                Self::settle(
                    state,
                    CatalogOp::RestaurantEvents,
                    completion,
                    |state, envelope| {
                        state.restaurant_events = envelope.payload;
                        state.lifecycle.succeed_with_message(envelope.message);
                    },
                );
                smallvec![Effect::None]
            },

            CatalogAction::EventLoaded(completion) => {
                Self::settle(state, CatalogOp::EventDetail, completion, |state, envelope| {
                    state.event = Some(envelope.payload);
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::EventCreated(completion) => {
                Self::settle(state, CatalogOp::CreateEvent, completion, |state, envelope| {
                    state.events.push(envelope.payload.clone());
                    state.restaurant_events.push(envelope.payload);
                    state.lifecycle.succeed_with_message(envelope.message);
                });
                smallvec![Effect::None]
            },

            CatalogAction::EventDeleted(completion) => {
                Self::settle(
                    state,
                    CatalogOp::DeleteEvent,
                    completion,
                    Self::apply_event_removal,
                );
                smallvec![Effect::None]
            },
        }
    }
}
