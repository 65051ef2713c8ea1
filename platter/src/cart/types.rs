//! Cart container state and actions.

use platter_api::models::{Cart, CartItem, CheckoutRequest, Envelope, Id, Money, NewCartItem};
use platter_api::service::Acknowledgement;
use platter_core::lifecycle::{Completion, Fence, Lifecycle};
use serde::Serialize;

/// Operation kinds of the cart container, used for request fencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOp {
    /// `GET /cart`
    Fetch,
    /// `POST /cart/add`
    Add,
    /// `PUT /cart/items/{id}`
    Update,
    /// `DELETE /cart/items/{id}`
    Remove,
    /// `DELETE /cart/clear`
    Clear,
    /// `POST /cart/checkout`
    Checkout,
}

/// State of the cart container
///
/// Totals are derived from `cart_items` on every read.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Lifecycle of the latest cart operation
    pub lifecycle: Lifecycle,
    /// Order in progress as last returned by the server
    pub cart: Option<Cart>,
    /// Lines of `cart`, in server order
    pub cart_items: Vec<CartItem>,
    #[serde(skip)]
    pub(crate) fence: Fence<CartOp>,
}

impl CartState {
    /// `Σ price · quantity` over the lines, saturating
    #[must_use]
    pub fn total(&self) -> Money {
        self.cart_items.iter().map(CartItem::subtotal).sum()
    }

    /// `Σ quantity` over the lines, saturating
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart_items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Whether the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }
}

/// Server response carrying the whole cart
pub type CartResponse = Envelope<Option<Cart>>;

/// Actions of the cart container
#[derive(Debug, Clone)]
pub enum CartAction {
    // Commands
    /// Load the cart
    FetchCart,
    /// Add an item
    AddItem(NewCartItem),
    /// Change the quantity of one line
    UpdateQuantity {
        /// Line to change
        item: Id,
        /// New quantity
        quantity: u32,
    },
    /// Remove one line
    RemoveItem {
        /// Line to remove
        item: Id,
    },
    /// Remove every line on the server
    ClearCart,
    /// Place the order
    Checkout(CheckoutRequest),
    /// Forget the cart locally, with its message and error
    ClearCartState,

    // Outcomes
    /// Cart fetch finished
    CartLoaded(Completion<CartResponse>),
    /// Add finished
    ItemAdded(Completion<CartResponse>),
    /// Quantity change finished
    QuantityUpdated(Completion<CartResponse>),
    /// Line removal finished
    ItemRemoved(Completion<CartResponse>),
    /// Server-side clear finished
    CartCleared(Completion<Acknowledgement>),
    /// Checkout finished
    CheckedOut(Completion<Acknowledgement>),
}
