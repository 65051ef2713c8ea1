//! Wire models of the REST API.
//!
//! Every response is wrapped in an [`Envelope`]. Entity records keep the
//! fields the client logic needs as typed fields and carry everything else in
//! a flattened `details` map, so nothing the backend sends is lost when the
//! state is rendered again.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Uniform response shape `{message, payload}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Human-readable server message
    #[serde(default)]
    pub message: Option<String>,
    /// Operation-specific payload
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates an envelope
    pub fn new(message: Option<String>, payload: T) -> Self {
        Self { message, payload }
    }

    /// Transform the payload, keeping the message
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            message: self.message,
            payload: f(self.payload),
        }
    }
}

/// Entity identifier
///
/// The backend is not consistent about numeric versus string ids, so both are
/// accepted. Two ids are equal when their textual forms match; numeric ids are
/// written back as JSON numbers.
#[derive(Debug, Clone, Eq)]
pub struct Id {
    text: String,
    numeric: bool,
}

impl Id {
    /// Textual form, as used in paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Id {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            numeric: false,
        }
    }
}

impl From<String> for Id {
    fn from(text: String) -> Self {
        Self {
            text,
            numeric: false,
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self {
            text: value.to_string(),
            numeric: true,
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self {
            text: value.to_string(),
            numeric: true,
        }
    }
}

impl From<i32> for Id {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.numeric {
            if let Ok(value) = self.text.parse::<i64>() {
                return serializer.serialize_i64(value);
            }
        }
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id, E> {
                Ok(Id::from(value))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Id, E> {
                Ok(Id::from(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Id, E> {
                Ok(Id::from(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Id, E> {
                Ok(Id::from(value))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Currency amount in cents
///
/// The wire carries decimal numbers; they are rounded to the nearest cent.
/// Amounts outside the `i64` cent range are rejected on decode, and
/// arithmetic saturates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Amount of `cents`
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, saturating at the representable range
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Whole currency units, `None` when out of range
    #[must_use]
    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Amount in cents
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn checked_from_decimal(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        // i64::MAX is not exactly representable; the bound rounds up to 2^63
        (cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64)
            .then(|| Self(cents as i64))
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount")
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
                Money::checked_from_decimal(value).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
                Money::checked_from_units(value).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
                i64::try_from(value)
                    .ok()
                    .and_then(Money::checked_from_units)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Money, E> {
                let parsed = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| E::custom(format!("invalid amount '{value}'")))?;
                self.visit_f64(parsed)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Restaurant record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Identifier
    pub id: Id,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Restaurant {
    /// Restaurant with only an id and a name
    #[must_use]
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            details: Map::new(),
        }
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub user_name: Option<String>,
    /// Role such as `USER` or `ADMIN`
    #[serde(default)]
    pub role: Option<String>,
    /// Favorite restaurants, only present on the profile
    #[serde(default)]
    pub favorites: Vec<Restaurant>,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Payload of a successful login or registration
#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    /// Bearer token
    pub jwt: String,
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub user_name: Option<String>,
    /// Role
    #[serde(default)]
    pub role: Option<String>,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("jwt", &"<redacted>")
            .field("email", &self.email)
            .field("user_name", &self.user_name)
            .field("role", &self.role)
            .finish()
    }
}

impl AuthPayload {
    /// Split into the bearer token and the user it identifies
    #[must_use]
    pub fn into_session(self) -> (String, User) {
        let user = User {
            email: self.email,
            user_name: self.user_name,
            role: self.role,
            favorites: Vec::new(),
            details: Map::new(),
        };
        (self.jwt, user)
    }
}

/// Menu category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier
    pub id: Id,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Restaurant event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier
    pub id: Id,
    /// Title shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Restaurant hosting the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<Id>,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Event {
    /// Event with only an id and a title
    #[must_use]
    pub fn new(id: impl Into<Id>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            restaurant_id: None,
            details: Map::new(),
        }
    }
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line identifier
    pub id: Id,
    /// Unit price
    pub price: Money,
    /// Number of units
    pub quantity: u32,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CartItem {
    /// Line with only an id, price and quantity
    #[must_use]
    pub fn new(id: impl Into<Id>, price: Money, quantity: u32) -> Self {
        Self {
            id: id.into(),
            price,
            quantity,
            details: Map::new(),
        }
    }

    /// `price * quantity`
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.price * self.quantity
    }
}

/// Order in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Identifier, absent for a fresh cart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Lines in insertion order
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Every other field sent by the server
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Spring-style page of restaurants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPage {
    /// Restaurants on this page
    #[serde(default)]
    pub content: Vec<Restaurant>,
    /// Number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Number of restaurants across all pages
    #[serde(default)]
    pub total_elements: u64,
}

/// Payload of the restaurant list endpoint: a page object or a bare list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestaurantListing {
    /// Bare array of restaurants
    List(Vec<Restaurant>),
    /// Page object with totals
    Page(RestaurantPage),
}

/// Registration form
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    pub user_name: String,
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Requested role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Login form
#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Creates login credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Item to add to the cart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    /// Menu item being ordered
    pub product_id: Id,
    /// Number of units
    pub quantity: u32,
    /// Extra fields forwarded as-is
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl NewCartItem {
    /// `quantity` units of `product_id`
    #[must_use]
    pub fn new(product_id: impl Into<Id>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            options: Map::new(),
        }
    }
}

/// Checkout form, forwarded as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Delivery address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    /// Payment method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Extra fields
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Restaurant create / update form (admin)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDraft {
    /// Display name
    pub name: String,
    /// Extra fields
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl RestaurantDraft {
    /// Draft with only a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: Map::new(),
        }
    }
}

/// Category create form (admin)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// Display name
    pub name: String,
    /// Restaurant the category belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<Id>,
    /// Extra fields
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Event create form (admin)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Hosting restaurant
    pub restaurant_id: Id,
    /// Title shown to users
    pub title: String,
    /// Extra fields
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Parameters of the restaurant list request
///
/// Pages are 1-indexed here and 0-indexed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    /// 1-indexed page
    pub page: u32,
    /// Page size
    pub size: u32,
    /// Category filter
    pub category: Option<String>,
    /// Free-text filter
    pub search: Option<String>,
}

impl Default for RestaurantQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            category: None,
            search: None,
        }
    }
}

impl RestaurantQuery {
    /// Query for `page` of `size` restaurants
    #[must_use]
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    /// Filter by category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by free text
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// 0-indexed page sent to the server
    #[must_use]
    pub const fn wire_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}
