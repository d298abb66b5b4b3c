//! Request and response bodies for the storefront backends.

use core::fmt;
use core::str::FromStr;

use products_plus_core::{NewCartItem, ProductId, Quantity, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::CurrentUser;

// =============================================================================
// Catalog
// =============================================================================

/// A product as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Product {
    /// Build the add-to-cart body for this product.
    ///
    /// A quantity of one is left for the store to default.
    #[must_use]
    pub fn to_cart_item(&self, quantity: Quantity) -> NewCartItem {
        NewCartItem {
            product_id: self.id,
            title: self.title.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity: (quantity != Quantity::MIN).then_some(quantity),
        }
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

/// Catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Electronics,
    Jewelery,
    MensClothing,
    WomensClothing,
}

impl Category {
    /// All categories in navigation order.
    pub const ALL: [Self; 4] = [
        Self::Electronics,
        Self::Jewelery,
        Self::MensClothing,
        Self::WomensClothing,
    ];

    /// Category name exactly as the catalog spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Jewelery => "jewelery",
            Self::MensClothing => "men's clothing",
            Self::WomensClothing => "women's clothing",
        }
    }

    /// Short URL slug.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Jewelery => "jewelery",
            Self::MensClothing => "men",
            Self::WomensClothing => "women",
        }
    }

    /// Whether a product belongs to this category.
    #[must_use]
    pub fn contains(self, product: &Product) -> bool {
        product.category.eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == wanted || c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Body of a quantity update.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityUpdate {
    pub quantity: Quantity,
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login response.
///
/// Some backends answer with the token alone.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
}

impl LoginResponse {
    /// The identity carried by this response, falling back to the username
    /// that was sent.
    #[must_use]
    pub fn user(&self, requested_username: &str) -> CurrentUser {
        let username = self
            .username
            .clone()
            .unwrap_or_else(|| requested_username.to_string());
        CurrentUser {
            id: self.id.clone().unwrap_or_else(|| UserId::new(username.as_str())),
            username,
        }
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish()
    }
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
}

/// Response to a successful signup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<CurrentUser>,
}

// =============================================================================
// Users
// =============================================================================

/// A user record as served by `GET /users/{id}`.
///
/// The backend also returns the password hash; it is never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<FullName>,
}

/// First and last name captured at signup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FullName {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.firstname.trim(), self.lastname.trim())
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Body of `POST /create-payment-intent`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Lower-case ISO 4217 code.
    pub currency: String,
}

/// A payment intent created by the backend.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Secret handed to the provider-hosted payment form.
    pub client_secret: String,
}

impl fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserialize() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Your perfect pack",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": {"rate": 3.9, "count": 120}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(10995, 2));
        assert!(Category::MensClothing.contains(&product));
        assert_eq!(product.rating.unwrap().count, 120);
    }

    #[test]
    fn test_category_from_slug_and_name() {
        assert_eq!("men".parse::<Category>().unwrap(), Category::MensClothing);
        assert_eq!(
            "Women's Clothing".parse::<Category>().unwrap(),
            Category::WomensClothing
        );
        assert_eq!("jewelery".parse::<Category>().unwrap(), Category::Jewelery);
        assert!("toys".parse::<Category>().is_err());
    }

    #[test]
    fn test_to_cart_item_defaults_quantity() {
        let product = Product {
            id: ProductId::new(2),
            title: "Shirt".to_string(),
            price: Decimal::new(2230, 2),
            description: String::new(),
            category: "men's clothing".to_string(),
            image: "shirt.jpg".to_string(),
            rating: None,
        };

        assert_eq!(product.to_cart_item(Quantity::MIN).quantity, None);
        assert_eq!(
            product.to_cart_item(Quantity::clamped(3)).quantity,
            Some(Quantity::clamped(3))
        );
    }

    #[test]
    fn test_login_response_debug_redacts_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"jwt-secret","id":1,"username":"johnd"}"#).unwrap();
        let debug = format!("{response:?}");
        assert!(!debug.contains("jwt-secret"));
        assert_eq!(response.user("ignored").username, "johnd");
        assert_eq!(response.user("ignored").id, UserId::new("1"));
    }

    #[test]
    fn test_login_response_token_only() {
        let response: LoginResponse = serde_json::from_str(r#"{"token":"jwt"}"#).unwrap();
        let user = response.user("mor_2314");
        assert_eq!(user.username, "mor_2314");
        assert_eq!(user.id, UserId::new("mor_2314"));
    }

    #[test]
    fn test_user_profile_skips_password_hash() {
        let json = r#"{
            "id": "1718000000000",
            "email": "kate@mail.com",
            "username": "kateh",
            "password": "$2a$10$hash",
            "name": {"firstname": "Kate", "lastname": "Hale"}
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, UserId::new("1718000000000"));
        assert_eq!(profile.username, "kateh");
        assert_eq!(profile.name.unwrap().to_string(), "Kate Hale");

        let bare: UserProfile =
            serde_json::from_str(r#"{"id": 2, "email": "m@mail.com", "username": "mor2314"}"#)
                .unwrap();
        assert_eq!(bare.name, None);
    }
}
