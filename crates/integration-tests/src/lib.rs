//! Integration test support for Products Plus.
//!
//! [`MockBackend`] serves the cart, auth, payments and catalog endpoints from
//! memory on an ephemeral port, so the real `reqwest` clients can be
//! exercised end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p products-plus-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! let dir = tempfile::tempdir()?;
//! let state = AppState::new(backend.config(dir.path()))?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use products_plus_core::{CartItem, ProductId, Quantity, UserId};
use products_plus_storefront::api::{Product, Rating};
use products_plus_storefront::config::StorefrontConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use url::Url;

/// Seeded account that can log in.
pub const USERNAME: &str = "johnd";
/// Password of [`USERNAME`].
pub const PASSWORD: &str = "secret123";

#[derive(Debug, Clone)]
struct MockUser {
    id: UserId,
    email: String,
    username: String,
    password: String,
    firstname: String,
    lastname: String,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<MockUser>,
    /// token -> username
    tokens: HashMap<String, String>,
    /// username -> cart
    carts: HashMap<String, Vec<CartItem>>,
    products: Vec<Product>,
    hits: HashMap<String, usize>,
    fail_next: Option<StatusCode>,
    payment_intents: Vec<(i64, String)>,
    next_token: u64,
}

#[derive(Clone, Default)]
struct MockState(Arc<Mutex<Inner>>);

impl MockState {
    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }
}

/// In-process backend listening on `127.0.0.1`.
///
/// The server task is aborted when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl MockBackend {
    /// Start a backend seeded with two users and a small catalog.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = MockState::default();
        state.with(seed);

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL with a trailing slash.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("mock backend url")
    }

    /// Storefront configuration pointing every service at this backend.
    #[must_use]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        StorefrontConfig::for_base_url(self.url(), data_dir.to_path_buf())
    }

    /// Number of requests seen for `"METHOD /path"`, e.g. `"DELETE /cart/1"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.state.with(|inner| inner.hits.get(route).copied().unwrap_or(0))
    }

    /// Total number of requests seen.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.state.with(|inner| inner.hits.values().sum())
    }

    /// Answer the next request with `status` and an error body.
    pub fn fail_next(&self, status: StatusCode) {
        self.state.with(|inner| inner.fail_next = Some(status));
    }

    /// Invalidate every issued token, as if sessions expired server-side.
    pub fn revoke_tokens(&self) {
        self.state.with(|inner| inner.tokens.clear());
    }

    #[must_use]
    pub fn cart_of(&self, username: &str) -> Vec<CartItem> {
        self.state
            .with(|inner| inner.carts.get(username).cloned().unwrap_or_default())
    }

    pub fn set_cart(&self, username: &str, items: Vec<CartItem>) {
        self.state.with(|inner| {
            inner.carts.insert(username.to_string(), items);
        });
    }

    /// Whether an account with `username` exists.
    #[must_use]
    pub fn has_user(&self, username: &str) -> bool {
        self.state
            .with(|inner| inner.users.iter().any(|u| u.username == username))
    }

    /// `(amount, currency)` of every payment intent created.
    #[must_use]
    pub fn payment_intents(&self) -> Vec<(i64, String)> {
        self.state.with(|inner| inner.payment_intents.clone())
    }
}

// =============================================================================
// Seed data
// =============================================================================

fn seed(inner: &mut Inner) {
    inner.users = vec![
        MockUser {
            id: UserId::new("1"),
            email: "john@gmail.com".to_string(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
        },
        MockUser {
            id: UserId::new("2"),
            email: "morrison@gmail.com".to_string(),
            username: "mor2314".to_string(),
            password: "83r5uG7".to_string(),
            firstname: "David".to_string(),
            lastname: "Morrison".to_string(),
        },
    ];
    inner.products = vec![
        product(1, "Fjallraven Foldsack No. 1 Backpack", 10995, "men's clothing"),
        product(2, "Mens Casual Premium Slim Fit TShirts", 2230, "men's clothing"),
        product(5, "John Hardy Womens Legends Naga Bracelet", 69500, "jewelery"),
        product(9, "WD 2TB Elements Portable External Hard Drive", 6400, "electronics"),
        product(15, "BIYLACLESEN Womens 3in1 Snowboard Jacket", 5699, "women's clothing"),
    ];
}

fn product(id: i32, title: &str, cents: i64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        description: format!("Description of {title}"),
        category: category.to_string(),
        image: format!("https://img.example.com/{id}.jpg"),
        rating: Some(Rating {
            rate: 4.1,
            count: 120,
        }),
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: MockState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/{id}", put(update_quantity).delete(remove_from_cart))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_fail))
        .with_state(state)
}

/// Count the request and apply any injected failure.
async fn record_and_fail(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    let failure = state.with(|inner| {
        *inner.hits.entry(route).or_default() += 1;
        inner.fail_next.take()
    });

    match failure {
        Some(status) => error(status, "Injected failure"),
        None => next.run(request).await,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Username for the request's bearer token.
fn authorized(state: &MockState, headers: &HeaderMap) -> Result<String, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    token
        .and_then(|token| state.with(|inner| inner.tokens.get(token).cloned()))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid or missing token"))
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<MockState>, Json(body): Json<LoginBody>) -> Response {
    state.with(|inner| {
        let Some(user) = inner
            .users
            .iter()
            .find(|u| u.username == body.username && u.password == body.password)
            .cloned()
        else {
            return error(StatusCode::UNAUTHORIZED, "Invalid username or password");
        };

        inner.next_token += 1;
        let token = format!("mock-token-{}", inner.next_token);
        inner.tokens.insert(token.clone(), user.username.clone());
        Json(json!({ "token": token, "id": user.id, "username": user.username })).into_response()
    })
}

#[derive(Deserialize)]
struct SignupBody {
    email: String,
    username: String,
    password: String,
    #[serde(default)]
    firstname: String,
    #[serde(default)]
    lastname: String,
}

async fn signup(State(state): State<MockState>, Json(body): Json<SignupBody>) -> Response {
    state.with(|inner| {
        if inner
            .users
            .iter()
            .any(|u| u.username == body.username || u.email == body.email)
        {
            return error(StatusCode::BAD_REQUEST, "Username or email already exists");
        }

        let id = UserId::new(format!("{}", 1000 + inner.users.len()));
        inner.users.push(MockUser {
            id,
            email: body.email,
            username: body.username,
            password: body.password,
            firstname: body.firstname,
            lastname: body.lastname,
        });
        (
            StatusCode::CREATED,
            Json(json!({ "message": "User created successfully" })),
        )
            .into_response()
    })
}

async fn logout(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorized(&state, &headers) {
        return response;
    }
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    state.with(|inner| {
        if let Some(token) = token {
            inner.tokens.remove(&token);
        }
    });
    Json(json!({})).into_response()
}

/// The full user record, password included, like a plain REST resource.
async fn get_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Response {
    if let Err(response) = authorized(&state, &headers) {
        return response;
    }
    let user = state.with(|inner| inner.users.iter().find(|u| u.id.as_str() == id).cloned());
    match user {
        Some(user) => Json(json!({
            "id": user.id,
            "email": user.email,
            "username": user.username,
            "password": user.password,
            "name": { "firstname": user.firstname, "lastname": user.lastname },
        }))
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

/// Delete a user along with their tokens and cart.
async fn delete_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Response {
    if let Err(response) = authorized(&state, &headers) {
        return response;
    }
    state.with(|inner| {
        let Some(index) = inner.users.iter().position(|u| u.id.as_str() == id) else {
            return error(StatusCode::NOT_FOUND, "User not found");
        };
        let user = inner.users.remove(index);
        inner.tokens.retain(|_, username| *username != user.username);
        inner.carts.remove(&user.username);
        Json(json!({})).into_response()
    })
}

async fn get_cart(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match authorized(&state, &headers) {
        Ok(username) => Json(state.with(|inner| cart_for(inner, &username).clone())).into_response(),
        Err(response) => response,
    }
}

fn cart_for<'a>(inner: &'a mut Inner, username: &str) -> &'a mut Vec<CartItem> {
    inner.carts.entry(username.to_string()).or_default()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: ProductId,
    title: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    image: String,
    #[serde(default)]
    quantity: Option<Quantity>,
}

async fn add_to_cart(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let username = match authorized(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let items = state.with(|inner| {
        let cart = cart_for(inner, &username);
        let quantity = body.quantity.unwrap_or_default();
        match cart.iter_mut().find(|i| i.product_id == body.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => cart.push(CartItem {
                product_id: body.product_id,
                title: body.title,
                price: body.price,
                quantity,
                image: body.image,
            }),
        }
        cart.clone()
    });
    Json(items).into_response()
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: Quantity,
}

async fn update_quantity(
    State(state): State<MockState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
    Json(body): Json<QuantityBody>,
) -> Response {
    let username = match authorized(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    state.with(|inner| {
        let cart = cart_for(inner, &username);
        let Some(item) = cart.iter_mut().find(|i| i.product_id == ProductId::new(id)) else {
            return error(StatusCode::NOT_FOUND, "Item not in cart");
        };
        item.quantity = body.quantity;
        Json(cart.clone()).into_response()
    })
}

async fn remove_from_cart(
    State(state): State<MockState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    let username = match authorized(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    state.with(|inner| {
        cart_for(inner, &username).retain(|i| i.product_id != ProductId::new(id));
    });
    Json(json!({})).into_response()
}

async fn clear_cart(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let username = match authorized(&state, &headers) {
        Ok(username) => username,
        Err(response) => return response,
    };

    state.with(|inner| cart_for(inner, &username).clear());
    Json(json!({})).into_response()
}

#[derive(Deserialize)]
struct PaymentBody {
    amount: i64,
    currency: String,
}

async fn create_payment_intent(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<PaymentBody>,
) -> Response {
    if let Err(response) = authorized(&state, &headers) {
        return response;
    }
    if body.amount <= 0 {
        return error(StatusCode::BAD_REQUEST, "Amount must be positive");
    }

    let secret = format!("pi_{}_secret_mock", body.amount);
    state.with(|inner| inner.payment_intents.push((body.amount, body.currency)));
    Json(json!({ "clientSecret": secret })).into_response()
}

#[derive(Deserialize)]
struct ProductQuery {
    category: Option<String>,
}

async fn list_products(
    State(state): State<MockState>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let products: Vec<Product> = state.with(|inner| {
        inner
            .products
            .iter()
            .filter(|p| query.category.as_ref().is_none_or(|c| &p.category == c))
            .cloned()
            .collect()
    });
    Json(products).into_response()
}

/// Unknown IDs get 200 with an empty body, like the public catalog.
async fn get_product(State(state): State<MockState>, UrlPath(id): UrlPath<i32>) -> Response {
    let found = state.with(|inner| {
        inner
            .products
            .iter()
            .find(|p| p.id == ProductId::new(id))
            .cloned()
    });
    match found {
        Some(product) => Json(product).into_response(),
        None => StatusCode::OK.into_response(),
    }
}
