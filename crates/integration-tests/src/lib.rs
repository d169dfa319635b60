//! Integration test support for the Cookie Shop client.
//!
//! [`FakeShop`] serves the Cookie Shop REST contract from an in-process axum
//! server on an ephemeral port. Tests drive the real `ApiClient` against it
//! and inspect or tweak [`ShopState`] directly.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cookie-shop-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let shop = FakeShop::start().await;
//! shop.add_product(product(1, "Oat", 50));
//!
//! let config = ClientConfig::for_api_url(&shop.api_url())?;
//! let context = ShopContext::with_store(config, Arc::new(MemoryStore::new()))?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use cookie_shop_core::{FavoriteId, OrderId, Product, ProductId, SuggestionId, UserId};

/// Bearer token the fake backend accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// A favorite as stored by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFavorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub product: Product,
}

/// A registered account. Passwords are compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Mutable backend state. Tests may edit it between client calls.
#[derive(Debug, Default)]
pub struct ShopState {
    pub products: Vec<Product>,
    pub favorites: Vec<StoredFavorite>,
    pub suggestions: Vec<Value>,
    pub accounts: Vec<StoredAccount>,
    /// Orders as stored, with `id`, `userId` and `status` filled in.
    pub orders: Vec<Value>,
    next_id: i64,

    /// Products whose `POST /favorites` answers 500.
    pub fail_adds: HashSet<ProductId>,
    /// `GET /favorites` answers 500.
    pub fail_list: bool,
    /// `DELETE /favorites` answers 500.
    pub fail_clear: bool,
    /// `POST /favorites` answers with an empty body.
    pub empty_add_response: bool,
    /// `GET /favorites` answers with this body instead of the stored list.
    pub favorites_body: Option<Value>,
    /// `POST /orders` answers 500.
    pub fail_orders: bool,

    /// Handled requests as `METHOD route`, in arrival order.
    pub requests: Vec<String>,
}

impl ShopState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register an account and return its id.
    pub fn add_account(&mut self, email: &str, password: &str) -> UserId {
        let id = UserId::new(self.next_id());
        self.accounts.push(StoredAccount {
            id,
            username: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: String::new(),
        });
        id
    }

    /// Number of recorded requests equal to `route` (e.g. `"GET /favorites"`).
    #[must_use]
    pub fn count(&self, route: &str) -> usize {
        self.requests.iter().filter(|r| *r == route).count()
    }

    /// Product ids favorited by `user_id`, in insertion order.
    #[must_use]
    pub fn favorite_products(&self, user_id: UserId) -> Vec<ProductId> {
        self.favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.product.id)
            .collect()
    }
}

type SharedState = Arc<Mutex<ShopState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ShopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running fake backend. The server stops when this is dropped.
pub struct FakeShop {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeShop {
    /// Start a server on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = SharedState::default();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Lock the backend state.
    pub fn state(&self) -> MutexGuard<'_, ShopState> {
        lock(&self.state)
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.state().products.push(product);
    }
}

impl Drop for FakeShop {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route(
            "/favorites",
            get(list_favorites).post(add_favorite).delete(clear_favorites),
        )
        .route("/favorites/{id}", delete(remove_favorite))
        .route("/suggestions", post(create_suggestion))
        .route("/suggestions/user", get(user_suggestions))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/orders", post(create_order))
        .route("/orders/user", get(user_orders));

    Router::new().nest("/api", api).with_state(state)
}

// =============================================================================
// Auth
// =============================================================================

fn authenticate(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if token != Some(VALID_TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    headers
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<UserId>().ok())
        .ok_or(StatusCode::FORBIDDEN)
}

fn favorite_json(favorite: &StoredFavorite) -> Value {
    json!({
        "id": favorite.id,
        "userId": favorite.user_id,
        "product": favorite.product,
    })
}

// =============================================================================
// Products
// =============================================================================

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

async fn list_products(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Product>> {
    let mut state = lock(&state);
    state.requests.push("GET /products".to_string());

    let needle = query.search.unwrap_or_default().to_lowercase();
    Json(
        state
            .products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, StatusCode> {
    let mut state = lock(&state);
    state.requests.push("GET /products/{id}".to_string());

    state
        .products
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// =============================================================================
// Favorites
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFavorite {
    product_id: ProductId,
}

async fn list_favorites(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("GET /favorites".to_string());

    if state.fail_list {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    if let Some(body) = &state.favorites_body {
        return Ok(Json(body.clone()));
    }

    let favorites = state
        .favorites
        .iter()
        .filter(|f| f.user_id == user_id)
        .map(favorite_json)
        .collect();
    Ok(Json(Value::Array(favorites)))
}

async fn add_favorite(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<AddFavorite>,
) -> Result<String, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("POST /favorites".to_string());

    if state.fail_adds.contains(&body.product_id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let product = state
        .products
        .iter()
        .find(|p| p.id == body.product_id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    let existing = state
        .favorites
        .iter()
        .find(|f| f.user_id == user_id && f.product.id == product.id)
        .cloned();
    let favorite = if let Some(existing) = existing {
        existing
    } else {
        let favorite = StoredFavorite {
            id: FavoriteId::new(state.next_id()),
            user_id,
            product,
        };
        state.favorites.push(favorite.clone());
        favorite
    };

    if state.empty_add_response {
        return Ok(String::new());
    }
    Ok(favorite_json(&favorite).to_string())
}

async fn remove_favorite(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    let user_id = match authenticate(&headers) {
        Ok(user_id) => user_id,
        Err(status) => return status,
    };
    let mut state = lock(&state);
    state.requests.push("DELETE /favorites/{id}".to_string());

    let before = state.favorites.len();
    state
        .favorites
        .retain(|f| !(f.id == FavoriteId::new(id) && f.user_id == user_id));

    if state.favorites.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn clear_favorites(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    let user_id = match authenticate(&headers) {
        Ok(user_id) => user_id,
        Err(status) => return status,
    };
    let mut state = lock(&state);
    state.requests.push("DELETE /favorites".to_string());

    if state.fail_clear {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.favorites.retain(|f| f.user_id != user_id);
    StatusCode::NO_CONTENT
}

// =============================================================================
// Suggestions
// =============================================================================

async fn create_suggestion(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("POST /suggestions".to_string());

    let id = SuggestionId::new(state.next_id());
    if let Some(fields) = body.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        fields.insert("userId".to_string(), json!(user_id));
    }
    state.suggestions.push(body.clone());
    Ok(Json(body))
}

async fn user_suggestions(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("GET /suggestions/user".to_string());

    Ok(Json(
        state
            .suggestions
            .iter()
            .filter(|s| s["userId"] == json!(user_id))
            .cloned()
            .collect(),
    ))
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
    full_name: String,
}

fn account_json(account: &StoredAccount) -> Value {
    json!({
        "success": true,
        "message": "Login successful",
        "token": VALID_TOKEN,
        "user": {
            "id": account.id,
            "username": account.username,
            "email": account.email,
            "fullName": account.full_name,
        },
    })
}

fn rejected(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "message": message})),
    )
}

async fn login(
    State(state): State<SharedState>,
    Json(body): Json<LoginBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    state.requests.push("POST /auth/login".to_string());

    match state.accounts.iter().find(|a| a.email == body.email) {
        Some(account) if account.password == body.password => {
            (StatusCode::OK, Json(account_json(account)))
        }
        Some(_) => rejected("Invalid password"),
        None => rejected("User not found"),
    }
}

async fn register(
    State(state): State<SharedState>,
    Json(body): Json<RegisterBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    state.requests.push("POST /auth/register".to_string());

    if state.accounts.iter().any(|a| a.email == body.email) {
        return rejected("Email already exists");
    }

    let account = StoredAccount {
        id: UserId::new(state.next_id()),
        username: body.username,
        email: body.email,
        password: body.password,
        full_name: body.full_name,
    };
    state.accounts.push(account.clone());
    (StatusCode::OK, Json(account_json(&account)))
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("POST /orders".to_string());

    if state.fail_orders {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let id = OrderId::new(state.next_id());
    if let Some(fields) = body.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        fields.insert("userId".to_string(), json!(user_id));
        fields.insert("status".to_string(), json!("PENDING"));
    }
    state.orders.push(body.clone());
    Ok(Json(body))
}

async fn user_orders(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let user_id = authenticate(&headers)?;
    let mut state = lock(&state);
    state.requests.push("GET /orders/user".to_string());

    Ok(Json(
        state
            .orders
            .iter()
            .rev()
            .filter(|o| o["userId"] == json!(user_id))
            .cloned()
            .collect(),
    ))
}
