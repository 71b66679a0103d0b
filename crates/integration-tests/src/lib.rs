//! Integration tests for Shopfront.
//!
//! The tests drive the storefront library against [`MockApi`], an in-process
//! axum server that speaks the storefront REST API and records every request
//! it receives. No external services are needed:
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopfront_storefront::api::Credentials;
use shopfront_storefront::{AuthFlow, MemorySessionStore, Storefront, StorefrontConfig};

/// Password given to every user registered through [`MockApi::signed_in`].
pub const PASSWORD: &str = "correct horse battery staple";

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the API root, e.g. `/cart/item/3/`.
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// A product row as stored by the mock.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category: Option<String>,
    pub rating: f64,
}

impl ProductRow {
    #[must_use]
    pub fn new(id: i64, name: &str, price: &str, category: Option<&str>, rating: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            category: category.map(str::to_owned),
            rating,
        }
    }
}

#[derive(Debug, Clone)]
struct CartRow {
    id: i64,
    product_id: i64,
    quantity: i64,
}

#[derive(Debug, Clone)]
struct User {
    password: String,
    email: String,
    is_superuser: bool,
}

#[derive(Debug, Default)]
struct Data {
    products: Vec<ProductRow>,
    users: HashMap<String, User>,
    carts: HashMap<String, Vec<CartRow>>,
    tokens: HashMap<String, String>,
    requests: Vec<RecordedRequest>,
    next_product_id: i64,
    next_cart_item_id: i64,
    issued_tokens: i64,
    malformed_tokens: bool,
    failing: Vec<(String, String)>,
}

type Shared = Arc<Mutex<Data>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Data> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process storefront API.
pub struct MockApi {
    addr: SocketAddr,
    data: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Bind to an ephemeral port on localhost and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let data: Shared = Arc::new(Mutex::new(Data {
            next_product_id: 1,
            next_cart_item_id: 1,
            ..Data::default()
        }));

        let api = Router::new()
            .route("/token/", post(obtain_token))
            .route("/signup/", post(signup))
            .route("/profile/", get(profile))
            .route("/products/", get(list_products).post(create_product))
            .route(
                "/products/{id}/",
                put(update_product).delete(delete_product),
            )
            .route("/cart/", get(cart))
            .route("/cart/add/", post(add_to_cart))
            .route(
                "/cart/item/{id}/",
                patch(update_cart_item).delete(remove_cart_item),
            )
            .layer(middleware::from_fn_with_state(data.clone(), record))
            .with_state(data.clone());

        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, data, server })
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A storefront pointed at this mock with an in-memory session store.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built, which only happens if the
    /// HTTP client cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn storefront(&self) -> Storefront {
        let config = StorefrontConfig::for_api(&self.api_url(), "unused-session.json")
            .expect("mock URL is a valid http URL");
        Storefront::new(config, MemorySessionStore::new()).expect("HTTP client builds")
    }

    /// Register `username` and return a storefront signed in as them.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    #[allow(clippy::expect_used)]
    pub async fn signed_in(&self, username: &str, is_superuser: bool) -> Storefront {
        self.add_user(username, PASSWORD, is_superuser);
        let storefront = self.storefront();
        AuthFlow::new(&storefront)
            .login(&Credentials::new(username, PASSWORD))
            .await
            .expect("mock login succeeds");
        storefront
    }

    pub fn add_product(&self, product: ProductRow) {
        let mut data = lock(&self.data);
        data.next_product_id = data.next_product_id.max(product.id + 1);
        data.products.push(product);
    }

    pub fn add_user(&self, username: &str, password: &str, is_superuser: bool) {
        lock(&self.data).users.insert(
            username.to_string(),
            User {
                password: password.to_string(),
                email: format!("{username}@example.com"),
                is_superuser,
            },
        );
    }

    /// Put a line item into a user's cart and return its id.
    pub fn add_cart_item(&self, username: &str, product_id: i64, quantity: i64) -> i64 {
        let mut data = lock(&self.data);
        let id = data.next_cart_item_id;
        data.next_cart_item_id += 1;
        data.carts
            .entry(username.to_string())
            .or_default()
            .push(CartRow {
                id,
                product_id,
                quantity,
            });
        id
    }

    /// Quantities in a user's cart as `(item id, quantity)`, in order.
    #[must_use]
    pub fn cart_quantities(&self, username: &str) -> Vec<(i64, i64)> {
        lock(&self.data)
            .carts
            .get(username)
            .map(|rows| rows.iter().map(|r| (r.id, r.quantity)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn product_names(&self) -> Vec<String> {
        lock(&self.data)
            .products
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Make `POST /token/` return tokens that are not JWTs.
    pub fn issue_malformed_tokens(&self) {
        lock(&self.data).malformed_tokens = true;
    }

    /// Make every `method path` request fail with a 500.
    pub fn fail(&self, method: &str, path: &str) {
        lock(&self.data)
            .failing
            .push((method.to_string(), path.to_string()));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.data).requests.clone()
    }

    /// Requests matching `method` and `path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        lock(&self.data).requests.clear();
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A JWT-shaped token for `subject`. The signature is not real.
#[must_use]
pub fn jwt(subject: &str, serial: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{subject}","exp":4102444800,"jti":{serial}}}"#));
    let signature = URL_SAFE_NO_PAD.encode(b"mock-signature");
    format!("{header}.{payload}.{signature}")
}

// =============================================================================
// Middleware
// =============================================================================

async fn record(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let method = parts.method.to_string();
    let path = parts.uri.path().to_string();

    let failing = {
        let mut data = lock(&data);
        data.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization: parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: serde_json::from_slice(&bytes).ok(),
        });
        data.failing.iter().any(|(m, p)| *m == method && *p == path)
    };

    if failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Internal server error"})),
        )
            .into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// =============================================================================
// Handlers
// =============================================================================

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

fn caller(data: &Data, headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    data.tokens.get(token).cloned()
}

fn is_superuser(data: &Data, username: &str) -> bool {
    data.users.get(username).is_some_and(|u| u.is_superuser)
}

fn cart_json(data: &Data, row: &CartRow) -> Value {
    let product = data.products.iter().find(|p| p.id == row.product_id);
    json!({
        "id": row.id,
        "product": {
            "id": row.product_id,
            "name": product.map_or("", |p| p.name.as_str()),
            "price": product.map_or("0", |p| p.price.as_str()),
        },
        "quantity": row.quantity,
    })
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn obtain_token(State(data): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut data = lock(&data);
    let valid = data
        .users
        .get(&body.username)
        .is_some_and(|u| u.password == body.password);
    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response();
    }

    if data.malformed_tokens {
        return Json(json!({"access": "not-a-jwt", "refresh": "also-not"})).into_response();
    }

    data.issued_tokens += 1;
    let access = jwt(&body.username, data.issued_tokens);
    let refresh = jwt(&body.username, -data.issued_tokens);
    data.tokens.insert(access.clone(), body.username);
    Json(json!({"access": access, "refresh": refresh})).into_response()
}

#[derive(Deserialize)]
struct SignupBody {
    username: String,
    email: String,
    password: String,
}

async fn signup(State(data): State<Shared>, Json(body): Json<SignupBody>) -> Response {
    let mut data = lock(&data);
    if data.users.contains_key(&body.username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Username already exists"})),
        )
            .into_response();
    }
    data.users.insert(
        body.username,
        User {
            password: body.password,
            email: body.email,
            is_superuser: false,
        },
    );
    (
        StatusCode::CREATED,
        Json(json!({"message": "User created successfully"})),
    )
        .into_response()
}

async fn profile(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    let Some(user) = data.users.get(&username) else {
        return not_found();
    };
    Json(json!({
        "username": username,
        "email": user.email,
        "is_superuser": user.is_superuser,
    }))
    .into_response()
}

async fn list_products(State(data): State<Shared>) -> Response {
    Json(lock(&data).products.clone()).into_response()
}

#[derive(Deserialize)]
struct ProductBody {
    name: String,
    description: Option<String>,
    price: Value,
    category: String,
    rating: f64,
}

fn price_text(price: &Value) -> String {
    price
        .as_str()
        .map_or_else(|| price.to_string(), str::to_owned)
}

async fn create_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    if !is_superuser(&data, &username) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "You do not have permission to perform this action."})),
        )
            .into_response();
    }

    let product = ProductRow {
        id: data.next_product_id,
        name: body.name,
        description: body.description,
        price: price_text(&body.price),
        category: Some(body.category),
        rating: body.rating,
    };
    data.next_product_id += 1;
    data.products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    if !is_superuser(&data, &username) {
        return unauthorized();
    }
    let Some(product) = data.products.iter_mut().find(|p| p.id == id) else {
        return not_found();
    };
    product.name = body.name;
    product.description = body.description;
    product.price = price_text(&body.price);
    product.category = Some(body.category);
    product.rating = body.rating;
    Json(product.clone()).into_response()
}

async fn delete_product(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    if !is_superuser(&data, &username) {
        return unauthorized();
    }
    let before = data.products.len();
    data.products.retain(|p| p.id != id);
    if data.products.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    let items: Vec<Value> = data
        .carts
        .get(&username)
        .map(|rows| rows.iter().map(|row| cart_json(&data, row)).collect())
        .unwrap_or_default();
    Json(items).into_response()
}

#[derive(Deserialize)]
struct AddBody {
    product_id: i64,
    quantity: i64,
}

async fn add_to_cart(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    if !data.products.iter().any(|p| p.id == body.product_id) {
        return not_found();
    }

    let next_id = data.next_cart_item_id;
    let rows = data.carts.entry(username).or_default();
    if let Some(row) = rows.iter_mut().find(|r| r.product_id == body.product_id) {
        row.quantity += body.quantity;
    } else {
        rows.push(CartRow {
            id: next_id,
            product_id: body.product_id,
            quantity: body.quantity,
        });
        data.next_cart_item_id += 1;
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "Added to cart"})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: i64,
}

async fn update_cart_item(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<QuantityBody>,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    let Some(row) = data
        .carts
        .get_mut(&username)
        .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
    else {
        return not_found();
    };
    row.quantity = body.quantity;
    let row = row.clone();
    Json(cart_json(&data, &row)).into_response()
}

async fn remove_cart_item(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = lock(&data);
    let Some(username) = caller(&data, &headers) else {
        return unauthorized();
    };
    let Some(rows) = data.carts.get_mut(&username) else {
        return not_found();
    };
    let before = rows.len();
    rows.retain(|r| r.id != id);
    if rows.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}
