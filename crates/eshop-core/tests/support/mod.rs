//! In-process stand-in for the remote storefront API.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use eshop_core::api::{build_http_client, ApiClient};
use eshop_core::auth::{SessionManager, TokenStore};
use eshop_core::storage::MemoryBackend;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "rightpass";
pub const ADMIN_USERNAME: &str = "admin@demo.com";
pub const ISSUED_TOKEN: &str = "eyJhbGciOiJIUzUxMiJ9.issued-token";
pub const TAKEN_EMAIL: &str = "taken@demo.com";

#[derive(Default)]
pub struct MockState {
    pub requests: AtomicUsize,
    /// Answer every protected call with 401
    pub reject_tokens: AtomicBool,
    /// Issue the sign-in token in the body instead of the header
    pub token_in_body: AtomicBool,
    /// Accept the sign-in but issue no token at all
    pub omit_token: AtomicBool,
    /// Raw 200 body served by `GET /products` in place of the catalog
    pub raw_products: Mutex<Option<&'static str>>,
    pub last_order: Mutex<Option<Value>>,
}

impl MockState {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn reject_tokens(&self, reject: bool) {
        self.reject_tokens.store(reject, Ordering::SeqCst);
    }

    pub fn serve_raw_products(&self, body: &'static str) {
        *self.raw_products.lock().unwrap() = Some(body);
    }

    pub fn last_order(&self) -> Option<Value> {
        self.last_order.lock().unwrap().clone()
    }
}

pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/auth/signin", post(sign_in))
            .route("/api/auth/signup", post(sign_up))
            .route("/api/products", get(list_products))
            .route("/api/products/categories", get(list_categories))
            .route("/api/products/{id}", get(get_product))
            .route("/api/addresses", get(list_addresses).post(add_address))
            .route("/api/orders", post(place_order))
            .layer(middleware::from_fn_with_state(state.clone(), count_requests))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
            task,
        }
    }
}

/// A client stack wired to a fresh mock API and empty memory backends
pub struct Harness {
    pub mock: MockApi,
    pub durable: Arc<MemoryBackend>,
    pub tab: Arc<MemoryBackend>,
    pub session: SessionManager,
    pub client: ApiClient,
}

pub async fn harness() -> Harness {
    let mock = MockApi::start().await;
    let durable = Arc::new(MemoryBackend::new());
    let tab = Arc::new(MemoryBackend::new());
    let session = session_for(&mock.base_url, durable.clone(), tab.clone());
    let client = ApiClient::new(session.clone());
    Harness {
        mock,
        durable,
        tab,
        session,
        client,
    }
}

pub fn session_for(base_url: &str, durable: Arc<MemoryBackend>, tab: Arc<MemoryBackend>) -> SessionManager {
    let store = TokenStore::new(durable, tab);
    SessionManager::new(store, build_http_client().unwrap(), base_url)
}

async fn count_requests(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "status": status.as_u16() }))).into_response()
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers.get("x-auth-token").and_then(|v| v.to_str().ok());
    if state.reject_tokens.load(Ordering::SeqCst) || token != Some(ISSUED_TOKEN) {
        return Err(error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    Ok(())
}

pub fn product_p1() -> Value {
    json!({
        "id": "p1",
        "name": "Trail Running Shoes",
        "category": "Footwear",
        "price": 2499.0,
        "description": "Lightweight shoes with a grippy sole",
        "manufacturer": "Acme",
        "availableItems": 5,
        "imageUrl": "https://images.example/p1.png",
        "createdAt": "2024-05-01T09:30:00Z"
    })
}

fn product_p2() -> Value {
    json!({
        "id": "p2",
        "name": "Noise Cancelling Headphones",
        "category": "Electronics",
        "price": 8999.0,
        "description": "Over-ear, 30h battery",
        "manufacturer": "Sonic",
        "availableItems": 0,
        "imageUrl": "https://images.example/p2.png"
    })
}

async fn sign_in(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if password != PASSWORD || (username != USERNAME && username != ADMIN_USERNAME) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }

    let role = if username == ADMIN_USERNAME { "ADMIN" } else { "USER" };
    let mut reply = json!({ "id": "u1", "email": username, "roles": [role] });
    let mut headers = HeaderMap::new();
    if state.omit_token.load(Ordering::SeqCst) {
        // Neither header nor body carries a token
    } else if state.token_in_body.load(Ordering::SeqCst) {
        reply["token"] = json!(ISSUED_TOKEN);
    } else {
        headers.insert("x-auth-token", ISSUED_TOKEN.parse().unwrap());
    }
    (StatusCode::OK, headers, Json(reply)).into_response()
}

async fn sign_up(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return error(StatusCode::BAD_REQUEST, "Error: Email is already in use!");
    }
    Json(json!({ "message": "User registered successfully!" })).into_response()
}

async fn list_products(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    if let Some(body) = *state.raw_products.lock().unwrap() {
        return (StatusCode::OK, [("content-type", "application/json")], body).into_response();
    }
    Json(json!([product_p1(), product_p2()])).into_response()
}

async fn list_categories(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    Json(json!(["Electronics", "Footwear"])).into_response()
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    match id.as_str() {
        "p1" => Json(product_p1()).into_response(),
        "p2" => Json(product_p2()).into_response(),
        _ => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn list_addresses(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    Json(json!([{
        "id": "a1",
        "name": "Home",
        "contactNumber": "9876543210",
        "street": "12 MG Road",
        "city": "Bengaluru",
        "state": "KA",
        "landmark": "Near the metro",
        "zipcode": "560001"
    }]))
    .into_response()
}

async fn add_address(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    body["id"] = json!("a2");
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn place_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    *state.last_order.lock().unwrap() = Some(body.clone());
    (StatusCode::CREATED, Json(json!({ "id": "o1", "order": body }))).into_response()
}
