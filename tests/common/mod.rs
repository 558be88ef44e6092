// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the inventory REST backend plus client helpers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use inventory_client::config::Config;
use inventory_client::routes::Navigator;
use inventory_client::services::TokenStore;
use inventory_client::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const EMAIL: &str = "jane@example.com";
pub const PASSWORD: &str = "correct-password";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const STALE_ACCESS: &str = "stale-access";

/// How the login endpoint reports rejected credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum LoginFailure {
    /// 401 with a failure envelope
    Unauthorized,
    /// 200 with `success: false` and `data: null`
    EnvelopeNullData,
    /// 200 with `success: false` and no `data` field
    EnvelopeWithoutData,
}

/// Backend state shared with the handlers.
pub struct MockState {
    login_failure: Mutex<LoginFailure>,
    soft_refresh_failure: AtomicBool,
    valid_access: Mutex<String>,
    valid_refresh: Mutex<Option<String>>,
    user: Mutex<Value>,
    pub last_query: Mutex<HashMap<String, String>>,
    next_token: AtomicUsize,
    pub total_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub rejected_calls: AtomicUsize,
}

impl MockState {
    fn new() -> Self {
        Self {
            login_failure: Mutex::new(LoginFailure::Unauthorized),
            soft_refresh_failure: AtomicBool::new(false),
            valid_access: Mutex::new("access-0".to_string()),
            valid_refresh: Mutex::new(Some(REFRESH_TOKEN.to_string())),
            user: Mutex::new(user_json(1, EMAIL, "user")),
            last_query: Mutex::new(HashMap::new()),
            next_token: AtomicUsize::new(1),
            total_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            rejected_calls: AtomicUsize::new(0),
        }
    }

    /// Issue a new access token, invalidating the previous one.
    fn mint_access(&self) -> String {
        let n = self.next_token.fetch_add(1, Ordering::SeqCst);
        let token = format!("access-{}", n);
        *self.valid_access.lock().unwrap() = token.clone();
        token
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn is_admin(&self) -> bool {
        self.user.lock().unwrap()["role"] == "admin"
    }

    fn hit(&self) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
    }
}

type Shared = Arc<MockState>;

pub fn user_json(id: u64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": email.split('@').next().unwrap_or_default(),
        "email": email,
        "first_name": "Jane",
        "last_name": "Doe",
        "role": role,
        "bio": null,
        "date_joined": "2025-01-15T09:30:00Z"
    })
}

fn product_json(id: u64, name: &str, category: Option<&str>, price: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": 1,
        "category_name": category,
        "price": price,
        "quantity": quantity,
        "description": null,
        "stock_threshold": 5,
        "sku": null,
        "is_active": true,
        "created_at": "2025-02-01T12:00:00Z",
        "updated_at": "2025-02-01T12:00:00Z"
    })
}

fn catalog() -> Vec<Value> {
    vec![
        product_json(1, "Claw Hammer", Some("Tools"), "12.50", 3),
        product_json(2, "Cordless Drill Pro Max", Some("Tools"), "89.00", 2),
        product_json(3, "Wood Glue", Some("Supplies"), "4.50", 40),
        product_json(4, "Mystery Box", None, "10.00", 10),
    ]
}

fn envelope(data: Value) -> Value {
    json!({"success": true, "message": "", "data": data})
}

fn ok(data: Value) -> Response {
    (StatusCode::OK, Json(envelope(data))).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "You do not have permission to perform this action."})),
    )
        .into_response()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.hit();
    state.login_calls.fetch_add(1, Ordering::SeqCst);

    let email_ok = body["email"] == state.user.lock().unwrap()["email"];
    if !email_ok || body["password"] != PASSWORD {
        let mode = *state.login_failure.lock().unwrap();
        return match mode {
            LoginFailure::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "Invalid credentials", "data": null})),
            )
                .into_response(),
            LoginFailure::EnvelopeNullData => (
                StatusCode::OK,
                Json(json!({"success": false, "message": "Invalid credentials", "data": null})),
            )
                .into_response(),
            LoginFailure::EnvelopeWithoutData => (
                StatusCode::OK,
                Json(json!({"success": false, "message": "Invalid credentials"})),
            )
                .into_response(),
        };
    }

    let access = state.mint_access();
    *state.valid_refresh.lock().unwrap() = Some(REFRESH_TOKEN.to_string());
    let user = state.user.lock().unwrap().clone();
    ok(json!({"access": access, "refresh": REFRESH_TOKEN, "user": user}))
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.hit();

    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        )
            .into_response();
    }

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let user = user_json(2, &email, "user");
    *state.user.lock().unwrap() = user.clone();

    let access = state.mint_access();
    *state.valid_refresh.lock().unwrap() = Some(REFRESH_TOKEN.to_string());
    (
        StatusCode::CREATED,
        Json(envelope(
            json!({"access": access, "refresh": REFRESH_TOKEN, "user": user}),
        )),
    )
        .into_response()
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.hit();
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    // Keep the renewal in flight long enough for concurrent callers to pile up
    tokio::time::sleep(Duration::from_millis(50)).await;

    if state.soft_refresh_failure.load(Ordering::SeqCst) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Token is invalid or expired", "data": null})),
        )
            .into_response();
    }

    let valid = state.valid_refresh.lock().unwrap().clone();
    match (valid, body["refresh"].as_str()) {
        (Some(valid), Some(sent)) if valid == sent => {
            let access = state.mint_access();
            ok(json!({"access": access}))
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response(),
    }
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.hit();
    state.profile_calls.fetch_add(1, Ordering::SeqCst);

    if !state.authorized(&headers) {
        return unauthorized();
    }
    let user = state.user.lock().unwrap().clone();
    ok(user)
}

/// Echoes only the submitted fields, like a partial serializer response.
async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hit();

    if !state.authorized(&headers) {
        return unauthorized();
    }
    if let (Some(user), Some(fields)) = (state.user.lock().unwrap().as_object_mut(), body.as_object())
    {
        for (key, value) in fields {
            user.insert(key.clone(), value.clone());
        }
    }
    ok(body)
}

async fn always_unauthorized(State(state): State<Shared>) -> Response {
    state.hit();
    state.rejected_calls.fetch_add(1, Ordering::SeqCst);
    unauthorized()
}

async fn categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    ok(json!([
        {"id": 1, "name": "Tools", "description": null,
         "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"},
        {"id": 2, "name": "Supplies", "description": "Consumables",
         "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"}
    ]))
}

async fn products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    *state.last_query.lock().unwrap() = query;
    ok(Value::Array(catalog()))
}

async fn low_stock(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let low: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| p["quantity"].as_u64() <= p["stock_threshold"].as_u64())
        .collect();
    ok(Value::Array(low))
}

async fn users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !state.is_admin() {
        return forbidden();
    }
    let me = state.user.lock().unwrap().clone();
    ok(json!([me, user_json(5, "sam@example.com", "user")]))
}

async fn user_detail(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !state.is_admin() {
        return forbidden();
    }
    if id != 5 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    ok(user_json(5, "sam@example.com", "user"))
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(_id): Path<u64>,
) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !state.is_admin() {
        return forbidden();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hit();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !state.is_admin() {
        return forbidden();
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    (
        StatusCode::CREATED,
        Json(envelope(json!({
            "access": "issued-to-new-admin",
            "refresh": "issued-to-new-admin",
            "user": user_json(9, &email, "admin")
        }))),
    )
        .into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/user/auth/login/", post(login))
        .route("/api/user/auth/register/", post(register))
        .route("/api/user/auth/admin/register/", post(admin_register))
        .route("/api/user/auth/token/refresh/", post(refresh))
        .route("/api/user/profile/", get(profile).put(update_profile))
        .route("/api/user/users/", get(users))
        .route("/api/user/users/{id}/", get(user_detail).delete(delete_user))
        .route("/api/always-401/", get(always_unauthorized))
        .route("/api/inventory/categories/", get(categories))
        .route("/api/inventory/products/", get(products))
        .route("/api/inventory/products/low-stock/", get(low_stock))
        .with_state(state)
}

// ─── Test fixtures ───────────────────────────────────────────────────────────

/// Mock backend bound to an ephemeral local port.
pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("No local address");
        let state = Arc::new(MockState::new());
        let app = router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn set_role(&self, role: &str) {
        self.state.user.lock().unwrap()["role"] = json!(role);
    }

    /// Invalidate the current access token without telling the client.
    pub fn expire_access(&self) {
        *self.state.valid_access.lock().unwrap() = "rotated-server-side".to_string();
    }

    /// Reject every refresh credential from now on.
    pub fn revoke_refresh(&self) {
        *self.state.valid_refresh.lock().unwrap() = None;
    }

    pub fn set_login_failure(&self, mode: LoginFailure) {
        *self.state.login_failure.lock().unwrap() = mode;
    }

    /// Answer refresh calls with 200 and a `success: false` envelope.
    pub fn fail_refresh_with_envelope(&self) {
        self.state.soft_refresh_failure.store(true, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        self.state.total_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.state.profile_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.state.login_calls.load(Ordering::SeqCst)
    }

    pub fn rejected_calls(&self) -> usize {
        self.state.rejected_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.state.last_query.lock().unwrap().clone()
    }
}

/// Navigator that records every requested path.
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

#[allow(dead_code)]
pub fn test_config(backend: &MockBackend) -> Config {
    Config {
        api_base_url: backend.base_url.clone(),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

/// Build a client against `backend` with the given token store.
#[allow(dead_code)]
pub fn create_client(
    backend: &MockBackend,
    tokens: Arc<TokenStore>,
) -> (AppState, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let state = AppState::new(test_config(backend), tokens, navigator.clone())
        .expect("Failed to build client");
    (state, navigator)
}

/// Client whose store holds a rejected access token and a valid refresh token.
#[allow(dead_code)]
pub fn stale_client(backend: &MockBackend) -> (AppState, Arc<RecordingNavigator>, Arc<TokenStore>) {
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.save(STALE_ACCESS, REFRESH_TOKEN).unwrap();
    tokens.set_bearer(STALE_ACCESS);
    let (state, navigator) = create_client(backend, tokens.clone());
    (state, navigator, tokens)
}
