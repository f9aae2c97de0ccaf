//! Integration test harness for Gifty.
//!
//! Spawns an in-process mock of both the Gifty backend REST API and the
//! identity provider on an ephemeral port, then points real
//! `gifty-client` instances at it. Tests exercise the full client stack
//! (token minting, profile provisioning, store mutations, share
//! resolution) over actual HTTP.
//!
//! The mock uses transparent token shapes so no real JWTs are involved:
//! a bearer token is `tok-{user id}` and a refresh token is
//! `ref-{user id}`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]
// Handler signatures are fixed by the router even when a body never awaits.
#![allow(clippy::unused_async)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Form, Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::Router;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

use gifty_client::api::GiftyApi;
use gifty_client::config::IdentityConfig;
use gifty_client::identity::IdentityClient;
use gifty_client::SessionManager;

/// The backend's copy for a second reservation in the same wishlist.
pub const RESERVATION_LIMIT_MESSAGE: &str = "You can only reserve 1 item per wishlist.";

// =============================================================================
// Mock state
// =============================================================================

#[derive(Clone)]
struct MockUser {
    id: String,
    email: String,
    password: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    verified: bool,
    sign_in_method: String,
}

#[derive(Clone)]
struct ProfileRec {
    email: String,
    username: String,
    bio: String,
    avatar_url: String,
}

#[derive(Clone)]
struct WishlistRec {
    id: String,
    user_id: String,
    name: String,
    is_public: bool,
    order: u32,
}

#[derive(Clone)]
struct ItemRec {
    id: String,
    wishlist_id: String,
    name: String,
    link: String,
    reserved_by: Option<String>,
}

#[derive(Default)]
struct MockState {
    users: Vec<MockUser>,
    auth_codes: HashMap<String, String>,
    revoked_refresh_tokens: HashSet<String>,
    profiles: HashMap<String, ProfileRec>,
    profile_creates: HashMap<String, u32>,
    wishlists: Vec<WishlistRec>,
    items: Vec<ItemRec>,
    share_codes: HashMap<String, String>,
    shared_with: HashMap<String, BTreeSet<String>>,
    fail_reorder: bool,
    next_id: u64,
}

impl MockState {
    fn alloc(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn user_by_token(&self, token: &str) -> Option<&MockUser> {
        let id = token.strip_prefix("tok-")?;
        self.users.iter().find(|u| u.id == id)
    }

    fn wishlist(&self, id: &str) -> Option<&WishlistRec> {
        self.wishlists.iter().find(|w| w.id == id)
    }

    fn item(&self, id: &str) -> Option<&ItemRec> {
        self.items.iter().find(|i| i.id == id)
    }
}

type SharedState = Arc<Mutex<MockState>>;

// =============================================================================
// Test context
// =============================================================================

/// One mock deployment plus client factories pointed at it.
pub struct TestContext {
    base_url: Url,
    state: SharedState,
}

impl TestContext {
    /// Start the mock backend and identity provider on an ephemeral port.
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("valid base url");
        Self { base_url, state }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    /// Backend client pointed at the mock.
    #[must_use]
    pub fn api(&self) -> GiftyApi {
        GiftyApi::new(&self.base_url)
    }

    /// Identity client pointed at the mock.
    #[must_use]
    pub fn identity_client(&self) -> IdentityClient {
        IdentityClient::new(&IdentityConfig {
            issuer: self.base_url.clone(),
            client_id: "gifty-integration".to_string(),
            client_secret: SecretString::from("integration-only-secret-9000"),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
        })
    }

    /// A session manager with no active session.
    #[must_use]
    pub fn session(&self) -> SessionManager {
        SessionManager::new(self.identity_client(), self.api())
    }

    /// Sign in with seeded password credentials and return the live session.
    pub async fn signed_in_session(&self, email: &str, password: &str) -> SessionManager {
        let mut session = self.session();
        session
            .sign_in_with_password(email, password)
            .await
            .expect("password sign-in");
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Seeding and inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Seed a verified password account at the identity provider.
    pub fn seed_user(&self, id: &str, email: &str, password: &str, display_name: Option<&str>) {
        self.seed_user_with(id, email, password, display_name, true);
    }

    /// Seed a password account with explicit verification state.
    pub fn seed_user_with(
        &self,
        id: &str,
        email: &str,
        password: &str,
        display_name: Option<&str>,
        verified: bool,
    ) {
        self.lock().users.push(MockUser {
            id: id.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            verified,
            sign_in_method: "password".to_string(),
        });
    }

    /// Seed a federated account (no password, always verified).
    pub fn seed_federated_user(&self, id: &str, email: &str, display_name: &str) {
        self.lock().users.push(MockUser {
            id: id.to_string(),
            email: email.to_string(),
            password: String::new(),
            display_name: Some(display_name.to_string()),
            photo_url: None,
            verified: true,
            sign_in_method: "federated".to_string(),
        });
    }

    /// Issue a one-time authorization code for the federated flow.
    #[must_use]
    pub fn issue_auth_code(&self, user_id: &str) -> String {
        let code = Uuid::new_v4().simple().to_string();
        self.lock()
            .auth_codes
            .insert(code.clone(), user_id.to_string());
        code
    }

    /// How many times `POST /api/users` ran for this subject.
    #[must_use]
    pub fn profile_creates(&self, user_id: &str) -> u32 {
        self.lock()
            .profile_creates
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the profile record exists server-side.
    #[must_use]
    pub fn profile_exists(&self, user_id: &str) -> bool {
        self.lock().profiles.contains_key(user_id)
    }

    /// Make the next (and every following) reorder request fail with a 500.
    pub fn set_fail_reorder(&self, fail: bool) {
        self.lock().fail_reorder = fail;
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: SharedState) -> Router {
    Router::new()
        // Identity provider
        .route("/oauth/token", post(oauth_token))
        .route("/oauth/revoke", post(oauth_revoke))
        .route("/accounts/register", post(register_account))
        .route("/accounts/me", get(account_me))
        .route("/accounts/send-verification", post(send_verification))
        // Backend: users
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", get(get_user).put(update_user))
        // Backend: wishlists
        .route("/api/wishlists", get(list_wishlists).post(create_wishlist))
        .route("/api/wishlists/reorder", put(reorder_wishlists))
        .route(
            "/api/wishlists/{id}",
            patch(rename_wishlist).delete(delete_wishlist),
        )
        // Backend: items
        .route("/api/wishlist-items", post(create_item))
        .route(
            "/api/wishlist-items/{id}",
            get(list_items).patch(update_item).delete(delete_item),
        )
        .route("/api/wishlist-items/{id}/reserve", patch(toggle_reservation))
        // Backend: share links
        .route("/api/shared-links/shared-with-me", get(shared_with_me))
        .route("/api/shared-links/{code}", get(resolve_share_code))
        .route(
            "/api/shared-links/{code}/generate",
            post(generate_share_link),
        )
        .with_state(state)
}

// =============================================================================
// Response helpers
// =============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn authed_uid(state: &MockState, headers: &HeaderMap) -> Option<String> {
    let token = bearer_token(headers)?;
    state.user_by_token(&token).map(|u| u.id.clone())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response()
}

fn forbidden(message: &str) -> Response {
    (StatusCode::FORBIDDEN, Json(json!({"error": message}))).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

fn token_grant(user_id: &str) -> Response {
    Json(json!({
        "access_token": format!("tok-{user_id}"),
        "expires_in": 3600,
        "refresh_token": format!("ref-{user_id}"),
    }))
    .into_response()
}

fn identity_json(user: &MockUser) -> Value {
    json!({
        "sub": user.id,
        "email": user.email,
        "emailVerified": user.verified,
        "displayName": user.display_name,
        "photoUrl": user.photo_url,
        "signInMethod": user.sign_in_method,
    })
}

fn profile_json(id: &str, profile: &ProfileRec) -> Value {
    json!({
        "id": id,
        "email": profile.email,
        "username": profile.username,
        "bio": profile.bio,
        "avatarUrl": profile.avatar_url,
    })
}

fn wishlist_json(wishlist: &WishlistRec) -> Value {
    json!({
        "id": wishlist.id,
        "userId": wishlist.user_id,
        "name": wishlist.name,
        "isPublic": wishlist.is_public,
        "order": wishlist.order,
    })
}

fn item_json(item: &ItemRec) -> Value {
    json!({
        "id": item.id,
        "wishlistId": item.wishlist_id,
        "name": item.name,
        "link": item.link,
        "isReserved": item.reserved_by.is_some(),
        "reservedBy": item.reserved_by,
    })
}

fn shared_wishlist_json(state: &MockState, wishlist: &WishlistRec) -> Value {
    let items: Vec<Value> = state
        .items
        .iter()
        .filter(|i| i.wishlist_id == wishlist.id)
        .map(item_json)
        .collect();
    json!({
        "id": wishlist.id,
        "name": wishlist.name,
        "userId": wishlist.user_id,
        "items": items,
    })
}

fn str_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

// =============================================================================
// Identity provider handlers
// =============================================================================

async fn oauth_token(
    State(state): State<SharedState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let state = state.lock().expect("mock state lock");
    let grant_type = params.get("grant_type").map_or("", String::as_str);

    match grant_type {
        "password" => {
            let email = params.get("username").map_or("", String::as_str);
            let password = params.get("password").map_or("", String::as_str);
            state
                .users
                .iter()
                .find(|u| u.email == email && u.password == password && !u.password.is_empty())
                .map_or_else(|| bad_request("invalid_grant"), |u| token_grant(&u.id))
        }
        "refresh_token" => {
            let refresh = params.get("refresh_token").map_or("", String::as_str);
            if state.revoked_refresh_tokens.contains(refresh) {
                return bad_request("invalid_grant");
            }
            let Some(id) = refresh.strip_prefix("ref-") else {
                return bad_request("invalid_grant");
            };
            if state.users.iter().any(|u| u.id == id) {
                token_grant(id)
            } else {
                bad_request("invalid_grant")
            }
        }
        "authorization_code" => {
            let code = params.get("code").map_or("", String::as_str);
            state
                .auth_codes
                .get(code)
                .map_or_else(|| bad_request("invalid_grant"), |id| token_grant(id))
        }
        _ => bad_request("unsupported_grant_type"),
    }
}

async fn oauth_revoke(
    State(state): State<SharedState>,
    Form(params): Form<HashMap<String, String>>,
) -> StatusCode {
    let mut state = state.lock().expect("mock state lock");
    if let Some(token) = params.get("token") {
        state.revoked_refresh_tokens.insert(token.clone());
    }
    StatusCode::OK
}

async fn register_account(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let email = str_field(&body, "email").to_string();

    if state.users.iter().any(|u| u.email == email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "email already in use"})),
        )
            .into_response();
    }

    let id = state.alloc("acct");
    let display_name = body
        .get("displayName")
        .and_then(Value::as_str)
        .map(str::to_string);
    state.users.push(MockUser {
        id: id.clone(),
        email,
        password: str_field(&body, "password").to_string(),
        display_name,
        photo_url: None,
        verified: false,
        sign_in_method: "password".to_string(),
    });
    token_grant(&id)
}

async fn account_me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state lock");
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    state
        .user_by_token(&token)
        .map_or_else(unauthorized, |u| Json(identity_json(u)).into_response())
}

async fn send_verification(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state lock");
    if authed_uid(&state, &headers).is_none() {
        return unauthorized();
    }
    StatusCode::OK.into_response()
}

// =============================================================================
// Backend handlers: users
// =============================================================================

async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().expect("mock state lock");
    if authed_uid(&state, &headers).is_none() {
        return unauthorized();
    }
    state
        .profiles
        .get(&id)
        .map_or_else(not_found, |p| Json(profile_json(&id, p)).into_response())
}

async fn create_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    // The backend trusts the bearer token for the email, not the payload.
    let email = state
        .users
        .iter()
        .find(|u| u.id == uid)
        .map(|u| u.email.clone())
        .unwrap_or_default();

    let id = str_field(&body, "id").to_string();
    *state.profile_creates.entry(id.clone()).or_insert(0) += 1;

    let profile = ProfileRec {
        email,
        username: str_field(&body, "username").to_string(),
        bio: str_field(&body, "bio").to_string(),
        avatar_url: str_field(&body, "avatarUrl").to_string(),
    };
    state.profiles.insert(id.clone(), profile.clone());
    (StatusCode::CREATED, Json(profile_json(&id, &profile))).into_response()
}

async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };
    if uid != id {
        return forbidden("you can only edit your own profile");
    }

    let Some(profile) = state.profiles.get_mut(&id) else {
        return not_found();
    };
    profile.username = str_field(&body, "username").to_string();
    profile.bio = str_field(&body, "bio").to_string();
    profile.avatar_url = str_field(&body, "avatarUrl").to_string();
    let profile = profile.clone();
    Json(profile_json(&id, &profile)).into_response()
}

// =============================================================================
// Backend handlers: wishlists
// =============================================================================

async fn list_wishlists(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let mut own: Vec<&WishlistRec> = state.wishlists.iter().filter(|w| w.user_id == uid).collect();
    own.sort_by_key(|w| w.order);
    let body: Vec<Value> = own.into_iter().map(wishlist_json).collect();
    Json(body).into_response()
}

async fn create_wishlist(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let order = u32::try_from(state.wishlists.iter().filter(|w| w.user_id == uid).count())
        .unwrap_or(u32::MAX);
    let wishlist = WishlistRec {
        id: state.alloc("w"),
        user_id: uid,
        name: str_field(&body, "name").to_string(),
        is_public: body.get("isPublic").and_then(Value::as_bool).unwrap_or(false),
        order,
    };
    state.wishlists.push(wishlist.clone());
    (StatusCode::CREATED, Json(wishlist_json(&wishlist))).into_response()
}

async fn rename_wishlist(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let Some(wishlist) = state.wishlists.iter_mut().find(|w| w.id == id) else {
        return not_found();
    };
    if wishlist.user_id != uid {
        return forbidden("not your wishlist");
    }
    wishlist.name = str_field(&body, "name").to_string();
    let wishlist = wishlist.clone();
    Json(wishlist_json(&wishlist)).into_response()
}

async fn reorder_wishlists(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Vec<Value>>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };
    if state.fail_reorder {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "reorder unavailable"})),
        )
            .into_response();
    }

    for entry in &body {
        let id = str_field(entry, "id");
        let order = entry.get("order").and_then(Value::as_u64).unwrap_or(0);
        if let Some(wishlist) = state
            .wishlists
            .iter_mut()
            .find(|w| w.id == id && w.user_id == uid)
        {
            wishlist.order = u32::try_from(order).unwrap_or(u32::MAX);
        }
    }
    StatusCode::OK.into_response()
}

async fn delete_wishlist(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let Some(wishlist) = state.wishlist(&id) else {
        return not_found();
    };
    if wishlist.user_id != uid {
        return forbidden("not your wishlist");
    }

    state.wishlists.retain(|w| w.id != id);
    state.items.retain(|i| i.wishlist_id != id);
    state.share_codes.retain(|_, wid| *wid != id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Backend handlers: items
// =============================================================================

async fn list_items(
    State(state): State<SharedState>,
    Path(wishlist_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().expect("mock state lock");
    if authed_uid(&state, &headers).is_none() {
        return unauthorized();
    }
    if state.wishlist(&wishlist_id).is_none() {
        return not_found();
    }

    let body: Vec<Value> = state
        .items
        .iter()
        .filter(|i| i.wishlist_id == wishlist_id)
        .map(item_json)
        .collect();
    Json(body).into_response()
}

async fn create_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let wishlist_id = str_field(&body, "wishlistId").to_string();
    match state.wishlist(&wishlist_id) {
        None => return not_found(),
        Some(w) if w.user_id != uid => return forbidden("not your wishlist"),
        Some(_) => {}
    }

    let item = ItemRec {
        id: state.alloc("i"),
        wishlist_id,
        name: str_field(&body, "name").to_string(),
        link: str_field(&body, "link").to_string(),
        reserved_by: None,
    };
    state.items.push(item.clone());
    (StatusCode::CREATED, Json(item_json(&item))).into_response()
}

async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let Some(owner) = state
        .item(&id)
        .and_then(|i| state.wishlist(&i.wishlist_id))
        .map(|w| w.user_id.clone())
    else {
        return not_found();
    };
    if owner != uid {
        return forbidden("not your item");
    }

    let Some(item) = state.items.iter_mut().find(|i| i.id == id) else {
        return not_found();
    };
    item.name = str_field(&body, "name").to_string();
    item.link = str_field(&body, "link").to_string();
    let item = item.clone();
    Json(item_json(&item)).into_response()
}

async fn delete_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let Some(owner) = state
        .item(&id)
        .and_then(|i| state.wishlist(&i.wishlist_id))
        .map(|w| w.user_id.clone())
    else {
        return not_found();
    };
    if owner != uid {
        return forbidden("not your item");
    }

    state.items.retain(|i| i.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn toggle_reservation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let Some((wishlist_id, owner, reserved_by)) = state
        .item(&id)
        .and_then(|i| {
            state
                .wishlist(&i.wishlist_id)
                .map(|w| (i.wishlist_id.clone(), w.user_id.clone(), i.reserved_by.clone()))
        })
    else {
        return not_found();
    };

    if owner == uid {
        return forbidden("Owners cannot reserve their own items.");
    }

    match reserved_by {
        // Reserved by the caller: release it.
        Some(holder) if holder == uid => {}
        Some(_) => return forbidden("This item is already reserved."),
        // Free: enforce one reservation per reserver per wishlist.
        None => {
            let already_holds = state
                .items
                .iter()
                .any(|i| i.wishlist_id == wishlist_id && i.reserved_by.as_deref() == Some(&uid));
            if already_holds {
                return forbidden(RESERVATION_LIMIT_MESSAGE);
            }
        }
    }

    let Some(item) = state.items.iter_mut().find(|i| i.id == id) else {
        return not_found();
    };
    item.reserved_by = match item.reserved_by {
        Some(_) => None,
        None => Some(uid),
    };
    let item = item.clone();
    Json(item_json(&item)).into_response()
}

// =============================================================================
// Backend handlers: share links
// =============================================================================

async fn generate_share_link(
    State(state): State<SharedState>,
    Path(wishlist_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    match state.wishlist(&wishlist_id) {
        None => return not_found(),
        Some(w) if w.user_id != uid => return forbidden("not your wishlist"),
        Some(_) => {}
    }

    // Reuse the existing code if one was generated before.
    let existing = state
        .share_codes
        .iter()
        .find(|(_, wid)| **wid == wishlist_id)
        .map(|(code, _)| code.clone());
    let code = existing.unwrap_or_else(|| {
        let code = Uuid::new_v4().simple().to_string();
        state.share_codes.insert(code.clone(), wishlist_id);
        code
    });

    Json(json!({"shareCode": code})).into_response()
}

async fn resolve_share_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().expect("mock state lock");

    let Some(wishlist) = state
        .share_codes
        .get(&code)
        .and_then(|wid| state.wishlist(wid))
        .cloned()
    else {
        return not_found();
    };

    // Signed-in viewers get the wishlist recorded as shared with them.
    if let Some(uid) = authed_uid(&state, &headers) {
        if uid != wishlist.user_id {
            state
                .shared_with
                .entry(uid)
                .or_default()
                .insert(wishlist.id.clone());
        }
    }

    Json(shared_wishlist_json(&state, &wishlist)).into_response()
}

async fn shared_with_me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state lock");
    let Some(uid) = authed_uid(&state, &headers) else {
        return unauthorized();
    };

    let mut groups: Vec<Value> = Vec::new();
    let shared = state.shared_with.get(&uid).cloned().unwrap_or_default();

    let mut by_owner: HashMap<String, Vec<Value>> = HashMap::new();
    for wid in &shared {
        if let Some(wishlist) = state.wishlist(wid) {
            by_owner
                .entry(wishlist.user_id.clone())
                .or_default()
                .push(shared_wishlist_json(&state, wishlist));
        }
    }

    let mut owners: Vec<String> = by_owner.keys().cloned().collect();
    owners.sort();
    for owner in owners {
        let (name, avatar) = state.profiles.get(&owner).map_or_else(
            || (owner.clone(), String::new()),
            |p| (p.username.clone(), p.avatar_url.clone()),
        );
        let wishlists = by_owner.remove(&owner).unwrap_or_default();
        groups.push(json!({
            "ownerId": owner,
            "ownerName": name,
            "ownerAvatar": avatar,
            "wishlists": wishlists,
        }));
    }

    Json(groups).into_response()
}
