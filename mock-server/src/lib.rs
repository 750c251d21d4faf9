use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Account accepted by `POST /token`.
pub const DEMO_EMAIL: &str = "traveler@example.com";
pub const DEMO_PASSWORD: &str = "secret";
/// Facebook token accepted by `POST /token`.
pub const DEMO_FB_TOKEN: &str = "fb-ok";

pub const CODE_INVALID_CREDENTIALS: i64 = 1001;
pub const CODE_UNAUTHENTICATED: i64 = 1002;
pub const CODE_TRAVEL_NOT_FOUND: i64 = 2001;
pub const CODE_INVALID_PAYLOAD: i64 = 2002;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Travel {
    pub id: i64,
    pub author: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub travel: i64,
    pub text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum TokenRequest {
    Email { email: String, password: String },
    Facebook {
        #[serde(rename = "fbToken")]
        fb_token: String,
    },
}

#[derive(Deserialize)]
pub struct TravelInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct CommentInput {
    pub text: String,
}

#[derive(Deserialize)]
pub struct Page {
    pub minimized: Option<u8>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Id of the single user every valid token belongs to.
pub const DEMO_USER_ID: i64 = 1;

#[derive(Default)]
pub struct Store {
    next_id: i64,
    tokens: HashSet<String>,
    travels: BTreeMap<i64, Travel>,
    comments: Vec<Comment>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

/// The service's structured error reply: `{"error": ..., "code": ...}`.
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: &'static str,
    pub code: i64,
}

impl ApiFailure {
    const fn new(status: StatusCode, message: &'static str, code: i64) -> Self {
        Self {
            status,
            message,
            code,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.message, "code": self.code })),
        )
            .into_response()
    }
}

fn travel_not_found() -> ApiFailure {
    ApiFailure::new(StatusCode::NOT_FOUND, "travel not found", CODE_TRAVEL_NOT_FOUND)
}

/// Accept only `Authorization: Token <issued token>`.
fn require_auth(headers: &HeaderMap, store: &Store) -> Result<(), ApiFailure> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "));
    match token {
        Some(token) if store.tokens.contains(token) => Ok(()),
        _ => Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "authentication required",
            CODE_UNAUTHENTICATED,
        )),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/token", post(issue_token))
        .route("/user", get(current_user).post(register_user))
        .route("/email/confirm/{email}", post(confirm_email))
        .route("/user/{id}/travels", get(published_by_author))
        .route("/travel", post(create_travel))
        .route(
            "/travel/{id}",
            get(get_travel).put(update_travel).delete(delete_travel),
        )
        .route("/travel/{id}/comment", post(add_comment))
        .route("/travel/{id}/comments", get(list_comments))
        .route("/image", post(upload_image))
        .route("/stats", get(stats))
        .route("/debug/status/{code}", get(debug_status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock HopTrip API listening");
    }
    axum::serve(listener, app()).await
}

async fn issue_token(
    State(db): State<Db>,
    Json(input): Json<TokenRequest>,
) -> Result<Json<Value>, ApiFailure> {
    let valid = match &input {
        TokenRequest::Email { email, password } => email == DEMO_EMAIL && password == DEMO_PASSWORD,
        TokenRequest::Facebook { fb_token } => fb_token == DEMO_FB_TOKEN,
    };
    if !valid {
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "invalid credentials",
            CODE_INVALID_CREDENTIALS,
        ));
    }
    let token = Uuid::new_v4().simple().to_string();
    db.write().await.tokens.insert(token.clone());
    Ok(Json(json!({ "token": token })))
}

async fn register_user(State(db): State<Db>, Json(user): Json<Value>) -> Json<Value> {
    let id = db.write().await.next_id();
    Json(json!({ "id": id, "user": user }))
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    require_auth(&headers, &*db.read().await)?;
    Ok(Json(json!({ "id": DEMO_USER_ID, "email": DEMO_EMAIL })))
}

async fn confirm_email(Path(email): Path<String>) -> Json<Value> {
    Json(json!({ "confirmed": email }))
}

async fn published_by_author(
    State(db): State<Db>,
    Path(author): Path<i64>,
    Query(page): Query<Page>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let minimized = page.minimized.unwrap_or(1) == 1;
    let travels = store
        .travels
        .values()
        .filter(|t| t.author == author)
        .skip(page.offset.unwrap_or(0))
        .take(page.limit.unwrap_or(10))
        .map(|t| {
            if minimized {
                json!({ "id": t.id, "title": t.title })
            } else {
                json!(t)
            }
        })
        .collect();
    Json(travels)
}

async fn create_travel(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let mut store = db.write().await;
    require_auth(&headers, &store)?;
    let input: TravelInput = serde_json::from_value(input).map_err(|_| {
        ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "travel needs a title",
            CODE_INVALID_PAYLOAD,
        )
    })?;
    let id = store.next_id();
    store.travels.insert(
        id,
        Travel {
            id,
            author: DEMO_USER_ID,
            title: input.title,
            description: input.description,
        },
    );
    Ok(Json(json!({ "id": id })))
}

async fn get_travel(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Travel>, ApiFailure> {
    let store = db.read().await;
    store.travels.get(&id).cloned().map(Json).ok_or_else(travel_not_found)
}

async fn update_travel(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<TravelInput>,
) -> Result<Json<Travel>, ApiFailure> {
    let mut store = db.write().await;
    require_auth(&headers, &store)?;
    let travel = store.travels.get_mut(&id).ok_or_else(travel_not_found)?;
    travel.title = input.title;
    travel.description = input.description;
    Ok(Json(travel.clone()))
}

async fn delete_travel(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    require_auth(&headers, &store)?;
    store
        .travels
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(travel_not_found)
}

async fn add_comment(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(travel): Path<i64>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Value>, ApiFailure> {
    let mut store = db.write().await;
    require_auth(&headers, &store)?;
    if !store.travels.contains_key(&travel) {
        return Err(travel_not_found());
    }
    let id = store.next_id();
    store.comments.push(Comment {
        id,
        travel,
        text: input.text,
    });
    Ok(Json(json!({ "id": id })))
}

async fn list_comments(
    State(db): State<Db>,
    Path(travel): Path<i64>,
    Query(page): Query<Page>,
) -> Json<Vec<Comment>> {
    let store = db.read().await;
    let comments = store
        .comments
        .iter()
        .filter(|c| c.travel == travel)
        .skip(page.offset.unwrap_or(0))
        .take(page.limit.unwrap_or(10))
        .cloned()
        .collect();
    Json(comments)
}

async fn upload_image(body: Bytes) -> Json<Value> {
    Json(json!({ "size": body.len() }))
}

async fn stats(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(json!({
        "travels": store.travels.len(),
        "comments": store.comments.len(),
    }))
}

/// Replies with the requested status and a plain-text body.
async fn debug_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("debug status {}", status.as_u16())).into_response()
}
