use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Path prefix every route is nested under.
pub const API_PREFIX: &str = "/nudge/api/v.1.1";

/// Secret accepted by `refreshToken` when none is supplied.
pub const DEFAULT_CLIENT_SECRET: &str = "mock-secret";

/// Resource segments the server stores items for.
pub const SEGMENTS: [&str; 13] = [
    "moves",
    "sleeps",
    "workouts",
    "meals",
    "mood",
    "body_events",
    "cardiac_events",
    "generic_events",
    "friends",
    "timezone",
    "trends",
    "goals",
    "settings",
];

const SUB_RESOURCES: [&str; 3] = ["image", "snapshot", "ticks"];

#[derive(Debug, Default)]
pub struct Store {
    pub items: HashMap<String, Vec<Value>>,
    pub webhook: Option<String>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    client_secret: Arc<str>,
}

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_secret(DEFAULT_CLIENT_SECRET)
}

pub fn app_with_secret(client_secret: &str) -> Router {
    let state = AppState {
        db: Db::default(),
        client_secret: Arc::from(client_secret),
    };
    let api = Router::new()
        .route("/users/@me/refreshToken", post(refresh_token))
        .route("/users/@me/pubsub", post(subscribe).delete(unsubscribe))
        .route("/users/@me/{segment}", get(list_items).post(create_item))
        .route("/{segment}/{xid}", get(get_item).delete(delete_item))
        .route("/{segment}/{xid}/partialUpdate", post(update_item))
        .route("/{segment}/{xid}/{sub}", get(sub_resource))
        .route_layer(middleware::from_fn(require_bearer))
        .with_state(state);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Wrap `data` in the API's `{meta, data}` envelope.
pub fn envelope(code: StatusCode, data: Value) -> Value {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    json!({
        "meta": {
            "code": code.as_u16(),
            "message": code.canonical_reason().unwrap_or_default(),
            "time": time,
        },
        "data": data,
    })
}

fn reply(code: StatusCode, data: Value) -> Reply {
    (code, Json(envelope(code, data)))
}

fn failure(code: StatusCode) -> Reply {
    reply(code, json!({}))
}

fn known_segment(segment: &str) -> Result<(), Reply> {
    if SEGMENTS.contains(&segment) {
        Ok(())
    } else {
        Err(failure(StatusCode::NOT_FOUND))
    }
}

async fn require_bearer(request: Request, next: Next) -> Response {
    debug!(method = %request.method(), uri = %request.uri(), "mock request");
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());
    if !authorized {
        return failure(StatusCode::UNAUTHORIZED).into_response();
    }
    next.run(request).await
}

async fn list_items(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    let store = state.db.read().await;
    let mut items = store.items.get(&segment).cloned().unwrap_or_default();
    if let Some(limit) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        items.truncate(limit);
    }
    let size = items.len();
    Ok(reply(StatusCode::OK, json!({ "items": items, "size": size })))
}

async fn create_item(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    let mut item = Map::new();
    item.insert("xid".to_string(), Value::String(Uuid::new_v4().simple().to_string()));
    for (k, v) in fields {
        item.insert(k, Value::String(v));
    }
    let item = Value::Object(item);
    state
        .db
        .write()
        .await
        .items
        .entry(segment)
        .or_default()
        .push(item.clone());
    Ok(reply(StatusCode::CREATED, item))
}

async fn get_item(
    State(state): State<AppState>,
    Path((segment, xid)): Path<(String, String)>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    let store = state.db.read().await;
    find(&store, &segment, &xid)
        .map(|item| reply(StatusCode::OK, item.clone()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND))
}

async fn delete_item(
    State(state): State<AppState>,
    Path((segment, xid)): Path<(String, String)>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    let mut store = state.db.write().await;
    let items = store
        .items
        .get_mut(&segment)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND))?;
    let index = items
        .iter()
        .position(|item| item["xid"] == xid.as_str())
        .ok_or_else(|| failure(StatusCode::NOT_FOUND))?;
    items.remove(index);
    Ok(reply(StatusCode::OK, json!({})))
}

async fn update_item(
    State(state): State<AppState>,
    Path((segment, xid)): Path<(String, String)>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    let mut store = state.db.write().await;
    let item = store
        .items
        .get_mut(&segment)
        .and_then(|items| items.iter_mut().find(|item| item["xid"] == xid.as_str()))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND))?;
    for (k, v) in fields {
        if k != "xid" {
            item.insert(k, Value::String(v));
        }
    }
    Ok(reply(StatusCode::OK, Value::Object(item.clone())))
}

async fn sub_resource(
    State(state): State<AppState>,
    Path((segment, xid, sub)): Path<(String, String, String)>,
) -> Result<Reply, Reply> {
    known_segment(&segment)?;
    if !SUB_RESOURCES.contains(&sub.as_str()) {
        return Err(failure(StatusCode::NOT_FOUND));
    }
    let store = state.db.read().await;
    find(&store, &segment, &xid).ok_or_else(|| failure(StatusCode::NOT_FOUND))?;
    Ok(reply(
        StatusCode::OK,
        json!({ "xid": xid, "kind": sub, "items": [], "size": 0 }),
    ))
}

async fn refresh_token(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Reply {
    match fields.get("secret") {
        Some(secret) if secret.as_str() == &*state.client_secret => reply(
            StatusCode::OK,
            json!({ "refresh_token": Uuid::new_v4().simple().to_string() }),
        ),
        _ => failure(StatusCode::BAD_REQUEST),
    }
}

async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    match query.get("webhook").filter(|url| !url.is_empty()) {
        Some(url) => {
            state.db.write().await.webhook = Some(url.clone());
            reply(StatusCode::OK, json!({ "webhook": url }))
        }
        None => failure(StatusCode::BAD_REQUEST),
    }
}

async fn unsubscribe(State(state): State<AppState>) -> Reply {
    state.db.write().await.webhook = None;
    reply(StatusCode::OK, json!({}))
}

fn find<'a>(store: &'a Store, segment: &str, xid: &str) -> Option<&'a Value> {
    store
        .items
        .get(segment)?
        .iter()
        .find(|item| item["xid"] == xid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_meta_and_data() {
        let value = envelope(StatusCode::CREATED, json!({ "xid": "abc" }));
        assert_eq!(value["meta"]["code"], 201);
        assert_eq!(value["meta"]["message"], "Created");
        assert!(value["meta"]["time"].as_u64().unwrap() > 0);
        assert_eq!(value["data"]["xid"], "abc");
    }

    #[test]
    fn failure_has_empty_data() {
        let (status, Json(body)) = failure(StatusCode::NOT_FOUND);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["meta"]["code"], 404);
        assert_eq!(body["data"], json!({}));
    }

    #[test]
    fn unknown_segments_are_rejected() {
        assert!(known_segment("moves").is_ok());
        assert!(known_segment("body_events").is_ok());
        assert!(known_segment("todos").is_err());
    }

    #[test]
    fn find_matches_on_xid() {
        let mut store = Store::default();
        store.items.insert(
            "meals".to_string(),
            vec![json!({ "xid": "a", "title": "Lunch" }), json!({ "xid": "b" })],
        );
        assert_eq!(find(&store, "meals", "a").unwrap()["title"], "Lunch");
        assert!(find(&store, "meals", "c").is_none());
        assert!(find(&store, "moves", "a").is_none());
    }
}
