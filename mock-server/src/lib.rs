use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const TEST_APPLICATION_ID: &str = "test-app";
pub const TEST_API_KEY: &str = "test-key";

const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

/// Credentials the mock accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub application_id: String,
    pub api_key: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            application_id: TEST_APPLICATION_ID.to_string(),
            api_key: TEST_API_KEY.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Index {
    pub objects: BTreeMap<String, Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: u64,
    pub method: String,
    pub url: String,
    pub answer_code: u16,
    #[serde(skip)]
    kind: LogKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum LogKind {
    #[default]
    Query,
    Build,
    Error,
}

#[derive(Debug, Default)]
pub struct Store {
    pub indexes: BTreeMap<String, Index>,
    pub keys: BTreeMap<String, Value>,
    pub logs: Vec<LogEntry>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    credentials: Arc<Credentials>,
    next_task: Arc<AtomicU64>,
    /// Status checks seen so far per issued task. A task reads as published
    /// from its second check on.
    tasks: Arc<Mutex<BTreeMap<u64, u32>>>,
}

impl AppState {
    fn task_id(&self) -> u64 {
        let id = self.next_task.fetch_add(1, Ordering::Relaxed);
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, 0);
        id
    }

    /// Record one status check; `None` for a task never issued.
    fn check_task(&self, id: u64) -> Option<u32> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let checks = tasks.get_mut(&id)?;
        *checks += 1;
        Some(*checks)
    }
}

pub fn app() -> Router {
    app_with(Credentials::default())
}

pub fn app_with(credentials: Credentials) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        credentials: Arc::new(credentials),
        next_task: Arc::new(AtomicU64::new(1)),
        tasks: Arc::new(Mutex::new(BTreeMap::new())),
    };
    router(state)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/1/indexes", get(list_indexes))
        .route("/1/indexes/{name}", delete(delete_index).post(add_object))
        .route("/1/indexes/{name}/operation", post(index_operation))
        .route("/1/indexes/{name}/queries", post(multiple_queries))
        .route("/1/indexes/{name}/objects", post(get_objects))
        .route("/1/indexes/{name}/batch", post(batch))
        .route("/1/indexes/{name}/query", post(search))
        .route("/1/indexes/{name}/deleteByQuery", post(delete_by_query))
        .route("/1/indexes/{name}/settings", get(get_settings).put(set_settings))
        .route("/1/indexes/{name}/task/{task_id}", get(task_status))
        .route(
            "/1/indexes/{name}/{object_id}",
            get(get_object).put(save_object).delete(delete_object),
        )
        .route("/1/indexes/{name}/{object_id}/partial", post(partial_update))
        .route("/1/logs", get(get_logs))
        .route("/1/keys", get(list_keys).post(add_key))
        .route(
            "/1/keys/{key}",
            get(get_key).put(update_key).delete(delete_key),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), record_log))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "message": message, "status": status.as_u16() })),
    )
        .into_response()
}

async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let valid = header(APPLICATION_ID_HEADER) == Some(state.credentials.application_id.as_str())
        && header(API_KEY_HEADER) == Some(state.credentials.api_key.as_str());
    if !valid {
        return error(StatusCode::FORBIDDEN, "Invalid Application-ID or API key");
    }
    next.run(request).await
}

async fn record_log(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let url = request.uri().to_string();
    let response = next.run(request).await;

    let status = response.status();
    let kind = if status.is_client_error() || status.is_server_error() {
        LogKind::Error
    } else if method == axum::http::Method::GET
        || url.contains("/queries")
        || url.ends_with("/query")
    {
        LogKind::Query
    } else {
        LogKind::Build
    };
    // The log endpoint does not log itself.
    if !url.starts_with("/1/logs") {
        tracing::debug!(%method, %url, status = status.as_u16(), "request");
        state.store.write().await.logs.push(LogEntry {
            timestamp: now(),
            method: method.to_string(),
            url,
            answer_code: status.as_u16(),
            kind,
        });
    }
    response
}

// --- indexes ---

async fn list_indexes(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let items: Vec<Value> = store
        .indexes
        .iter()
        .map(|(name, index)| json!({ "name": name, "entries": index.objects.len() }))
        .collect();
    Json(json!({ "items": items, "nbPages": 1 }))
}

async fn delete_index(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let removed = state.store.write().await.indexes.remove(&name);
    match removed {
        Some(_) => Json(json!({ "deletedAt": now(), "taskID": state.task_id() })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Index does not exist"),
    }
}

#[derive(Deserialize)]
pub struct IndexOperation {
    pub operation: String,
    pub destination: String,
}

async fn index_operation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<IndexOperation>,
) -> Response {
    let mut store = state.store.write().await;
    let source = match input.operation.as_str() {
        "move" => store.indexes.remove(&name),
        "copy" => store.indexes.get(&name).cloned(),
        _ => return error(StatusCode::BAD_REQUEST, "Invalid operation"),
    };
    match source {
        Some(index) => {
            store.indexes.insert(input.destination, index);
            Json(json!({ "updatedAt": now(), "taskID": state.task_id() })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Index does not exist"),
    }
}

// --- queries ---

#[derive(Deserialize)]
pub struct QueriesParams {
    #[serde(default)]
    pub strategy: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub index_name: String,
    #[serde(default)]
    pub params: String,
}

#[derive(Deserialize)]
pub struct QueriesBody {
    pub requests: Vec<QueryRequest>,
}

/// Split `a=b&c=d`, percent-decoding names and values.
fn parse_params(params: &str) -> BTreeMap<String, String> {
    params
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((percent_decode(k), percent_decode(v)))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

fn matches(object: &Value, text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let needle = text.to_lowercase();
    match object {
        Value::String(s) => s.to_lowercase().contains(&needle),
        Value::Array(items) => items.iter().any(|v| matches(v, text)),
        Value::Object(map) => map.values().any(|v| matches(v, text)),
        _ => false,
    }
}

/// Matching objects of `index`, capped at the page size.
fn search_index(index: &Index, params: &BTreeMap<String, String>) -> (Vec<Value>, usize, usize) {
    let text = params.get("query").map(String::as_str).unwrap_or_default();
    let hits_per_page: usize = params
        .get("hitsPerPage")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let all: Vec<&Value> = index.objects.values().filter(|o| matches(o, text)).collect();
    let hits = all.iter().take(hits_per_page).map(|o| (*o).clone()).collect();
    (hits, all.len(), hits_per_page)
}

async fn multiple_queries(
    State(state): State<AppState>,
    Query(params): Query<QueriesParams>,
    Json(body): Json<QueriesBody>,
) -> Response {
    let strategy = params.strategy.unwrap_or_else(|| "none".to_string());
    if strategy != "none" && strategy != "stopIfEnoughMatches" {
        return error(StatusCode::BAD_REQUEST, "Invalid strategy");
    }
    let store = state.store.read().await;
    let mut results = Vec::with_capacity(body.requests.len());
    let mut enough = false;
    for request in body.requests {
        let params = parse_params(&request.params);
        let text = params.get("query").cloned().unwrap_or_default();

        if enough {
            results.push(json!({
                "index": request.index_name,
                "hits": [],
                "nbHits": 0,
                "query": text,
                "params": request.params,
                "processed": false,
            }));
            continue;
        }

        let Some(index) = store.indexes.get(&request.index_name) else {
            return error(StatusCode::NOT_FOUND, "Index does not exist");
        };
        let (hits, nb_hits, hits_per_page) = search_index(index, &params);
        if strategy == "stopIfEnoughMatches" && nb_hits >= hits_per_page {
            enough = true;
        }
        results.push(json!({
            "index": request.index_name,
            "hits": hits,
            "nbHits": nb_hits,
            "hitsPerPage": hits_per_page,
            "query": text,
            "params": request.params,
        }));
    }
    Json(json!({ "results": results })).into_response()
}

#[derive(Deserialize)]
pub struct ParamsBody {
    #[serde(default)]
    pub params: String,
}

async fn search(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<ParamsBody>,
) -> Response {
    let store = state.store.read().await;
    let Some(index) = store.indexes.get(&name) else {
        return error(StatusCode::NOT_FOUND, "Index does not exist");
    };
    let params = parse_params(&body.params);
    let (hits, nb_hits, hits_per_page) = search_index(index, &params);
    Json(json!({
        "hits": hits,
        "nbHits": nb_hits,
        "hitsPerPage": hits_per_page,
        "page": 0,
        "query": params.get("query").cloned().unwrap_or_default(),
        "params": body.params,
    }))
    .into_response()
}

async fn delete_by_query(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<ParamsBody>,
) -> Response {
    let mut store = state.store.write().await;
    let Some(index) = store.indexes.get_mut(&name) else {
        return error(StatusCode::NOT_FOUND, "Index does not exist");
    };
    let text = parse_params(&body.params)
        .remove("query")
        .unwrap_or_default();
    index.objects.retain(|_, object| !matches(object, &text));
    Json(json!({ "updatedAt": now(), "taskID": state.task_id() })).into_response()
}

// --- objects ---

fn with_object_id(mut object: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut object {
        map.insert("objectID".to_string(), Value::String(id.to_string()));
    }
    object
}

/// Copy the attributes of `update` onto `object`.
fn merge(object: &mut Value, update: Value) {
    match (object, update) {
        (Value::Object(target), Value::Object(source)) => target.extend(source),
        (object, update) => *object = update,
    }
}

async fn add_object(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(object): Json<Value>,
) -> Response {
    let id = Uuid::new_v4().simple().to_string();
    let object = with_object_id(object, &id);
    state
        .store
        .write()
        .await
        .indexes
        .entry(name)
        .or_default()
        .objects
        .insert(id.clone(), object);
    let body = json!({ "createdAt": now(), "taskID": state.task_id(), "objectID": id });
    (StatusCode::CREATED, Json(body)).into_response()
}

#[derive(Deserialize)]
pub struct ObjectParams {
    #[serde(default)]
    pub attributes: Option<String>,
}

async fn get_object(
    State(state): State<AppState>,
    Path((name, object_id)): Path<(String, String)>,
    Query(params): Query<ObjectParams>,
) -> Response {
    let store = state.store.read().await;
    let Some(index) = store.indexes.get(&name) else {
        return error(StatusCode::NOT_FOUND, "Index does not exist");
    };
    let Some(object) = index.objects.get(&object_id) else {
        return error(StatusCode::NOT_FOUND, "ObjectID does not exist");
    };
    let Some(attributes) = params.attributes else {
        return Json(object.clone()).into_response();
    };
    let wanted: Vec<&str> = attributes.split(',').map(str::trim).collect();
    let selected: Map<String, Value> = object
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(k, _)| *k == "objectID" || wanted.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Json(Value::Object(selected)).into_response()
}

async fn save_object(
    State(state): State<AppState>,
    Path((name, object_id)): Path<(String, String)>,
    Json(object): Json<Value>,
) -> Response {
    let object = with_object_id(object, &object_id);
    state
        .store
        .write()
        .await
        .indexes
        .entry(name)
        .or_default()
        .objects
        .insert(object_id.clone(), object);
    Json(json!({ "updatedAt": now(), "taskID": state.task_id(), "objectID": object_id }))
        .into_response()
}

async fn partial_update(
    State(state): State<AppState>,
    Path((name, object_id)): Path<(String, String)>,
    Json(update): Json<Value>,
) -> Response {
    let mut store = state.store.write().await;
    let object = store
        .indexes
        .entry(name)
        .or_default()
        .objects
        .entry(object_id.clone())
        .or_insert_with(|| json!({}));
    merge(object, with_object_id(update, &object_id));
    Json(json!({ "updatedAt": now(), "taskID": state.task_id(), "objectID": object_id }))
        .into_response()
}

async fn delete_object(
    State(state): State<AppState>,
    Path((name, object_id)): Path<(String, String)>,
) -> Response {
    let mut store = state.store.write().await;
    let Some(index) = store.indexes.get_mut(&name) else {
        return error(StatusCode::NOT_FOUND, "Index does not exist");
    };
    index.objects.remove(&object_id);
    Json(json!({ "deletedAt": now(), "taskID": state.task_id() })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRequest {
    pub index_name: String,
    #[serde(rename = "objectID")]
    pub object_id: String,
}

#[derive(Deserialize)]
pub struct ObjectsBody {
    pub requests: Vec<ObjectRequest>,
}

/// Missing objects come back as `null` in their slot.
async fn get_objects(State(state): State<AppState>, Json(body): Json<ObjectsBody>) -> Response {
    let store = state.store.read().await;
    let results: Vec<Value> = body
        .requests
        .iter()
        .map(|r| {
            store
                .indexes
                .get(&r.index_name)
                .and_then(|index| index.objects.get(&r.object_id))
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect();
    Json(json!({ "results": results })).into_response()
}

// --- settings and tasks ---

async fn get_settings(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let store = state.store.read().await;
    match store.indexes.get(&name) {
        Some(index) => Json(Value::Object(index.settings.clone())).into_response(),
        None => error(StatusCode::NOT_FOUND, "Index does not exist"),
    }
}

async fn set_settings(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(settings): Json<Value>,
) -> Response {
    let Value::Object(settings) = settings else {
        return error(StatusCode::BAD_REQUEST, "Settings must be an object");
    };
    state
        .store
        .write()
        .await
        .indexes
        .entry(name)
        .or_default()
        .settings
        .extend(settings);
    Json(json!({ "updatedAt": now(), "taskID": state.task_id() })).into_response()
}

async fn task_status(
    State(state): State<AppState>,
    Path((_name, task_id)): Path<(String, u64)>,
) -> Response {
    match state.check_task(task_id) {
        Some(1) => Json(json!({ "status": "notPublished", "pendingTask": true })).into_response(),
        Some(_) => Json(json!({ "status": "published", "pendingTask": false })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Task does not exist"),
    }
}

// --- batch ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAction {
    pub action: String,
    /// Required on `/1/indexes/*/batch`; defaults to the path index otherwise.
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub body: Value,
}

#[derive(Deserialize)]
pub struct BatchBody {
    pub requests: Vec<BatchAction>,
}

/// `name` is `*` for a multi-index batch, which answers with one task per
/// index; a batch on one index answers with a single task.
async fn batch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<BatchBody>,
) -> Response {
    let multi_index = name == "*";
    let mut store = state.store.write().await;
    let mut object_ids = Vec::with_capacity(body.requests.len());
    let mut tasks = Map::new();
    for request in body.requests {
        let index_name = match request.index_name {
            Some(index_name) => index_name,
            None if !multi_index => name.clone(),
            None => return error(StatusCode::BAD_REQUEST, "Missing indexName"),
        };
        let object_id = request
            .body
            .get("objectID")
            .and_then(Value::as_str)
            .map(str::to_string);
        match request.action.as_str() {
            "addObject" => {
                let id = object_id.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
                store
                    .indexes
                    .entry(index_name.clone())
                    .or_default()
                    .objects
                    .insert(id.clone(), with_object_id(request.body, &id));
                object_ids.push(id);
            }
            "updateObject" => {
                let Some(id) = object_id else {
                    return error(StatusCode::BAD_REQUEST, "Missing objectID");
                };
                store
                    .indexes
                    .entry(index_name.clone())
                    .or_default()
                    .objects
                    .insert(id.clone(), request.body);
                object_ids.push(id);
            }
            "partialUpdateObject" => {
                let Some(id) = object_id else {
                    return error(StatusCode::BAD_REQUEST, "Missing objectID");
                };
                let object = store
                    .indexes
                    .entry(index_name.clone())
                    .or_default()
                    .objects
                    .entry(id.clone())
                    .or_insert_with(|| json!({}));
                merge(object, request.body);
                object_ids.push(id);
            }
            "deleteObject" => {
                let Some(id) = object_id else {
                    return error(StatusCode::BAD_REQUEST, "Missing objectID");
                };
                if let Some(index) = store.indexes.get_mut(&index_name) {
                    index.objects.remove(&id);
                }
                object_ids.push(id);
            }
            _ => return error(StatusCode::BAD_REQUEST, "Invalid action"),
        }
        if !tasks.contains_key(&index_name) {
            tasks.insert(index_name, json!(state.task_id()));
        }
    }
    if multi_index {
        return Json(json!({ "taskID": tasks, "objectIDs": object_ids })).into_response();
    }
    let task_id = tasks
        .remove(&name)
        .unwrap_or_else(|| json!(state.task_id()));
    Json(json!({ "taskID": task_id, "objectIDs": object_ids })).into_response()
}

// --- logs ---

#[derive(Deserialize)]
pub struct LogParams {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_log_length")]
    pub length: usize,
    #[serde(default, rename = "type")]
    pub log_type: Option<String>,
}

fn default_log_length() -> usize {
    10
}

async fn get_logs(State(state): State<AppState>, Query(params): Query<LogParams>) -> Response {
    if params.length > 1000 {
        return error(StatusCode::BAD_REQUEST, "length must be <= 1000");
    }
    let filter = match params.log_type.as_deref().unwrap_or("all") {
        "all" => None,
        "query" => Some(LogKind::Query),
        "build" => Some(LogKind::Build),
        "error" => Some(LogKind::Error),
        _ => return error(StatusCode::BAD_REQUEST, "Invalid log type"),
    };
    let store = state.store.read().await;
    let logs: Vec<&LogEntry> = store
        .logs
        .iter()
        .rev()
        .filter(|entry| filter.map_or(true, |kind| entry.kind == kind))
        .skip(params.offset)
        .take(params.length)
        .collect();
    Json(json!({ "logs": logs })).into_response()
}

// --- keys ---

async fn list_keys(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let keys: Vec<Value> = store.keys.values().cloned().collect();
    Json(json!({ "keys": keys }))
}

async fn get_key(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let store = state.store.read().await;
    match store.keys.get(&key) {
        Some(value) => Json(value.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Key does not exist"),
    }
}

async fn add_key(State(state): State<AppState>, Json(parameters): Json<Value>) -> Response {
    let Value::Object(mut definition) = parameters else {
        return error(StatusCode::BAD_REQUEST, "Key parameters must be an object");
    };
    let key = Uuid::new_v4().simple().to_string();
    definition.insert("value".to_string(), Value::String(key.clone()));
    state
        .store
        .write()
        .await
        .keys
        .insert(key.clone(), Value::Object(definition));
    (
        StatusCode::CREATED,
        Json(json!({ "key": key, "createdAt": now() })),
    )
        .into_response()
}

async fn update_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(parameters): Json<Value>,
) -> Response {
    let Value::Object(mut definition) = parameters else {
        return error(StatusCode::BAD_REQUEST, "Key parameters must be an object");
    };
    let mut store = state.store.write().await;
    let Some(existing) = store.keys.get_mut(&key) else {
        return error(StatusCode::NOT_FOUND, "Key does not exist");
    };
    definition.insert("value".to_string(), Value::String(key.clone()));
    *existing = Value::Object(definition);
    Json(json!({ "key": key, "updatedAt": now() })).into_response()
}

async fn delete_key(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let removed = state.store.write().await.keys.remove(&key);
    match removed {
        Some(_) => Json(json!({ "deletedAt": now() })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Key does not exist"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_params_decodes_values() {
        let params =
            parse_params("query=red%20shoes&hitsPerPage=5&attributesToRetrieve=name%2Cprice");
        assert_eq!(params["query"], "red shoes");
        assert_eq!(params["hitsPerPage"], "5");
        assert_eq!(params["attributesToRetrieve"], "name,price");
    }

    #[test]
    fn parse_params_empty() {
        assert!(parse_params("").is_empty());
    }

    #[test]
    fn matches_searches_nested_strings_case_insensitively() {
        let object = json!({"name": "Red Shoes", "tags": ["sale", "summer"], "price": 10});
        assert!(matches(&object, "shoes"));
        assert!(matches(&object, "SUMMER"));
        assert!(!matches(&object, "winter"));
        assert!(matches(&object, ""));
    }

    #[test]
    fn batch_action_deserializes_camel_case() {
        let action: BatchAction = serde_json::from_str(
            r#"{"action":"addObject","indexName":"products","body":{"name":"x"}}"#,
        )
        .unwrap();
        assert_eq!(action.index_name.as_deref(), Some("products"));
        assert_eq!(action.body["name"], "x");

        let action: BatchAction =
            serde_json::from_str(r#"{"action":"deleteObject","body":{"objectID":"1"}}"#).unwrap();
        assert_eq!(action.index_name, None);
    }

    #[test]
    fn merge_overwrites_only_given_attributes() {
        let mut object = json!({"objectID": "1", "name": "phone", "price": 10});
        merge(&mut object, json!({"price": 12, "stock": 3}));
        assert_eq!(
            object,
            json!({"objectID": "1", "name": "phone", "price": 12, "stock": 3})
        );
    }

    #[test]
    fn tasks_publish_on_second_check() {
        let state = AppState {
            store: Arc::new(RwLock::new(Store::default())),
            credentials: Arc::new(Credentials::default()),
            next_task: Arc::new(AtomicU64::new(1)),
            tasks: Arc::new(Mutex::new(BTreeMap::new())),
        };
        let id = state.task_id();
        assert_eq!(state.check_task(id), Some(1));
        assert_eq!(state.check_task(id), Some(2));
        assert_eq!(state.check_task(id + 1), None);
    }
}
