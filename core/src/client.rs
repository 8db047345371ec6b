//! Stateless HTTP request builder and response parser for the search API.
//!
//! # Design
//! `SearchClient` holds only the application credentials. Every operation has
//! a `build_*` method producing a host-relative `HttpRequest`; `build`
//! dispatches an `Operation` to the matching builder. All successful responses
//! are JSON documents the service defines, so a single `parse_response`
//! handles every operation.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::operation::Operation;
use crate::types::{IndexQuery, LogType, Query, QueryStrategy};

pub const APPLICATION_ID_HEADER: &str = "X-Algolia-Application-Id";
pub const API_KEY_HEADER: &str = "X-Algolia-API-Key";

/// Synchronous, stateless client for the search API.
#[derive(Debug, Clone)]
pub struct SearchClient {
    application_id: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(application_id: &str, api_key: &str) -> Self {
        Self {
            application_id: application_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Build the request for any operation.
    pub fn build(&self, operation: &Operation) -> Result<HttpRequest, ApiError> {
        match operation {
            Operation::ListIndexes => Ok(self.build_list_indexes()),
            Operation::DeleteIndex { index_name } => Ok(self.build_delete_index(index_name)),
            Operation::MoveIndex {
                source,
                destination,
            } => self.build_move_index(source, destination),
            Operation::CopyIndex {
                source,
                destination,
            } => self.build_copy_index(source, destination),
            Operation::GetLogs {
                offset,
                length,
                log_type,
            } => Ok(self.build_get_logs(*offset, *length, *log_type)),
            Operation::ListUserKeys => Ok(self.build_list_user_keys()),
            Operation::GetUserKey { key } => Ok(self.build_get_user_key(key)),
            Operation::DeleteUserKey { key } => Ok(self.build_delete_user_key(key)),
            Operation::AddUserKey { parameters } => self.build_add_user_key(parameters),
            Operation::UpdateUserKey { key, parameters } => {
                self.build_update_user_key(key, parameters)
            }
            Operation::MultipleQueries { queries, strategy } => {
                self.build_multiple_queries(queries, *strategy)
            }
            Operation::Batch { actions } => self.build_batch(actions),
            Operation::Search { index_name, query } => self.build_search(index_name, query),
            Operation::AddObject {
                index_name,
                object,
                object_id,
            } => self.build_add_object(index_name, object, object_id.as_deref()),
            Operation::AddObjects {
                index_name,
                objects,
            } => self.build_index_batch(index_name, "addObject", objects),
            Operation::SaveObject { index_name, object } => {
                self.build_save_object(index_name, object)
            }
            Operation::SaveObjects {
                index_name,
                objects,
            } => self.build_index_batch(index_name, "updateObject", objects),
            Operation::PartialUpdateObject { index_name, object } => {
                self.build_partial_update_object(index_name, object)
            }
            Operation::PartialUpdateObjects {
                index_name,
                objects,
            } => self.build_index_batch(index_name, "partialUpdateObject", objects),
            Operation::GetObject {
                index_name,
                object_id,
                attributes_to_retrieve,
            } => self.build_get_object(index_name, object_id, attributes_to_retrieve),
            Operation::GetObjects {
                index_name,
                object_ids,
            } => self.build_get_objects(index_name, object_ids),
            Operation::DeleteObject {
                index_name,
                object_id,
            } => self.build_delete_object(index_name, object_id),
            Operation::DeleteObjects {
                index_name,
                object_ids,
            } => self.build_delete_objects(index_name, object_ids),
            Operation::DeleteByQuery { index_name, query } => {
                self.build_delete_by_query(index_name, query)
            }
            Operation::WaitTask {
                index_name,
                task_id,
            } => Ok(self.build_task_status(index_name, *task_id)),
            Operation::GetSettings { index_name } => Ok(self.build_get_settings(index_name)),
            Operation::SetSettings {
                index_name,
                settings,
            } => self.build_set_settings(index_name, settings),
        }
    }

    pub fn build_list_indexes(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/1/indexes".to_string(), None)
    }

    pub fn build_delete_index(&self, index_name: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("/1/indexes/{}", urlencoding::encode(index_name)),
            None,
        )
    }

    pub fn build_move_index(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build_index_operation("move", source, destination)
    }

    pub fn build_copy_index(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build_index_operation("copy", source, destination)
    }

    fn build_index_operation(
        &self,
        operation: &str,
        source: &str,
        destination: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&json!({ "operation": operation, "destination": destination }))?;
        Ok(self.request(
            HttpMethod::Post,
            format!("/1/indexes/{}/operation", urlencoding::encode(source)),
            Some(body),
        ))
    }

    pub fn build_get_logs(&self, offset: u32, length: u32, log_type: LogType) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("/1/logs?offset={offset}&length={length}&type={log_type}"),
            None,
        )
    }

    pub fn build_list_user_keys(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/1/keys".to_string(), None)
    }

    pub fn build_get_user_key(&self, key: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("/1/keys/{}", urlencoding::encode(key)),
            None,
        )
    }

    pub fn build_delete_user_key(&self, key: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("/1/keys/{}", urlencoding::encode(key)),
            None,
        )
    }

    pub fn build_add_user_key(&self, parameters: &Value) -> Result<HttpRequest, ApiError> {
        let body = encode(parameters)?;
        Ok(self.request(HttpMethod::Post, "/1/keys".to_string(), Some(body)))
    }

    pub fn build_update_user_key(
        &self,
        key: &str,
        parameters: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(parameters)?;
        Ok(self.request(
            HttpMethod::Put,
            format!("/1/keys/{}", urlencoding::encode(key)),
            Some(body),
        ))
    }

    pub fn build_multiple_queries(
        &self,
        queries: &[IndexQuery],
        strategy: QueryStrategy,
    ) -> Result<HttpRequest, ApiError> {
        let requests: Vec<Value> = queries
            .iter()
            .map(|q| json!({ "indexName": q.index_name, "params": q.query.to_params() }))
            .collect();
        let body = encode(&json!({ "requests": requests }))?;
        Ok(self.request(
            HttpMethod::Post,
            format!("/1/indexes/*/queries?strategy={strategy}"),
            Some(body),
        ))
    }

    pub fn build_batch(&self, actions: &[Value]) -> Result<HttpRequest, ApiError> {
        let body = encode(&json!({ "requests": actions }))?;
        Ok(self.request(HttpMethod::Post, "/1/indexes/*/batch".to_string(), Some(body)))
    }

    pub fn build_search(&self, index_name: &str, query: &Query) -> Result<HttpRequest, ApiError> {
        let body = encode(&json!({ "params": query.to_params() }))?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/query", index_path(index_name)),
            Some(body),
        ))
    }

    /// Without an id the service assigns one; with an id the object is
    /// stored under it.
    pub fn build_add_object(
        &self,
        index_name: &str,
        object: &Value,
        object_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(object)?;
        Ok(match object_id {
            Some(id) => self.request(
                HttpMethod::Put,
                object_path(index_name, non_empty(id)?),
                Some(body),
            ),
            None => self.request(HttpMethod::Post, index_path(index_name), Some(body)),
        })
    }

    pub fn build_save_object(
        &self,
        index_name: &str,
        object: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let id = object_id_of(object)?;
        Ok(self.request(
            HttpMethod::Put,
            object_path(index_name, id),
            Some(encode(object)?),
        ))
    }

    pub fn build_partial_update_object(
        &self,
        index_name: &str,
        object: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let id = object_id_of(object)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/partial", object_path(index_name, id)),
            Some(encode(object)?),
        ))
    }

    /// One batch against `index_name` applying `action` to every object.
    /// Actions other than `addObject` need an `objectID` in each object.
    pub fn build_index_batch(
        &self,
        index_name: &str,
        action: &str,
        objects: &[Value],
    ) -> Result<HttpRequest, ApiError> {
        let requests = objects
            .iter()
            .map(|object| {
                if action != "addObject" {
                    object_id_of(object)?;
                }
                Ok(json!({ "action": action, "body": object }))
            })
            .collect::<Result<Vec<Value>, ApiError>>()?;
        self.index_batch(index_name, requests)
    }

    pub fn build_get_object(
        &self,
        index_name: &str,
        object_id: &str,
        attributes_to_retrieve: &[String],
    ) -> Result<HttpRequest, ApiError> {
        let mut path = object_path(index_name, non_empty(object_id)?);
        if !attributes_to_retrieve.is_empty() {
            let attributes: Vec<String> = attributes_to_retrieve
                .iter()
                .map(|a| urlencoding::encode(a).into_owned())
                .collect();
            path.push_str("?attributes=");
            path.push_str(&attributes.join(","));
        }
        Ok(self.request(HttpMethod::Get, path, None))
    }

    pub fn build_get_objects(
        &self,
        index_name: &str,
        object_ids: &[String],
    ) -> Result<HttpRequest, ApiError> {
        let requests: Vec<Value> = object_ids
            .iter()
            .map(|id| json!({ "indexName": index_name, "objectID": id }))
            .collect();
        let body = encode(&json!({ "requests": requests }))?;
        Ok(self.request(
            HttpMethod::Post,
            "/1/indexes/*/objects".to_string(),
            Some(body),
        ))
    }

    pub fn build_delete_object(
        &self,
        index_name: &str,
        object_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            HttpMethod::Delete,
            object_path(index_name, non_empty(object_id)?),
            None,
        ))
    }

    pub fn build_delete_objects(
        &self,
        index_name: &str,
        object_ids: &[String],
    ) -> Result<HttpRequest, ApiError> {
        let requests = object_ids
            .iter()
            .map(|id| {
                Ok(json!({ "action": "deleteObject", "body": { "objectID": non_empty(id)? } }))
            })
            .collect::<Result<Vec<Value>, ApiError>>()?;
        self.index_batch(index_name, requests)
    }

    pub fn build_delete_by_query(
        &self,
        index_name: &str,
        query: &Query,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&json!({ "params": query.to_params() }))?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/deleteByQuery", index_path(index_name)),
            Some(body),
        ))
    }

    /// One status check for an indexing task. Waiting for publication is a
    /// loop over this request.
    pub fn build_task_status(&self, index_name: &str, task_id: u64) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{}/task/{task_id}", index_path(index_name)),
            None,
        )
    }

    pub fn build_get_settings(&self, index_name: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("{}/settings", index_path(index_name)),
            None,
        )
    }

    pub fn build_set_settings(
        &self,
        index_name: &str,
        settings: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(settings)?;
        Ok(self.request(
            HttpMethod::Put,
            format!("{}/settings", index_path(index_name)),
            Some(body),
        ))
    }

    fn index_batch(
        &self,
        index_name: &str,
        requests: Vec<Value>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&json!({ "requests": requests }))?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/batch", index_path(index_name)),
            Some(body),
        ))
    }

    /// Interpret a response to any operation.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        match response.status {
            200 | 201 => serde_json::from_str(&response.body)
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            404 => Err(ApiError::NotFound {
                message: error_message(&response.body),
            }),
            status => Err(ApiError::Http {
                status,
                message: error_message(&response.body),
            }),
        }
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            (APPLICATION_ID_HEADER.to_string(), self.application_id.clone()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

fn index_path(index_name: &str) -> String {
    format!("/1/indexes/{}", urlencoding::encode(index_name))
}

fn object_path(index_name: &str, object_id: &str) -> String {
    format!(
        "{}/{}",
        index_path(index_name),
        urlencoding::encode(object_id)
    )
}

fn non_empty(object_id: &str) -> Result<&str, ApiError> {
    if object_id.is_empty() {
        return Err(ApiError::Serialization("objectID must not be empty".to_string()));
    }
    Ok(object_id)
}

/// The `objectID` attribute an object must carry to be saved or updated.
fn object_id_of(object: &Value) -> Result<&str, ApiError> {
    let id = object
        .get("objectID")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Serialization("object is missing an objectID".to_string()))?;
    non_empty(id)
}

fn encode(value: &Value) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// The service reports failures as `{"message": "...", "status": N}`; fall
/// back to the raw body for anything else.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SearchClient {
        SearchClient::new("APPID", "secret")
    }

    fn body_json(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn every_request_carries_credentials() {
        let req = client().build_list_indexes();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/1/indexes");
        assert_eq!(req.header(APPLICATION_ID_HEADER), Some("APPID"));
        assert_eq!(req.header("x-algolia-api-key"), Some("secret"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn delete_index_encodes_name() {
        let req = client().build_delete_index("my index/v2");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "/1/indexes/my%20index%2Fv2");
    }

    #[test]
    fn move_and_copy_target_source_operation_endpoint() {
        let req = client().build_move_index("products", "products_old").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/1/indexes/products/operation");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(
            body_json(&req),
            json!({"operation": "move", "destination": "products_old"})
        );

        let req = client().build_copy_index("products", "backup").unwrap();
        assert_eq!(body_json(&req)["operation"], "copy");
    }

    #[test]
    fn get_logs_renders_query_string() {
        let req = client().build_get_logs(10, 100, LogType::Error);
        assert_eq!(req.path, "/1/logs?offset=10&length=100&type=error");
    }

    #[test]
    fn user_key_requests() {
        let c = client();
        assert_eq!(c.build_list_user_keys().path, "/1/keys");

        let get = c.build_get_user_key("abc");
        assert_eq!((get.method, get.path.as_str()), (HttpMethod::Get, "/1/keys/abc"));

        let delete = c.build_delete_user_key("abc");
        assert_eq!(
            (delete.method, delete.path.as_str()),
            (HttpMethod::Delete, "/1/keys/abc")
        );

        let params = json!({"acl": ["search"], "validity": 3600});
        let add = c.build_add_user_key(&params).unwrap();
        assert_eq!((add.method, add.path.as_str()), (HttpMethod::Post, "/1/keys"));
        assert_eq!(body_json(&add), params);

        let update = c.build_update_user_key("abc", &params).unwrap();
        assert_eq!(
            (update.method, update.path.as_str()),
            (HttpMethod::Put, "/1/keys/abc")
        );
    }

    #[test]
    fn build_routes_get_user_key_to_get() {
        let req = client()
            .build(&Operation::GetUserKey { key: "abc".into() })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
    }

    #[test]
    fn multiple_queries_body_and_strategy() {
        let queries = vec![
            IndexQuery::new("products", Query::new("phone").set("hitsPerPage", "2")),
            IndexQuery::new("articles", Query::default()),
        ];
        let req = client()
            .build_multiple_queries(&queries, QueryStrategy::StopIfEnoughMatches)
            .unwrap();
        assert_eq!(req.path, "/1/indexes/*/queries?strategy=stopIfEnoughMatches");
        assert_eq!(
            body_json(&req),
            json!({"requests": [
                {"indexName": "products", "params": "query=phone&hitsPerPage=2"},
                {"indexName": "articles", "params": ""}
            ]})
        );
    }

    #[test]
    fn batch_wraps_actions() {
        let actions = vec![json!({
            "action": "addObject",
            "indexName": "products",
            "body": {"name": "x"}
        })];
        let req = client().build_batch(&actions).unwrap();
        assert_eq!(req.path, "/1/indexes/*/batch");
        assert_eq!(body_json(&req), json!({ "requests": actions }));
    }

    #[test]
    fn search_posts_params_to_index() {
        let query = Query::new("red phone").set("hitsPerPage", "5");
        let req = client().build_search("my products", &query).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/1/indexes/my%20products/query");
        assert_eq!(
            body_json(&req),
            json!({"params": "query=red%20phone&hitsPerPage=5"})
        );
    }

    #[test]
    fn add_object_with_and_without_id() {
        let c = client();
        let object = json!({"name": "phone"});

        let req = c.build_add_object("products", &object, None).unwrap();
        assert_eq!((req.method, req.path.as_str()), (HttpMethod::Post, "/1/indexes/products"));
        assert_eq!(body_json(&req), object);

        let req = c.build_add_object("products", &object, Some("a/1")).unwrap();
        assert_eq!(
            (req.method, req.path.as_str()),
            (HttpMethod::Put, "/1/indexes/products/a%2F1")
        );

        let err = c.build_add_object("products", &object, Some("")).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn save_and_partial_update_use_object_id() {
        let c = client();
        let object = json!({"objectID": "42", "price": 10});

        let save = c.build_save_object("products", &object).unwrap();
        assert_eq!(
            (save.method, save.path.as_str()),
            (HttpMethod::Put, "/1/indexes/products/42")
        );

        let partial = c.build_partial_update_object("products", &object).unwrap();
        assert_eq!(
            (partial.method, partial.path.as_str()),
            (HttpMethod::Post, "/1/indexes/products/42/partial")
        );

        let err = c.build_save_object("products", &json!({"price": 10})).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn multi_object_writes_become_index_batches() {
        let c = client();
        let objects = vec![json!({"name": "a"}), json!({"name": "b"})];
        let req = c
            .build(&Operation::AddObjects {
                index_name: "products".into(),
                objects: objects.clone(),
            })
            .unwrap();
        assert_eq!(req.path, "/1/indexes/products/batch");
        assert_eq!(
            body_json(&req),
            json!({"requests": [
                {"action": "addObject", "body": {"name": "a"}},
                {"action": "addObject", "body": {"name": "b"}}
            ]})
        );

        // Saving needs an id on every object.
        let err = c
            .build(&Operation::SaveObjects {
                index_name: "products".into(),
                objects,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));

        let req = c
            .build_delete_objects("products", &["1".to_string(), "2".to_string()])
            .unwrap();
        assert_eq!(
            body_json(&req)["requests"][1],
            json!({"action": "deleteObject", "body": {"objectID": "2"}})
        );
    }

    #[test]
    fn get_object_requests() {
        let c = client();
        let req = c.build_get_object("products", "42", &[]).unwrap();
        assert_eq!((req.method, req.path.as_str()), (HttpMethod::Get, "/1/indexes/products/42"));

        let attributes = vec!["name".to_string(), "unit price".to_string()];
        let req = c.build_get_object("products", "42", &attributes).unwrap();
        assert_eq!(req.path, "/1/indexes/products/42?attributes=name,unit%20price");

        let req = c
            .build_get_objects("products", &["1".to_string(), "2".to_string()])
            .unwrap();
        assert_eq!(req.path, "/1/indexes/*/objects");
        assert_eq!(
            body_json(&req),
            json!({"requests": [
                {"indexName": "products", "objectID": "1"},
                {"indexName": "products", "objectID": "2"}
            ]})
        );
    }

    #[test]
    fn delete_requests_target_index_paths() {
        let c = client();
        let req = c.build_delete_object("products", "42").unwrap();
        assert_eq!(
            (req.method, req.path.as_str()),
            (HttpMethod::Delete, "/1/indexes/products/42")
        );
        assert!(c.build_delete_object("products", "").is_err());

        let req = c
            .build_delete_by_query("products", &Query::new("phone"))
            .unwrap();
        assert_eq!(req.path, "/1/indexes/products/deleteByQuery");
        assert_eq!(body_json(&req), json!({"params": "query=phone"}));
    }

    #[test]
    fn task_and_settings_requests() {
        let c = client();
        let task = c.build_task_status("products", 17);
        assert_eq!(
            (task.method, task.path.as_str()),
            (HttpMethod::Get, "/1/indexes/products/task/17")
        );

        let get = c.build_get_settings("products");
        assert_eq!(get.path, "/1/indexes/products/settings");

        let settings = json!({"attributesToIndex": ["name"]});
        let set = c.build_set_settings("products", &settings).unwrap();
        assert_eq!(set.method, HttpMethod::Put);
        assert_eq!(body_json(&set), settings);
    }

    #[test]
    fn parse_success_returns_body_unchanged() {
        let body = r#"{"deletedAt":"2015-01-01T00:00:00Z","taskID":42}"#;
        let value = client().parse_response(HttpResponse::new(200, body)).unwrap();
        assert_eq!(value["taskID"], 42);
        assert_eq!(value, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn parse_created_is_success() {
        let value = client()
            .parse_response(HttpResponse::new(201, r#"{"key":"k1"}"#))
            .unwrap();
        assert_eq!(value["key"], "k1");
    }

    #[test]
    fn parse_not_found_extracts_message() {
        let err = client()
            .parse_response(HttpResponse::new(
                404,
                r#"{"message":"Index does not exist","status":404}"#,
            ))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound {
                message: "Index does not exist".to_string()
            }
        );
    }

    #[test]
    fn parse_error_with_plain_body() {
        let err = client()
            .parse_response(HttpResponse::new(503, "unavailable"))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 503,
                message: "unavailable".to_string()
            }
        );
    }

    #[test]
    fn parse_bad_json() {
        let err = client()
            .parse_response(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
