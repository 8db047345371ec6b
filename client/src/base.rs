//! Synchronous base client.
//!
//! # Design
//! `SyncApi` is the blocking call the dispatcher runs on a worker: one
//! `Operation` in, one `CallOutcome` out. `BlockingClient` implements it by
//! building the request with `search_core::SearchClient`, sending it to each
//! configured host in order until one answers, and parsing the answer.
//!
//! A host is skipped when the transport fails or the answer is a 5xx; any
//! other answer, including 4xx, is final.
//!
//! `Operation::WaitTask` is the one call made of several requests: the task
//! status is checked until it reads `published`, sleeping between checks with
//! a doubling delay. It occupies its worker for the whole wait.

use std::time::Duration;

use search_core::{
    ApiError, CallOutcome, HttpRequest, IndexQuery, LogType, Operation, Query, QueryStrategy,
    SearchClient,
};
use serde_json::Value;

use crate::config::{ClientConfig, MAX_TASK_POLL_INTERVAL};
use crate::transport::{Transport, UreqTransport};

/// A blocking executor for remote operations.
pub trait SyncApi: Send + Sync + 'static {
    fn execute(&self, operation: &Operation) -> CallOutcome;
}

#[derive(Debug, Clone)]
pub struct BlockingClient<T = UreqTransport> {
    core: SearchClient,
    hosts: Vec<String>,
    task_poll_interval: Duration,
    transport: T,
}

impl BlockingClient<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> BlockingClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            core: SearchClient::new(&config.application_id, &config.api_key),
            hosts: config.resolved_hosts(),
            task_poll_interval: config.task_poll_interval,
            transport,
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn list_indexes(&self) -> CallOutcome {
        self.execute(&Operation::ListIndexes)
    }

    pub fn delete_index(&self, index_name: &str) -> CallOutcome {
        self.execute(&Operation::DeleteIndex {
            index_name: index_name.to_string(),
        })
    }

    pub fn move_index(&self, source: &str, destination: &str) -> CallOutcome {
        self.execute(&Operation::MoveIndex {
            source: source.to_string(),
            destination: destination.to_string(),
        })
    }

    pub fn copy_index(&self, source: &str, destination: &str) -> CallOutcome {
        self.execute(&Operation::CopyIndex {
            source: source.to_string(),
            destination: destination.to_string(),
        })
    }

    pub fn get_logs(&self, offset: u32, length: u32, log_type: LogType) -> CallOutcome {
        self.execute(&Operation::GetLogs {
            offset,
            length,
            log_type,
        })
    }

    pub fn list_user_keys(&self) -> CallOutcome {
        self.execute(&Operation::ListUserKeys)
    }

    pub fn get_user_key(&self, key: &str) -> CallOutcome {
        self.execute(&Operation::GetUserKey {
            key: key.to_string(),
        })
    }

    pub fn delete_user_key(&self, key: &str) -> CallOutcome {
        self.execute(&Operation::DeleteUserKey {
            key: key.to_string(),
        })
    }

    pub fn add_user_key(&self, parameters: Value) -> CallOutcome {
        self.execute(&Operation::AddUserKey { parameters })
    }

    pub fn update_user_key(&self, key: &str, parameters: Value) -> CallOutcome {
        self.execute(&Operation::UpdateUserKey {
            key: key.to_string(),
            parameters,
        })
    }

    pub fn multiple_queries(
        &self,
        queries: Vec<IndexQuery>,
        strategy: QueryStrategy,
    ) -> CallOutcome {
        self.execute(&Operation::MultipleQueries { queries, strategy })
    }

    pub fn batch(&self, actions: Vec<Value>) -> CallOutcome {
        self.execute(&Operation::Batch { actions })
    }

    pub fn search(&self, index_name: &str, query: Query) -> CallOutcome {
        self.execute(&Operation::Search {
            index_name: index_name.to_string(),
            query,
        })
    }

    pub fn add_object(&self, index_name: &str, object: Value) -> CallOutcome {
        self.execute(&Operation::AddObject {
            index_name: index_name.to_string(),
            object,
            object_id: None,
        })
    }

    pub fn save_object(&self, index_name: &str, object: Value) -> CallOutcome {
        self.execute(&Operation::SaveObject {
            index_name: index_name.to_string(),
            object,
        })
    }

    pub fn get_object(&self, index_name: &str, object_id: &str) -> CallOutcome {
        self.execute(&Operation::GetObject {
            index_name: index_name.to_string(),
            object_id: object_id.to_string(),
            attributes_to_retrieve: Vec::new(),
        })
    }

    pub fn delete_object(&self, index_name: &str, object_id: &str) -> CallOutcome {
        self.execute(&Operation::DeleteObject {
            index_name: index_name.to_string(),
            object_id: object_id.to_string(),
        })
    }

    pub fn wait_task(&self, index_name: &str, task_id: u64) -> CallOutcome {
        self.execute(&Operation::WaitTask {
            index_name: index_name.to_string(),
            task_id,
        })
    }

    pub fn get_settings(&self, index_name: &str) -> CallOutcome {
        self.execute(&Operation::GetSettings {
            index_name: index_name.to_string(),
        })
    }

    pub fn set_settings(&self, index_name: &str, settings: Value) -> CallOutcome {
        self.execute(&Operation::SetSettings {
            index_name: index_name.to_string(),
            settings,
        })
    }

    /// Check the task status until it is published and return the final
    /// status document.
    fn wait_for_task(&self, operation: &Operation, index_name: &str, task_id: u64) -> CallOutcome {
        let request = self.core.build_task_status(index_name, task_id);
        let mut delay = self.task_poll_interval;
        loop {
            let status = self.send(operation, &request)?;
            if status.get("status").and_then(Value::as_str) == Some("published") {
                return Ok(status);
            }
            tracing::debug!(
                index = index_name,
                task_id,
                delay_ms = delay.as_millis() as u64,
                "task not published yet"
            );
            std::thread::sleep(delay);
            delay = (delay * 2).min(MAX_TASK_POLL_INTERVAL);
        }
    }

    fn send(&self, operation: &Operation, request: &HttpRequest) -> CallOutcome {
        let mut last_failure = String::from("no hosts configured");

        for host in &self.hosts {
            match self.transport.send(host, request) {
                Ok(response) if response.status >= 500 => {
                    tracing::warn!(
                        operation = %operation.kind(),
                        host = %host,
                        status = response.status,
                        "host answered with server error, trying next host"
                    );
                    last_failure = format!("{host}: HTTP {}", response.status);
                }
                Ok(response) => return self.core.parse_response(response),
                Err(e) => {
                    tracing::warn!(
                        operation = %operation.kind(),
                        error = %e,
                        "host unreachable, trying next host"
                    );
                    last_failure = e.to_string();
                }
            }
        }

        Err(ApiError::Transport(last_failure))
    }
}

impl<T: Transport> SyncApi for BlockingClient<T> {
    fn execute(&self, operation: &Operation) -> CallOutcome {
        if let Operation::WaitTask {
            index_name,
            task_id,
        } = operation
        {
            return self.wait_for_task(operation, index_name, *task_id);
        }
        let request = self.core.build(operation)?;
        self.send(operation, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use search_core::{HttpMethod, HttpRequest, HttpResponse};
    use serde_json::json;

    use crate::transport::TransportError;

    /// Answers per host from a fixed script and records every attempt.
    struct ScriptedTransport {
        answers: Vec<(&'static str, Result<(u16, &'static str), &'static str>)>,
        attempts: Mutex<Vec<(String, HttpRequest)>>,
    }

    impl ScriptedTransport {
        fn new(answers: Vec<(&'static str, Result<(u16, &'static str), &'static str>)>) -> Self {
            Self {
                answers,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempted_hosts(&self) -> Vec<String> {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .map(|(h, _)| h.clone())
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.attempts
                .lock()
                .unwrap()
                .push((host.to_string(), request.clone()));
            let (_, answer) = self
                .answers
                .iter()
                .find(|(h, _)| *h == host)
                .expect("unscripted host");
            match answer {
                Ok((status, body)) => Ok(HttpResponse::new(*status, *body)),
                Err(message) => Err(TransportError {
                    host: host.to_string(),
                    message: message.to_string(),
                }),
            }
        }
    }

    fn config(hosts: &[&str]) -> ClientConfig {
        ClientConfig::new("APPID", "secret").with_hosts(hosts.iter().copied())
    }

    #[test]
    fn first_healthy_host_answers() {
        let transport = ScriptedTransport::new(vec![("http://a", Ok((200, r#"{"items":[]}"#)))]);
        let client = BlockingClient::with_transport(&config(&["http://a"]), transport);
        assert_eq!(client.list_indexes().unwrap(), json!({"items": []}));
        assert_eq!(client.transport.attempted_hosts(), vec!["http://a"]);
    }

    #[test]
    fn fails_over_on_transport_error_and_server_error() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Err("connection refused")),
            ("http://b", Ok((503, "busy"))),
            ("http://c", Ok((200, r#"{"deletedAt":1}"#))),
        ]);
        let hosts = ["http://a", "http://b", "http://c"];
        let client = BlockingClient::with_transport(&config(&hosts), transport);
        assert_eq!(client.delete_index("products").unwrap(), json!({"deletedAt": 1}));
        assert_eq!(
            client.transport.attempted_hosts(),
            vec!["http://a", "http://b", "http://c"]
        );
    }

    #[test]
    fn client_errors_do_not_fail_over() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Ok((404, r#"{"message":"Index does not exist","status":404}"#))),
            ("http://b", Ok((200, "{}"))),
        ]);
        let client = BlockingClient::with_transport(&config(&["http://a", "http://b"]), transport);
        let err = client.delete_index("products").unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound {
                message: "Index does not exist".to_string()
            }
        );
        assert_eq!(client.transport.attempted_hosts(), vec!["http://a"]);
    }

    #[test]
    fn all_hosts_down_reports_last_failure() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Err("timed out")),
            ("http://b", Err("connection refused")),
        ]);
        let client = BlockingClient::with_transport(&config(&["http://a", "http://b"]), transport);
        let err = client.list_user_keys().unwrap_err();
        assert_eq!(
            err,
            ApiError::Transport("http://b: connection refused".to_string())
        );
    }

    /// Answers task status checks from a fixed sequence of bodies.
    struct TaskTransport {
        statuses: Mutex<Vec<&'static str>>,
        checks: Mutex<usize>,
    }

    impl Transport for TaskTransport {
        fn send(&self, _host: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            assert_eq!(request.path, "/1/indexes/products/task/7");
            *self.checks.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let body = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            };
            Ok(HttpResponse::new(200, body))
        }
    }

    #[test]
    fn wait_task_checks_until_published() {
        let transport = TaskTransport {
            statuses: Mutex::new(vec![
                r#"{"status":"notPublished"}"#,
                r#"{"status":"notPublished"}"#,
                r#"{"status":"published","pendingTask":false}"#,
            ]),
            checks: Mutex::new(0),
        };
        let config = config(&["http://a"]).with_task_poll_interval(Duration::from_millis(1));
        let client = BlockingClient::with_transport(&config, transport);
        let status = client.wait_task("products", 7).unwrap();
        assert_eq!(status["status"], "published");
        assert_eq!(*client.transport.checks.lock().unwrap(), 3);
    }

    #[test]
    fn wait_task_stops_on_error() {
        let transport = ScriptedTransport::new(vec![(
            "http://a",
            Ok((404, r#"{"message":"Task does not exist","status":404}"#)),
        )]);
        let client = BlockingClient::with_transport(&config(&["http://a"]), transport);
        let err = client.wait_task("products", 7).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(client.transport.attempted_hosts().len(), 1);
    }

    #[test]
    fn dsn_host_is_tried_before_configured_hosts() {
        let transport = ScriptedTransport::new(vec![
            ("http://dsn", Err("connection refused")),
            ("http://a", Ok((200, r#"{"items":[]}"#))),
        ]);
        let config = config(&["http://a"]).with_dsn(true).with_dsn_host("http://dsn");
        let client = BlockingClient::with_transport(&config, transport);
        client.list_indexes().unwrap();
        assert_eq!(client.transport.attempted_hosts(), vec!["http://dsn", "http://a"]);
    }

    #[test]
    fn get_user_key_sends_get_not_delete() {
        let transport = ScriptedTransport::new(vec![("http://a", Ok((200, r#"{"value":"k"}"#)))]);
        let client = BlockingClient::with_transport(&config(&["http://a"]), transport);
        client.get_user_key("k").unwrap();
        let attempts = client.transport.attempts.lock().unwrap();
        assert_eq!(attempts[0].1.method, HttpMethod::Get);
        assert_eq!(attempts[0].1.path, "/1/keys/k");
    }
}
