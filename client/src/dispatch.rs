//! Asynchronous facade over a `SyncApi`.
//!
//! # Design
//! Every `*_async` method wraps its arguments in an `Operation` and hands it
//! to `submit`, which returns immediately. The blocking call runs as one
//! `spawn_blocking` task; its outcome, including a panic converted into
//! `ApiError::Dispatch`, goes to `Delivery` exactly once. Calls are
//! independent: no ordering between them, no cancellation, no retries here.
//!
//! The tokio runtime is either owned by the client (`new`, `from_config`) or
//! borrowed from the caller (`with_handle`). An owned runtime waits for
//! in-flight calls when the client is dropped, so dropping the client from
//! inside another runtime's async context is not allowed.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use search_core::{ApiError, CallOutcome, IndexQuery, LogType, Operation, QueryStrategy};
use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::base::{BlockingClient, SyncApi};
use crate::config::{ClientConfig, ConfigError};
use crate::delivery::Delivery;
use crate::index::Index;
use crate::listener::Listener;

enum Executor {
    Owned(Runtime),
    Shared(Handle),
}

impl Executor {
    fn handle(&self) -> &Handle {
        match self {
            Executor::Owned(runtime) => runtime.handle(),
            Executor::Shared(handle) => handle,
        }
    }
}

/// Runs calls in the background and reports each outcome to a listener.
///
/// Outcomes are delivered on the dispatch worker by default, not on the
/// thread that made the call. A caller that must observe results on its own
/// thread, such as a UI loop, installs `Delivery::Queue` with `with_delivery`
/// and drains the matching `CallbackQueue` from that thread.
pub struct AsyncClient<A: SyncApi = BlockingClient> {
    api: Arc<A>,
    executor: Executor,
    delivery: Delivery,
}

impl AsyncClient<BlockingClient> {
    /// Blocking client over `ureq` plus an owned dispatch runtime.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(BlockingClient::new(config), config.workers)
    }
}

impl<A: SyncApi> AsyncClient<A> {
    /// Dispatch on an owned runtime running at most `workers` calls at once.
    pub fn new(api: A, workers: usize) -> Result<Self, ConfigError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers.max(1))
            .thread_name("search-dispatch")
            .enable_all()
            .build()?;
        Ok(Self {
            api: Arc::new(api),
            executor: Executor::Owned(runtime),
            delivery: Delivery::default(),
        })
    }

    /// Dispatch on the blocking pool of an existing runtime.
    pub fn with_handle(api: A, handle: Handle) -> Self {
        Self {
            api: Arc::new(api),
            executor: Executor::Shared(handle),
            delivery: Delivery::default(),
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Handle for the calls scoped to `name`. No request is made.
    pub fn init_index(&self, name: &str) -> Index<'_, A> {
        Index::new(self, name)
    }

    /// The synchronous client, for callers that want to block.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run `operation` in the background and deliver its outcome to
    /// `listener`. The call runs even when there is no listener.
    pub fn submit(&self, operation: Operation, listener: impl Into<Option<Listener>>) {
        let listener = listener.into();
        let api = Arc::clone(&self.api);
        let delivery = self.delivery.clone();
        tracing::debug!(
            operation = %operation.kind(),
            listener = listener.is_some(),
            "submitting call"
        );

        // The join handle is dropped: delivery is the only completion signal.
        drop(self.executor.handle().spawn_blocking(move || {
            let outcome = run(api.as_ref(), &operation);
            delivery.deliver(listener, operation, outcome);
        }));
    }

    /// Run `operation` in the background and await its outcome.
    pub async fn call(&self, operation: Operation) -> CallOutcome {
        let api = Arc::clone(&self.api);
        self.executor
            .handle()
            .spawn_blocking(move || run(api.as_ref(), &operation))
            .await
            .unwrap_or_else(|e| Err(ApiError::Dispatch(e.to_string())))
    }

    pub fn list_indexes_async(&self, listener: impl Into<Option<Listener>>) {
        self.submit(Operation::ListIndexes, listener)
    }

    pub fn delete_index_async(&self, index_name: &str, listener: impl Into<Option<Listener>>) {
        self.submit(
            Operation::DeleteIndex {
                index_name: index_name.to_string(),
            },
            listener,
        )
    }

    /// Rename `source` to `destination`; an existing destination is replaced.
    pub fn move_index_async(
        &self,
        source: &str,
        destination: &str,
        listener: impl Into<Option<Listener>>,
    ) {
        self.submit(
            Operation::MoveIndex {
                source: source.to_string(),
                destination: destination.to_string(),
            },
            listener,
        )
    }

    /// Copy `source` into `destination`; an existing destination is replaced.
    pub fn copy_index_async(
        &self,
        source: &str,
        destination: &str,
        listener: impl Into<Option<Listener>>,
    ) {
        self.submit(
            Operation::CopyIndex {
                source: source.to_string(),
                destination: destination.to_string(),
            },
            listener,
        )
    }

    /// `offset` 0 is the most recent entry; the service caps `length` at 1000.
    pub fn get_logs_async(
        &self,
        offset: u32,
        length: u32,
        log_type: LogType,
        listener: impl Into<Option<Listener>>,
    ) {
        self.submit(
            Operation::GetLogs {
                offset,
                length,
                log_type,
            },
            listener,
        )
    }

    pub fn list_user_keys_async(&self, listener: impl Into<Option<Listener>>) {
        self.submit(Operation::ListUserKeys, listener)
    }

    pub fn get_user_key_async(&self, key: &str, listener: impl Into<Option<Listener>>) {
        self.submit(
            Operation::GetUserKey {
                key: key.to_string(),
            },
            listener,
        )
    }

    pub fn delete_user_key_async(&self, key: &str, listener: impl Into<Option<Listener>>) {
        self.submit(
            Operation::DeleteUserKey {
                key: key.to_string(),
            },
            listener,
        )
    }

    pub fn add_user_key_async(&self, parameters: Value, listener: impl Into<Option<Listener>>) {
        self.submit(Operation::AddUserKey { parameters }, listener)
    }

    /// `parameters` may hold `acl`, `indexes`, `validity`, `referrers`,
    /// `description`, `maxHitsPerQuery`, `queryParameters` and
    /// `maxQueriesPerIPPerHour`.
    pub fn update_user_key_async(
        &self,
        key: &str,
        parameters: Value,
        listener: impl Into<Option<Listener>>,
    ) {
        self.submit(
            Operation::UpdateUserKey {
                key: key.to_string(),
                parameters,
            },
            listener,
        )
    }

    pub fn multiple_queries_async(
        &self,
        queries: Vec<IndexQuery>,
        listener: impl Into<Option<Listener>>,
    ) {
        self.multiple_queries_with_strategy_async(queries, QueryStrategy::None, listener)
    }

    pub fn multiple_queries_with_strategy_async(
        &self,
        queries: Vec<IndexQuery>,
        strategy: QueryStrategy,
        listener: impl Into<Option<Listener>>,
    ) {
        self.submit(Operation::MultipleQueries { queries, strategy }, listener)
    }

    pub fn batch_async(&self, actions: Vec<Value>, listener: impl Into<Option<Listener>>) {
        self.submit(Operation::Batch { actions }, listener)
    }
}

/// Execute one call, turning a panic into an error outcome.
fn run<A: SyncApi + ?Sized>(api: &A, operation: &Operation) -> CallOutcome {
    let kind = operation.kind();
    let outcome = catch_unwind(AssertUnwindSafe(|| api.execute(operation)))
        .unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(operation = %kind, %message, "call panicked");
            Err(ApiError::Dispatch(message))
        });
    tracing::debug!(operation = %kind, ok = outcome.is_ok(), "call completed");
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "call panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    use search_core::{OperationKind, Query};
    use serde_json::json;

    use crate::delivery::callback_queue;
    use crate::listener::{listener_fn, ApiListener};

    const WAIT: Duration = Duration::from_secs(5);

    /// Answers from the operation's arguments and records what it executed.
    #[derive(Default)]
    struct FakeApi {
        executed: Mutex<Vec<Operation>>,
    }

    impl SyncApi for FakeApi {
        fn execute(&self, operation: &Operation) -> CallOutcome {
            self.executed.lock().unwrap().push(operation.clone());
            match operation {
                Operation::DeleteIndex { index_name } if index_name == "missing" => {
                    Err(ApiError::NotFound {
                        message: "Index does not exist".to_string(),
                    })
                }
                Operation::DeleteIndex { index_name } => {
                    Ok(json!({ "deleted": index_name, "taskID": 1 }))
                }
                Operation::GetUserKey { key } if key == "explode" => panic!("boom"),
                Operation::GetUserKey { key } => Ok(json!({ "value": key })),
                Operation::DeleteUserKey { .. } => Ok(json!({ "deletedAt": 1 })),
                _ => Ok(json!({})),
            }
        }
    }

    /// Forwards every callback, tagged with its variant, into a channel.
    struct ChannelListener {
        tx: Mutex<mpsc::Sender<(String, Operation, CallOutcome)>>,
    }

    impl ApiListener for ChannelListener {
        fn on_success(&self, operation: &Operation, content: Value) {
            let tagged = ("success".into(), operation.clone(), Ok(content));
            let _ = self.tx.lock().unwrap().send(tagged);
        }

        fn on_error(&self, operation: &Operation, error: ApiError) {
            let tagged = ("error".into(), operation.clone(), Err(error));
            let _ = self.tx.lock().unwrap().send(tagged);
        }
    }

    fn channel_listener() -> (Listener, mpsc::Receiver<(String, Operation, CallOutcome)>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(ChannelListener { tx: Mutex::new(tx) }), rx)
    }

    fn client() -> AsyncClient<FakeApi> {
        AsyncClient::new(FakeApi::default(), 4).unwrap()
    }

    #[test]
    fn success_fires_once_with_unchanged_payload() {
        let client = client();
        let (listener, rx) = channel_listener();
        client.delete_index_async("products", listener);

        let (variant, op, outcome) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(variant, "success");
        assert_eq!(
            op,
            Operation::DeleteIndex {
                index_name: "products".into()
            }
        );
        assert_eq!(outcome, Ok(json!({ "deleted": "products", "taskID": 1 })));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn error_fires_once_with_unchanged_error() {
        let client = client();
        let (listener, rx) = channel_listener();
        client.delete_index_async("missing", listener);

        let (variant, _, outcome) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(variant, "error");
        assert_eq!(
            outcome,
            Err(ApiError::NotFound {
                message: "Index does not exist".to_string()
            })
        );
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn panic_in_call_becomes_error_callback() {
        let client = client();
        let (listener, rx) = channel_listener();
        client.get_user_key_async("explode", listener);

        let (variant, _, outcome) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(variant, "error");
        assert_eq!(outcome, Err(ApiError::Dispatch("boom".to_string())));
    }

    #[test]
    fn get_user_key_is_not_routed_to_delete() {
        let client = client();
        let (listener, rx) = channel_listener();
        client.get_user_key_async("k1", listener);

        let (_, _, outcome) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(outcome, Ok(json!({ "value": "k1" })));
        assert_eq!(
            client.api().executed.lock().unwrap().as_slice(),
            &[Operation::GetUserKey { key: "k1".into() }]
        );
    }

    #[test]
    fn no_listener_still_executes() {
        let client = client();
        client.delete_index_async("products", None);

        let deadline = Instant::now() + WAIT;
        while client.api().executed.lock().unwrap().is_empty() {
            assert!(Instant::now() < deadline, "call never executed");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn concurrent_calls_deliver_to_their_own_listener() {
        let client = client();
        let mut receivers = Vec::new();
        for i in 0..32 {
            let (listener, rx) = channel_listener();
            client.delete_index_async(&format!("index-{i}"), listener);
            receivers.push((i, rx));
        }
        for (i, rx) in receivers {
            let (_, op, outcome) = rx.recv_timeout(WAIT).unwrap();
            assert_eq!(
                op,
                Operation::DeleteIndex {
                    index_name: format!("index-{i}")
                }
            );
            assert_eq!(outcome.unwrap()["deleted"], format!("index-{i}"));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn every_operation_kind_delivers_once() {
        let client = client();
        let (listener, rx) = channel_listener();
        client.list_indexes_async(Arc::clone(&listener));
        client.delete_index_async("a", Arc::clone(&listener));
        client.move_index_async("a", "b", Arc::clone(&listener));
        client.copy_index_async("a", "b", Arc::clone(&listener));
        client.get_logs_async(0, 10, LogType::All, Arc::clone(&listener));
        client.list_user_keys_async(Arc::clone(&listener));
        client.get_user_key_async("k", Arc::clone(&listener));
        client.delete_user_key_async("k", Arc::clone(&listener));
        client.add_user_key_async(json!({"acl": []}), Arc::clone(&listener));
        client.update_user_key_async("k", json!({"acl": []}), Arc::clone(&listener));
        client.multiple_queries_async(vec![], Arc::clone(&listener));
        client.batch_async(vec![], Arc::clone(&listener));

        let index = client.init_index("products");
        let object = json!({"objectID": "1", "name": "phone"});
        index.search_async(Query::new("phone"), Arc::clone(&listener));
        index.add_object_async(json!({"name": "phone"}), Arc::clone(&listener));
        index.add_objects_async(vec![object.clone()], Arc::clone(&listener));
        index.save_object_async(object.clone(), Arc::clone(&listener));
        index.save_objects_async(vec![object.clone()], Arc::clone(&listener));
        index.partial_update_object_async(object.clone(), Arc::clone(&listener));
        index.partial_update_objects_async(vec![object], Arc::clone(&listener));
        index.get_object_async("1", Arc::clone(&listener));
        index.get_objects_async(vec!["1".into()], Arc::clone(&listener));
        index.delete_object_async("1", Arc::clone(&listener));
        index.delete_objects_async(vec!["1".into()], Arc::clone(&listener));
        index.delete_by_query_async(Query::new("phone"), Arc::clone(&listener));
        index.wait_task_async(1, Arc::clone(&listener));
        index.get_settings_async(Arc::clone(&listener));
        index.set_settings_async(json!({}), listener);

        let mut kinds: Vec<_> = (0..OperationKind::ALL.len())
            .map(|_| rx.recv_timeout(WAIT).unwrap().1.kind())
            .collect();
        kinds.sort_by_key(|k| k.as_str());
        let mut expected = OperationKind::ALL.to_vec();
        expected.sort_by_key(|k| k.as_str());
        assert_eq!(kinds, expected);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn index_calls_carry_the_index_name() {
        let client = client();
        let (listener, rx) = channel_listener();
        let index = client.init_index("products");
        assert_eq!(index.name(), "products");
        index.get_object_attributes_async("42", vec!["name".into()], listener);

        let (variant, op, _) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(variant, "success");
        assert_eq!(
            op,
            Operation::GetObject {
                index_name: "products".into(),
                object_id: "42".into(),
                attributes_to_retrieve: vec!["name".into()],
            }
        );
    }

    #[test]
    fn queue_delivery_runs_on_the_draining_thread() {
        let (handle, mut queue) = callback_queue();
        let client = client().with_delivery(Delivery::Queue(handle));
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b"] {
            let sink = Arc::clone(&seen);
            client.delete_index_async(
                name,
                listener_fn(move |op, outcome| {
                    sink.lock()
                        .unwrap()
                        .push((thread::current().id(), op.clone(), outcome.is_ok()));
                }),
            );
        }

        assert!(queue.run_next());
        assert!(queue.run_next());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(id, _, ok)| *id == thread::current().id() && *ok));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn call_resolves_to_outcome() {
        let client = AsyncClient::with_handle(FakeApi::default(), Handle::current());
        let outcome = client
            .call(Operation::DeleteIndex {
                index_name: "products".into(),
            })
            .await;
        assert_eq!(outcome.unwrap()["deleted"], "products");

        let outcome = client
            .call(Operation::GetUserKey {
                key: "explode".into(),
            })
            .await;
        assert!(matches!(outcome, Err(ApiError::Dispatch(_))));
    }
}
