//! Asynchronous client for the hosted search API.
//!
//! # Overview
//! `search-core` builds and parses requests; this crate sends them. A
//! `BlockingClient` performs one call on the calling thread with host
//! fail-over. An `AsyncClient` runs those calls in the background and reports
//! each outcome to an `ApiListener`; `AsyncClient::init_index` scopes calls to
//! one index.
//!
//! Listeners run on a dispatch worker unless the client is given a
//! `Delivery::Queue`. An application that handles results on its own thread,
//! typically a UI loop, pairs the client with a `CallbackQueue` and drains it
//! there:
//!
//! ```no_run
//! use search_client::{callback_queue, listener_fn, AsyncClient, ClientConfig, Delivery, Query};
//!
//! let (handle, mut queue) = callback_queue();
//! let config = ClientConfig::new("APPID", "api-key").with_dsn(true);
//! let client = AsyncClient::from_config(&config)?.with_delivery(Delivery::Queue(handle));
//!
//! client.init_index("products").search_async(
//!     Query::new("phone"),
//!     listener_fn(|_, outcome| match outcome {
//!         Ok(content) => println!("hits: {}", content["nbHits"]),
//!         Err(e) => eprintln!("failed: {e}"),
//!     }),
//! );
//!
//! // On the thread that owns the queue.
//! queue.run_next();
//! # Ok::<(), search_client::ConfigError>(())
//! ```

pub mod base;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod index;
pub mod listener;
pub mod transport;

pub use base::{BlockingClient, SyncApi};
pub use config::{default_hosts, dsn_host, ClientConfig, ConfigError};
pub use delivery::{callback_queue, CallbackQueue, Delivery, QueueHandle};
pub use dispatch::AsyncClient;
pub use index::Index;
pub use listener::{listener_fn, ApiListener, FnListener, Listener};
pub use transport::{Transport, TransportError, UreqTransport};

pub use search_core::{
    ApiError, CallOutcome, IndexQuery, LogType, Operation, OperationKind, Query, QueryStrategy,
};
