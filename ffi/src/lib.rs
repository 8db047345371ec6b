//! C-ABI wrapper around `search-client`.
//!
//! # Overview
//! Exposes every asynchronous call through `extern "C"` functions so a mobile
//! host (Swift, Kotlin/JNI, plain C) can drive the SDK without linking to
//! tokio or serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `search_<operation>` per application-level call and one
//!   `search_index_<operation>` per index-level call, mirroring `AsyncClient`
//!   and `Index`. Structured arguments (objects, queries, settings, key
//!   parameters) travel as JSON C strings, and enum-like arguments as plain
//!   integers. Both are validated before anything is dispatched.
//! - The synchronous return value only says whether the call was dispatched.
//!   Its outcome arrives later through the `FfiCallback`, invoked exactly
//!   once on a background thread with a borrowed `FfiCallResult`. A null
//!   callback runs the call and discards the outcome.
//! - The C caller owns the client handle and releases it with
//!   `search_client_free`, which waits for in-flight calls. It must not be
//!   called from inside a callback.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use search_client::{AsyncClient, ClientConfig, IndexQuery, Listener, Operation, Query};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `app_id` / `api_key`.
///
/// `hosts_csv` is a comma-separated list of base URLs tried in order; null
/// selects the default hosts for the application. With `enable_dsn` the
/// application's DSN host is tried before them. `workers` caps concurrent
/// calls; 0 selects the default.
///
/// Returns null if a credential is null or not UTF-8, if the configuration
/// is invalid, or if an internal panic occurs. The caller must free the
/// returned pointer with `search_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn search_client_new(
    app_id: *const c_char,
    api_key: *const c_char,
    hosts_csv: *const c_char,
    enable_dsn: bool,
    workers: u32,
) -> *mut FfiSearchClient {
    catch_unwind(|| {
        let (Ok(app_id), Ok(api_key)) = (read_str(app_id), read_str(api_key)) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(app_id, api_key);
        if !hosts_csv.is_null() {
            let Ok(hosts) = read_str(hosts_csv) else {
                return std::ptr::null_mut();
            };
            config = config.with_hosts(
                hosts
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            );
        }
        config = config.with_dsn(enable_dsn);
        if workers > 0 {
            config = config.with_workers(workers as usize);
        }
        match AsyncClient::from_config(&config) {
            Ok(inner) => Box::into_raw(Box::new(FfiSearchClient { inner })),
            Err(e) => {
                tracing::warn!(error = %e, "client creation failed");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `search_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn search_client_free(client: *mut FfiSearchClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// List every index of the application.
#[unsafe(no_mangle)]
pub extern "C" fn search_list_indexes(
    client: *const FfiSearchClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || Ok(Operation::ListIndexes))
}

/// Delete an index with all its content and settings.
#[unsafe(no_mangle)]
pub extern "C" fn search_delete_index(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::DeleteIndex {
            index_name: read_str(index_name)?.to_string(),
        })
    })
}

/// Rename `source` to `destination`, replacing any existing destination.
#[unsafe(no_mangle)]
pub extern "C" fn search_move_index(
    client: *const FfiSearchClient,
    source: *const c_char,
    destination: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::MoveIndex {
            source: read_str(source)?.to_string(),
            destination: read_str(destination)?.to_string(),
        })
    })
}

/// Copy `source` into `destination`, replacing any existing destination.
#[unsafe(no_mangle)]
pub extern "C" fn search_copy_index(
    client: *const FfiSearchClient,
    source: *const c_char,
    destination: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::CopyIndex {
            source: read_str(source)?.to_string(),
            destination: read_str(destination)?.to_string(),
        })
    })
}

/// Fetch `length` log entries starting at `offset` (0 is the most recent).
#[unsafe(no_mangle)]
pub extern "C" fn search_get_logs(
    client: *const FfiSearchClient,
    offset: u32,
    length: u32,
    log_type: u32,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::GetLogs {
            offset,
            length,
            log_type: FfiLogType::try_from(log_type)?.into(),
        })
    })
}

/// List every key of the application with its ACL and validity.
#[unsafe(no_mangle)]
pub extern "C" fn search_list_user_keys(
    client: *const FfiSearchClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || Ok(Operation::ListUserKeys))
}

/// Fetch the definition of `key`.
#[unsafe(no_mangle)]
pub extern "C" fn search_get_user_key(
    client: *const FfiSearchClient,
    key: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::GetUserKey {
            key: read_str(key)?.to_string(),
        })
    })
}

/// Revoke `key`.
#[unsafe(no_mangle)]
pub extern "C" fn search_delete_user_key(
    client: *const FfiSearchClient,
    key: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::DeleteUserKey {
            key: read_str(key)?.to_string(),
        })
    })
}

/// Create a key. `parameters_json` must be a JSON object such as
/// `{"acl":["search"],"validity":3600}`.
#[unsafe(no_mangle)]
pub extern "C" fn search_add_user_key(
    client: *const FfiSearchClient,
    parameters_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::AddUserKey {
            parameters: read_object(parameters_json)?,
        })
    })
}

/// Replace the definition of `key`. `parameters_json` must be a JSON object.
#[unsafe(no_mangle)]
pub extern "C" fn search_update_user_key(
    client: *const FfiSearchClient,
    key: *const c_char,
    parameters_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::UpdateUserKey {
            key: read_str(key)?.to_string(),
            parameters: read_object(parameters_json)?,
        })
    })
}

/// Run several queries in one round trip.
///
/// `queries_json` is an array of
/// `{"indexName":"products","query":{"query":"phone","hitsPerPage":"5"}}`;
/// query parameter values are strings. `strategy` is an `FfiQueryStrategy`
/// value.
#[unsafe(no_mangle)]
pub extern "C" fn search_multiple_queries(
    client: *const FfiSearchClient,
    queries_json: *const c_char,
    strategy: u32,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        let strategy = FfiQueryStrategy::try_from(strategy)?;
        let queries: Vec<IndexQuery> = serde_json::from_str(read_str(queries_json)?)
            .map_err(|_| FfiErrorCode::InvalidArgument)?;
        Ok(Operation::MultipleQueries {
            queries,
            strategy: strategy.into(),
        })
    })
}

/// Apply write actions, possibly across indexes. `actions_json` is an array
/// of `{"action":..,"indexName":..,"body":{..}}` objects.
#[unsafe(no_mangle)]
pub extern "C" fn search_batch(
    client: *const FfiSearchClient,
    actions_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        let actions: Vec<Value> = serde_json::from_str(read_str(actions_json)?)
            .map_err(|_| FfiErrorCode::InvalidArgument)?;
        Ok(Operation::Batch { actions })
    })
}

// ---------------------------------------------------------------------------
// Index operations
// ---------------------------------------------------------------------------

/// Search `index_name`. `query_json` is an object of string parameters such
/// as `{"query":"phone","hitsPerPage":"5"}`.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_search(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    query_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::Search {
            index_name: read_string(index_name)?,
            query: read_query(query_json)?,
        })
    })
}

/// Add one object. A null `object_id` lets the service assign the id; a
/// non-null one stores the object under it.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_add_object(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_json: *const c_char,
    object_id: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        let object_id = if object_id.is_null() {
            None
        } else {
            Some(read_string(object_id)?)
        };
        Ok(Operation::AddObject {
            index_name: read_string(index_name)?,
            object: read_object(object_json)?,
            object_id,
        })
    })
}

/// `objects_json` is an array of objects.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_add_objects(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    objects_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::AddObjects {
            index_name: read_string(index_name)?,
            objects: read_objects(objects_json)?,
        })
    })
}

/// Replace the object named by the `objectID` attribute of `object_json`.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_save_object(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::SaveObject {
            index_name: read_string(index_name)?,
            object: read_object(object_json)?,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn search_index_save_objects(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    objects_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::SaveObjects {
            index_name: read_string(index_name)?,
            objects: read_objects(objects_json)?,
        })
    })
}

/// Update only the attributes present in `object_json`, which must carry
/// an `objectID`.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_partial_update_object(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::PartialUpdateObject {
            index_name: read_string(index_name)?,
            object: read_object(object_json)?,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn search_index_partial_update_objects(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    objects_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::PartialUpdateObjects {
            index_name: read_string(index_name)?,
            objects: read_objects(objects_json)?,
        })
    })
}

/// Fetch one object. `attributes_csv` lists the attributes to return; null
/// returns all of them.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_get_object(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_id: *const c_char,
    attributes_csv: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        let attributes_to_retrieve = if attributes_csv.is_null() {
            Vec::new()
        } else {
            read_str(attributes_csv)?
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        };
        Ok(Operation::GetObject {
            index_name: read_string(index_name)?,
            object_id: read_string(object_id)?,
            attributes_to_retrieve,
        })
    })
}

/// `object_ids_json` is an array of strings.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_get_objects(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_ids_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::GetObjects {
            index_name: read_string(index_name)?,
            object_ids: read_ids(object_ids_json)?,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn search_index_delete_object(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_id: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::DeleteObject {
            index_name: read_string(index_name)?,
            object_id: read_string(object_id)?,
        })
    })
}

/// `object_ids_json` is an array of strings.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_delete_objects(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    object_ids_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::DeleteObjects {
            index_name: read_string(index_name)?,
            object_ids: read_ids(object_ids_json)?,
        })
    })
}

/// Delete every object matching `query_json`, shaped as for
/// `search_index_search`.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_delete_by_query(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    query_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::DeleteByQuery {
            index_name: read_string(index_name)?,
            query: read_query(query_json)?,
        })
    })
}

/// Call back once task `task_id`, as returned by a write, is published.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_wait_task(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    task_id: u64,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::WaitTask {
            index_name: read_string(index_name)?,
            task_id,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn search_index_get_settings(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::GetSettings {
            index_name: read_string(index_name)?,
        })
    })
}

/// `settings_json` must be a JSON object; only the settings it names change.
#[unsafe(no_mangle)]
pub extern "C" fn search_index_set_settings(
    client: *const FfiSearchClient,
    index_name: *const c_char,
    settings_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    dispatch(client, callback, user_data, || {
        Ok(Operation::SetSettings {
            index_name: read_string(index_name)?,
            settings: read_object(settings_json)?,
        })
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate arguments with `operation` and submit the result. Nothing is
/// dispatched, and the callback never fires, unless this returns `Ok`.
fn dispatch<F>(
    client: *const FfiSearchClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
    operation: F,
) -> FfiErrorCode
where
    F: FnOnce() -> Result<Operation, FfiErrorCode>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let client = unsafe { &*client };
        let operation = match operation() {
            Ok(op) => op,
            Err(code) => return code,
        };
        let listener = callback.map(|callback| {
            Arc::new(FfiListener {
                callback,
                user_data: UserData(user_data),
            }) as Listener
        });
        client.inner.submit(operation, listener);
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiErrorCode> {
    if ptr.is_null() {
        return Err(FfiErrorCode::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiErrorCode::InvalidArgument)
}

fn read_string(ptr: *const c_char) -> Result<String, FfiErrorCode> {
    read_str(ptr).map(str::to_string)
}

fn read_object(ptr: *const c_char) -> Result<Value, FfiErrorCode> {
    match serde_json::from_str(read_str(ptr)?) {
        Ok(value @ Value::Object(_)) => Ok(value),
        _ => Err(FfiErrorCode::InvalidArgument),
    }
}

/// A JSON array whose items are all objects.
fn read_objects(ptr: *const c_char) -> Result<Vec<Value>, FfiErrorCode> {
    match serde_json::from_str(read_str(ptr)?) {
        Ok(Value::Array(items)) if items.iter().all(Value::is_object) => Ok(items),
        _ => Err(FfiErrorCode::InvalidArgument),
    }
}

fn read_ids(ptr: *const c_char) -> Result<Vec<String>, FfiErrorCode> {
    serde_json::from_str(read_str(ptr)?).map_err(|_| FfiErrorCode::InvalidArgument)
}

fn read_query(ptr: *const c_char) -> Result<Query, FfiErrorCode> {
    serde_json::from_str(read_str(ptr)?).map_err(|_| FfiErrorCode::InvalidArgument)
}
