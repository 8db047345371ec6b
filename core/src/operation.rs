//! The closed set of remote operations the SDK can dispatch.
//!
//! Each `Operation` variant carries exactly the arguments its call needs, so a
//! move without a destination or a key update without a key cannot be built.
//! Application-level calls come first, then the calls scoped to one index.

use std::fmt;

use serde_json::Value;

use crate::types::{IndexQuery, LogType, Query, QueryStrategy};

/// Tag identifying which remote call an `Operation` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ListIndexes,
    DeleteIndex,
    MoveIndex,
    CopyIndex,
    GetLogs,
    ListUserKeys,
    GetUserKey,
    DeleteUserKey,
    AddUserKey,
    UpdateUserKey,
    MultipleQueries,
    Batch,
    Search,
    AddObject,
    AddObjects,
    SaveObject,
    SaveObjects,
    PartialUpdateObject,
    PartialUpdateObjects,
    GetObject,
    GetObjects,
    DeleteObject,
    DeleteObjects,
    DeleteByQuery,
    WaitTask,
    GetSettings,
    SetSettings,
}

impl OperationKind {
    pub const ALL: [OperationKind; 27] = [
        OperationKind::ListIndexes,
        OperationKind::DeleteIndex,
        OperationKind::MoveIndex,
        OperationKind::CopyIndex,
        OperationKind::GetLogs,
        OperationKind::ListUserKeys,
        OperationKind::GetUserKey,
        OperationKind::DeleteUserKey,
        OperationKind::AddUserKey,
        OperationKind::UpdateUserKey,
        OperationKind::MultipleQueries,
        OperationKind::Batch,
        OperationKind::Search,
        OperationKind::AddObject,
        OperationKind::AddObjects,
        OperationKind::SaveObject,
        OperationKind::SaveObjects,
        OperationKind::PartialUpdateObject,
        OperationKind::PartialUpdateObjects,
        OperationKind::GetObject,
        OperationKind::GetObjects,
        OperationKind::DeleteObject,
        OperationKind::DeleteObjects,
        OperationKind::DeleteByQuery,
        OperationKind::WaitTask,
        OperationKind::GetSettings,
        OperationKind::SetSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ListIndexes => "list_indexes",
            OperationKind::DeleteIndex => "delete_index",
            OperationKind::MoveIndex => "move_index",
            OperationKind::CopyIndex => "copy_index",
            OperationKind::GetLogs => "get_logs",
            OperationKind::ListUserKeys => "list_user_keys",
            OperationKind::GetUserKey => "get_user_key",
            OperationKind::DeleteUserKey => "delete_user_key",
            OperationKind::AddUserKey => "add_user_key",
            OperationKind::UpdateUserKey => "update_user_key",
            OperationKind::MultipleQueries => "multiple_queries",
            OperationKind::Batch => "batch",
            OperationKind::Search => "search",
            OperationKind::AddObject => "add_object",
            OperationKind::AddObjects => "add_objects",
            OperationKind::SaveObject => "save_object",
            OperationKind::SaveObjects => "save_objects",
            OperationKind::PartialUpdateObject => "partial_update_object",
            OperationKind::PartialUpdateObjects => "partial_update_objects",
            OperationKind::GetObject => "get_object",
            OperationKind::GetObjects => "get_objects",
            OperationKind::DeleteObject => "delete_object",
            OperationKind::DeleteObjects => "delete_objects",
            OperationKind::DeleteByQuery => "delete_by_query",
            OperationKind::WaitTask => "wait_task",
            OperationKind::GetSettings => "get_settings",
            OperationKind::SetSettings => "set_settings",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote call together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ListIndexes,
    DeleteIndex {
        index_name: String,
    },
    /// Rename `source` to `destination`, overwriting the destination.
    MoveIndex {
        source: String,
        destination: String,
    },
    /// Copy `source` into `destination`, overwriting the destination.
    CopyIndex {
        source: String,
        destination: String,
    },
    /// `offset` 0 is the most recent entry.
    GetLogs {
        offset: u32,
        length: u32,
        log_type: LogType,
    },
    ListUserKeys,
    GetUserKey {
        key: String,
    },
    DeleteUserKey {
        key: String,
    },
    /// `parameters` is the key definition (`acl`, `indexes`, `validity`, ...).
    AddUserKey {
        parameters: Value,
    },
    UpdateUserKey {
        key: String,
        parameters: Value,
    },
    MultipleQueries {
        queries: Vec<IndexQuery>,
        strategy: QueryStrategy,
    },
    /// Each action is a `{"action", "indexName", "body"}` object.
    Batch {
        actions: Vec<Value>,
    },
    Search {
        index_name: String,
        query: Query,
    },
    /// With an `object_id` the object is stored under that id, replacing any
    /// existing object; without one the service assigns the id.
    AddObject {
        index_name: String,
        object: Value,
        object_id: Option<String>,
    },
    AddObjects {
        index_name: String,
        objects: Vec<Value>,
    },
    /// Replace the object named by the `objectID` attribute of `object`.
    SaveObject {
        index_name: String,
        object: Value,
    },
    SaveObjects {
        index_name: String,
        objects: Vec<Value>,
    },
    /// Update only the attributes present in `object`; `objectID` required.
    PartialUpdateObject {
        index_name: String,
        object: Value,
    },
    PartialUpdateObjects {
        index_name: String,
        objects: Vec<Value>,
    },
    /// An empty `attributes_to_retrieve` returns every attribute.
    GetObject {
        index_name: String,
        object_id: String,
        attributes_to_retrieve: Vec<String>,
    },
    GetObjects {
        index_name: String,
        object_ids: Vec<String>,
    },
    DeleteObject {
        index_name: String,
        object_id: String,
    },
    DeleteObjects {
        index_name: String,
        object_ids: Vec<String>,
    },
    DeleteByQuery {
        index_name: String,
        query: Query,
    },
    /// Block until the indexing task `task_id` is published.
    WaitTask {
        index_name: String,
        task_id: u64,
    },
    GetSettings {
        index_name: String,
    },
    SetSettings {
        index_name: String,
        settings: Value,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::ListIndexes => OperationKind::ListIndexes,
            Operation::DeleteIndex { .. } => OperationKind::DeleteIndex,
            Operation::MoveIndex { .. } => OperationKind::MoveIndex,
            Operation::CopyIndex { .. } => OperationKind::CopyIndex,
            Operation::GetLogs { .. } => OperationKind::GetLogs,
            Operation::ListUserKeys => OperationKind::ListUserKeys,
            Operation::GetUserKey { .. } => OperationKind::GetUserKey,
            Operation::DeleteUserKey { .. } => OperationKind::DeleteUserKey,
            Operation::AddUserKey { .. } => OperationKind::AddUserKey,
            Operation::UpdateUserKey { .. } => OperationKind::UpdateUserKey,
            Operation::MultipleQueries { .. } => OperationKind::MultipleQueries,
            Operation::Batch { .. } => OperationKind::Batch,
            Operation::Search { .. } => OperationKind::Search,
            Operation::AddObject { .. } => OperationKind::AddObject,
            Operation::AddObjects { .. } => OperationKind::AddObjects,
            Operation::SaveObject { .. } => OperationKind::SaveObject,
            Operation::SaveObjects { .. } => OperationKind::SaveObjects,
            Operation::PartialUpdateObject { .. } => OperationKind::PartialUpdateObject,
            Operation::PartialUpdateObjects { .. } => OperationKind::PartialUpdateObjects,
            Operation::GetObject { .. } => OperationKind::GetObject,
            Operation::GetObjects { .. } => OperationKind::GetObjects,
            Operation::DeleteObject { .. } => OperationKind::DeleteObject,
            Operation::DeleteObjects { .. } => OperationKind::DeleteObjects,
            Operation::DeleteByQuery { .. } => OperationKind::DeleteByQuery,
            Operation::WaitTask { .. } => OperationKind::WaitTask,
            Operation::GetSettings { .. } => OperationKind::GetSettings,
            Operation::SetSettings { .. } => OperationKind::SetSettings,
        }
    }

    /// The index an index-level call targets. `None` for application-level
    /// calls, including `DeleteIndex` and the multi-index ones.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Operation::Search { index_name, .. }
            | Operation::AddObject { index_name, .. }
            | Operation::AddObjects { index_name, .. }
            | Operation::SaveObject { index_name, .. }
            | Operation::SaveObjects { index_name, .. }
            | Operation::PartialUpdateObject { index_name, .. }
            | Operation::PartialUpdateObjects { index_name, .. }
            | Operation::GetObject { index_name, .. }
            | Operation::GetObjects { index_name, .. }
            | Operation::DeleteObject { index_name, .. }
            | Operation::DeleteObjects { index_name, .. }
            | Operation::DeleteByQuery { index_name, .. }
            | Operation::WaitTask { index_name, .. }
            | Operation::GetSettings { index_name }
            | Operation::SetSettings { index_name, .. } => Some(index_name),
            _ => None,
        }
    }
}
