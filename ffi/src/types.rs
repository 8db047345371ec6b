//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with a C-compatible representation. The
//! result handed to a callback is borrowed: every pointer in it stays valid
//! only until the callback returns, so the C side copies what it keeps and
//! never frees anything.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use search_client::{
    ApiError, ApiListener, AsyncClient, LogType, Operation, OperationKind, QueryStrategy,
};
use serde_json::Value;

/// Opaque handle to an `AsyncClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiSearchClient {
    pub(crate) inner: AsyncClient,
}

/// Completion callback. `result` is only valid for the duration of the call.
pub type FfiCallback = extern "C" fn(user_data: *mut c_void, result: *const FfiCallResult);

/// Which remote call a result belongs to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOperationKind {
    ListIndexes = 0,
    DeleteIndex = 1,
    MoveIndex = 2,
    CopyIndex = 3,
    GetLogs = 4,
    ListUserKeys = 5,
    GetUserKey = 6,
    DeleteUserKey = 7,
    AddUserKey = 8,
    UpdateUserKey = 9,
    MultipleQueries = 10,
    Batch = 11,
    Search = 12,
    AddObject = 13,
    AddObjects = 14,
    SaveObject = 15,
    SaveObjects = 16,
    PartialUpdateObject = 17,
    PartialUpdateObjects = 18,
    GetObject = 19,
    GetObjects = 20,
    DeleteObject = 21,
    DeleteObjects = 22,
    DeleteByQuery = 23,
    WaitTask = 24,
    GetSettings = 25,
    SetSettings = 26,
}

impl From<OperationKind> for FfiOperationKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::ListIndexes => FfiOperationKind::ListIndexes,
            OperationKind::DeleteIndex => FfiOperationKind::DeleteIndex,
            OperationKind::MoveIndex => FfiOperationKind::MoveIndex,
            OperationKind::CopyIndex => FfiOperationKind::CopyIndex,
            OperationKind::GetLogs => FfiOperationKind::GetLogs,
            OperationKind::ListUserKeys => FfiOperationKind::ListUserKeys,
            OperationKind::GetUserKey => FfiOperationKind::GetUserKey,
            OperationKind::DeleteUserKey => FfiOperationKind::DeleteUserKey,
            OperationKind::AddUserKey => FfiOperationKind::AddUserKey,
            OperationKind::UpdateUserKey => FfiOperationKind::UpdateUserKey,
            OperationKind::MultipleQueries => FfiOperationKind::MultipleQueries,
            OperationKind::Batch => FfiOperationKind::Batch,
            OperationKind::Search => FfiOperationKind::Search,
            OperationKind::AddObject => FfiOperationKind::AddObject,
            OperationKind::AddObjects => FfiOperationKind::AddObjects,
            OperationKind::SaveObject => FfiOperationKind::SaveObject,
            OperationKind::SaveObjects => FfiOperationKind::SaveObjects,
            OperationKind::PartialUpdateObject => FfiOperationKind::PartialUpdateObject,
            OperationKind::PartialUpdateObjects => FfiOperationKind::PartialUpdateObjects,
            OperationKind::GetObject => FfiOperationKind::GetObject,
            OperationKind::GetObjects => FfiOperationKind::GetObjects,
            OperationKind::DeleteObject => FfiOperationKind::DeleteObject,
            OperationKind::DeleteObjects => FfiOperationKind::DeleteObjects,
            OperationKind::DeleteByQuery => FfiOperationKind::DeleteByQuery,
            OperationKind::WaitTask => FfiOperationKind::WaitTask,
            OperationKind::GetSettings => FfiOperationKind::GetSettings,
            OperationKind::SetSettings => FfiOperationKind::SetSettings,
        }
    }
}

/// Error codes, both as the synchronous return value of `search_*` calls
/// and inside `FfiCallResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Transport = 3,
    Serialization = 4,
    Deserialization = 5,
    Dispatch = 6,
    NullArg = 7,
    InvalidArgument = 8,
    Panic = 9,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NotFound { .. } => FfiErrorCode::NotFound,
            ApiError::Http { .. } => FfiErrorCode::Http,
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Dispatch(_) => FfiErrorCode::Dispatch,
        }
    }
}

/// Values accepted by the `log_type` argument of `search_get_logs`. The
/// argument itself is a `uint32_t`; anything else is rejected with
/// `InvalidArgument`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLogType {
    Query = 0,
    Build = 1,
    Error = 2,
    All = 3,
}

impl TryFrom<u32> for FfiLogType {
    type Error = FfiErrorCode;

    fn try_from(raw: u32) -> Result<Self, FfiErrorCode> {
        match raw {
            0 => Ok(FfiLogType::Query),
            1 => Ok(FfiLogType::Build),
            2 => Ok(FfiLogType::Error),
            3 => Ok(FfiLogType::All),
            _ => Err(FfiErrorCode::InvalidArgument),
        }
    }
}

impl From<FfiLogType> for LogType {
    fn from(t: FfiLogType) -> Self {
        match t {
            FfiLogType::Query => LogType::Query,
            FfiLogType::Build => LogType::Build,
            FfiLogType::Error => LogType::Error,
            FfiLogType::All => LogType::All,
        }
    }
}

/// Values accepted by the `strategy` argument of `search_multiple_queries`,
/// passed as a `uint32_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiQueryStrategy {
    None = 0,
    StopIfEnoughMatches = 1,
}

impl TryFrom<u32> for FfiQueryStrategy {
    type Error = FfiErrorCode;

    fn try_from(raw: u32) -> Result<Self, FfiErrorCode> {
        match raw {
            0 => Ok(FfiQueryStrategy::None),
            1 => Ok(FfiQueryStrategy::StopIfEnoughMatches),
            _ => Err(FfiErrorCode::InvalidArgument),
        }
    }
}

impl From<FfiQueryStrategy> for QueryStrategy {
    fn from(s: FfiQueryStrategy) -> Self {
        match s {
            FfiQueryStrategy::None => QueryStrategy::None,
            FfiQueryStrategy::StopIfEnoughMatches => QueryStrategy::StopIfEnoughMatches,
        }
    }
}

/// Outcome of one call as seen by a C callback.
///
/// On success `error_code` is `Ok`, `error_message` is null and `content`
/// is the JSON payload. On failure `content` is null, `error_message`
/// describes the error and `http_status` is set when the service answered.
#[repr(C)]
pub struct FfiCallResult {
    pub operation: FfiOperationKind,
    pub error_code: FfiErrorCode,
    pub error_message: *const c_char,
    pub http_status: u16,
    pub content: *const c_char,
}

/// Caller context passed back verbatim. Thread safety is the caller's
/// contract.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut c_void);

unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

/// Bridges `ApiListener` to a C function pointer.
pub(crate) struct FfiListener {
    pub(crate) callback: FfiCallback,
    pub(crate) user_data: UserData,
}

impl FfiListener {
    fn invoke(&self, kind: OperationKind, outcome: Result<Value, ApiError>) {
        let (error_code, http_status, message, content) = match outcome {
            Ok(content) => (FfiErrorCode::Ok, 0, None, Some(c_string(&content.to_string()))),
            Err(e) => (
                FfiErrorCode::from(&e),
                e.status().unwrap_or(0),
                Some(c_string(&e.to_string())),
                None,
            ),
        };
        let result = FfiCallResult {
            operation: kind.into(),
            error_code,
            error_message: message.as_ref().map_or(ptr::null(), |m| m.as_ptr()),
            http_status,
            content: content.as_ref().map_or(ptr::null(), |c| c.as_ptr()),
        };
        (self.callback)(self.user_data.0, &result);
    }
}

impl ApiListener for FfiListener {
    fn on_success(&self, operation: &Operation, content: Value) {
        self.invoke(operation.kind(), Ok(content));
    }

    fn on_error(&self, operation: &Operation, error: ApiError) {
        self.invoke(operation.kind(), Err(error));
    }
}

/// Interior NULs cannot cross into C; they are dropped.
pub(crate) fn c_string(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}
