//! Caller-supplied completion callbacks.

use std::sync::Arc;

use search_core::{ApiError, CallOutcome, Operation};
use serde_json::Value;

/// Receives the outcome of an asynchronous call. Exactly one of the two
/// methods is invoked, exactly once, per submitted call.
///
/// Both methods get the `Operation` that was submitted, so one listener can
/// serve several calls and still tell them apart.
pub trait ApiListener: Send + Sync {
    fn on_success(&self, operation: &Operation, content: Value);

    fn on_error(&self, operation: &Operation, error: ApiError);
}

pub type Listener = Arc<dyn ApiListener>;

/// Adapter turning a closure over `CallOutcome` into an `ApiListener`.
pub struct FnListener<F>(F);

impl<F> ApiListener for FnListener<F>
where
    F: Fn(&Operation, CallOutcome) + Send + Sync,
{
    fn on_success(&self, operation: &Operation, content: Value) {
        (self.0)(operation, Ok(content))
    }

    fn on_error(&self, operation: &Operation, error: ApiError) {
        (self.0)(operation, Err(error))
    }
}

pub fn listener_fn<F>(f: F) -> Listener
where
    F: Fn(&Operation, CallOutcome) + Send + Sync + 'static,
{
    Arc::new(FnListener(f))
}

pub(crate) fn notify(listener: &dyn ApiListener, operation: &Operation, outcome: CallOutcome) {
    match outcome {
        Ok(content) => listener.on_success(operation, content),
        Err(error) => listener.on_error(operation, error),
    }
}
