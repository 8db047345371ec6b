//! Where completed calls meet their listeners.
//!
//! # Design
//! `Delivery::Worker` invokes the listener on the background thread that ran
//! the call. `Delivery::Queue` posts the invocation to a `CallbackQueue` that
//! the originating context drains itself, so UI-style callers can keep all
//! listener code on one thread. Either way the listener runs exactly once and
//! sees the outcome unchanged.

use search_core::{CallOutcome, Operation};
use tokio::sync::mpsc;

use crate::listener::{notify, Listener};

type Job = Box<dyn FnOnce() + Send>;

#[derive(Clone, Default)]
pub enum Delivery {
    #[default]
    Worker,
    Queue(QueueHandle),
}

/// Sending half of a `CallbackQueue`.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<Job>,
}

/// Pending listener invocations, run by whoever owns the queue.
pub struct CallbackQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

/// Create a queue and the handle used to post into it.
pub fn callback_queue() -> (QueueHandle, CallbackQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueHandle { tx }, CallbackQueue { rx })
}

impl CallbackQueue {
    /// Run every invocation already queued, without blocking. Returns how
    /// many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Block until one invocation is available and run it. Returns `false`
    /// once every `QueueHandle` is gone and the queue is empty.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run_next(&mut self) -> bool {
        match self.rx.blocking_recv() {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Async counterpart of `run_next`.
    pub async fn run_next_async(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

impl Delivery {
    pub(crate) fn deliver(
        &self,
        listener: Option<Listener>,
        operation: Operation,
        outcome: CallOutcome,
    ) {
        let kind = operation.kind();
        let Some(listener) = listener else {
            tracing::debug!(
                operation = %kind,
                ok = outcome.is_ok(),
                "no listener, outcome dropped"
            );
            return;
        };
        match self {
            Delivery::Worker => notify(&*listener, &operation, outcome),
            Delivery::Queue(handle) => {
                let job: Job = Box::new(move || notify(&*listener, &operation, outcome));
                if handle.tx.send(job).is_err() {
                    tracing::warn!(operation = %kind, "callback queue closed, outcome dropped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener_fn;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Listener, Arc<Mutex<Vec<CallOutcome>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = listener_fn(move |_, outcome| sink.lock().unwrap().push(outcome));
        (listener, seen)
    }

    #[test]
    fn worker_delivery_is_immediate() {
        let (listener, seen) = recording();
        Delivery::Worker.deliver(Some(listener), Operation::ListIndexes, Ok(json!(1)));
        assert_eq!(*seen.lock().unwrap(), vec![CallOutcome::Ok(json!(1))]);
    }

    #[test]
    fn queue_delivery_waits_for_the_owner() {
        let (handle, mut queue) = callback_queue();
        let (listener, seen) = recording();
        Delivery::Queue(handle).deliver(Some(listener), Operation::ListIndexes, Ok(json!(2)));
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![CallOutcome::Ok(json!(2))]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn run_next_ends_when_handles_are_gone() {
        let (handle, mut queue) = callback_queue();
        let (listener, seen) = recording();
        let delivery = Delivery::Queue(handle);
        delivery.deliver(Some(listener), Operation::ListUserKeys, Ok(json!(3)));
        drop(delivery);

        assert!(queue.run_next());
        assert!(!queue.run_next());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn missing_listener_is_a_no_op() {
        Delivery::Worker.deliver(None, Operation::ListIndexes, Ok(json!(null)));
        let (handle, mut queue) = callback_queue();
        Delivery::Queue(handle).deliver(None, Operation::ListIndexes, Ok(json!(null)));
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn closed_queue_does_not_panic() {
        let (handle, queue) = callback_queue();
        drop(queue);
        let (listener, seen) = recording();
        Delivery::Queue(handle).deliver(Some(listener), Operation::ListIndexes, Ok(json!(4)));
        assert!(seen.lock().unwrap().is_empty());
    }
}
