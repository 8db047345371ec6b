//! Calls scoped to one index.
//!
//! `Index` is a named view over an `AsyncClient`: every method builds the
//! index-level `Operation` and submits it through the client, so outcomes are
//! delivered the same way as application-level calls.

use search_core::{Operation, Query};
use serde_json::Value;

use crate::base::{BlockingClient, SyncApi};
use crate::dispatch::AsyncClient;
use crate::listener::Listener;

pub struct Index<'a, A: SyncApi = BlockingClient> {
    client: &'a AsyncClient<A>,
    name: String,
}

impl<'a, A: SyncApi> Index<'a, A> {
    pub(crate) fn new(client: &'a AsyncClient<A>, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn search_async(&self, query: Query, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::Search {
                index_name: self.name.clone(),
                query,
            },
            listener,
        )
    }

    /// The service assigns the `objectID`; the answer carries it.
    pub fn add_object_async(&self, object: Value, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::AddObject {
                index_name: self.name.clone(),
                object,
                object_id: None,
            },
            listener,
        )
    }

    /// Store `object` under `object_id`, replacing any existing object.
    pub fn add_object_with_id_async(
        &self,
        object: Value,
        object_id: &str,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::AddObject {
                index_name: self.name.clone(),
                object,
                object_id: Some(object_id.to_string()),
            },
            listener,
        )
    }

    pub fn add_objects_async(&self, objects: Vec<Value>, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::AddObjects {
                index_name: self.name.clone(),
                objects,
            },
            listener,
        )
    }

    /// Replace the object named by `object["objectID"]`.
    pub fn save_object_async(&self, object: Value, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::SaveObject {
                index_name: self.name.clone(),
                object,
            },
            listener,
        )
    }

    pub fn save_objects_async(&self, objects: Vec<Value>, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::SaveObjects {
                index_name: self.name.clone(),
                objects,
            },
            listener,
        )
    }

    /// Update the attributes present in `object`, leaving the others intact.
    pub fn partial_update_object_async(
        &self,
        object: Value,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::PartialUpdateObject {
                index_name: self.name.clone(),
                object,
            },
            listener,
        )
    }

    pub fn partial_update_objects_async(
        &self,
        objects: Vec<Value>,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::PartialUpdateObjects {
                index_name: self.name.clone(),
                objects,
            },
            listener,
        )
    }

    pub fn get_object_async(&self, object_id: &str, listener: impl Into<Option<Listener>>) {
        self.get_object_attributes_async(object_id, Vec::new(), listener)
    }

    /// Fetch only `attributes` of the object.
    pub fn get_object_attributes_async(
        &self,
        object_id: &str,
        attributes: Vec<String>,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::GetObject {
                index_name: self.name.clone(),
                object_id: object_id.to_string(),
                attributes_to_retrieve: attributes,
            },
            listener,
        )
    }

    pub fn get_objects_async(
        &self,
        object_ids: Vec<String>,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::GetObjects {
                index_name: self.name.clone(),
                object_ids,
            },
            listener,
        )
    }

    pub fn delete_object_async(&self, object_id: &str, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::DeleteObject {
                index_name: self.name.clone(),
                object_id: object_id.to_string(),
            },
            listener,
        )
    }

    pub fn delete_objects_async(
        &self,
        object_ids: Vec<String>,
        listener: impl Into<Option<Listener>>,
    ) {
        self.client.submit(
            Operation::DeleteObjects {
                index_name: self.name.clone(),
                object_ids,
            },
            listener,
        )
    }

    /// Delete every object matching `query`.
    pub fn delete_by_query_async(&self, query: Query, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::DeleteByQuery {
                index_name: self.name.clone(),
                query,
            },
            listener,
        )
    }

    /// Notify `listener` once task `task_id` is published. The wait holds one
    /// worker until then.
    pub fn wait_task_async(&self, task_id: u64, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::WaitTask {
                index_name: self.name.clone(),
                task_id,
            },
            listener,
        )
    }

    pub fn get_settings_async(&self, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::GetSettings {
                index_name: self.name.clone(),
            },
            listener,
        )
    }

    pub fn set_settings_async(&self, settings: Value, listener: impl Into<Option<Listener>>) {
        self.client.submit(
            Operation::SetSettings {
                index_name: self.name.clone(),
                settings,
            },
            listener,
        )
    }
}
