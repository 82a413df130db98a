//! Write Bridge

use async_trait::async_trait;
use serde_json::{Map, Value};

use live_view::domain::{RemoteError, RemoteErrorCode};
use live_view::remote::MutationTransport;
use live_view::{LocalTask, Spawner};

use super::{add_document, delete_document, remote_error, to_js, update_document};

/// `MutationTransport` backed by the JavaScript store SDK
#[derive(Clone, Copy, Default)]
pub struct BridgeTransport;

#[async_trait(?Send)]
impl MutationTransport for BridgeTransport {
    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<String, RemoteError> {
        let js_data = to_js(&data)?;
        let id = add_document(collection, js_data).await.map_err(remote_error)?;
        id.as_string()
            .ok_or_else(|| RemoteError::new(RemoteErrorCode::Unknown, "store returned no document id"))
    }

    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<(), RemoteError> {
        let js_fields = to_js(&fields)?;
        update_document(collection, id, js_fields).await.map_err(remote_error)?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        delete_document(collection, id).await.map_err(remote_error)?;
        Ok(())
    }
}

/// Runs writes on the Leptos local executor
#[derive(Clone, Copy, Default)]
pub struct LeptosSpawner;

impl Spawner for LeptosSpawner {
    fn spawn(&self, task: LocalTask) {
        leptos::task::spawn_local(task);
    }
}
