//! Remote Store - Core Traits
//!
//! Contracts for the two remote collaborators: a live query that re-delivers
//! the full matching document set on every change, and a write transport.
//! Implementations can be a browser SDK bridge, in-memory, etc.
//!
//! Everything here is single-threaded; nothing requires `Send`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Document, RemoteError, RemoteErrorCode};
use crate::query::QueryDescriptor;

/// One delivery from a live query
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    /// Full matching document set
    Snapshot(Vec<Document>),
    /// The query failed; no further snapshots should be expected
    Error(RemoteError),
}

impl RemoteEvent {
    /// A delivery whose payload could not be read as documents
    pub fn unreadable(message: impl Into<String>) -> Self {
        RemoteEvent::Error(RemoteError::new(RemoteErrorCode::Unknown, message))
    }
}

/// Callback receiving live query deliveries
pub type SnapshotListener = Box<dyn FnMut(RemoteEvent)>;

/// Handle to an open live query. Dropping it unsubscribes.
#[must_use = "dropping the registration closes the subscription"]
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce()>>,
}

impl ListenerRegistration {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Registration with nothing to tear down
    pub fn inert() -> Self {
        Self { detach: None }
    }

    pub fn remove(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

/// Standing queries over the remote store
pub trait LiveCollection {
    /// Open a live query. Deliveries arrive later through `listener`.
    fn subscribe(&self, query: &QueryDescriptor, listener: SnapshotListener) -> ListenerRegistration;
}

/// Remote write operations
#[async_trait(?Send)]
pub trait MutationTransport {
    /// Add a document, returning its assigned id
    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<String, RemoteError>;

    /// Merge `fields` into an existing document
    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<(), RemoteError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;
}
