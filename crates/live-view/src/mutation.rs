//! Mutation Sink
//!
//! Fire-and-forget writes. Every call returns as soon as the write is
//! handed to the spawner; a failure later shows up on the [`ErrorBus`].
//! Nothing here checks permissions and nothing is retried.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::domain::{LiveViewError, Operation};
use crate::remote::MutationTransport;

/// Boxed local future handed to a [`Spawner`]
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs detached local futures on the host's executor
pub trait Spawner {
    fn spawn(&self, task: LocalTask);
}

/// Spawns onto the current tokio `LocalSet`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLocalSpawner;

#[cfg(not(target_arch = "wasm32"))]
impl Spawner for TokioLocalSpawner {
    fn spawn(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }
}

/// Broadcasts write and subscription failures to whoever shows notices
#[derive(Debug, Clone)]
pub struct ErrorBus {
    tx: broadcast::Sender<LiveViewError>,
}

impl ErrorBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveViewError> {
        self.tx.subscribe()
    }

    /// Log and publish. Dropped silently when nobody listens.
    pub fn report(&self, error: LiveViewError) {
        log::error!("[MUTATION] {}", error);
        let _ = self.tx.send(error);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new(32)
    }
}

/// Decrements the in-flight counter when the write settles
struct InFlight(Rc<Cell<usize>>);

impl InFlight {
    fn start(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self(Rc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Non-blocking writes against the remote store
#[derive(Clone)]
pub struct MutationSink {
    transport: Rc<dyn MutationTransport>,
    spawner: Rc<dyn Spawner>,
    errors: ErrorBus,
    in_flight: Rc<Cell<usize>>,
}

impl MutationSink {
    pub fn new(transport: Rc<dyn MutationTransport>, spawner: Rc<dyn Spawner>, errors: ErrorBus) -> Self {
        Self {
            transport,
            spawner,
            errors,
            in_flight: Rc::new(Cell::new(0)),
        }
    }

    pub fn errors(&self) -> &ErrorBus {
        &self.errors
    }

    /// Writes issued but not yet settled
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn create(&self, collection: &str, data: Map<String, Value>) {
        let transport = Rc::clone(&self.transport);
        let errors = self.errors.clone();
        let guard = InFlight::start(&self.in_flight);
        let collection = collection.to_string();
        log::debug!("[MUTATION] create {}", collection);
        self.spawner.spawn(Box::pin(async move {
            let _guard = guard;
            match transport.create(&collection, data).await {
                Ok(id) => log::debug!("[MUTATION] created {}/{}", collection, id),
                Err(e) => errors.report(e.into_live(Operation::Create, collection)),
            }
        }));
    }

    pub fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        let transport = Rc::clone(&self.transport);
        let errors = self.errors.clone();
        let guard = InFlight::start(&self.in_flight);
        let (collection, id) = (collection.to_string(), id.to_string());
        log::debug!("[MUTATION] update {}/{} ({} fields)", collection, id, fields.len());
        self.spawner.spawn(Box::pin(async move {
            let _guard = guard;
            if let Err(e) = transport.update(&collection, &id, fields).await {
                errors.report(e.into_live(Operation::Update, format!("{}/{}", collection, id)));
            }
        }));
    }

    pub fn delete(&self, collection: &str, id: &str) {
        let transport = Rc::clone(&self.transport);
        let errors = self.errors.clone();
        let guard = InFlight::start(&self.in_flight);
        let (collection, id) = (collection.to_string(), id.to_string());
        log::debug!("[MUTATION] delete {}/{}", collection, id);
        self.spawner.spawn(Box::pin(async move {
            let _guard = guard;
            if let Err(e) = transport.delete(&collection, &id).await {
                errors.report(e.into_live(Operation::Delete, format!("{}/{}", collection, id)));
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchId, RemoteError, RemoteErrorCode, Scope};
    use crate::remote::MemoryCollection;
    use serde_json::json;
    use tokio::task::LocalSet;

    fn sink(store: &MemoryCollection) -> MutationSink {
        MutationSink::new(Rc::new(store.clone()), Rc::new(TokioLocalSpawner), ErrorBus::new(8))
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn status_fields(status: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status));
        fields
    }

    #[tokio::test]
    async fn test_update_returns_before_write_lands() {
        LocalSet::new()
            .run_until(async {
                let store = MemoryCollection::new();
                store.insert_json("tasks", "t1", json!({"title": "a", "status": "x", "upc": "12001"}));
                let sink = sink(&store);

                sink.update("tasks", "t1", status_fields("y"));
                assert_eq!(sink.in_flight(), 1);
                assert_eq!(store.document("tasks", "t1").unwrap().field_str("status"), Some("x"));

                settle().await;
                assert_eq!(sink.in_flight(), 0);
                assert_eq!(store.document("tasks", "t1").unwrap().field_str("status"), Some("y"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_permission_denied_is_reported_with_path() {
        LocalSet::new()
            .run_until(async {
                let store = MemoryCollection::new();
                store.insert_json("tasks", "t1", json!({"title": "a", "upc": "12002"}));
                store.restrict_writes_to(Scope::Branch(BranchId::new("12001")));
                let sink = sink(&store);
                let mut rx = sink.errors().subscribe();

                sink.update("tasks", "t1", status_fields("y"));
                settle().await;

                assert_eq!(
                    rx.try_recv().unwrap(),
                    LiveViewError::PermissionDenied {
                        operation: Operation::Update,
                        path: "tasks/t1".to_string(),
                    }
                );
                assert!(rx.try_recv().is_err());
            })
            .await;
    }

    #[tokio::test]
    async fn test_failures_are_not_retried() {
        LocalSet::new()
            .run_until(async {
                let store = MemoryCollection::new();
                store.set_write_failure(Some(RemoteError::new(RemoteErrorCode::Unavailable, "offline")));
                let sink = sink(&store);
                let mut rx = sink.errors().subscribe();

                sink.create("tasks", status_fields("y"));
                settle().await;
                store.set_write_failure(None);
                settle().await;

                match rx.try_recv().unwrap() {
                    LiveViewError::Remote { operation, path, message } => {
                        assert_eq!(operation, Operation::Create);
                        assert_eq!(path, "tasks");
                        assert_eq!(message, "offline");
                    }
                    other => panic!("unexpected {:?}", other),
                }
                assert!(store.documents("tasks").is_empty());
                assert_eq!(sink.in_flight(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_quiet() {
        LocalSet::new()
            .run_until(async {
                let store = MemoryCollection::new();
                let sink = sink(&store);
                let mut rx = sink.errors().subscribe();
                sink.delete("tasks", "gone");
                settle().await;
                assert!(rx.try_recv().is_err());
            })
            .await;
    }
}
