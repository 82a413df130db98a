//! In-Memory Remote Store
//!
//! Implements both remote contracts in process. Deliveries are queued and
//! only reach listeners on [`MemoryCollection::flush`], so callers control
//! exactly when "the network" answers. A delivery queued before its listener
//! unsubscribed is still handed over, the way a real SDK may fire a
//! callback that was already in flight.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::traits::{ListenerRegistration, LiveCollection, MutationTransport, RemoteEvent, SnapshotListener};
use crate::domain::{Document, RemoteError, RemoteErrorCode, Scope, BranchId, BRANCH_FIELD};
use crate::query::QueryDescriptor;

type SharedListener = Rc<RefCell<SnapshotListener>>;

struct ListenerSlot {
    id: u64,
    query: QueryDescriptor,
    listener: SharedListener,
}

#[derive(Default)]
struct MemoryState {
    /// collection -> document id -> fields
    documents: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
    listeners: Vec<ListenerSlot>,
    pending: VecDeque<(SharedListener, RemoteEvent)>,
    next_listener_id: u64,
    next_document_id: u64,
    write_scope: Option<Scope>,
    write_failure: Option<RemoteError>,
}

impl MemoryState {
    fn matching(&self, query: &QueryDescriptor) -> Vec<Document> {
        self.documents
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .filter(|doc| query.matches(&query.collection, doc))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Queue a fresh snapshot for every listener on `collection`
    fn notify(&mut self, collection: &str) {
        let deliveries: Vec<(SharedListener, RemoteEvent)> = self
            .listeners
            .iter()
            .filter(|slot| slot.query.collection == collection)
            .map(|slot| (Rc::clone(&slot.listener), RemoteEvent::Snapshot(self.matching(&slot.query))))
            .collect();
        self.pending.extend(deliveries);
    }

    fn check_write(&self, owner: Option<&str>, path: &str) -> Result<(), RemoteError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        let Some(scope) = &self.write_scope else {
            return Ok(());
        };
        let allowed = match owner {
            Some(owner) => scope.covers(&BranchId::new(owner)),
            None => scope.is_all(),
        };
        if allowed {
            Ok(())
        } else {
            Err(RemoteError::permission_denied(format!(
                "{} is outside {}",
                path,
                scope.label()
            )))
        }
    }
}

fn owner_of(data: &Map<String, Value>) -> Option<&str> {
    data.get(BRANCH_FIELD).and_then(Value::as_str)
}

/// In-process document store with live queries
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Rc<RefCell<MemoryState>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document as-is, bypassing write rules
    pub fn insert(&self, collection: &str, doc: Document) {
        let mut state = self.inner.borrow_mut();
        state
            .documents
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id, doc.data);
        state.notify(collection);
    }

    pub fn insert_json(&self, collection: &str, id: &str, data: Value) {
        self.insert(collection, Document::from_value(id, data));
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner
            .borrow()
            .documents
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone()))
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .borrow()
            .documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reject writes to documents outside `scope`, like the store's access rules
    pub fn restrict_writes_to(&self, scope: Scope) {
        self.inner.borrow_mut().write_scope = Some(scope);
    }

    /// Fail every write with `error` until cleared
    pub fn set_write_failure(&self, error: Option<RemoteError>) {
        self.inner.borrow_mut().write_failure = error;
    }

    /// Queue a query failure for every open listener
    pub fn fail_listeners(&self, code: RemoteErrorCode, message: &str) {
        let mut state = self.inner.borrow_mut();
        let deliveries: Vec<(SharedListener, RemoteEvent)> = state
            .listeners
            .iter()
            .map(|slot| {
                (
                    Rc::clone(&slot.listener),
                    RemoteEvent::Error(RemoteError::new(code, message)),
                )
            })
            .collect();
        state.pending.extend(deliveries);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn pending_deliveries(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Hand queued deliveries to their listeners, in order. Returns how many
    /// were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.borrow_mut().pending.pop_front();
            let Some((listener, event)) = next else {
                break;
            };
            let mut callback = listener.borrow_mut();
            (&mut **callback)(event);
            delivered += 1;
        }
        delivered
    }

    fn detach(inner: &Weak<RefCell<MemoryState>>, listener_id: u64) {
        if let Some(inner) = inner.upgrade() {
            inner.borrow_mut().listeners.retain(|slot| slot.id != listener_id);
        }
    }
}

impl LiveCollection for MemoryCollection {
    fn subscribe(&self, query: &QueryDescriptor, listener: SnapshotListener) -> ListenerRegistration {
        let listener: SharedListener = Rc::new(RefCell::new(listener));
        let id = {
            let mut state = self.inner.borrow_mut();
            state.next_listener_id += 1;
            let id = state.next_listener_id;
            let initial = RemoteEvent::Snapshot(state.matching(query));
            state.pending.push_back((Rc::clone(&listener), initial));
            state.listeners.push(ListenerSlot {
                id,
                query: query.clone(),
                listener,
            });
            id
        };
        let inner = Rc::downgrade(&self.inner);
        ListenerRegistration::new(move || MemoryCollection::detach(&inner, id))
    }
}

#[async_trait(?Send)]
impl MutationTransport for MemoryCollection {
    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<String, RemoteError> {
        let mut state = self.inner.borrow_mut();
        state.check_write(owner_of(&data), collection)?;
        state.next_document_id += 1;
        let id = format!("doc-{}", state.next_document_id);
        state
            .documents
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        state.notify(collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<(), RemoteError> {
        let mut state = self.inner.borrow_mut();
        let path = format!("{}/{}", collection, id);
        let current_owner = state
            .documents
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| owner_of(data).map(str::to_string))
            .ok_or_else(|| RemoteError::new(RemoteErrorCode::NotFound, format!("{} does not exist", path)))?;
        state.check_write(current_owner.as_deref(), &path)?;
        if let Some(new_owner) = owner_of(&fields) {
            state.check_write(Some(new_owner), &path)?;
        }
        if let Some(doc) = state.documents.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            for (key, value) in fields {
                doc.insert(key, value);
            }
        }
        state.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let mut state = self.inner.borrow_mut();
        let path = format!("{}/{}", collection, id);
        let owner = state
            .documents
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| owner_of(data).map(str::to_string));
        match owner {
            Some(owner) => state.check_write(owner.as_deref(), &path)?,
            // Deleting a missing document succeeds, as in the remote store
            None => return Ok(()),
        }
        if let Some(docs) = state.documents.get_mut(collection) {
            docs.remove(id);
        }
        state.notify(collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::query::{build_query, RemoteHandle};
    use serde_json::json;

    fn branch_query(branch: &str) -> QueryDescriptor {
        let scope = Scope::Branch(BranchId::new(branch));
        build_query::<Task>(Some(&RemoteHandle::new("naviga")), Some(&scope)).unwrap()
    }

    fn recorder() -> (Rc<RefCell<Vec<RemoteEvent>>>, SnapshotListener) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |event| sink.borrow_mut().push(event)))
    }

    #[test]
    fn test_initial_snapshot_is_deferred_until_flush() {
        let store = MemoryCollection::new();
        store.insert_json("tasks", "t1", json!({"title": "a", "upc": "12001"}));
        store.insert_json("tasks", "t2", json!({"title": "b", "upc": "12002"}));

        let (seen, listener) = recorder();
        let _registration = store.subscribe(&branch_query("12001"), listener);
        assert!(seen.borrow().is_empty());

        assert_eq!(store.flush(), 1);
        match &seen.borrow()[0] {
            RemoteEvent::Snapshot(docs) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].id, "t1");
            }
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn test_dropping_registration_stops_new_deliveries() {
        let store = MemoryCollection::new();
        let (seen, listener) = recorder();
        let registration = store.subscribe(&branch_query("12001"), listener);
        store.flush();
        drop(registration);
        assert_eq!(store.listener_count(), 0);

        store.insert_json("tasks", "t1", json!({"title": "a", "upc": "12001"}));
        store.flush();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_write_rules_reject_other_branches() {
        let store = MemoryCollection::new();
        store.insert_json("tasks", "t1", json!({"title": "a", "upc": "12002"}));
        store.restrict_writes_to(Scope::Branch(BranchId::new("12001")));

        let mut fields = Map::new();
        fields.insert("status".to_string(), json!("Selesai (Done)"));
        let err = store.update("tasks", "t1", fields).await.unwrap_err();
        assert_eq!(err.code, RemoteErrorCode::PermissionDenied);

        let mut data = Map::new();
        data.insert("upc".to_string(), json!("12001"));
        assert!(store.create("tasks", data).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryCollection::new();
        store.insert_json("tasks", "t1", json!({"title": "a", "status": "x", "upc": "12001"}));

        let mut fields = Map::new();
        fields.insert("status".to_string(), json!("y"));
        store.update("tasks", "t1", fields).await.unwrap();

        let doc = store.document("tasks", "t1").unwrap();
        assert_eq!(doc.field_str("status"), Some("y"));
        assert_eq!(doc.field_str("title"), Some("a"));

        let missing = store.update("tasks", "nope", Map::new()).await.unwrap_err();
        assert_eq!(missing.code, RemoteErrorCode::NotFound);
    }
}
