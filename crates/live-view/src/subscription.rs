//! Subscription Manager
//!
//! Keeps at most one live query open and publishes its latest state through
//! a `watch` channel. Every delivery fully replaces the previous records.
//!
//! Each opened query gets a generation number. A delivery whose generation
//! is no longer current comes from a torn-down query and is dropped, even if
//! the remote side fires it after the unsubscribe.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

use tokio::sync::watch;

use crate::domain::{decode_documents, LiveViewError, Record};
use crate::query::QueryDescriptor;
use crate::remote::{ListenerRegistration, LiveCollection, RemoteEvent};

/// Latest view of a live query
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState<R> {
    pub records: Vec<R>,
    pub is_loading: bool,
    /// Set when the query failed; `records` keeps the last good snapshot
    pub error: Option<LiveViewError>,
}

impl<R> LiveState<R> {
    /// No query open
    pub fn idle() -> Self {
        Self {
            records: Vec::new(),
            is_loading: false,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::idle()
        }
    }
}

impl<R> Default for LiveState<R> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Owns the single active live query for records of type `R`
pub struct SubscriptionManager<R: Record> {
    collection: Rc<dyn LiveCollection>,
    query: Option<QueryDescriptor>,
    registration: Option<ListenerRegistration>,
    generation: Rc<Cell<u64>>,
    state: Rc<watch::Sender<LiveState<R>>>,
    _record: PhantomData<R>,
}

impl<R: Record> SubscriptionManager<R> {
    pub fn new(collection: Rc<dyn LiveCollection>) -> Self {
        let (state, _) = watch::channel(LiveState::idle());
        Self {
            collection,
            query: None,
            registration: None,
            generation: Rc::new(Cell::new(0)),
            state: Rc::new(state),
            _record: PhantomData,
        }
    }

    pub fn query(&self) -> Option<&QueryDescriptor> {
        self.query.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// Current state (cloned)
    pub fn state(&self) -> LiveState<R> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<LiveState<R>> {
        self.state.subscribe()
    }

    /// Replace the live query. `None` closes it. The same descriptor again is
    /// a no-op.
    pub fn set_query(&mut self, query: Option<QueryDescriptor>) {
        if self.query == query {
            return;
        }
        self.teardown();
        self.query = query;

        let Some(query) = self.query.clone() else {
            self.state.send_replace(LiveState::idle());
            return;
        };

        let generation = self.generation.get();
        log::info!(
            "[LIVE] Opening {} query #{} (scoped: {})",
            query.collection,
            generation,
            query.is_scoped()
        );
        self.state.send_replace(LiveState::loading());

        let current = Rc::clone(&self.generation);
        let state = Rc::clone(&self.state);
        let collection = query.collection.clone();
        let listener = Box::new(move |event: RemoteEvent| {
            if current.get() != generation {
                log::debug!(
                    "[LIVE] Discarding delivery from closed {} query #{}",
                    collection,
                    generation
                );
                return;
            }
            match event {
                RemoteEvent::Snapshot(documents) => {
                    let records = decode_documents::<R>(&documents);
                    state.send_replace(LiveState {
                        records,
                        is_loading: false,
                        error: None,
                    });
                }
                RemoteEvent::Error(err) => {
                    log::warn!("[LIVE] {} query #{} failed: {}", collection, generation, err);
                    state.send_modify(|s| {
                        s.is_loading = false;
                        s.error = Some(LiveViewError::Subscription(err.message.clone()));
                    });
                }
            }
        });
        self.registration = Some(self.collection.subscribe(&query, listener));
    }

    /// Close the live query and clear the published records
    pub fn detach(&mut self) {
        self.set_query(None);
    }

    fn teardown(&mut self) {
        // Bump first so anything the old query still fires is stale
        self.generation.set(self.generation.get() + 1);
        if let Some(registration) = self.registration.take() {
            registration.remove();
        }
    }
}

impl<R: Record> Drop for SubscriptionManager<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchId, RemoteErrorCode, Scope, Task};
    use crate::query::{build_query, RemoteHandle};
    use crate::remote::{MemoryCollection, SnapshotListener};
    use serde_json::json;

    fn query_for(scope: &Scope) -> Option<QueryDescriptor> {
        build_query::<Task>(Some(&RemoteHandle::new("naviga")), Some(scope))
    }

    fn seeded() -> MemoryCollection {
        let store = MemoryCollection::new();
        store.insert_json("tasks", "t1", json!({"title": "a", "status": "Selesai (Done)", "upc": "12001"}));
        store.insert_json("tasks", "t2", json!({"title": "b", "status": "Selesai (Done)", "upc": "12002"}));
        store.flush();
        store
    }

    #[test]
    fn test_loading_until_first_snapshot() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        assert!(!manager.state().is_loading);

        manager.set_query(query_for(&Scope::Branch(BranchId::new("12001"))));
        assert!(manager.state().is_loading);
        assert!(manager.state().records.is_empty());

        store.flush();
        let state = manager.state();
        assert!(!state.is_loading);
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, "t1");
    }

    #[test]
    fn test_no_subscription_without_query() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        manager.set_query(None);
        assert!(!manager.is_active());
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_replaced_query_discards_in_flight_delivery() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));

        manager.set_query(query_for(&Scope::Branch(BranchId::new("12001"))));
        // A's initial snapshot is queued but not delivered yet
        assert_eq!(store.pending_deliveries(), 1);

        manager.set_query(query_for(&Scope::Branch(BranchId::new("12002"))));
        assert_eq!(store.listener_count(), 1);

        // Both A's stale snapshot and B's snapshot get delivered; only B lands
        assert_eq!(store.flush(), 2);
        let state = manager.state();
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, "t2");
    }

    #[test]
    fn test_same_query_keeps_subscription() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        let query = query_for(&Scope::All);
        manager.set_query(query.clone());
        store.flush();
        manager.set_query(query);
        assert_eq!(store.pending_deliveries(), 0);
        assert_eq!(manager.state().records.len(), 2);
    }

    #[test]
    fn test_error_keeps_last_good_records() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        manager.set_query(query_for(&Scope::All));
        store.flush();

        store.fail_listeners(RemoteErrorCode::Unavailable, "offline");
        store.flush();

        let state = manager.state();
        assert_eq!(state.records.len(), 2);
        assert!(!state.is_loading);
        assert_eq!(state.error, Some(LiveViewError::Subscription("offline".to_string())));
    }

    /// Delivers one unreadable payload as soon as a query opens
    struct GarbledCollection;

    impl LiveCollection for GarbledCollection {
        fn subscribe(&self, _query: &QueryDescriptor, mut listener: SnapshotListener) -> ListenerRegistration {
            listener(RemoteEvent::unreadable("invalid type: map, expected a sequence"));
            ListenerRegistration::inert()
        }
    }

    #[test]
    fn test_unreadable_first_delivery_stops_loading() {
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(GarbledCollection));
        manager.set_query(query_for(&Scope::All));

        let state = manager.state();
        assert!(!state.is_loading);
        assert!(state.records.is_empty());
        assert!(matches!(state.error, Some(LiveViewError::Subscription(_))));
    }

    #[test]
    fn test_detach_clears_records() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        manager.set_query(query_for(&Scope::All));
        store.flush();

        manager.detach();
        assert_eq!(manager.state(), LiveState::idle());
        assert_eq!(store.listener_count(), 0);

        store.insert_json("tasks", "t3", json!({"title": "c", "upc": "12001"}));
        store.flush();
        assert!(manager.state().records.is_empty());
    }

    #[test]
    fn test_watch_sees_each_snapshot() {
        let store = seeded();
        let mut manager = SubscriptionManager::<Task>::new(Rc::new(store.clone()));
        let mut rx = manager.watch();
        manager.set_query(query_for(&Scope::All));
        store.flush();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().records.len(), 2);
    }
}
