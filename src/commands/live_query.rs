//! Live Query Bridge

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use live_view::domain::Document;
use live_view::remote::{ListenerRegistration, LiveCollection, RemoteEvent, SnapshotListener};
use live_view::QueryDescriptor;

use super::{remote_error, store_subscribe, to_js};

/// `LiveCollection` backed by the JavaScript store SDK
#[derive(Clone, Copy, Default)]
pub struct BridgeCollection;

impl LiveCollection for BridgeCollection {
    fn subscribe(&self, query: &QueryDescriptor, listener: SnapshotListener) -> ListenerRegistration {
        let js_query = match to_js(query) {
            Ok(q) => q,
            Err(e) => {
                log::error!("[BRIDGE] Cannot encode {} query: {}", query.collection, e);
                return ListenerRegistration::inert();
            }
        };

        let listener = Rc::new(RefCell::new(listener));
        let snapshots = Rc::clone(&listener);
        let collection = query.collection.clone();
        let on_snapshot = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            match serde_wasm_bindgen::from_value::<Vec<Document>>(value) {
                Ok(documents) => (&mut *snapshots.borrow_mut())(RemoteEvent::Snapshot(documents)),
                Err(e) => {
                    log::warn!("[BRIDGE] Unreadable {} snapshot: {}", collection, e);
                    (&mut *snapshots.borrow_mut())(RemoteEvent::unreadable(e.to_string()));
                }
            }
        });
        let failures = Rc::clone(&listener);
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            (&mut *failures.borrow_mut())(RemoteEvent::Error(remote_error(value)));
        });

        let unsubscribe = store_subscribe(js_query, &on_snapshot, &on_error);
        // The closures must outlive the subscription on the JS side
        ListenerRegistration::new(move || {
            if let Err(e) = unsubscribe.call0(&JsValue::NULL) {
                log::warn!("[BRIDGE] Unsubscribe failed: {:?}", e);
            }
            drop(on_snapshot);
            drop(on_error);
        })
    }
}
