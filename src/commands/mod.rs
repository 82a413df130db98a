//! Remote Store Bridge
//!
//! Frontend bindings to the JavaScript store SDK exposed on
//! `window.__NAVIGA__.store`, organized by concern.

mod live_query;
mod mutation;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use live_view::domain::{RemoteError, RemoteErrorCode};

#[wasm_bindgen]
extern "C" {
    /// Opens a live query; returns the unsubscribe function
    #[wasm_bindgen(js_namespace = ["window", "__NAVIGA__", "store"], js_name = subscribe)]
    fn store_subscribe(
        query: JsValue,
        on_snapshot: &Closure<dyn FnMut(JsValue)>,
        on_error: &Closure<dyn FnMut(JsValue)>,
    ) -> js_sys::Function;

    #[wasm_bindgen(js_namespace = ["window", "__NAVIGA__", "store"], js_name = addDocument, catch)]
    async fn add_document(collection: &str, data: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__NAVIGA__", "store"], js_name = updateDocument, catch)]
    async fn update_document(collection: &str, id: &str, fields: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__NAVIGA__", "store"], js_name = deleteDocument, catch)]
    async fn delete_document(collection: &str, id: &str) -> Result<JsValue, JsValue>;
}

/// Error object thrown by the store SDK
#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn remote_error(value: JsValue) -> RemoteError {
    match serde_wasm_bindgen::from_value::<ErrorPayload>(value.clone()) {
        Ok(payload) => RemoteError::new(RemoteErrorCode::from_code(&payload.code), payload.message),
        Err(_) => RemoteError::new(
            RemoteErrorCode::Unknown,
            value.as_string().unwrap_or_else(|| format!("{:?}", value)),
        ),
    }
}

/// Plain JS objects for maps, so the SDK sees `{field: value}`
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, RemoteError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| RemoteError::new(RemoteErrorCode::Unknown, e.to_string()))
}

pub use live_query::BridgeCollection;
pub use mutation::{BridgeTransport, LeptosSpawner};
