//! Browser Session Cache
//!
//! The login page stores a small profile in `localStorage`; the console
//! only reads it.

use live_view::domain::{SessionCache, SessionContext};
use live_view::ConsoleConfig;

const SESSION_KEY: &str = "loggedInUser";
const CONFIG_KEY: &str = "navigaConsoleConfig";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn read_key(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// `localStorage["loggedInUser"]`
pub struct BrowserSession;

impl SessionCache for BrowserSession {
    fn read(&self) -> Option<SessionContext> {
        let raw = read_key(SESSION_KEY)?;
        match SessionContext::from_json(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("[SESSION] Ignoring cached login: {}", e);
                None
            }
        }
    }
}

/// Console settings saved in the browser, or the defaults
pub fn load_config() -> ConsoleConfig {
    let Some(raw) = read_key(CONFIG_KEY) else {
        return ConsoleConfig::default();
    };
    ConsoleConfig::from_json(&raw).unwrap_or_else(|e| {
        log::warn!("[CONFIG] Using defaults: {}", e);
        ConsoleConfig::default()
    })
}
