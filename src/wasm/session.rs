//! WasmSession: the wallet session exposed to JavaScript
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import { WasmSession } from 'rwa-wallet';
//!
//! const session = new WasmSession();          // mount
//! session.onNotice(n => toast[n.level](n.message));
//! await session.initialize();
//!
//! if (!session.isReady()) {
//!     const outcome = await session.connect(); // "ready", "cancelled", ...
//! }
//! render(session.snapshot());
//!
//! session.teardown();                          // unmount
//! ```

use super::log;
use super::provider::InjectedProvider;
use crate::config::SessionConfig;
use crate::session::SessionManager;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub struct WasmSession {
    manager: Rc<SessionManager<InjectedProvider>>,
}

#[wasm_bindgen]
impl WasmSession {
    /// Mount with the default target network.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::mount(SessionConfig::default())
    }

    /// Mount with a JSON config (same shape as `SessionConfig`).
    #[wasm_bindgen(js_name = "withConfig")]
    pub fn with_config(config_json: &str) -> Result<WasmSession, JsValue> {
        let config = SessionConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::mount(config))
    }

    fn mount(config: SessionConfig) -> Self {
        let provider = InjectedProvider::detect();
        log!("[WasmSession] mounting, provider present: {}", provider.is_some());
        let manager = Rc::new(SessionManager::new(provider, config));

        let events = manager.clone();
        wasm_bindgen_futures::spawn_local(async move {
            events.run_events().await;
        });

        Self { manager }
    }

    #[wasm_bindgen]
    pub async fn initialize(&self) {
        self.manager.initialize().await;
    }

    /// Returns the outcome name (`"ready"`, `"cancelled"`, `"wrong_network"`, ...).
    #[wasm_bindgen]
    pub async fn connect(&self) -> String {
        self.manager.connect().await.as_str().to_string()
    }

    #[wasm_bindgen(js_name = "isReady")]
    pub fn is_ready(&self) -> bool {
        self.manager.is_ready()
    }

    #[wasm_bindgen(js_name = "isInitialLoading")]
    pub fn is_initial_loading(&self) -> bool {
        self.manager.is_initial_loading()
    }

    #[wasm_bindgen(js_name = "hasProvider")]
    pub fn has_provider(&self) -> bool {
        self.manager.has_provider()
    }

    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.manager.snapshot())
    }

    /// Forward every notice to `callback({level, message})`.
    #[wasm_bindgen(js_name = "onNotice")]
    pub fn on_notice(&self, callback: js_sys::Function) {
        let rx = self.manager.subscribe_notices();
        let this = JsValue::NULL;
        wasm_bindgen_futures::spawn_local(async move {
            use futures::StreamExt;
            let mut rx = rx;
            while let Some(notice) = rx.next().await {
                if let Ok(value) = to_js(&notice) {
                    let _ = callback.call1(&this, &value);
                }
            }
        });
    }

    /// Unmount: detach provider listeners. This also ends the spawned event
    /// task, which holds its own handle on the manager. `free()` calls it too.
    #[wasm_bindgen]
    pub fn teardown(&self) {
        log!("[WasmSession] teardown");
        self.manager.teardown();
    }
}

impl Drop for WasmSession {
    fn drop(&mut self) {
        self.manager.teardown();
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}
