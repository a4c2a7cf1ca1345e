//! InjectedProvider - `window.ethereum` behind the [`Provider`] trait.

use crate::core::methods::events;
use crate::error::ProviderError;
use crate::provider::{Provider, ProviderEvent, RpcMethod};
use async_trait::async_trait;
use futures::channel::mpsc;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// JSON-RPC "internal error", used when a rejection carries no code.
const INTERNAL_ERROR: i64 = -32603;

pub struct InjectedProvider {
    ethereum: Object,
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl InjectedProvider {
    /// `window.ethereum`, if a wallet extension injected one.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum: ethereum.unchecked_into(), listeners: RefCell::new(Vec::new()) })
    }

    fn function(&self, name: &str) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .map_err(provider_error)?
            .dyn_into::<Function>()
            .map_err(|_| ProviderError::new(INTERNAL_ERROR, format!("provider has no {}()", name)))
    }
}

/// Map a JS rejection (`{code, message}` or anything else) to a ProviderError.
fn provider_error(value: JsValue) -> ProviderError {
    let code = Reflect::get(&value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(INTERNAL_ERROR);
    let message = Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "provider request failed".into());
    ProviderError::new(code, message)
}

#[async_trait(?Send)]
impl Provider for InjectedProvider {
    async fn request(&self, method: RpcMethod) -> Result<Value, ProviderError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = method
            .to_request()
            .serialize(&serializer)
            .map_err(|e| ProviderError::new(INTERNAL_ERROR, e.to_string()))?;
        let promise: Promise = self
            .function("request")?
            .call1(&self.ethereum, &args)
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| ProviderError::new(INTERNAL_ERROR, "request() did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(provider_error)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::new(INTERNAL_ERROR, e.to_string()))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (tx, rx) = mpsc::unbounded();
        let on = match self.function("on") {
            Ok(on) => on,
            Err(e) => {
                tracing::warn!(error = %e, "provider does not support events");
                return rx;
            }
        };
        for name in events::ALL.iter().copied() {
            let tx = tx.clone();
            let listener = Closure::wrap(Box::new(move |payload: JsValue| {
                let value: Value = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
                if let Some(event) = ProviderEvent::from_raw(name, &value) {
                    let _ = tx.unbounded_send(event);
                }
            }) as Box<dyn FnMut(JsValue)>);
            if let Err(e) = on.call2(&self.ethereum, &JsValue::from_str(name), listener.as_ref().unchecked_ref()) {
                tracing::warn!(event = name, error = %provider_error(e), "listener registration failed");
            }
            self.listeners.borrow_mut().push(listener);
        }
        rx
    }

    fn remove_all_listeners(&self) {
        if let Ok(remove) = self.function("removeAllListeners") {
            for name in events::ALL {
                let _ = remove.call1(&self.ethereum, &JsValue::from_str(name));
            }
        }
        // Dropping the closures drops their senders and ends the event stream.
        self.listeners.borrow_mut().clear();
    }
}
