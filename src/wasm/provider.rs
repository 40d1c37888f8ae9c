//! InjectedProvider - `window.ethereum` behind the `WalletProvider` trait.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::ProviderError;
use crate::provider::{EventHandler, SubscriptionId, WalletProvider};

pub struct InjectedProvider {
    ethereum: JsValue,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<SubscriptionId, (String, Closure<dyn FnMut(JsValue)>)>>,
}

impl InjectedProvider {
    /// `None` when the page has no injected wallet.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum, next_id: Cell::new(1), listeners: RefCell::new(HashMap::new()) })
    }

    fn function(&self, name: &str) -> Result<js_sys::Function, ProviderError> {
        js_sys::Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ProviderError::internal(format!("ethereum.{name} is not a function")))
    }
}

impl Drop for InjectedProvider {
    fn drop(&mut self) {
        let ids: Vec<SubscriptionId> = self.listeners.borrow().keys().copied().collect();
        for id in ids {
            self.unsubscribe(id);
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = json!({"method": method, "params": params})
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::internal(e.to_string()))?;
        let promise = self
            .function("request")?
            .call1(&self.ethereum, &args)
            .map_err(provider_error)?
            .dyn_into::<js_sys::Promise>()
            .map_err(|_| ProviderError::internal("ethereum.request did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(provider_error)?;
        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::internal(e.to_string()))
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.replace(self.next_id.get() + 1));
        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            let value: Value = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
            handler(&value);
        }) as Box<dyn FnMut(JsValue)>);
        if let Ok(on) = self.function("on") {
            let _ = on.call2(&self.ethereum, &JsValue::from_str(event), closure.as_ref().unchecked_ref());
        }
        self.listeners.borrow_mut().insert(id, (event.to_string(), closure));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some((event, closure)) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        if let Ok(remove) = self.function("removeListener") {
            let _ = remove.call2(&self.ethereum, &JsValue::from_str(&event), closure.as_ref().unchecked_ref());
        }
    }
}

/// Read `{code, message, data}` off a rejected request.
fn provider_error(err: JsValue) -> ProviderError {
    let field = |name: &str| js_sys::Reflect::get(&err, &JsValue::from_str(name)).ok();
    let code = field("code").and_then(|v| v.as_f64()).map(|c| c as i64);
    let message = field("message")
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    let data = field("data")
        .filter(|v| !v.is_undefined())
        .and_then(|v| serde_wasm_bindgen::from_value(v).ok());
    match code {
        Some(code) => ProviderError { code, message, data },
        None => ProviderError::internal(message),
    }
}
