//! BrowserHost - alert, reload, setTimeout.

use async_trait::async_trait;
use std::time::Duration;
use wasm_bindgen_futures::JsFuture;

use crate::host::Host;

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHost;

#[async_trait(?Send)]
impl Host for BrowserHost {
    fn notify(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn reload(&self) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    }

    async fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}
