//! MintApp: the page, exposed to JavaScript.
//!
//! ```javascript
//! import init, { MintApp } from 'epicmint';
//!
//! await init();
//! const app = new MintApp();          // or new MintApp({ socialHandle: "me" })
//! app.mount("root");                  // renders + wires data-action buttons
//! await app.start();                  // detect existing connection
//! ```

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::host::BrowserHost;
use super::log;
use super::provider::InjectedProvider;
use crate::core::config::MintConfig;
use crate::error::SessionError;
use crate::session::WalletSession;

type Session = WalletSession<InjectedProvider, BrowserHost>;

#[wasm_bindgen]
pub struct MintApp {
    session: Rc<Session>,
    root: Rc<RefCell<Option<String>>>,
}

#[wasm_bindgen]
impl MintApp {
    /// `config` is optional; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<MintApp, JsValue> {
        let config: MintConfig = if config.is_undefined() || config.is_null() {
            MintConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let provider = InjectedProvider::detect().map(Rc::new);
        log!("[MintApp] wallet provider present: {}", provider.is_some());
        Ok(Self {
            session: Rc::new(WalletSession::new(provider, Rc::new(BrowserHost), config)),
            root: Rc::new(RefCell::new(None)),
        })
    }

    /// Detect an existing connection. Call once on load.
    #[wasm_bindgen]
    pub async fn start(&self) -> Result<JsValue, JsValue> {
        let result = self.session.detect_existing_connection().await;
        self.rerender();
        to_js(&result.map_err(js_error)?)
    }

    #[wasm_bindgen]
    pub async fn connect(&self) -> Result<JsValue, JsValue> {
        let result = self.session.request_connection().await;
        self.rerender();
        to_js(&result.map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = "switchNetwork")]
    pub async fn switch_network(&self) -> Result<JsValue, JsValue> {
        let result = self.session.verify_or_switch_network().await;
        self.rerender();
        to_js(&result.map_err(js_error)?)
    }

    #[wasm_bindgen]
    pub async fn mint(&self) -> Result<JsValue, JsValue> {
        let result = self.session.submit_mint_transaction().await;
        self.rerender();
        to_js(&result.map_err(js_error)?)
    }

    /// `{account, network, chainId}`
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.state())
    }

    /// `"switchNetwork" | "connectWallet" | "mint"`
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.view())
    }

    #[wasm_bindgen]
    pub fn html(&self) -> String {
        self.session.render_html()
    }

    /// Render into `#root_id` and dispatch clicks on `[data-action]`.
    #[wasm_bindgen]
    pub fn mount(&self, root_id: &str) -> Result<(), JsValue> {
        let element = root_element(root_id)?;
        *self.root.borrow_mut() = Some(root_id.to_string());
        element.set_inner_html(&self.session.render_html());

        let weak = Rc::downgrade(&self.session);
        let root = self.root.clone();
        self.session.set_on_change(Rc::new(move || {
            if let Some(session) = weak.upgrade() {
                render(&session, &root);
            }
        }));

        let session = self.session.clone();
        let root = self.root.clone();
        let on_click = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let action = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest("[data-action]").ok().flatten())
                .and_then(|el| el.get_attribute("data-action"));
            let Some(action) = action else { return };
            let session = session.clone();
            let root = root.clone();
            wasm_bindgen_futures::spawn_local(async move {
                dispatch(&session, &root, &action).await;
            });
        }) as Box<dyn FnMut(web_sys::Event)>);
        element.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // Lives as long as the page.
        on_click.forget();
        Ok(())
    }
}

impl MintApp {
    fn rerender(&self) {
        render(&self.session, &self.root);
    }
}

async fn dispatch(session: &Session, root: &RefCell<Option<String>>, action: &str) {
    log!("[MintApp] action: {}", action);
    match action {
        "connect" => {
            let _ = session.request_connection().await;
        }
        "switch" => {
            let _ = session.verify_or_switch_network().await;
        }
        "mint" => {
            let _ = session.submit_mint_transaction().await;
        }
        other => log!("[MintApp] unknown action: {}", other),
    }
    render(session, root);
}

fn render(session: &Session, root: &RefCell<Option<String>>) {
    let Some(id) = root.borrow().clone() else { return };
    if let Ok(element) = root_element(&id) {
        element.set_inner_html(&session.render_html());
    }
}

fn root_element(id: &str) -> Result<web_sys::Element, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
