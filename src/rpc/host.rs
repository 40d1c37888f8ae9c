//! TerminalHost - the native stand-in for the browser page.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tracing::info;

use crate::host::Host;

/// Collects notifications instead of popping alerts; a reload is a flag the driver acts on.
#[derive(Debug, Default)]
pub struct TerminalHost {
    notifications: RefCell<Vec<String>>,
    reload_requested: Cell<bool>,
}

impl TerminalHost {
    pub fn new() -> Self { Self::default() }

    /// Drain notifications collected so far.
    pub fn take_notifications(&self) -> Vec<String> {
        std::mem::take(&mut *self.notifications.borrow_mut())
    }

    /// True once per requested reload.
    pub fn take_reload(&self) -> bool { self.reload_requested.replace(false) }
}

#[async_trait(?Send)]
impl Host for TerminalHost {
    fn notify(&self, message: &str) {
        info!(target: "epicmint::notify", "{message}");
        self.notifications.borrow_mut().push(message.to_string());
    }

    fn reload(&self) {
        self.reload_requested.set(true);
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
