//! Host environment: what the page (or terminal) does for the session.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait(?Send)]
pub trait Host {
    /// Blocking, user-visible notification (`alert` in a browser).
    fn notify(&self, message: &str);

    /// Discard everything and start over (`location.reload()` in a browser).
    fn reload(&self);

    /// Yield for `duration`. Used between receipt polls.
    async fn sleep(&self, duration: Duration);
}
