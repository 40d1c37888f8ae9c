//! Session state: connected account + detected network. Lives for one page load.

use serde::Serialize;

use crate::core::networks;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub account: Option<String>,
    pub network: Option<String>,
    pub chain_id: Option<String>,
}

impl SessionState {
    pub fn is_connected(&self) -> bool { self.account.is_some() }

    /// Record an observed chain id; unknown ids clear the network name.
    pub fn observe_chain(&mut self, chain_id: &str) {
        self.chain_id = Some(chain_id.to_string());
        self.network = networks::resolve(chain_id).map(String::from);
    }

    pub fn is_on(&self, network_name: &str) -> bool {
        self.network.as_deref() == Some(network_name)
    }
}
