//! Declarative UI: which call-to-action to show, and the page around it.
//!
//! | network == required | account | view |
//! |---------------------|---------|------|
//! | no | any | `SwitchNetwork` |
//! | yes | empty | `ConnectWallet` |
//! | yes | set | `Mint` |

use serde::Serialize;

use super::config::MintConfig;

pub const TITLE: &str = "My NFT Collection";
pub const SUBTITLE: &str = "Each unique. Each beautiful. Discover your NFT today.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    SwitchNetwork,
    ConnectWallet,
    Mint,
}

impl View {
    /// Pure function of `(account, network)`.
    pub fn select(account: Option<&str>, network: Option<&str>, required_network: &str) -> View {
        if network != Some(required_network) {
            View::SwitchNetwork
        } else if account.map_or(true, str::is_empty) {
            View::ConnectWallet
        } else {
            View::Mint
        }
    }

    /// `data-action` wired to the button of this view.
    pub fn action(&self) -> &'static str {
        match self {
            View::SwitchNetwork => "switch",
            View::ConnectWallet => "connect",
            View::Mint => "mint",
        }
    }
}

/// Render the whole page. `minting` disables the mint button while a transaction is pending.
pub fn render_html(config: &MintConfig, view: View, minting: bool) -> String {
    let action = view.action();
    let cta = match view {
        View::SwitchNetwork => format!(
            "<div class=\"connect-wallet-container\">\
             <p>Please connect to {}</p>\
             <button class=\"cta-button mint-button\" data-action=\"{action}\">Click here to switch</button>\
             </div>",
            escape(config.required_network_name())
        ),
        View::ConnectWallet => format!(
            "<button class=\"cta-button connect-wallet-button\" data-action=\"{action}\">Connect to Wallet</button>"
        ),
        View::Mint if minting => format!(
            "<button class=\"cta-button connect-wallet-button\" data-action=\"{action}\" disabled>Minting...</button>"
        ),
        View::Mint => format!(
            "<button class=\"cta-button connect-wallet-button\" data-action=\"{action}\">Mint NFT</button>"
        ),
    };
    let handle = escape(&config.social_handle);
    format!(
        "<div class=\"App\"><div class=\"container\">\
         <div class=\"header-container\">\
         <p class=\"header gradient-text\">{TITLE}</p>\
         <p class=\"sub-text\">{SUBTITLE}</p>\
         <p class=\"sub-text mint-count\">{} NFTs in this collection</p>\
         {cta}\
         </div>\
         <div class=\"footer-container\">\
         <a class=\"footer-text\" href=\"{}\" target=\"_blank\" rel=\"noreferrer\">built on @{handle}</a>\
         </div>\
         </div></div>",
        config.total_mint_count,
        escape(&config.social_link()),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
