//! Epicmint CLI - the mint page driven from a terminal
//!
//! Every command talks to a JSON-RPC node as if it were an injected wallet:
//!   epicmint status              → {"account": .., "network": .., "view": ..}
//!   epicmint connect             → eth_requestAccounts, first account
//!   epicmint switch              → wallet_switchEthereumChain (adds the chain if unknown)
//!   epicmint mint                → makeAnEpicNFT(), waits for the receipt
//!   epicmint watch               → print every NewEpicNFTMinted until Ctrl-C
//!   epicmint render              → the page HTML for the current view
//!
//! Configuration:
//!   --rpc <url>          EPICMINT_RPC_URL   (default http://127.0.0.1:8545)
//!   --contract <addr>    EPICMINT_CONTRACT  (default the deployed collection)
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use alloy_primitives::Address;
use anyhow::{anyhow, bail, Context};
use epicmint::logging::init_logging;
use epicmint::{HttpProvider, MintConfig, TerminalHost, View, WalletSession};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::rc::Rc;
use tracing::{debug, info, warn};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

type Session = WalletSession<HttpProvider, TerminalHost>;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("epicmint {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("status") => run(&opts, cmd_status),
        Some("connect") => run(&opts, cmd_connect),
        Some("switch") => run(&opts, cmd_switch),
        Some("mint") => run(&opts, cmd_mint),
        Some("watch") => run(&opts, cmd_watch),
        Some("render") => run(&opts, cmd_render),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    match result {
        Ok(output) => println!("{}", format_json(&output, opts.pretty_output())),
        Err(e) => {
            let err = json!({"error": format!("{e:#}")});
            eprintln!("{}", format_json(&err, opts.pretty_output()));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    rpc_url: Option<String>,
    contract: Option<String>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--rpc" | "-r" => {
                    if i + 1 < args.len() {
                        opts.rpc_url = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--contract" | "-c" => {
                    if i + 1 < args.len() {
                        opts.contract = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }

        // Environment is lower priority than flags
        if opts.rpc_url.is_none() {
            opts.rpc_url = env::var("EPICMINT_RPC_URL").ok().filter(|s| !s.is_empty());
        }
        if opts.contract.is_none() {
            opts.contract = env::var("EPICMINT_CONTRACT").ok().filter(|s| !s.is_empty());
        }

        opts
    }

    fn pretty_output(&self) -> bool {
        !self.json && (self.pretty || std::io::stdout().is_terminal())
    }

    fn config(&self) -> anyhow::Result<MintConfig> {
        let mut config = MintConfig::default();
        if let Some(contract) = self.contract.as_deref() {
            let address: Address = contract
                .trim()
                .parse()
                .with_context(|| format!("invalid contract address {contract}"))?;
            config = config.with_contract(address);
        }
        Ok(config)
    }
}

fn format_json(value: &Value, pretty: bool) -> String {
    let formatted = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    formatted.unwrap_or_else(|_| value.to_string())
}

fn print_usage() {
    println!(
        r#"epicmint - mint an NFT from the terminal

USAGE:
    epicmint <command> [options]

COMMANDS:
    status      Detect the connected account and network
    connect     Request account access
    switch      Switch the node/wallet to the required network
    mint        Mint one NFT and wait until it is mined
    watch       Print mint notifications until Ctrl-C
    render      Print the page HTML for the current state

OPTIONS:
    -r, --rpc <url>          JSON-RPC endpoint (env: EPICMINT_RPC_URL)
    -c, --contract <addr>    Collection contract (env: EPICMINT_CONTRACT)
    --json                   Compact JSON output
    --pretty                 Pretty JSON output
    -h, --help               Show this help
    -V, --version            Show version

LOGGING:
    RUST_LOG=epicmint=debug  Verbose logs on stderr
    EPICMINT_LOG_JSON=1      JSON logs"#
    );
}

// =============================================================================
// Commands
// =============================================================================

/// Build a session over the configured node and drive `command` to completion.
fn run<F, Fut>(opts: &ParsedArgs, command: F) -> anyhow::Result<Value>
where
    F: FnOnce(Rc<Session>) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<Value>>,
{
    let config = opts.config()?;
    let url = opts.rpc_url.clone().unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    debug!(rpc = %url, contract = %config.contract_address, "starting session");

    let provider = Rc::new(HttpProvider::new(&url)?);
    let session = Rc::new(WalletSession::new(Some(provider), Rc::new(TerminalHost::new()), config));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    rt.block_on(command(session))
}

fn status_json(session: &Session) -> Value {
    json!({
        "account": session.state().account,
        "network": session.state().network,
        "chainId": session.state().chain_id,
        "view": session.view(),
        "required": session.config().required_network_name(),
        "contract": session.config().contract_address,
    })
}

async fn cmd_status(session: Rc<Session>) -> anyhow::Result<Value> {
    session.detect_existing_connection().await?;
    Ok(status_json(&session))
}

async fn cmd_connect(session: Rc<Session>) -> anyhow::Result<Value> {
    session.detect_existing_connection().await?;
    let account = session.request_connection().await?;
    Ok(json!({ "account": account, "view": session.view() }))
}

async fn cmd_switch(session: Rc<Session>) -> anyhow::Result<Value> {
    let outcome = session.verify_or_switch_network().await?;
    session.detect_existing_connection().await?;
    Ok(json!({ "result": outcome, "network": session.state().network, "view": session.view() }))
}

async fn cmd_mint(session: Rc<Session>) -> anyhow::Result<Value> {
    session.detect_existing_connection().await?;
    if !session.state().is_connected() {
        session.request_connection().await?;
    }
    match session.view() {
        View::Mint => {}
        View::SwitchNetwork => bail!(
            "wrong network {:?}, run `epicmint switch` to move to {}",
            session.state().network.unwrap_or_else(|| "unknown".to_string()),
            session.config().required_network_name()
        ),
        View::ConnectWallet => bail!("no account available to mint from"),
    }

    let receipt = session.submit_mint_transaction().await?;

    // The minted event arrives through the log subscription, not the receipt.
    let provider = session.provider().context("no provider")?;
    if let Err(e) = provider.poll().await {
        warn!(error = %e, "could not fetch mint event");
    }
    Ok(json!({
        "receipt": receipt,
        "notifications": session.host().take_notifications(),
    }))
}

async fn cmd_watch(session: Rc<Session>) -> anyhow::Result<Value> {
    session.detect_existing_connection().await?;
    info!(contract = %session.config().contract_address, "watching for mints, Ctrl-C to stop");
    let delivered = watch_mints(&session, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(json!({ "delivered": delivered, "state": status_json(&session) }))
}

/// Poll and print notifications until `shutdown` resolves. Shutdown also cancels a poll in progress.
async fn watch_mints(session: &Session, shutdown: impl std::future::Future<Output = ()>) -> anyhow::Result<usize> {
    let provider = session.provider().cloned().context("no provider")?;
    let interval = session.config().receipt_poll_interval();
    tokio::pin!(shutdown);

    let mut delivered = 0usize;
    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = async {
                tokio::time::sleep(interval).await;
                provider.poll().await
            } => polled,
        };
        match polled {
            Ok(count) => delivered += count,
            Err(e) => warn!(error = %e, "poll failed"),
        }
        for message in session.host().take_notifications() {
            println!("{}", json!({ "notification": message }));
        }
        if session.host().take_reload() {
            session.reset().await;
            if let Err(e) = session.detect_existing_connection().await {
                warn!(error = %e, "re-detect after chain change failed");
            }
        }
    }
    Ok(delivered)
}

async fn cmd_render(session: Rc<Session>) -> anyhow::Result<Value> {
    session.detect_existing_connection().await?;
    Ok(json!({ "view": session.view(), "html": session.render_html() }))
}
