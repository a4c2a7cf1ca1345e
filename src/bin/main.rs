//! rwa-wallet CLI - drive the wallet session against a scripted wallet
//!
//! All output is JSON:
//!   rwa-wallet network                     → target network descriptor
//!   rwa-wallet demo [options]              → initialize + connect, final session
//!   rwa-wallet mint nft|ft [options]       → mint against a ready session
//!
//! Configuration:
//!   --config <path> or RWA_NETWORK_CONFIG  → SessionConfig JSON
//!
//! Output format:
//!   --json     Output compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context, Result};
use futures::StreamExt;
use rwa_wallet::config::CONFIG_ENV;
use rwa_wallet::logging::{init_logging, LOG_JSON_ENV};
use rwa_wallet::{
    AssetType, ChainId, FtMintForm, MockProvider, NftMintWizard, PriceToken, SessionConfig,
    SessionManager,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::debug;

const DEMO_ACCOUNT: &str = "0xABCD000000000000000000000000000000001234";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("rwa-wallet {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("network") => cmd_network(&opts),
        Some("demo") => run(cmd_demo(&opts)),
        Some("mint") => run(cmd_mint(&opts)),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

/// The session is `!Send`; drive it on a current-thread runtime.
fn run<F: std::future::Future<Output = Result<Value>>>(future: F) -> Result<Value> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("tokio runtime")?;
    runtime.block_on(future)
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    kind: Option<String>,
    config: Option<String>,
    // Scripted wallet
    chain: Option<String>,
    accounts: Vec<String>,
    authorized: bool,
    reject: bool,
    known_chain: bool,
    // Mint form
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    asset_type: Option<String>,
    token: Option<String>,
    valuation: Option<String>,
    maturity: Option<String>,
    apy: Option<String>,
    supply: Option<String>,
    // Output options
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
            let value = args.get(i + 1).cloned();
            let mut take = |slot: &mut Option<String>| {
                if value.is_some() {
                    *slot = value.clone();
                    i += 1;
                }
            };
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--authorized" => opts.authorized = true,
                "--reject" => opts.reject = true,
                "--known-chain" => opts.known_chain = true,
                "--config" | "-c" => take(&mut opts.config),
                "--chain" => take(&mut opts.chain),
                "--title" | "-t" => take(&mut opts.title),
                "--description" | "-d" => take(&mut opts.description),
                "--image" => take(&mut opts.image),
                "--asset-type" => take(&mut opts.asset_type),
                "--token" => take(&mut opts.token),
                "--valuation" => take(&mut opts.valuation),
                "--maturity" => take(&mut opts.maturity),
                "--apy" => take(&mut opts.apy),
                "--supply" => take(&mut opts.supply),
                "--accounts" | "-a" => {
                    let mut raw = None;
                    take(&mut raw);
                    if let Some(raw) = raw {
                        opts.accounts = raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command, second the mint kind
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        if !positional.is_empty() {
            opts.kind = Some(positional.remove(0));
        }

        if opts.accounts.is_empty() {
            opts.accounts.push(DEMO_ACCOUNT.to_string());
        }

        opts
    }

    fn session_config(&self) -> Result<SessionConfig> {
        match &self.config {
            Some(path) => SessionConfig::from_file(path).with_context(|| format!("loading {}", path)),
            // Environment (lower priority than CLI args)
            None => SessionConfig::from_env().context("loading config from environment"),
        }
    }

    fn wallet(&self, config: &SessionConfig) -> Result<MockProvider> {
        let chain = match &self.chain {
            Some(raw) => ChainId::parse(raw)?,
            None => ChainId(1),
        };
        let accounts: Vec<&str> = self.accounts.iter().map(String::as_str).collect();
        let mut wallet = MockProvider::new().with_chain(chain);
        wallet = if self.authorized { wallet.with_authorized(&accounts) } else { wallet.with_wallet_accounts(&accounts) };
        if self.known_chain {
            wallet = wallet.with_known_chain(config.target.chain_id);
        }
        if self.reject {
            wallet = wallet.rejecting_prompt();
        }
        Ok(wallet)
    }
}

fn cmd_network(opts: &ParsedArgs) -> Result<Value> {
    let config = opts.session_config()?;
    Ok(serde_json::to_value(&config.target)?)
}

async fn cmd_demo(opts: &ParsedArgs) -> Result<Value> {
    let config = opts.session_config()?;
    let wallet = opts.wallet(&config)?;
    let manager = SessionManager::new(Some(wallet.clone()), config);
    let mut notices = manager.subscribe_notices();

    manager.initialize().await;
    manager.pump_events();
    let after_init = manager.snapshot();

    let outcome = if manager.is_ready() { None } else { Some(manager.connect().await) };
    let applied = manager.pump_events();
    debug!(applied, "wallet events applied after connect");
    let session = manager.snapshot();
    manager.teardown();

    // Dropping the manager closes the notice bus, so the drain terminates.
    drop(manager);
    let mut delivered = Vec::new();
    while let Some(notice) = notices.next().await {
        delivered.push(notice);
    }

    Ok(json!({
        "initialized": after_init,
        "outcome": outcome.as_ref().map(|o| o.as_str()),
        "session": session,
        "notices": delivered,
        "calls": wallet.calls().iter().map(|c| c.to_request()).collect::<Vec<_>>(),
    }))
}

async fn cmd_mint(opts: &ParsedArgs) -> Result<Value> {
    let config = opts.session_config()?;
    let wallet = MockProvider::new()
        .with_chain(config.target.chain_id)
        .with_authorized(&[opts.accounts[0].as_str()]);
    let manager = SessionManager::new(Some(wallet), config);
    manager.initialize().await;
    if !manager.is_ready() {
        bail!("session not ready: {:?}", manager.snapshot());
    }
    let session = manager.session();

    let asset_type = match opts.asset_type.as_deref() {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .and_then(AssetType::from_index)
            .ok_or_else(|| anyhow!("asset type must be 0 (Real Estate), 1 (Invoice) or 2 (Commodity)"))?,
        None => AssetType::default(),
    };
    let price_token = match opts.token.as_deref() {
        Some(raw) => raw.parse::<PriceToken>()?,
        None => PriceToken::default(),
    };

    let asset = match opts.kind.as_deref() {
        Some("nft") => {
            let mut wizard = NftMintWizard::new();
            wizard.title = opts.title.clone().unwrap_or_default();
            wizard.description = opts.description.clone().unwrap_or_default();
            wizard.image = opts.image.clone();
            wizard.next()?;
            wizard.asset_type = asset_type;
            wizard.price_token = price_token;
            wizard.valuation = opts.valuation.clone().unwrap_or_default();
            wizard.maturity = opts.maturity.clone();
            wizard.apy = opts.apy.clone();
            wizard.mint(&session)?
        }
        Some("ft") => {
            let form = FtMintForm {
                title: opts.title.clone().unwrap_or_default(),
                description: opts.description.clone().unwrap_or_default(),
                image: opts.image.clone(),
                asset_type,
                price_token,
                total_supply: opts.supply.clone().unwrap_or_default(),
                ..FtMintForm::default()
            };
            form.mint(&session)?
        }
        Some(other) => bail!("unknown asset kind '{}' (expected nft or ft)", other),
        None => bail!("usage: rwa-wallet mint nft|ft --title <t> --description <d> ..."),
    };
    Ok(serde_json::to_value(&asset)?)
}

fn print_usage() {
    println!(
        r#"rwa-wallet - wallet session and issuer desk

USAGE:
    rwa-wallet <command> [kind] [options]

COMMANDS:
    network                 Print the target network descriptor
    demo                    Initialize and connect against a scripted wallet
    mint nft|ft             Mint a mock asset from a ready session

WALLET OPTIONS (demo):
    --chain <id>            Chain the wallet starts on (default: 0x1)
    --accounts, -a <a,b>    Wallet accounts (comma separated)
    --authorized            Accounts are already authorized (silent init connects)
    --reject                Dismiss the permission prompt
    --known-chain           Wallet already knows the target chain (no add needed)

MINT OPTIONS:
    --title, -t <text>      Asset title (required)
    --description, -d <t>   Asset description (required)
    --image <file>          Image file name (required for nft)
    --asset-type <0|1|2>    Real Estate | Invoice | Commodity
    --token <USDC|USDT>     Price token
    --valuation <u64>       NFT valuation
    --maturity <u64>        NFT maturity
    --apy <u64>             NFT APY
    --supply <u64>          FT total supply (required for ft)

CONFIG:
    --config, -c <path>     SessionConfig JSON (env: {config_env})

OUTPUT OPTIONS:
    --json                  Compact JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version

LOGGING:
    RUST_LOG=debug          Log filter (default: info)
    {log_json}=1          JSON log lines on stderr
"#,
        config_env = CONFIG_ENV,
        log_json = LOG_JSON_ENV,
    );
}
