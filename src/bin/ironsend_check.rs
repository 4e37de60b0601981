//! 命令行检查：解析一个收款人输入并输出 JSON 评估结果
//!
//! 用法：ironsend-check <input> [source_chain] [--source osmosis] [--destination evmos] [--wallet osmo1...]
//!       [--own cosmos=cosmos1...] [--name alice.osmo=osmo1...@osmosis]
//!       [--evm-native] [--hardware] [--no-fiat] [--no-pfm] [--testnet] [--zh] [--channel channel-0]
//!       [--config ironsend.toml]

use std::sync::Arc;

use anyhow::{Context, Result};

use ironsend::config::EngineConfig;
use ironsend::domain::{
    AssetInfo, ChainKey, ChainRegistry, Network, RecipientInput, RouteSupport,
    StaticChainRegistry, TransferContext,
};
use ironsend::error::AppError;
use ironsend::infrastructure::init_logging;
use ironsend::repository::{
    InMemoryContactBook, InMemoryNameService, InMemoryRouteSupportTable, RouteSupportTable,
    StaticWalletAddresses,
};
use ironsend::service::{AccountBridge, RestLinkedAddressClient, SendEngine};

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    source: Option<String>,
    destination: Option<String>,
    wallet: Option<String>,
    own: Vec<(String, String)>,
    names: Vec<(String, String, String)>,
    evm_native: bool,
    hardware: bool,
    no_fiat: bool,
    no_pfm: bool,
    testnet: bool,
    zh: bool,
    channel: Option<String>,
    config: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => parsed.source = args.next(),
            "--destination" => parsed.destination = args.next(),
            "--wallet" => parsed.wallet = args.next(),
            "--channel" => parsed.channel = args.next(),
            "--config" => parsed.config = args.next(),
            "--own" => {
                let value = args.next().context("--own expects <chain>=<address>")?;
                let (chain, address) = value
                    .split_once('=')
                    .context("--own expects <chain>=<address>")?;
                parsed.own.push((chain.to_string(), address.to_string()));
            }
            "--name" => {
                let value = args
                    .next()
                    .context("--name expects <name>=<address>@<chain>")?;
                let (name, target) = value
                    .split_once('=')
                    .context("--name expects <name>=<address>@<chain>")?;
                let (address, chain) = target
                    .rsplit_once('@')
                    .context("--name expects <name>=<address>@<chain>")?;
                parsed
                    .names
                    .push((name.to_string(), address.to_string(), chain.to_string()));
            }
            "--evm-native" => parsed.evm_native = true,
            "--hardware" => parsed.hardware = true,
            "--no-fiat" => parsed.no_fiat = true,
            "--no-pfm" => parsed.no_pfm = true,
            "--testnet" => parsed.testnet = true,
            "--zh" => parsed.zh = true,
            other if other.starts_with("--") => anyhow::bail!("unknown option {}", other),
            other => {
                if parsed.input.is_none() {
                    parsed.input = Some(other.to_string());
                } else if parsed.source.is_none() {
                    parsed.source = Some(other.to_string());
                } else {
                    anyhow::bail!("unexpected argument {}", other);
                }
            }
        }
    }

    Ok(parsed)
}

/// 所有启用的非 EVM-only 链之间默认可达
fn default_routes(registry: &dyn ChainRegistry, pfm_enabled: bool) -> InMemoryRouteSupportTable {
    let keys: Vec<String> = registry
        .chains()
        .into_iter()
        .filter(|c| c.enabled && !c.evm_only)
        .map(|c| c.key.as_str().to_string())
        .collect();

    let support = RouteSupport {
        supported: true,
        pfm_enabled,
        disabled: false,
    };
    let mut table = InMemoryRouteSupportTable::new();
    for (i, a) in keys.iter().enumerate() {
        for b in keys.iter().skip(i + 1) {
            table.insert_bidirectional(a, b, support);
        }
    }
    table
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = parse_args()?;
    let config = EngineConfig::from_env_and_file(args.config.as_deref())?;
    config
        .validate()
        .map_err(|e| AppError::config_invalid(format!("{:#}", e)))?;
    init_logging(&config.logging)?;

    let input = args
        .input
        .clone()
        .context("usage: ironsend-check <input> [--source <chain>] ...")?;

    let registry = Arc::new(StaticChainRegistry::new());
    registry.ensure_consistent()?;
    let source_chain = ChainKey::from(args.source.as_deref().unwrap_or("osmosis"));
    if !registry.chain(&source_chain).map(|c| c.enabled).unwrap_or(false) {
        return Err(AppError::chain_not_supported(format!(
            "unknown source chain {}",
            source_chain.as_str()
        ))
        .into());
    }

    let mut wallet = StaticWalletAddresses::default();
    for (chain, address) in &args.own {
        wallet = wallet.with(chain.as_str(), address.as_str());
    }

    let mut asset = AssetInfo::native("native");
    asset.fiat_value_available = !args.no_fiat;

    let current_wallet = args
        .wallet
        .clone()
        .or_else(|| {
            args.own
                .iter()
                .find(|(chain, _)| chain.as_str() == source_chain.as_str())
                .map(|(_, address)| address.clone())
        })
        .unwrap_or_default();

    let mut ctx = TransferContext::new(source_chain.clone(), current_wallet, asset);
    ctx.selected_destination_chain = args.destination.as_deref().map(ChainKey::from);
    if args.testnet {
        ctx.source_network = Network::Testnet;
    }
    ctx.is_hardware_wallet = args.hardware;
    ctx.asset_is_evm_native = args.evm_native;
    ctx.custom_ibc_channel_override = args.channel.clone();
    ctx.own_addresses = args
        .own
        .iter()
        .map(|(chain, address)| (ChainKey::from(chain.as_str()), address.clone()))
        .collect();

    let destinations: Vec<ChainKey> = registry.chains().iter().map(|c| c.key.clone()).collect();
    ctx.ibc_support =
        default_routes(registry.as_ref(), !args.no_pfm).snapshot_for(&source_chain, &destinations);

    let mut names = InMemoryNameService::new();
    for (name, address, chain) in &args.names {
        names = names.with_record(name.as_str(), address.as_str(), chain.as_str());
    }

    let engine = SendEngine::from_config(
        &config,
        registry.clone(),
        Arc::new(InMemoryContactBook::new()),
        Arc::new(wallet),
    );

    let client = RestLinkedAddressClient::from_config(&config.linked_address, config.bridge.timeout())
        .map_err(|e| anyhow::anyhow!("build linked address client: {}", e))?;
    let bridge = AccountBridge::new(client, config.bridge.clone());

    let evaluation = engine
        .evaluate_with_lookups(&RecipientInput::typed(input), &ctx, &bridge, &names)
        .await;

    tracing::info!(
        can_proceed = evaluation.can_proceed(),
        code = evaluation.finding.kind().map(|k| k.code()),
        "Recipient evaluated"
    );

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    if args.zh {
        if let Some(kind) = evaluation.finding.kind() {
            println!("{}", kind.message_zh());
        }
    }

    if evaluation.finding.is_blocking() {
        std::process::exit(2);
    }

    Ok(())
}
