//! 测试辅助模块
//! 提供测试地址、上下文和引擎构造函数

#![allow(dead_code)]

use std::sync::Arc;

use ironsend::domain::{
    AssetInfo, ChainKey, ChainPair, Contact, RouteSupport, StaticChainRegistry, TransferContext,
};
use ironsend::repository::{InMemoryContactBook, StaticWalletAddresses};
use ironsend::service::SendEngine;

/// 私钥 = 1 对应的 EVM 地址（EIP-55 格式）
pub const GENERATOR_EVM_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

/// EIP-55 规范中的示例地址
pub const CHECKSUMMED_EVM_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// 用固定字节生成合法的 bech32 地址
pub fn bech32_address(prefix: &str, byte: u8) -> String {
    let hrp = bech32::Hrp::parse(prefix).unwrap();
    bech32::encode::<bech32::Bech32>(hrp, &[byte; 20]).unwrap()
}

pub fn wallet_osmo() -> String {
    bech32_address("osmo", 0xaa)
}

pub fn wallet_cosmos() -> String {
    bech32_address("cosmos", 0xaa)
}

pub fn route(supported: bool, pfm_enabled: bool) -> RouteSupport {
    RouteSupport {
        supported,
        pfm_enabled,
        disabled: false,
    }
}

pub fn wallet_addresses() -> StaticWalletAddresses {
    StaticWalletAddresses::default()
        .with("osmosis", wallet_osmo())
        .with("cosmos", wallet_cosmos())
}

/// 从 osmosis 发送 uosmo，osmosis ↔ cosmos 路径可用且启用 PFM
pub fn osmosis_context() -> TransferContext {
    let mut ctx = TransferContext::new("osmosis", wallet_osmo(), AssetInfo::native("uosmo"));
    ctx.own_addresses
        .insert(ChainKey::from("osmosis"), wallet_osmo());
    ctx.own_addresses
        .insert(ChainKey::from("cosmos"), wallet_cosmos());
    ctx.ibc_support
        .insert(ChainPair::new("osmosis", "cosmos"), route(true, true));
    ctx
}

pub fn engine_with_contacts(contacts: Vec<Contact>) -> Arc<SendEngine> {
    Arc::new(SendEngine::new(
        Arc::new(StaticChainRegistry::new()),
        Arc::new(InMemoryContactBook::with_contacts(contacts)),
        Arc::new(wallet_addresses()),
    ))
}

pub fn engine() -> Arc<SendEngine> {
    engine_with_contacts(Vec::new())
}
