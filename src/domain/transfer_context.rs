//! 转账上下文
//!
//! 由调用方（UI）提供，校验阶段只读；它独立于收款人变化（如切换资产），
//! 变化时只需重新校验，不需要重新解析。

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::chain_config::ChainKey;

/// IBC 自定义通道格式：channel-<n>
static CHANNEL_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^channel-\d+$").expect("static channel id pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

/// 资产类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// 链原生资产
    Native,
    /// 经 IBC 转入的资产
    Ibc,
    /// CosmWasm 代币，不能跨链
    Cw20,
    Erc20,
    /// CosmWasm NFT
    Cw721,
    Erc721,
}

impl AssetKind {
    /// 合约型资产只能在本链内转移
    pub fn is_chain_bound(&self) -> bool {
        matches!(self, AssetKind::Cw20 | AssetKind::Cw721 | AssetKind::Erc721)
    }

    pub fn is_evm_contract(&self) -> bool {
        matches!(self, AssetKind::Erc20 | AssetKind::Erc721)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub denom: String,
    pub kind: AssetKind,
    /// 资产的发行链（IBC 资产用于确定中转链）
    pub origin_chain: Option<ChainKey>,
    /// 是否有可靠的法币价格
    pub fiat_value_available: bool,
}

impl AssetInfo {
    pub fn native(denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            kind: AssetKind::Native,
            origin_chain: None,
            fiat_value_available: true,
        }
    }
}

/// 源链 → 目标链
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainPair {
    pub source: ChainKey,
    pub destination: ChainKey,
}

impl ChainPair {
    pub fn new(source: impl Into<ChainKey>, destination: impl Into<ChainKey>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// IBC 路径支持情况
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSupport {
    pub supported: bool,
    /// 是否启用 Packet Forwarding Middleware
    pub pfm_enabled: bool,
    /// 路径存在但被显式禁用
    #[serde(default)]
    pub disabled: bool,
}

impl RouteSupport {
    pub fn usable(&self) -> bool {
        self.supported && !self.disabled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferContext {
    pub source_chain: ChainKey,
    pub source_network: Network,
    /// 用户显式选择的目标链（0x 地址在多条 EVM 链间可选）
    pub selected_destination_chain: Option<ChainKey>,
    pub current_wallet_address: String,
    /// 当前钱包在各链上的地址（用于 PFM 提示中的自动填充）
    pub own_addresses: HashMap<ChainKey, String>,
    pub is_hardware_wallet: bool,
    /// 硬件签名器是否支持 EVM 关联地址
    pub hardware_supports_linked_address: bool,
    /// 资产/合集原生于 EVM，收款人必须是 EVM 地址
    pub asset_is_evm_native: bool,
    pub asset: AssetInfo,
    pub ibc_support: HashMap<ChainPair, RouteSupport>,
    pub custom_ibc_channel_override: Option<String>,
}

impl TransferContext {
    pub fn new(
        source_chain: impl Into<ChainKey>,
        current_wallet_address: impl Into<String>,
        asset: AssetInfo,
    ) -> Self {
        Self {
            source_chain: source_chain.into(),
            source_network: Network::Mainnet,
            selected_destination_chain: None,
            current_wallet_address: current_wallet_address.into(),
            own_addresses: HashMap::new(),
            is_hardware_wallet: false,
            hardware_supports_linked_address: false,
            asset_is_evm_native: false,
            asset,
            ibc_support: HashMap::new(),
            custom_ibc_channel_override: None,
        }
    }

    /// 0x 地址归属的链：显式选择的目标链，否则源链
    pub fn active_chain(&self) -> &ChainKey {
        self.selected_destination_chain
            .as_ref()
            .unwrap_or(&self.source_chain)
    }

    pub fn route_to(&self, destination: &ChainKey) -> Option<RouteSupport> {
        self.ibc_support
            .get(&ChainPair::new(self.source_chain.clone(), destination.clone()))
            .copied()
    }

    /// 格式合法的自定义通道；格式错误的通道视为未设置
    pub fn valid_channel_override(&self) -> Option<&str> {
        let channel = self.custom_ibc_channel_override.as_deref()?.trim();
        if channel.is_empty() {
            return None;
        }
        if CHANNEL_ID_REGEX.is_match(channel) {
            Some(channel)
        } else {
            tracing::warn!(channel, "Ignoring malformed custom IBC channel override");
            None
        }
    }

    /// 签名器无法完成 EVM 关联地址派生
    pub fn signer_blocks_linked_address(&self) -> bool {
        self.asset_is_evm_native && self.is_hardware_wallet && !self.hardware_supports_linked_address
    }
}
