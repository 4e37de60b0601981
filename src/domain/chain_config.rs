//! 多链配置模块
//!
//! 定义链标识（ChainKey）、静态链元数据以及只读的链注册表接口

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 链标识（注册表中的不透明键，如 "osmosis"、"cosmos"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainKey(String);

impl ChainKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChainKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// 链配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub key: ChainKey,
    /// 链名称
    pub name: String,
    /// 规范 bech32 前缀（EVM-only 链为 None）
    pub bech32_prefix: Option<String>,
    /// EVM chain id（EIP-155），不支持 EVM 地址的链为 None
    pub evm_chain_id: Option<u64>,
    /// 仅使用 0x 地址的链
    pub evm_only: bool,
    pub enabled: bool,
    /// 链图标引用
    pub icon_ref: String,
    pub is_testnet: bool,
}

impl ChainConfig {
    /// 是否接受 0x 地址（EVM-only 或双地址体系的链）
    pub fn supports_evm_addressing(&self) -> bool {
        self.evm_only || self.evm_chain_id.is_some()
    }
}

/// 链注册表（外部提供的只读接口）
pub trait ChainRegistry: Send + Sync {
    /// 通过 key 获取配置
    fn chain(&self, key: &ChainKey) -> Option<&ChainConfig>;

    /// 列出所有链（包括未启用的）
    fn chains(&self) -> Vec<&ChainConfig>;

    fn bech32_prefix_of(&self, key: &ChainKey) -> Option<&str> {
        self.chain(key).and_then(|c| c.bech32_prefix.as_deref())
    }

    fn evm_chain_id_of(&self, key: &ChainKey) -> Option<u64> {
        self.chain(key).and_then(|c| c.evm_chain_id)
    }

    fn is_evm_only(&self, key: &ChainKey) -> bool {
        self.chain(key).map(|c| c.evm_only).unwrap_or(false)
    }

    fn is_enabled(&self, key: &ChainKey) -> bool {
        self.chain(key).map(|c| c.enabled).unwrap_or(false)
    }

    fn supports_evm_addressing(&self, key: &ChainKey) -> bool {
        self.chain(key)
            .map(|c| c.supports_evm_addressing())
            .unwrap_or(false)
    }

    /// bech32 前缀 → 启用的链
    fn chain_for_prefix(&self, prefix: &str) -> Option<ChainKey> {
        let prefix = prefix.to_lowercase();
        self.chains()
            .into_iter()
            .filter(|c| c.enabled)
            .find(|c| c.bech32_prefix.as_deref() == Some(prefix.as_str()))
            .map(|c| c.key.clone())
    }
}

/// 预配置的静态链注册表
pub struct StaticChainRegistry {
    configs: HashMap<ChainKey, ChainConfig>,
    prefix_map: HashMap<String, ChainKey>,
}

impl StaticChainRegistry {
    /// 创建空注册表
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
            prefix_map: HashMap::new(),
        }
    }

    /// 创建预配置的注册表
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_default_chains();
        registry
    }

    fn cosmos_chain(key: &str, name: &str, prefix: &str, evm_chain_id: Option<u64>) -> ChainConfig {
        ChainConfig {
            key: ChainKey::from(key),
            name: name.to_string(),
            bech32_prefix: Some(prefix.to_string()),
            evm_chain_id,
            evm_only: false,
            enabled: true,
            icon_ref: format!("chains/{}.svg", key),
            is_testnet: false,
        }
    }

    fn evm_chain(key: &str, name: &str, evm_chain_id: u64) -> ChainConfig {
        ChainConfig {
            key: ChainKey::from(key),
            name: name.to_string(),
            bech32_prefix: None,
            evm_chain_id: Some(evm_chain_id),
            evm_only: true,
            enabled: true,
            icon_ref: format!("chains/{}.svg", key),
            is_testnet: false,
        }
    }

    /// 注册默认支持的链
    fn register_default_chains(&mut self) {
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Bech32 系列
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        self.register(Self::cosmos_chain("cosmos", "Cosmos Hub", "cosmos", None));
        self.register(Self::cosmos_chain("osmosis", "Osmosis", "osmo", None));
        self.register(Self::cosmos_chain("juno", "Juno", "juno", None));
        self.register(Self::cosmos_chain("stargaze", "Stargaze", "stars", None));
        self.register(Self::cosmos_chain("akash", "Akash", "akash", None));

        // 双地址体系：bech32 + EVM
        self.register(Self::cosmos_chain("sei", "Sei", "sei", Some(1329)));
        self.register(Self::cosmos_chain("injective", "Injective", "inj", Some(2525)));
        self.register(Self::cosmos_chain("evmos", "Evmos", "evmos", Some(9001)));

        // 旧版 key，保留但不启用（同前缀只允许一条启用的链）
        let mut legacy = Self::cosmos_chain("cosmoshub", "Cosmos Hub (legacy)", "cosmos", None);
        legacy.enabled = false;
        self.register(legacy);

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // EVM-only 系列
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        self.register(Self::evm_chain("ethereum", "Ethereum", 1));
        self.register(Self::evm_chain("arbitrum", "Arbitrum One", 42161));
    }

    /// 注册链配置
    pub fn register(&mut self, config: ChainConfig) {
        if config.enabled {
            if let Some(prefix) = &config.bech32_prefix {
                self.prefix_map
                    .insert(prefix.to_lowercase(), config.key.clone());
            }
        }
        self.configs.insert(config.key.clone(), config);
    }

    /// 验证链配置完整性
    pub fn validate_configs(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut enabled_prefixes: HashMap<&str, &ChainKey> = HashMap::new();

        for (key, config) in &self.configs {
            if key.as_str().is_empty() {
                errors.push("Chain with empty key".to_string());
            }
            if config.name.is_empty() {
                errors.push(format!("Chain {} has empty name", key));
            }

            if config.evm_only && config.bech32_prefix.is_some() {
                errors.push(format!(
                    "Chain {} is EVM-only but declares a bech32 prefix",
                    key
                ));
            }
            if config.evm_only && config.evm_chain_id.is_none() {
                errors.push(format!("Chain {} is EVM-only but has no EVM chain id", key));
            }

            if !config.enabled {
                continue;
            }
            if let Some(prefix) = config.bech32_prefix.as_deref() {
                if let Some(other) = enabled_prefixes.insert(prefix, key) {
                    errors.push(format!(
                        "Bech32 prefix {} is mapped to both {} and {}",
                        prefix, other, key
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `validate_configs` 的 AppError 版本
    pub fn ensure_consistent(&self) -> Result<(), AppError> {
        self.validate_configs()
            .map_err(|errors| AppError::registry_inconsistent(errors.join("; ")))
    }
}

impl Default for StaticChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRegistry for StaticChainRegistry {
    fn chain(&self, key: &ChainKey) -> Option<&ChainConfig> {
        self.configs.get(key)
    }

    fn chains(&self) -> Vec<&ChainConfig> {
        self.configs.values().collect()
    }

    fn chain_for_prefix(&self, prefix: &str) -> Option<ChainKey> {
        self.prefix_map.get(&prefix.to_lowercase()).cloned()
    }
}
