//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 引擎配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub name_service: NameServiceConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub linked_address: LinkedAddressConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 跨 VM 地址派生（Async Account Bridge）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 最后一次按键后的防抖延迟
    pub debounce_ms: u64,
    /// 单次远程查询上限，超时视为失败
    pub timeout_ms: u64,
    /// 非 EVM 地址的最小可信长度，低于此长度不发起查询
    pub min_source_len: usize,
}

/// 名称服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameServiceConfig {
    /// 允许识别的顶级域（如 "osmo" 对应 alice.osmo）
    pub tlds: Vec<String>,
    pub timeout_ms: u64,
}

/// 中心化交易所充值地址启发式配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub deposit_addresses: Vec<String>,
}

/// 链上账户公钥查询（LCD）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedAddressConfig {
    pub lcd_url: String,
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: std::env::var("BRIDGE_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(200),
            timeout_ms: std::env::var("BRIDGE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            min_source_len: std::env::var("BRIDGE_MIN_SOURCE_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(40),
        }
    }
}

impl BridgeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub const DEFAULT_NAME_SERVICE_TLDS: &[&str] = &[
    "cosmos", "osmo", "juno", "stars", "sei", "inj", "evmos", "akash",
];

impl Default for NameServiceConfig {
    fn default() -> Self {
        Self {
            tlds: env_list("NAME_SERVICE_TLDS").unwrap_or_else(|| {
                DEFAULT_NAME_SERVICE_TLDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            timeout_ms: std::env::var("NAME_SERVICE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl NameServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            deposit_addresses: env_list("CEX_DEPOSIT_ADDRESSES").unwrap_or_default(),
        }
    }
}

impl Default for LinkedAddressConfig {
    fn default() -> Self {
        Self {
            lcd_url: std::env::var("LINKED_ADDRESS_LCD_URL")
                .unwrap_or_else(|_| "https://rest.sei-apis.com".into()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            bridge: BridgeConfig::default(),
            name_service: NameServiceConfig::default(),
            exchange: ExchangeConfig::default(),
            linked_address: LinkedAddressConfig::default(),
        }
    }
}

impl EngineConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self::default())
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: EngineConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            } else {
                tracing::warn!(path = ?path.as_ref(), "Config file not found, using environment");
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        if self.bridge.timeout_ms == 0 {
            anyhow::bail!("BRIDGE_TIMEOUT_MS must be greater than 0");
        }

        // 防抖必须短于超时，否则每次查询都会在发出前过期
        if self.bridge.debounce_ms >= self.bridge.timeout_ms {
            anyhow::bail!(
                "BRIDGE_DEBOUNCE_MS ({}) must be less than BRIDGE_TIMEOUT_MS ({})",
                self.bridge.debounce_ms,
                self.bridge.timeout_ms
            );
        }

        if self.name_service.timeout_ms == 0 {
            anyhow::bail!("NAME_SERVICE_TIMEOUT_MS must be greater than 0");
        }

        for tld in &self.name_service.tlds {
            if tld.is_empty() || !tld.chars().all(|c| c.is_ascii_lowercase()) {
                anyhow::bail!("Invalid name service TLD: {:?} (lowercase a-z only)", tld);
            }
        }

        Ok(())
    }
}
