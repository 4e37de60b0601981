//! 交易所充值地址识别
//!
//! 交易所通常不为跨链（IBC）入账，识别结果只用于提示，不阻止转账。

use std::collections::HashSet;

use crate::config::ExchangeConfig;

#[derive(Debug, Clone, Default)]
pub struct ExchangeHeuristic {
    /// 已知充值地址（EVM 地址统一小写）
    deposit_addresses: HashSet<String>,
}

impl ExchangeHeuristic {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            deposit_addresses: addresses
                .into_iter()
                .map(|a| canonical(a.as_ref()))
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ExchangeConfig) -> Self {
        Self::new(&config.deposit_addresses)
    }

    pub fn is_exchange_deposit(&self, address: &str) -> bool {
        !self.deposit_addresses.is_empty() && self.deposit_addresses.contains(&canonical(address))
    }

    pub fn len(&self) -> usize {
        self.deposit_addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposit_addresses.is_empty()
    }
}

/// EVM 与 bech32 地址都不区分大小写
fn canonical(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
