//! 当前钱包在各链上的地址集合

use std::collections::HashMap;

use crate::domain::ChainKey;

pub trait WalletAddressSet: Send + Sync {
    fn addresses_of_active_wallet(&self) -> HashMap<ChainKey, String>;

    /// 地址属于当前钱包时返回对应的链（EVM 地址忽略大小写）
    fn owning_chain(&self, address: &str) -> Option<ChainKey> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        let is_evm = address
            .get(..2)
            .map(|p| p.eq_ignore_ascii_case("0x"))
            .unwrap_or(false);
        let mut owned: Vec<(ChainKey, String)> =
            self.addresses_of_active_wallet().into_iter().collect();
        // 同一 EVM 地址可能出现在多条链上，结果需稳定
        owned.sort_by(|a, b| a.0.cmp(&b.0));
        owned
            .into_iter()
            .find(|(_, own)| {
                if is_evm {
                    own.eq_ignore_ascii_case(address)
                } else {
                    own == address
                }
            })
            .map(|(chain, _)| chain)
    }
}

/// 固定地址集合
#[derive(Debug, Clone, Default)]
pub struct StaticWalletAddresses {
    addresses: HashMap<ChainKey, String>,
}

impl StaticWalletAddresses {
    pub fn new(addresses: HashMap<ChainKey, String>) -> Self {
        Self { addresses }
    }

    pub fn with(mut self, chain: impl Into<ChainKey>, address: impl Into<String>) -> Self {
        self.addresses.insert(chain.into(), address.into());
        self
    }
}

impl WalletAddressSet for StaticWalletAddresses {
    fn addresses_of_active_wallet(&self) -> HashMap<ChainKey, String> {
        self.addresses.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_chain() {
        let wallet = StaticWalletAddresses::default()
            .with("osmosis", "osmo1me")
            .with("sei", "0xAbCdEf0000000000000000000000000000000001")
            .with("ethereum", "0xabcdef0000000000000000000000000000000001");

        assert_eq!(wallet.owning_chain("osmo1me"), Some(ChainKey::from("osmosis")));
        assert_eq!(wallet.owning_chain("OSMO1ME"), None);
        assert_eq!(
            wallet.owning_chain("0xABCDEF0000000000000000000000000000000001"),
            Some(ChainKey::from("ethereum"))
        );
        assert_eq!(wallet.owning_chain(""), None);
    }
}
