//! 链标识符标准化模块
//!
//! 统一旧版 key、链 ID（如 cosmoshub-4）等别名到注册表中的规范 key

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::ChainKey;

/// 链别名配置
#[derive(Debug, Clone)]
struct ChainAlias {
    /// 规范 key
    canonical: &'static str,
    /// 别名列表（小写）
    aliases: &'static [&'static str],
}

/// 别名注册表（静态初始化）
static ALIAS_REGISTRY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let chains = [
        ChainAlias {
            canonical: "cosmos",
            // cosmoshub 是旧版 key，需兼容已保存的联系人
            aliases: &["cosmoshub", "cosmoshub-4", "gaia", "cosmos-hub"],
        },
        ChainAlias {
            canonical: "osmosis",
            aliases: &["osmosis-1", "osmo"],
        },
        ChainAlias {
            canonical: "juno",
            aliases: &["juno-1"],
        },
        ChainAlias {
            canonical: "stargaze",
            aliases: &["stargaze-1", "stars"],
        },
        ChainAlias {
            canonical: "sei",
            aliases: &["pacific-1", "sei-network"],
        },
        ChainAlias {
            canonical: "injective",
            aliases: &["injective-1", "inj"],
        },
    ];

    let mut registry = HashMap::new();
    for chain in chains {
        for alias in chain.aliases {
            registry.insert(*alias, chain.canonical);
        }
    }
    registry
});

/// 标准化链 key（大小写不敏感）；未知 key 原样返回
///
/// # 示例
/// ```rust
/// # use ironsend::domain::ChainKey;
/// # use ironsend::utils::chain_normalizer::normalize_chain_key;
/// assert_eq!(normalize_chain_key(&ChainKey::from("cosmoshub")), ChainKey::from("cosmos"));
/// assert_eq!(normalize_chain_key(&ChainKey::from("osmosis")), ChainKey::from("osmosis"));
/// ```
pub fn normalize_chain_key(key: &ChainKey) -> ChainKey {
    let lower = key.as_str().trim().to_ascii_lowercase();
    match ALIAS_REGISTRY.get(lower.as_str()) {
        Some(canonical) => ChainKey::from(*canonical),
        None => key.clone(),
    }
}
