//! 链推断
//!
//! `AddressShape` + 链注册表 → 候选链。返回 None 不是错误：
//! 未知前缀由校验阶段报告，0x 地址在非 EVM-only 链上等待关联地址解析。

use crate::domain::{AddressShape, ChainKey, ChainRegistry};
use crate::utils::chain_normalizer::normalize_chain_key;

/// 推断地址所属的链
///
/// `active_chain`：0x 地址可能归属的链（显式选择的目标链，否则源链）
pub fn infer(
    shape: &AddressShape,
    registry: &dyn ChainRegistry,
    active_chain: &ChainKey,
) -> Option<ChainKey> {
    match shape {
        AddressShape::Bech32 { prefix, .. } => {
            let chain = registry.chain_for_prefix(prefix)?;
            Some(normalize_chain_key(&chain))
        }
        AddressShape::EvmHex { .. } => {
            let active = normalize_chain_key(active_chain);
            if registry.is_evm_only(&active) {
                Some(active)
            } else {
                None
            }
        }
        AddressShape::NameServiceCandidate { .. } | AddressShape::Unclassifiable { .. } => None,
    }
}
