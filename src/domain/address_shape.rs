//! 地址形态
//!
//! 由原始文本纯函数派生，不持久化

use serde::{Deserialize, Serialize};

/// 地址形态（分类器输出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddressShape {
    /// bech32 解码成功（前缀 + 解码后的负载字节）
    Bech32 { prefix: String, payload: Vec<u8> },
    /// 0x 开头的 EVM 地址（不保证长度与字符合法）
    EvmHex { value: String },
    /// 名称服务候选，如 alice.osmo
    NameServiceCandidate { label: String, tld: String },
    /// 无法识别
    Unclassifiable { raw: String },
}

impl AddressShape {
    pub fn is_evm_hex(&self) -> bool {
        matches!(self, AddressShape::EvmHex { .. })
    }

    pub fn is_bech32(&self) -> bool {
        matches!(self, AddressShape::Bech32 { .. })
    }

    pub fn bech32_prefix(&self) -> Option<&str> {
        match self {
            AddressShape::Bech32 { prefix, .. } => Some(prefix),
            _ => None,
        }
    }

    /// 名称服务查询串（label.tld）
    pub fn name_query(&self) -> Option<String> {
        match self {
            AddressShape::NameServiceCandidate { label, tld } => Some(format!("{}.{}", label, tld)),
            _ => None,
        }
    }
}
