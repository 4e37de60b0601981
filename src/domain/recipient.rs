//! 收款人领域模型
//!
//! `ResolvedRecipient` 每次输入变化或异步结果回填时整体重建，从不原地修改；
//! `raw_input` 记录产生它的输入快照，用于丢弃过期的异步结果。

use serde::{Deserialize, Serialize};

use super::chain_config::ChainKey;

/// 收款人来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// 地址簿联系人
    Saved,
    /// 当前钱包在某条链上的自有地址
    CurrentWallet,
    /// 新输入/派生的地址，地址簿中没有
    NotSaved,
    Unresolved,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFlags {
    /// 输入由选择联系人/自有钱包自动填入
    pub autofilled: bool,
    pub from_name_service: bool,
    /// 名称服务查询尚未返回
    pub awaiting_name_service: bool,
}

/// 跨 VM 关联地址（EVM 地址）派生状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkedAddressStatus {
    NotRequested,
    Pending,
    /// `address` 已替换为派生出的 EVM 地址，原地址保存在这里
    Derived { source_address: String },
    Failed { reason: String },
}

impl Default for LinkedAddressStatus {
    fn default() -> Self {
        LinkedAddressStatus::NotRequested
    }
}

/// 用户输入快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientInput {
    pub text: String,
    pub autofilled: bool,
}

impl RecipientInput {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            autofilled: false,
        }
    }

    pub fn autofilled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            autofilled: true,
        }
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecipient {
    /// 产生该结果的输入（已去除首尾空白）
    pub raw_input: String,
    pub address: String,
    pub display_name: String,
    pub chain_key: Option<ChainKey>,
    pub selection_source: SelectionSource,
    pub avatar_ref: Option<String>,
    pub chain_icon_ref: Option<String>,
    pub emoji_ref: Option<String>,
    pub flags: RecipientFlags,
    #[serde(default)]
    pub linked_address: LinkedAddressStatus,
}

impl ResolvedRecipient {
    /// 未解析的收款人（空输入或无法解码）
    pub fn unresolved(raw_input: &str, autofilled: bool) -> Self {
        Self {
            raw_input: raw_input.to_string(),
            address: String::new(),
            display_name: raw_input.to_string(),
            chain_key: None,
            selection_source: SelectionSource::Unresolved,
            avatar_ref: None,
            chain_icon_ref: None,
            emoji_ref: None,
            flags: RecipientFlags {
                autofilled,
                ..RecipientFlags::default()
            },
            linked_address: LinkedAddressStatus::NotRequested,
        }
    }

    pub fn is_empty_input(&self) -> bool {
        self.raw_input.is_empty()
    }

    pub fn is_resolved(&self) -> bool {
        self.selection_source != SelectionSource::Unresolved
    }

    /// 仍在等待名称服务或地址派生结果
    pub fn is_pending(&self) -> bool {
        self.flags.awaiting_name_service || self.linked_address == LinkedAddressStatus::Pending
    }

    pub fn is_evm_address(&self) -> bool {
        let lower = self.address.to_ascii_lowercase();
        lower.starts_with("0x")
    }

    /// 比较地址，忽略大小写
    ///
    /// EVM 地址的大小写只承载校验和；bech32 只允许全小写或全大写，两者是同一地址
    pub fn same_address(&self, other: &str) -> bool {
        !self.address.is_empty() && self.address.eq_ignore_ascii_case(other.trim())
    }
}
