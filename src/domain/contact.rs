//! 联系人（地址簿条目）

use serde::{Deserialize, Serialize};

use super::chain_config::ChainKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// 原始地址（精确匹配用，不做大小写转换）
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    /// 保存时记录的链；为空时按地址推断
    #[serde(default)]
    pub chain_key: Option<ChainKey>,
    #[serde(default)]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl Contact {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            emoji: None,
            chain_key: None,
            avatar_ref: None,
            memo: None,
        }
    }

    pub fn with_chain(mut self, chain_key: impl Into<ChainKey>) -> Self {
        self.chain_key = Some(chain_key.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}
