//! 名称服务解析接口

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ChainKey;

/// 名称解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub address: String,
    pub chain_key: ChainKey,
}

#[async_trait]
pub trait NameServiceResolver: Send + Sync {
    /// 解析完整名称（如 alice.osmo），未注册返回 None
    async fn resolve(&self, name: &str) -> Result<Option<NameRecord>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryNameService {
    records: HashMap<String, NameRecord>,
}

impl InMemoryNameService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(
        mut self,
        name: impl Into<String>,
        address: impl Into<String>,
        chain_key: impl Into<ChainKey>,
    ) -> Self {
        self.records.insert(
            name.into(),
            NameRecord {
                address: address.into(),
                chain_key: chain_key.into(),
            },
        );
        self
    }
}

#[async_trait]
impl NameServiceResolver for InMemoryNameService {
    async fn resolve(&self, name: &str) -> Result<Option<NameRecord>> {
        Ok(self.records.get(name).cloned())
    }
}
