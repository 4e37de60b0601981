//! 名称服务查询
//!
//! 查询结果带上它所回答的查询串，会话只接受与当前输入一致的结果

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::log_sanitizer::sanitize_log_message;
use crate::repository::{NameRecord, NameServiceResolver};

/// 名称服务查询快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameServiceMatch {
    /// 完整名称（label.tld）
    pub query: String,
    /// None：未注册、查询失败或超时
    pub record: Option<NameRecord>,
}

impl NameServiceMatch {
    pub fn not_found(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            record: None,
        }
    }

    pub fn answers(&self, query: &str) -> bool {
        self.query == query
    }
}

/// 带超时的名称查询；失败统一转为"未找到"
pub async fn lookup_name(
    resolver: &dyn NameServiceResolver,
    query: &str,
    timeout: Duration,
) -> NameServiceMatch {
    match tokio::time::timeout(timeout, resolver.resolve(query)).await {
        Ok(Ok(record)) => {
            tracing::debug!(name = query, found = record.is_some(), "Name service lookup finished");
            NameServiceMatch {
                query: query.to_string(),
                record,
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(
                name = query,
                error = %sanitize_log_message(&e.to_string()),
                "Name service lookup failed"
            );
            NameServiceMatch::not_found(query)
        }
        Err(_) => {
            tracing::warn!(
                name = query,
                timeout_ms = timeout.as_millis() as u64,
                "Name service lookup timed out"
            );
            NameServiceMatch::not_found(query)
        }
    }
}
