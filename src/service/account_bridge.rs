//! 跨 VM 关联地址桥接
//!
//! 为 EVM 原生资产把非 EVM 收款地址（如 sei1...）派生为关联的 EVM 地址。
//! 这是流水线中唯一跨 await 的操作：防抖、可取消、带超时、不自动重试。
//!
//! 桥接从不直接修改收款人，只产出 `LinkedAddressSnapshot`，由会话在下一次
//! 解析时折叠进去。每次请求递增代号，过期请求的结果直接丢弃。

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::domain::TransferContext;
use crate::infrastructure::log_sanitizer::{sanitize_address, sanitize_log_message};
use crate::utils::address_classifier::is_well_formed_evm;

/// 关联地址查询错误（在桥内部转为 DerivationFailed）
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {status}")]
    Http { status: u16 },
    #[error("account has no public key on chain")]
    MissingPublicKey,
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("lookup timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 关联地址来源（远程查询）
#[async_trait]
pub trait LinkedAddressSource: Send + Sync {
    /// 返回与 `address` 关联的 EVM 地址（0x + 40 hex）
    async fn linked_evm_address(&self, address: &str) -> Result<String, BridgeError>;
}

#[async_trait]
impl<T: LinkedAddressSource + ?Sized> LinkedAddressSource for Arc<T> {
    async fn linked_evm_address(&self, address: &str) -> Result<String, BridgeError> {
        (**self).linked_evm_address(address).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LinkedAddressState {
    Pending,
    Derived(String),
    Failed(String),
}

/// 某个输入的关联地址结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAddressSnapshot {
    /// 触发查询的输入（已去除首尾空白）
    pub source_input: String,
    pub state: LinkedAddressState,
}

impl LinkedAddressSnapshot {
    pub fn pending(source_input: &str) -> Self {
        Self {
            source_input: source_input.trim().to_string(),
            state: LinkedAddressState::Pending,
        }
    }

    pub fn answers(&self, input: &str) -> bool {
        self.source_input == input.trim()
    }
}

/// 桥接结果；每个结果都带有它所回答的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// 当前输入/资产不需要派生
    NotRequired { source_input: String },
    /// 硬件签名器不支持，未发起查询
    UnsupportedOnSigner { source_input: String },
    /// 期间有更新的请求或被取消，结果已丢弃
    Stale { source_input: String },
    Derived(LinkedAddressSnapshot),
    Failed(LinkedAddressSnapshot),
}

impl BridgeOutcome {
    pub fn snapshot(&self) -> Option<&LinkedAddressSnapshot> {
        match self {
            BridgeOutcome::Derived(s) | BridgeOutcome::Failed(s) => Some(s),
            _ => None,
        }
    }

    pub fn source_input(&self) -> &str {
        match self {
            BridgeOutcome::NotRequired { source_input }
            | BridgeOutcome::UnsupportedOnSigner { source_input }
            | BridgeOutcome::Stale { source_input } => source_input,
            BridgeOutcome::Derived(s) | BridgeOutcome::Failed(s) => &s.source_input,
        }
    }

    pub fn answers(&self, input: &str) -> bool {
        self.source_input() == input.trim()
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, BridgeOutcome::Stale { .. })
    }
}

/// 一次请求的代号，在 `begin` 时同步分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    generation: u64,
    input: String,
}

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// 是否需要派生关联地址
///
/// 条件：资产原生于 EVM、输入不是 0x、长度达到非 EVM 地址的最小长度且能按 bech32 解码。
/// 前缀是否对应已知链由 `SendEngine::requires_linked_lookup` 判断。
pub fn linked_lookup_required(input: &str, ctx: &TransferContext, min_source_len: usize) -> bool {
    let input = input.trim();
    if !ctx.asset_is_evm_native || input.is_empty() {
        return false;
    }
    let is_hex = input
        .get(..2)
        .map(|p| p.eq_ignore_ascii_case("0x"))
        .unwrap_or(false);
    !is_hex && input.chars().count() >= min_source_len && bech32::decode(input).is_ok()
}

pub struct AccountBridge<S> {
    source: S,
    config: BridgeConfig,
    generation: AtomicU64,
}

impl<S: LinkedAddressSource> AccountBridge<S> {
    pub fn new(source: S, config: BridgeConfig) -> Self {
        Self {
            source,
            config,
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// 当前代号
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 作废所有进行中的请求
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Linked address requests cancelled");
    }

    pub fn requires_lookup(&self, input: &str, ctx: &TransferContext) -> bool {
        linked_lookup_required(input, ctx, self.config.min_source_len)
    }

    /// 分配请求代号，同时作废之前的请求（新的按键即取消旧查询）
    pub fn begin(&self, input: &str) -> RequestToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            generation,
            input: input.trim().to_string(),
        }
    }

    /// 为最新输入请求关联地址
    ///
    /// 代号在调用时立即分配，而不是在 future 第一次被 poll 时
    pub fn request<'a>(
        &'a self,
        input: &str,
        ctx: &'a TransferContext,
    ) -> impl Future<Output = BridgeOutcome> + 'a {
        let token = self.begin(input);
        self.run(token, ctx)
    }

    /// 执行已分配代号的请求
    pub async fn run(&self, token: RequestToken, ctx: &TransferContext) -> BridgeOutcome {
        let RequestToken { generation, input } = token;

        if input.is_empty() {
            return BridgeOutcome::NotRequired {
                source_input: input,
            };
        }

        // 1. 签名器不支持：立即返回，不发起查询
        if ctx.signer_blocks_linked_address() {
            tracing::info!(
                address = %sanitize_address(&input),
                "Hardware signer cannot use linked EVM addresses, skipping lookup"
            );
            return BridgeOutcome::UnsupportedOnSigner {
                source_input: input,
            };
        }

        if !self.requires_lookup(&input, ctx) {
            return BridgeOutcome::NotRequired {
                source_input: input,
            };
        }

        // 2. 防抖
        tokio::time::sleep(self.config.debounce()).await;
        if self.is_stale(generation) {
            tracing::debug!(generation, "Linked address request debounced away");
            return BridgeOutcome::Stale {
                source_input: input,
            };
        }

        // 3. 远程查询（带超时）
        tracing::debug!(
            generation,
            address = %sanitize_address(&input),
            "Requesting linked EVM address"
        );
        let result =
            tokio::time::timeout(self.config.timeout(), self.source.linked_evm_address(&input))
                .await;

        let state = match result {
            Ok(Ok(evm)) if is_well_formed_evm(&evm) => LinkedAddressState::Derived(evm),
            Ok(Ok(evm)) => {
                tracing::warn!(
                    generation,
                    length = evm.len(),
                    "Linked address source returned a malformed EVM address"
                );
                LinkedAddressState::Failed(
                    BridgeError::Malformed("not a 20-byte hex address".into()).to_string(),
                )
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    generation,
                    error = %sanitize_log_message(&e.to_string()),
                    "Linked address lookup failed"
                );
                LinkedAddressState::Failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    generation,
                    timeout_ms = self.config.timeout_ms,
                    "Linked address lookup timed out"
                );
                LinkedAddressState::Failed(BridgeError::Timeout.to_string())
            }
        };

        // 4. 结果返回前再次检查是否过期
        if self.is_stale(generation) {
            tracing::debug!(generation, "Dropping stale linked address result");
            return BridgeOutcome::Stale {
                source_input: input,
            };
        }

        match state {
            LinkedAddressState::Derived(evm) => {
                tracing::info!(
                    generation,
                    address = %sanitize_address(&input),
                    linked = %sanitize_address(&evm),
                    "Linked EVM address derived"
                );
                BridgeOutcome::Derived(LinkedAddressSnapshot {
                    source_input: input,
                    state: LinkedAddressState::Derived(evm),
                })
            }
            state => BridgeOutcome::Failed(LinkedAddressSnapshot {
                source_input: input,
                state,
            }),
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}
