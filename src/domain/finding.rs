//! 校验结果（Finding）
//!
//! 任意时刻只有一个生效的 Finding：错误阻止提交，警告不阻止。
//! 编码规则：1xxx 错误，2xxx 警告。

use serde::{Deserialize, Serialize};

use super::chain_config::ChainKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FindingKind {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 错误（1xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    InvalidAddress = 1001,
    UnsupportedAssetForChain = 1002,
    UnsupportedCrossChainPath = 1003,
    DerivationFailed = 1004,
    DerivationUnsupportedOnSigner = 1005,

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 警告（2xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    PfmDisabled = 2001,
    SendingToSelf = 2002,
    DerivedAddressNotice = 2003,
    NoFiatValue = 2004,
    ExchangeDepositCrossChain = 2005,
}

impl FindingKind {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn severity(&self) -> Severity {
        if self.code() < 2000 {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// 获取提示消息（英文）
    pub fn message_en(&self) -> &'static str {
        match self {
            FindingKind::InvalidAddress => "Invalid address",
            FindingKind::UnsupportedAssetForChain => {
                "This asset cannot be sent to the selected chain"
            }
            FindingKind::UnsupportedCrossChainPath => {
                "Transfers between these chains are not supported"
            }
            FindingKind::DerivationFailed => {
                "Only EVM-capable recipients are supported for this asset"
            }
            FindingKind::DerivationUnsupportedOnSigner => {
                "Your hardware wallet cannot send this asset to an EVM-linked address"
            }
            FindingKind::PfmDisabled => {
                "This route cannot forward automatically. Send to your own address on the intermediate chain first"
            }
            FindingKind::SendingToSelf => "You are sending to your own address",
            FindingKind::DerivedAddressNotice => {
                "The recipient will receive funds at their linked EVM address"
            }
            FindingKind::NoFiatValue => "No reliable fiat value is available for this asset",
            FindingKind::ExchangeDepositCrossChain => {
                "This looks like an exchange deposit address. Exchanges may not credit cross-chain transfers"
            }
        }
    }

    /// 获取提示消息（中文）
    pub fn message_zh(&self) -> &'static str {
        match self {
            FindingKind::InvalidAddress => "地址无效",
            FindingKind::UnsupportedAssetForChain => "该资产无法发送到所选链",
            FindingKind::UnsupportedCrossChainPath => "不支持这两条链之间的转账",
            FindingKind::DerivationFailed => "该资产仅支持 EVM 兼容的收款人",
            FindingKind::DerivationUnsupportedOnSigner => "硬件钱包不支持向 EVM 关联地址发送该资产",
            FindingKind::PfmDisabled => "该路径不支持自动转发，请先发送到你在中转链上的地址",
            FindingKind::SendingToSelf => "你正在向自己的地址转账",
            FindingKind::DerivedAddressNotice => "收款人将在其关联的 EVM 地址收到资产",
            FindingKind::NoFiatValue => "该资产暂无可靠的法币估值",
            FindingKind::ExchangeDepositCrossChain => "该地址疑似交易所充值地址，交易所可能不入账跨链转账",
        }
    }
}

/// 警告附带动作的效果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionEffect {
    /// 将输入框自动填充为当前钱包在指定链上的地址
    AutofillAddress { chain_key: ChainKey, address: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningAction {
    pub label: String,
    pub effect: ActionEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum Finding {
    None,
    Error {
        kind: FindingKind,
        message: String,
    },
    Warning {
        kind: FindingKind,
        message: String,
        action: Option<WarningAction>,
    },
}

impl Finding {
    pub fn error(kind: FindingKind, message: impl Into<String>) -> Self {
        Finding::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Finding::Warning {
            kind,
            message: message.into(),
            action: None,
        }
    }

    pub fn warning_with_action(
        kind: FindingKind,
        message: impl Into<String>,
        action: WarningAction,
    ) -> Self {
        Finding::Warning {
            kind,
            message: message.into(),
            action: Some(action),
        }
    }

    /// 使用默认英文消息构造
    pub fn from_kind(kind: FindingKind) -> Self {
        match kind.severity() {
            Severity::Error => Finding::error(kind, kind.message_en()),
            Severity::Warning => Finding::warning(kind, kind.message_en()),
        }
    }

    pub fn kind(&self) -> Option<FindingKind> {
        match self {
            Finding::None => None,
            Finding::Error { kind, .. } | Finding::Warning { kind, .. } => Some(*kind),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Finding::None => None,
            Finding::Error { message, .. } | Finding::Warning { message, .. } => Some(message),
        }
    }

    pub fn action(&self) -> Option<&WarningAction> {
        match self {
            Finding::Warning { action, .. } => action.as_ref(),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Finding::None)
    }

    /// 错误阻止提交
    pub fn is_blocking(&self) -> bool {
        matches!(self, Finding::Error { .. })
    }
}
