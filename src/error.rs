//! 引擎运行错误
//!
//! 注意：用户输入导致的问题（地址无效、路径不支持等）不是错误，而是
//! `domain::finding::Finding`。这里只覆盖配置、注册表、外部服务等运行期故障。

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppErrorCode {
    // 基础错误码
    Internal,

    // 业务错误码
    ConfigInvalid,
    RegistryInconsistent,
    ChainNotSupported,
}

impl AppErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::Internal => "internal",
            AppErrorCode::ConfigInvalid => "config_invalid",
            AppErrorCode::RegistryInconsistent => "registry_inconsistent",
            AppErrorCode::ChainNotSupported => "chain_not_supported",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    fn with_code(code: AppErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::Internal, msg)
    }

    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::ConfigInvalid, msg)
    }

    /// 链注册表违反不变量（例如同一 bech32 前缀对应多条启用的链）
    pub fn registry_inconsistent(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::RegistryInconsistent, msg)
    }

    /// 源链不在注册表中或未启用
    pub fn chain_not_supported(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::ChainNotSupported, msg)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // 保留完整的错误链，方便排查配置问题
        AppError::internal(format!("{:#}", err))
    }
}
