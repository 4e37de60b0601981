//! IronSend - 多链钱包转账收款人解析与转账资格校验引擎
//!
//! 输入：用户输入的地址 / 名称 / 联系人匹配 + 转账上下文
//! 输出：唯一的收款人（ResolvedRecipient）+ 唯一的当前提示（Finding）

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod repository;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{AppError, AppErrorCode};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::EngineConfig,
        domain::{
            AddressShape, ChainKey, ChainRegistry, Finding, FindingKind, ResolvedRecipient,
            SelectionSource, StaticChainRegistry, TransferContext,
        },
        error::{AppError, AppErrorCode},
        service::{AccountBridge, RecipientSession, SendEngine, SendEvaluation},
    };
}
