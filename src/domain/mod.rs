//! Domain 模块
//!
//! 包含收款人解析与转账校验的领域模型

pub mod address_shape;
pub mod chain_config;
pub mod contact;
pub mod finding;
pub mod recipient;
pub mod transfer_context;

// Re-exports
pub use address_shape::AddressShape;
pub use chain_config::{ChainConfig, ChainKey, ChainRegistry, StaticChainRegistry};
pub use contact::Contact;
pub use finding::{ActionEffect, Finding, FindingKind, Severity, WarningAction};
pub use recipient::{
    LinkedAddressStatus, RecipientFlags, RecipientInput, ResolvedRecipient, SelectionSource,
};
pub use transfer_context::{AssetInfo, AssetKind, ChainPair, Network, RouteSupport, TransferContext};
