pub mod account_bridge; // 跨 VM 关联地址派生（防抖/取消/超时）
pub mod chain_inference;
pub mod eligibility_validator; // 有序规则表，只产出一个 Finding
pub mod exchange_heuristic;
pub mod linked_address_client; // LCD REST 实现
pub mod name_lookup;
pub mod recipient_resolver;
pub mod send_pipeline;

pub use account_bridge::{
    AccountBridge, BridgeError, BridgeOutcome, LinkedAddressSnapshot, LinkedAddressSource,
    LinkedAddressState, RequestToken,
};
pub use eligibility_validator::EligibilityValidator;
pub use exchange_heuristic::ExchangeHeuristic;
pub use linked_address_client::RestLinkedAddressClient;
pub use name_lookup::{lookup_name, NameServiceMatch};
pub use send_pipeline::{
    LookupSnapshots, PendingRequests, RecipientSession, SendEngine, SendEvaluation,
};
