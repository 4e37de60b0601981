//! 收款人解析 + 转账校验流水线
//!
//! - `SendEngine`：无状态入口（classify / infer / resolve / validate / resolve_and_validate）
//! - `RecipientSession`：当前收款人的唯一写入者，按输入/上下文变化重新解析或只重新校验，
//!   并只接受回答当前输入的异步结果

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::{
    AddressShape, ChainKey, ChainRegistry, Finding, RecipientInput, ResolvedRecipient,
    TransferContext,
};
use crate::repository::{ContactBook, NameServiceResolver, WalletAddressSet};
use crate::service::account_bridge::{
    linked_lookup_required, AccountBridge, BridgeOutcome, LinkedAddressSnapshot,
    LinkedAddressSource,
};
use crate::service::chain_inference;
use crate::service::eligibility_validator::EligibilityValidator;
use crate::service::exchange_heuristic::ExchangeHeuristic;
use crate::service::name_lookup::{lookup_name, NameServiceMatch};
use crate::service::recipient_resolver::{self, Lookups};
use crate::utils::address_classifier::AddressClassifier;

/// 解析 + 校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendEvaluation {
    pub recipient: ResolvedRecipient,
    pub finding: Finding,
}

impl SendEvaluation {
    /// 收款人已确定、没有进行中的查询且没有阻止性错误
    pub fn can_proceed(&self) -> bool {
        self.recipient.is_resolved() && !self.recipient.is_pending() && !self.finding.is_blocking()
    }
}

/// 异步查询结果快照（可能属于旧输入，解析时会过滤）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupSnapshots {
    pub name_service: Option<NameServiceMatch>,
    pub linked_address: Option<LinkedAddressSnapshot>,
}

pub struct SendEngine {
    registry: Arc<dyn ChainRegistry>,
    contacts: Arc<dyn ContactBook>,
    wallet: Arc<dyn WalletAddressSet>,
    classifier: AddressClassifier,
    validator: EligibilityValidator,
    min_source_len: usize,
    name_timeout: Duration,
}

impl SendEngine {
    pub fn new(
        registry: Arc<dyn ChainRegistry>,
        contacts: Arc<dyn ContactBook>,
        wallet: Arc<dyn WalletAddressSet>,
    ) -> Self {
        Self::from_config(&EngineConfig::default(), registry, contacts, wallet)
    }

    pub fn from_config(
        config: &EngineConfig,
        registry: Arc<dyn ChainRegistry>,
        contacts: Arc<dyn ContactBook>,
        wallet: Arc<dyn WalletAddressSet>,
    ) -> Self {
        let validator = EligibilityValidator::new(
            registry.clone(),
            ExchangeHeuristic::from_config(&config.exchange),
        );
        Self {
            registry,
            contacts,
            wallet,
            classifier: AddressClassifier::from_config(&config.name_service),
            validator,
            min_source_len: config.bridge.min_source_len,
            name_timeout: config.name_service.timeout(),
        }
    }

    pub fn with_classifier(mut self, classifier: AddressClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_exchange_heuristic(mut self, heuristic: ExchangeHeuristic) -> Self {
        self.validator = EligibilityValidator::new(self.registry.clone(), heuristic);
        self
    }

    pub fn registry(&self) -> &dyn ChainRegistry {
        self.registry.as_ref()
    }

    pub fn classify(&self, raw: &str) -> AddressShape {
        self.classifier.classify(raw)
    }

    pub fn infer(&self, shape: &AddressShape, ctx: &TransferContext) -> Option<ChainKey> {
        chain_inference::infer(shape, self.registry.as_ref(), ctx.active_chain())
    }

    /// 只读取上下文中的链身份（源链、所选目标链）
    pub fn resolve(
        &self,
        input: &RecipientInput,
        ctx: &TransferContext,
        snapshots: &LookupSnapshots,
    ) -> ResolvedRecipient {
        let shape = self.classify(&input.text);
        let inferred = self.infer(&shape, ctx);
        let lookups = Lookups {
            contacts: self.contacts.as_ref(),
            wallet: self.wallet.as_ref(),
            registry: self.registry.as_ref(),
            source_chain: &ctx.source_chain,
            active_chain: ctx.active_chain(),
            name_service: snapshots.name_service.as_ref(),
            linked_address: snapshots.linked_address.as_ref(),
        };
        recipient_resolver::resolve(input, &shape, inferred, &lookups)
    }

    pub fn validate(&self, recipient: &ResolvedRecipient, ctx: &TransferContext) -> Finding {
        self.validator.validate(recipient, ctx)
    }

    /// 同步入口：不含任何异步结果
    pub fn resolve_and_validate(&self, raw_input: &str, ctx: &TransferContext) -> SendEvaluation {
        self.resolve_and_validate_with(
            &RecipientInput::typed(raw_input),
            ctx,
            &LookupSnapshots::default(),
        )
    }

    pub fn resolve_and_validate_with(
        &self,
        input: &RecipientInput,
        ctx: &TransferContext,
        snapshots: &LookupSnapshots,
    ) -> SendEvaluation {
        let recipient = self.resolve(input, ctx, snapshots);
        let finding = self.validate(&recipient, ctx);
        SendEvaluation { recipient, finding }
    }

    /// 输入需要名称服务查询时返回查询串
    pub fn name_query(&self, input: &str) -> Option<String> {
        self.classify(input).name_query()
    }

    /// 只有前缀对应已知链的 bech32 地址才值得发起关联地址查询
    pub fn requires_linked_lookup(&self, input: &str, ctx: &TransferContext) -> bool {
        if !linked_lookup_required(input, ctx, self.min_source_len) {
            return false;
        }
        let shape = self.classify(input);
        shape.is_bech32() && self.infer(&shape, ctx).is_some()
    }

    /// 一次性执行全部查询后再解析（命令行等非交互场景）
    pub async fn evaluate_with_lookups<S: LinkedAddressSource>(
        &self,
        input: &RecipientInput,
        ctx: &TransferContext,
        bridge: &AccountBridge<S>,
        names: &dyn NameServiceResolver,
    ) -> SendEvaluation {
        let mut snapshots = LookupSnapshots::default();

        if let Some(query) = self.name_query(&input.text) {
            snapshots.name_service = Some(lookup_name(names, &query, self.name_timeout).await);
        }

        if self.requires_linked_lookup(&input.text, ctx) {
            snapshots.linked_address = bridge.request(&input.text, ctx).await.snapshot().cloned();
        }

        self.resolve_and_validate_with(input, ctx, &snapshots)
    }
}

/// 输入/上下文变化后需要调用方发起的异步查询
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub name_query: Option<String>,
    pub linked_address: bool,
}

/// 当前收款人会话
pub struct RecipientSession {
    engine: Arc<SendEngine>,
    ctx: TransferContext,
    input: RecipientInput,
    snapshots: LookupSnapshots,
    recipient: Arc<ResolvedRecipient>,
    finding: Finding,
}

impl RecipientSession {
    pub fn new(engine: Arc<SendEngine>, ctx: TransferContext) -> Self {
        let input = RecipientInput::default();
        let snapshots = LookupSnapshots::default();
        let recipient = Arc::new(engine.resolve(&input, &ctx, &snapshots));
        let finding = engine.validate(&recipient, &ctx);
        Self {
            engine,
            ctx,
            input,
            snapshots,
            recipient,
            finding,
        }
    }

    pub fn context(&self) -> &TransferContext {
        &self.ctx
    }

    pub fn input(&self) -> &RecipientInput {
        &self.input
    }

    /// 当前收款人快照（只会被整体替换）
    pub fn recipient(&self) -> Arc<ResolvedRecipient> {
        Arc::clone(&self.recipient)
    }

    pub fn finding(&self) -> &Finding {
        &self.finding
    }

    pub fn evaluation(&self) -> SendEvaluation {
        SendEvaluation {
            recipient: self.recipient.as_ref().clone(),
            finding: self.finding.clone(),
        }
    }

    /// 输入变化：丢弃旧结果并重新解析
    pub fn on_input(&mut self, input: RecipientInput) -> PendingRequests {
        self.input = input;
        let text = self.input.trimmed().to_string();

        if let Some(name) = &self.snapshots.name_service {
            if self.engine.name_query(&text).as_deref() != Some(name.query.as_str()) {
                self.snapshots.name_service = None;
            }
        }
        if let Some(linked) = &self.snapshots.linked_address {
            if !linked.answers(&text) {
                self.snapshots.linked_address = None;
            }
        }

        let requests = self.schedule_lookups();
        self.re_resolve();
        requests
    }

    /// 上下文变化：链身份（源链、源网络、所选目标链）变化时重新解析，否则只重新校验
    pub fn on_context(&mut self, ctx: TransferContext) -> PendingRequests {
        let chain_identity_changed = ctx.source_chain != self.ctx.source_chain
            || ctx.source_network != self.ctx.source_network
            || ctx.selected_destination_chain != self.ctx.selected_destination_chain;
        let linked_requirement_changed = self
            .engine
            .requires_linked_lookup(&self.input.text, &ctx)
            != self.engine.requires_linked_lookup(&self.input.text, &self.ctx);
        self.ctx = ctx;

        if chain_identity_changed || linked_requirement_changed {
            if linked_requirement_changed {
                self.snapshots.linked_address = None;
            }
            let requests = self.schedule_lookups();
            self.re_resolve();
            requests
        } else {
            self.re_validate();
            PendingRequests::default()
        }
    }

    /// 折叠关联地址结果；不属于当前输入的结果被丢弃
    pub fn apply_linked(&mut self, outcome: BridgeOutcome) -> bool {
        if outcome.is_stale() {
            return false;
        }
        if !outcome.answers(&self.input.text) {
            tracing::debug!("Dropping linked address result for a previous input");
            return false;
        }

        match outcome {
            BridgeOutcome::Derived(snapshot) | BridgeOutcome::Failed(snapshot) => {
                self.snapshots.linked_address = Some(snapshot);
                self.re_resolve();
                true
            }
            BridgeOutcome::NotRequired { .. } | BridgeOutcome::UnsupportedOnSigner { .. } => {
                // 当前输入不会再有结果，撤销等待状态
                if self.snapshots.linked_address.take().is_some() {
                    self.re_resolve();
                }
                false
            }
            BridgeOutcome::Stale { .. } => false,
        }
    }

    /// 外部数据（如地址簿）变化后按当前输入重新解析
    pub fn refresh(&mut self) {
        self.re_resolve();
    }

    pub fn apply_name(&mut self, result: NameServiceMatch) -> bool {
        if self.engine.name_query(&self.input.text).as_deref() != Some(result.query.as_str()) {
            tracing::debug!(name = %result.query, "Dropping name service result for a previous input");
            return false;
        }
        self.snapshots.name_service = Some(result);
        self.re_resolve();
        true
    }

    fn schedule_lookups(&mut self) -> PendingRequests {
        let text = self.input.trimmed();
        let name_query = match &self.snapshots.name_service {
            Some(_) => None,
            None => self.engine.name_query(text),
        };

        let linked_address = self.snapshots.linked_address.is_none()
            && !self.ctx.signer_blocks_linked_address()
            && self.engine.requires_linked_lookup(text, &self.ctx);
        if linked_address {
            self.snapshots.linked_address = Some(LinkedAddressSnapshot::pending(text));
        }

        PendingRequests {
            name_query,
            linked_address,
        }
    }

    fn re_resolve(&mut self) {
        self.recipient = Arc::new(self.engine.resolve(&self.input, &self.ctx, &self.snapshots));
        self.re_validate();
    }

    fn re_validate(&mut self) {
        self.finding = self.engine.validate(&self.recipient, &self.ctx);
    }
}
