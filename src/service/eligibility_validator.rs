//! 转账资格校验
//!
//! `(ResolvedRecipient, TransferContext)` → 唯一生效的 `Finding`。
//! 规则按优先级排列，第一条命中的规则即为结果；校验从不触发解析。

use std::sync::Arc;

use crate::domain::{
    ActionEffect, ChainKey, ChainRegistry, Finding, FindingKind, LinkedAddressStatus,
    ResolvedRecipient, RouteSupport, TransferContext, WarningAction,
};
use crate::service::exchange_heuristic::ExchangeHeuristic;
use crate::utils::chain_normalizer::normalize_chain_key;
use crate::utils::string_utils::shorten_address;

/// 单条规则：命中返回 Some(Finding)
type Rule = fn(&EligibilityValidator, &RuleInput<'_>) -> Option<Finding>;

/// 规则按顺序求值（高优先级在前）
const RULES: &[Rule] = &[
    EligibilityValidator::unsupported_asset,
    EligibilityValidator::signer_cannot_derive,
    EligibilityValidator::pending_lookup,
    EligibilityValidator::invalid_address,
    EligibilityValidator::derivation_failed,
    EligibilityValidator::evm_address_required,
    EligibilityValidator::unsupported_path,
    EligibilityValidator::pfm_disabled,
    EligibilityValidator::sending_to_self,
    EligibilityValidator::derived_address_notice,
    EligibilityValidator::no_fiat_value,
    EligibilityValidator::exchange_deposit,
];

/// 预先计算的规则输入
struct RuleInput<'a> {
    recipient: &'a ResolvedRecipient,
    ctx: &'a TransferContext,
    source: ChainKey,
    /// 收款人所在链（已标准化）
    destination: Option<ChainKey>,
    /// 合法的自定义 IBC 通道
    channel_override: Option<&'a str>,
}

impl RuleInput<'_> {
    fn is_cross_chain(&self) -> bool {
        self.destination
            .as_ref()
            .map(|dest| *dest != self.source)
            .unwrap_or(false)
    }

    fn route(&self) -> Option<RouteSupport> {
        let dest = self.destination.as_ref()?;
        // 上下文中的 key 可能是别名
        self.ctx.route_to(dest).or_else(|| {
            self.ctx
                .ibc_support
                .iter()
                .find(|(pair, _)| {
                    normalize_chain_key(&pair.source) == self.source
                        && normalize_chain_key(&pair.destination) == *dest
                })
                .map(|(_, support)| *support)
        })
    }
}

pub struct EligibilityValidator {
    registry: Arc<dyn ChainRegistry>,
    exchange_heuristic: ExchangeHeuristic,
}

impl EligibilityValidator {
    pub fn new(registry: Arc<dyn ChainRegistry>, exchange_heuristic: ExchangeHeuristic) -> Self {
        Self {
            registry,
            exchange_heuristic,
        }
    }

    /// 计算当前生效的 Finding
    pub fn validate(&self, recipient: &ResolvedRecipient, ctx: &TransferContext) -> Finding {
        // 空输入不提前报错
        if recipient.is_empty_input() {
            return Finding::None;
        }

        let input = RuleInput {
            recipient,
            ctx,
            source: normalize_chain_key(&ctx.source_chain),
            destination: recipient.chain_key.as_ref().map(normalize_chain_key),
            channel_override: ctx.valid_channel_override(),
        };

        let finding = RULES
            .iter()
            .find_map(|rule| rule(self, &input))
            .unwrap_or(Finding::None);

        if let Some(kind) = finding.kind() {
            tracing::debug!(kind = ?kind, code = kind.code(), "Transfer finding");
        }
        finding
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 错误
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 资产无法到达收款人所在链
    fn unsupported_asset(&self, input: &RuleInput<'_>) -> Option<Finding> {
        let dest = input.destination.as_ref()?;
        let asset = &input.ctx.asset;
        let cross_chain = *dest != input.source;

        // cw20/cw721/erc721 只能在本链转移
        let chain_bound = asset.kind.is_chain_bound() && cross_chain;
        // EVM 资产需要目标链接受 EVM 地址
        let needs_evm = (input.ctx.asset_is_evm_native || asset.kind.is_evm_contract())
            && self.registry.chain(dest).is_some()
            && !self.registry.supports_evm_addressing(dest);
        // EVM-only 链之间没有 IBC 路径
        let evm_only_target = cross_chain && self.registry.is_evm_only(dest);

        (chain_bound || needs_evm || evm_only_target)
            .then(|| Finding::from_kind(FindingKind::UnsupportedAssetForChain))
    }

    /// 硬件签名器不支持关联地址：只依赖上下文，0x 输入同样命中
    fn signer_cannot_derive(&self, input: &RuleInput<'_>) -> Option<Finding> {
        input
            .ctx
            .signer_blocks_linked_address()
            .then(|| Finding::from_kind(FindingKind::DerivationUnsupportedOnSigner))
    }

    /// 名称服务或关联地址查询进行中：不报错，但也不能提交
    fn pending_lookup(&self, input: &RuleInput<'_>) -> Option<Finding> {
        input.recipient.is_pending().then_some(Finding::None)
    }

    fn invalid_address(&self, input: &RuleInput<'_>) -> Option<Finding> {
        let known_chain = input
            .destination
            .as_ref()
            .map(|dest| self.registry.is_enabled(dest))
            .unwrap_or(false);

        (!input.recipient.is_resolved() || !known_chain)
            .then(|| Finding::from_kind(FindingKind::InvalidAddress))
    }

    fn derivation_failed(&self, input: &RuleInput<'_>) -> Option<Finding> {
        match &input.recipient.linked_address {
            LinkedAddressStatus::Failed { reason } => {
                tracing::debug!(reason = %reason, "Linked address derivation failed");
                Some(Finding::from_kind(FindingKind::DerivationFailed))
            }
            _ => None,
        }
    }

    /// EVM 原生资产但没有可用的 EVM 地址（例如输入太短未触发派生）
    fn evm_address_required(&self, input: &RuleInput<'_>) -> Option<Finding> {
        (input.ctx.asset_is_evm_native && !input.recipient.is_evm_address()).then(|| {
            Finding::error(
                FindingKind::InvalidAddress,
                "This asset can only be sent to an EVM address",
            )
        })
    }

    fn unsupported_path(&self, input: &RuleInput<'_>) -> Option<Finding> {
        if !input.is_cross_chain() || input.channel_override.is_some() {
            return None;
        }
        let usable = input.route().map(|r| r.usable()).unwrap_or(false);
        (!usable).then(|| Finding::from_kind(FindingKind::UnsupportedCrossChainPath))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 警告
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 路径可用但未启用 PFM：建议先发到自己在中转链上的地址
    fn pfm_disabled(&self, input: &RuleInput<'_>) -> Option<Finding> {
        if !input.is_cross_chain() || input.channel_override.is_some() {
            return None;
        }
        let route = input.route()?;
        if !route.usable() || route.pfm_enabled {
            return None;
        }

        let dest = input.destination.as_ref()?;
        // 资产发行链与两端都不同时需要经发行链中转
        let intermediate = input
            .ctx
            .asset
            .origin_chain
            .as_ref()
            .map(normalize_chain_key)
            .filter(|origin| origin != dest && *origin != input.source)
            .unwrap_or_else(|| dest.clone());

        let own_address = input
            .ctx
            .own_addresses
            .iter()
            .find(|(chain, _)| normalize_chain_key(chain) == intermediate)
            .map(|(_, address)| address.clone());

        let message = FindingKind::PfmDisabled.message_en();
        Some(match own_address {
            Some(address) => {
                let chain_name = self
                    .registry
                    .chain(&intermediate)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| intermediate.to_string());
                Finding::warning_with_action(
                    FindingKind::PfmDisabled,
                    message,
                    WarningAction {
                        label: format!("Use my {} address", chain_name),
                        effect: ActionEffect::AutofillAddress {
                            chain_key: intermediate,
                            address,
                        },
                    },
                )
            }
            None => Finding::warning(FindingKind::PfmDisabled, message),
        })
    }

    fn sending_to_self(&self, input: &RuleInput<'_>) -> Option<Finding> {
        input
            .recipient
            .same_address(&input.ctx.current_wallet_address)
            .then(|| Finding::from_kind(FindingKind::SendingToSelf))
    }

    fn derived_address_notice(&self, input: &RuleInput<'_>) -> Option<Finding> {
        match &input.recipient.linked_address {
            LinkedAddressStatus::Derived { .. } => Some(Finding::warning(
                FindingKind::DerivedAddressNotice,
                format!(
                    "The recipient will receive funds at their linked EVM address {}",
                    shorten_address(&input.recipient.address)
                ),
            )),
            _ => None,
        }
    }

    fn no_fiat_value(&self, input: &RuleInput<'_>) -> Option<Finding> {
        (!input.ctx.asset.fiat_value_available)
            .then(|| Finding::from_kind(FindingKind::NoFiatValue))
    }

    fn exchange_deposit(&self, input: &RuleInput<'_>) -> Option<Finding> {
        if !input.is_cross_chain() {
            return None;
        }
        let recipient = input.recipient;
        let source_address = match &recipient.linked_address {
            LinkedAddressStatus::Derived { source_address } => Some(source_address.as_str()),
            _ => None,
        };
        let is_exchange = self.exchange_heuristic.is_exchange_deposit(&recipient.address)
            || source_address
                .map(|a| self.exchange_heuristic.is_exchange_deposit(a))
                .unwrap_or(false);

        is_exchange.then(|| Finding::from_kind(FindingKind::ExchangeDepositCrossChain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AssetInfo, AssetKind, ChainPair, RecipientFlags, SelectionSource, StaticChainRegistry,
    };

    const OSMO_ME: &str = "osmo1me";
    const COSMOS_ME: &str = "cosmos1me";

    fn validator() -> EligibilityValidator {
        EligibilityValidator::new(
            Arc::new(StaticChainRegistry::new()),
            ExchangeHeuristic::new(["cosmos1exchange"]),
        )
    }

    fn recipient(address: &str, chain: Option<&str>) -> ResolvedRecipient {
        ResolvedRecipient {
            raw_input: address.to_string(),
            address: address.to_string(),
            display_name: address.to_string(),
            chain_key: chain.map(ChainKey::from),
            selection_source: SelectionSource::NotSaved,
            avatar_ref: None,
            chain_icon_ref: None,
            emoji_ref: None,
            flags: RecipientFlags::default(),
            linked_address: LinkedAddressStatus::NotRequested,
        }
    }

    fn route(supported: bool, pfm_enabled: bool) -> RouteSupport {
        RouteSupport {
            supported,
            pfm_enabled,
            disabled: false,
        }
    }

    fn osmosis_ctx() -> TransferContext {
        let mut ctx = TransferContext::new("osmosis", OSMO_ME, AssetInfo::native("uosmo"));
        ctx.own_addresses.insert(ChainKey::from("osmosis"), OSMO_ME.into());
        ctx.own_addresses.insert(ChainKey::from("cosmos"), COSMOS_ME.into());
        ctx.ibc_support
            .insert(ChainPair::new("osmosis", "cosmos"), route(true, true));
        ctx
    }

    #[test]
    fn test_empty_input_has_no_finding() {
        let v = validator();
        let empty = ResolvedRecipient::unresolved("", false);
        let mut ctx = osmosis_ctx();
        ctx.asset_is_evm_native = true;
        ctx.is_hardware_wallet = true;
        assert_eq!(v.validate(&empty, &ctx), Finding::None);
    }

    #[test]
    fn test_same_chain_transfer_is_clean() {
        let v = validator();
        let finding = v.validate(&recipient("osmo1friend", Some("osmosis")), &osmosis_ctx());
        assert_eq!(finding, Finding::None);
    }

    #[test]
    fn test_invalid_address() {
        let v = validator();
        let ctx = osmosis_ctx();

        let unresolved = ResolvedRecipient::unresolved("not-an-address", false);
        assert_eq!(
            v.validate(&unresolved, &ctx).kind(),
            Some(FindingKind::InvalidAddress)
        );

        let unknown_chain = recipient("terra1friend", None);
        assert_eq!(
            v.validate(&unknown_chain, &ctx).kind(),
            Some(FindingKind::InvalidAddress)
        );

        // 注册表中没有的链
        let unregistered = recipient("xyz1friend", Some("unknown-chain"));
        assert_eq!(
            v.validate(&unregistered, &ctx).kind(),
            Some(FindingKind::InvalidAddress)
        );
    }

    #[test]
    fn test_cw20_cross_chain_is_unsupported() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.asset.kind = AssetKind::Cw20;

        let finding = v.validate(&recipient("cosmos1friend", Some("cosmos")), &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::UnsupportedAssetForChain));
        assert!(finding.is_blocking());

        // 本链转移不受影响
        let finding = v.validate(&recipient("osmo1friend", Some("osmosis")), &ctx);
        assert_eq!(finding, Finding::None);
    }

    #[test]
    fn test_unsupported_asset_outranks_invalid_address() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.asset.kind = AssetKind::Cw721;

        // 已知链但地址未解析
        let mut r = recipient("cosmos1friend", Some("cosmos"));
        r.selection_source = SelectionSource::Unresolved;
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedAssetForChain)
        );
    }

    #[test]
    fn test_evm_only_destination_from_cosmos_chain() {
        let v = validator();
        let ctx = osmosis_ctx();
        let r = recipient("0x742d35cc6634c0532925a3b844bc9e7595f0beb6", Some("ethereum"));
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedAssetForChain)
        );
    }

    #[test]
    fn test_unsupported_path_and_override() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        let r = recipient("juno1friend", Some("juno"));

        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedCrossChainPath)
        );

        // 显式禁用
        ctx.ibc_support.insert(
            ChainPair::new("osmosis", "juno"),
            RouteSupport {
                supported: true,
                pfm_enabled: true,
                disabled: true,
            },
        );
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedCrossChainPath)
        );

        // 格式错误的通道被忽略
        ctx.custom_ibc_channel_override = Some("juno".into());
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedCrossChainPath)
        );

        ctx.custom_ibc_channel_override = Some("channel-42".into());
        assert_eq!(v.validate(&r, &ctx), Finding::None);
    }

    #[test]
    fn test_pfm_disabled_offers_autofill() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.ibc_support
            .insert(ChainPair::new("osmosis", "cosmos"), route(true, false));

        let finding = v.validate(&recipient("cosmos1friend", Some("cosmos")), &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::PfmDisabled));
        assert!(!finding.is_blocking());

        let action = finding.action().unwrap();
        assert_eq!(
            action.effect,
            ActionEffect::AutofillAddress {
                chain_key: ChainKey::from("cosmos"),
                address: COSMOS_ME.into(),
            }
        );
        assert_eq!(action.label, "Use my Cosmos Hub address");
    }

    #[test]
    fn test_pfm_intermediate_is_origin_chain() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.asset = AssetInfo {
            denom: "ibc/JUNO".into(),
            kind: AssetKind::Ibc,
            origin_chain: Some(ChainKey::from("juno")),
            fiat_value_available: true,
        };
        ctx.own_addresses.insert(ChainKey::from("juno"), "juno1me".into());
        ctx.ibc_support
            .insert(ChainPair::new("osmosis", "cosmos"), route(true, false));

        let finding = v.validate(&recipient("cosmos1friend", Some("cosmos")), &ctx);
        assert_eq!(
            finding.action().map(|a| a.effect.clone()),
            Some(ActionEffect::AutofillAddress {
                chain_key: ChainKey::from("juno"),
                address: "juno1me".into(),
            })
        );
    }

    #[test]
    fn test_pfm_warning_without_own_address() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.own_addresses.clear();
        ctx.ibc_support
            .insert(ChainPair::new("osmosis", "cosmos"), route(true, false));

        let finding = v.validate(&recipient("cosmos1friend", Some("cosmos")), &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::PfmDisabled));
        assert!(finding.action().is_none());
    }

    #[test]
    fn test_sending_to_self() {
        let v = validator();
        let finding = v.validate(&recipient(OSMO_ME, Some("osmosis")), &osmosis_ctx());
        assert_eq!(finding.kind(), Some(FindingKind::SendingToSelf));
    }

    #[test]
    fn test_no_fiat_value() {
        let v = validator();
        let mut ctx = osmosis_ctx();
        ctx.asset.fiat_value_available = false;
        let finding = v.validate(&recipient("osmo1friend", Some("osmosis")), &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::NoFiatValue));
    }

    #[test]
    fn test_exchange_deposit_only_cross_chain() {
        let v = validator();
        let ctx = osmosis_ctx();
        let finding = v.validate(&recipient("cosmos1exchange", Some("cosmos")), &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::ExchangeDepositCrossChain));

        let same_chain_ctx = TransferContext::new("cosmos", COSMOS_ME, AssetInfo::native("uatom"));
        let finding = v.validate(&recipient("cosmos1exchange", Some("cosmos")), &same_chain_ctx);
        assert_eq!(finding, Finding::None);
    }

    #[test]
    fn test_signer_check_precedes_address_checks() {
        let v = validator();
        let mut ctx = TransferContext::new("sei", "sei1me", AssetInfo::native("usei"));
        ctx.asset_is_evm_native = true;
        ctx.is_hardware_wallet = true;

        let r = recipient("0x742d35cc6634c0532925a3b844bc9e7595f0beb6", Some("sei"));
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::DerivationUnsupportedOnSigner)
        );

        let unresolved = ResolvedRecipient::unresolved("0x1234", false);
        assert_eq!(
            v.validate(&unresolved, &ctx).kind(),
            Some(FindingKind::DerivationUnsupportedOnSigner)
        );
    }

    #[test]
    fn test_linked_address_findings() {
        let v = validator();
        let mut ctx = TransferContext::new("sei", "sei1me", AssetInfo::native("usei"));
        ctx.asset_is_evm_native = true;

        let mut pending = recipient("sei1friend", Some("sei"));
        pending.linked_address = LinkedAddressStatus::Pending;
        assert_eq!(v.validate(&pending, &ctx), Finding::None);

        let mut failed = recipient("sei1friend", Some("sei"));
        failed.linked_address = LinkedAddressStatus::Failed {
            reason: "timeout".into(),
        };
        assert_eq!(
            v.validate(&failed, &ctx).kind(),
            Some(FindingKind::DerivationFailed)
        );

        // 未派生的非 EVM 地址
        let plain = recipient("sei1friend", Some("sei"));
        assert_eq!(
            v.validate(&plain, &ctx).kind(),
            Some(FindingKind::InvalidAddress)
        );

        let mut derived = recipient("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf", Some("sei"));
        derived.linked_address = LinkedAddressStatus::Derived {
            source_address: "sei1friend".into(),
        };
        let finding = v.validate(&derived, &ctx);
        assert_eq!(finding.kind(), Some(FindingKind::DerivedAddressNotice));
        assert!(finding.message().unwrap().contains("0x7e5f"));
    }

    #[test]
    fn test_evm_asset_to_non_evm_chain() {
        let v = validator();
        let mut ctx = TransferContext::new("sei", "sei1me", AssetInfo::native("usei"));
        ctx.asset_is_evm_native = true;
        let r = recipient("osmo1friend", Some("osmosis"));
        assert_eq!(
            v.validate(&r, &ctx).kind(),
            Some(FindingKind::UnsupportedAssetForChain)
        );
    }
}
