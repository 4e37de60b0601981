//! 收款人解析
//!
//! 把分类/推断结果与地址簿、名称服务、自有钱包地址合并成唯一的 `ResolvedRecipient`。
//! 纯函数：只读 `Lookups` 中的快照，不访问网络，也不读取与链身份无关的上下文。
//!
//! 优先级（先匹配者生效）：
//! 1. 地址簿联系人（输入与联系人地址完全一致）
//! 2. 名称服务结果
//! 3. 源链与目标链都支持 EVM 地址时的 0x 地址
//! 4. bech32 地址（前缀未知时 chain_key 为 None）
//! 5. 自有钱包地址 → CurrentWallet
//! 6. Unresolved

use crate::domain::{
    AddressShape, ChainKey, ChainRegistry, Contact, LinkedAddressStatus, RecipientFlags,
    RecipientInput, ResolvedRecipient, SelectionSource,
};
use crate::infrastructure::log_sanitizer::sanitize_address;
use crate::repository::{ContactBook, WalletAddressSet};
use crate::service::account_bridge::{LinkedAddressSnapshot, LinkedAddressState};
use crate::service::name_lookup::NameServiceMatch;
use crate::utils::address_classifier::{has_valid_eip55_checksum, is_well_formed_evm};
use crate::utils::chain_normalizer::normalize_chain_key;
use crate::utils::string_utils::shorten_address;

/// 解析所需的只读查询
pub struct Lookups<'a> {
    pub contacts: &'a dyn ContactBook,
    pub wallet: &'a dyn WalletAddressSet,
    pub registry: &'a dyn ChainRegistry,
    pub source_chain: &'a ChainKey,
    /// 显式选择的目标链，否则源链
    pub active_chain: &'a ChainKey,
    /// 最近一次名称服务结果（可能属于旧输入）
    pub name_service: Option<&'a NameServiceMatch>,
    /// 最近一次关联地址结果（可能属于旧输入）
    pub linked_address: Option<&'a LinkedAddressSnapshot>,
}

/// 解析收款人
pub fn resolve(
    input: &RecipientInput,
    shape: &AddressShape,
    inferred: Option<ChainKey>,
    lookups: &Lookups<'_>,
) -> ResolvedRecipient {
    let raw = input.trimmed();
    if raw.is_empty() {
        return ResolvedRecipient::unresolved(raw, input.autofilled);
    }

    // 全大写的 bech32 与小写形式是同一地址，统一为小写后再比较
    let address = if shape.is_bech32() {
        raw.to_ascii_lowercase()
    } else {
        raw.to_string()
    };

    // 1. 地址簿
    if let Some(contact) = lookups.contacts.find_by_address(&address) {
        let fallback = inferred.clone().or_else(|| typed_evm_chain(shape, lookups));
        let recipient = saved_recipient(input, contact, fallback, lookups.registry);
        tracing::debug!(address = %sanitize_address(raw), "Recipient matched a saved contact");
        return fold_linked_address(recipient, lookups.linked_address);
    }

    // 2. 名称服务
    if let Some(query) = shape.name_query() {
        return resolve_name(input, &query, lookups);
    }

    // 3 & 4. 手动输入的地址
    let chain_key = match shape {
        AddressShape::EvmHex { .. } => typed_evm_chain(shape, lookups).or(inferred),
        AddressShape::Bech32 { .. } => inferred,
        _ => None,
    };
    let decodable = match shape {
        AddressShape::EvmHex { value } => is_well_formed_evm(value) && has_valid_eip55_checksum(value),
        AddressShape::Bech32 { .. } => true,
        _ => false,
    };
    if !decodable || (shape.is_evm_hex() && chain_key.is_none()) {
        tracing::debug!(address = %sanitize_address(raw), "Recipient could not be resolved");
        return ResolvedRecipient::unresolved(raw, input.autofilled);
    }

    let mut recipient = not_saved_recipient(input, &address, chain_key, lookups.registry);

    // 5. 自有钱包地址
    if let Some(owned_on) = lookups.wallet.owning_chain(&address) {
        tracing::debug!(chain = %owned_on, "Recipient is one of the active wallet's addresses");
        recipient.selection_source = SelectionSource::CurrentWallet;
    }

    fold_linked_address(recipient, lookups.linked_address)
}

/// 源链与当前链都支持 EVM 地址时，合法的 0x 地址归属当前链
fn typed_evm_chain(shape: &AddressShape, lookups: &Lookups<'_>) -> Option<ChainKey> {
    let AddressShape::EvmHex { value } = shape else {
        return None;
    };
    if !is_well_formed_evm(value) || !has_valid_eip55_checksum(value) {
        return None;
    }
    let source = normalize_chain_key(lookups.source_chain);
    let active = normalize_chain_key(lookups.active_chain);
    if lookups.registry.supports_evm_addressing(&source)
        && lookups.registry.supports_evm_addressing(&active)
    {
        Some(active)
    } else {
        None
    }
}

fn chain_icon(registry: &dyn ChainRegistry, chain_key: Option<&ChainKey>) -> Option<String> {
    chain_key
        .and_then(|key| registry.chain(key))
        .map(|c| c.icon_ref.clone())
}

fn saved_recipient(
    input: &RecipientInput,
    contact: Contact,
    fallback_chain: Option<ChainKey>,
    registry: &dyn ChainRegistry,
) -> ResolvedRecipient {
    let chain_key = contact
        .chain_key
        .as_ref()
        .map(normalize_chain_key)
        .or(fallback_chain);

    ResolvedRecipient {
        raw_input: input.trimmed().to_string(),
        chain_icon_ref: chain_icon(registry, chain_key.as_ref()),
        address: contact.address,
        display_name: contact.name,
        chain_key,
        selection_source: SelectionSource::Saved,
        avatar_ref: contact.avatar_ref,
        emoji_ref: contact.emoji,
        flags: RecipientFlags {
            autofilled: input.autofilled,
            ..RecipientFlags::default()
        },
        linked_address: LinkedAddressStatus::NotRequested,
    }
}

fn not_saved_recipient(
    input: &RecipientInput,
    address: &str,
    chain_key: Option<ChainKey>,
    registry: &dyn ChainRegistry,
) -> ResolvedRecipient {
    ResolvedRecipient {
        raw_input: input.trimmed().to_string(),
        address: address.to_string(),
        display_name: shorten_address(address),
        chain_icon_ref: chain_icon(registry, chain_key.as_ref()),
        chain_key,
        selection_source: SelectionSource::NotSaved,
        avatar_ref: None,
        emoji_ref: None,
        flags: RecipientFlags {
            autofilled: input.autofilled,
            ..RecipientFlags::default()
        },
        linked_address: LinkedAddressStatus::NotRequested,
    }
}

fn resolve_name(input: &RecipientInput, query: &str, lookups: &Lookups<'_>) -> ResolvedRecipient {
    let raw = input.trimmed();
    match lookups.name_service.filter(|m| m.answers(query)) {
        // 查询尚未返回
        None => {
            let mut recipient = ResolvedRecipient::unresolved(raw, input.autofilled);
            recipient.flags.awaiting_name_service = true;
            recipient
        }
        Some(NameServiceMatch { record: None, .. }) => {
            tracing::debug!(name = query, "Name is not registered");
            ResolvedRecipient::unresolved(raw, input.autofilled)
        }
        Some(NameServiceMatch {
            record: Some(record),
            ..
        }) => {
            let chain_key = normalize_chain_key(&record.chain_key);
            let mut recipient =
                not_saved_recipient(input, &record.address, Some(chain_key), lookups.registry);
            recipient.display_name = query.to_string();
            recipient.flags.from_name_service = true;
            tracing::debug!(
                name = query,
                address = %sanitize_address(&record.address),
                "Name resolved"
            );
            recipient
        }
    }
}

/// 折叠关联地址结果；只接受回答当前输入的结果
fn fold_linked_address(
    mut recipient: ResolvedRecipient,
    snapshot: Option<&LinkedAddressSnapshot>,
) -> ResolvedRecipient {
    let Some(snapshot) = snapshot else {
        return recipient;
    };
    if !snapshot.answers(&recipient.raw_input) {
        tracing::debug!("Ignoring linked address result for a previous input");
        return recipient;
    }
    if recipient.is_evm_address() || !recipient.is_resolved() {
        return recipient;
    }

    match &snapshot.state {
        LinkedAddressState::Pending => {
            recipient.linked_address = LinkedAddressStatus::Pending;
            recipient
        }
        LinkedAddressState::Failed(reason) => {
            recipient.linked_address = LinkedAddressStatus::Failed {
                reason: reason.clone(),
            };
            recipient
        }
        LinkedAddressState::Derived(evm) => {
            let source_address = std::mem::replace(&mut recipient.address, evm.clone());
            ResolvedRecipient {
                display_name: shorten_address(evm),
                selection_source: SelectionSource::NotSaved,
                avatar_ref: None,
                emoji_ref: None,
                linked_address: LinkedAddressStatus::Derived { source_address },
                ..recipient
            }
        }
    }
}
