//! 地址分类模块
//!
//! 原始文本 → `AddressShape`，同步且不会失败（解码失败只会落到下一条规则）

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sha3::{Digest, Keccak256};

use crate::config::{NameServiceConfig, DEFAULT_NAME_SERVICE_TLDS};
use crate::domain::AddressShape;

/// 名称服务候选格式：label.tld
static NAME_CANDIDATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9_-]+)\.([a-z]+)$").expect("static name pattern is valid")
});

/// 地址分类器
#[derive(Debug, Clone)]
pub struct AddressClassifier {
    /// 已识别的名称服务顶级域
    tlds: HashSet<String>,
}

impl AddressClassifier {
    pub fn new<I, S>(tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tlds: tlds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &NameServiceConfig) -> Self {
        Self::new(config.tlds.iter().cloned())
    }

    pub fn is_recognized_tld(&self, tld: &str) -> bool {
        self.tlds.contains(tld)
    }

    /// 分类
    ///
    /// 顺序：空 → 0x → bech32 → 名称服务候选 → 无法识别
    pub fn classify(&self, raw: &str) -> AddressShape {
        let input = raw.trim();

        if input.is_empty() {
            return AddressShape::Unclassifiable { raw: String::new() };
        }

        // 1. 0x 前缀（大小写不敏感），不校验长度与字符
        if has_hex_prefix(input) {
            return AddressShape::EvmHex {
                value: input.to_string(),
            };
        }

        // 2. bech32（校验和、字符集、大小写一致性由 bech32 crate 检查）
        if let Ok((hrp, payload)) = bech32::decode(input) {
            return AddressShape::Bech32 {
                prefix: hrp.to_lowercase(),
                payload,
            };
        }

        // 3. 名称服务候选
        if let Some(caps) = NAME_CANDIDATE_REGEX.captures(input) {
            let tld = &caps[2];
            if self.is_recognized_tld(tld) {
                return AddressShape::NameServiceCandidate {
                    label: caps[1].to_string(),
                    tld: tld.to_string(),
                };
            }
        }

        AddressShape::Unclassifiable {
            raw: input.to_string(),
        }
    }
}

impl Default for AddressClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_SERVICE_TLDS.iter().copied())
    }
}

fn has_hex_prefix(s: &str) -> bool {
    s.get(..2)
        .map(|p| p.eq_ignore_ascii_case("0x"))
        .unwrap_or(false)
}

/// 0x + 40 位十六进制
pub fn is_well_formed_evm(address: &str) -> bool {
    if address.len() != 42 || !has_hex_prefix(address) {
        return false;
    }
    address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// 验证EIP-55 Checksum
/// https://eips.ethereum.org/EIPS/eip-55
///
/// 全小写或全大写地址不携带校验和，视为有效
pub fn has_valid_eip55_checksum(address: &str) -> bool {
    if !is_well_formed_evm(address) {
        return false;
    }

    let hex_chars = &address[2..];
    let has_lower = hex_chars.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_chars.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    to_checksum_address(hex_chars) == hex_chars
}

/// 计算 EIP-55 大小写形式（输入不含 0x）
fn to_checksum_address(hex_chars: &str) -> String {
    let addr_lower = hex_chars.to_lowercase();
    let hash = Keccak256::digest(addr_lower.as_bytes());

    addr_lower
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };
            if ch.is_ascii_alphabetic() && hash_nibble >= 8 {
                ch.to_ascii_uppercase()
            } else {
                ch
            }
        })
        .collect()
}

/// 转为 EIP-55 校验和格式（带 0x）；格式不合法时返回 None
pub fn checksum_evm_address(address: &str) -> Option<String> {
    if !is_well_formed_evm(address) {
        return None;
    }
    Some(format!("0x{}", to_checksum_address(&address[2..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bech32_address(prefix: &str, bytes: &[u8]) -> String {
        let hrp = bech32::Hrp::parse(prefix).unwrap();
        bech32::encode::<bech32::Bech32>(hrp, bytes).unwrap()
    }

    #[test]
    fn test_empty_input_is_unclassifiable() {
        let classifier = AddressClassifier::default();
        assert_eq!(
            classifier.classify("   "),
            AddressShape::Unclassifiable { raw: String::new() }
        );
    }

    #[test]
    fn test_evm_hex_regardless_of_casing() {
        let classifier = AddressClassifier::default();
        for input in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1Beaed",
        ] {
            assert!(classifier.classify(input).is_evm_hex(), "{}", input);
        }
        // 长度不合法也归为 EvmHex，由校验阶段报告
        assert!(classifier.classify("0x123").is_evm_hex());
    }

    #[test]
    fn test_bech32_decoding() {
        let classifier = AddressClassifier::default();
        let address = bech32_address("osmo", &[7u8; 20]);

        match classifier.classify(&format!("  {}  ", address)) {
            AddressShape::Bech32 { prefix, payload } => {
                assert_eq!(prefix, "osmo");
                assert_eq!(payload, vec![7u8; 20]);
            }
            other => panic!("unexpected shape: {:?}", other),
        }

        // 全大写同样合法
        assert!(classifier.classify(&address.to_uppercase()).is_bech32());
    }

    #[test]
    fn test_bech32_failures_fall_through() {
        let classifier = AddressClassifier::default();
        let address = bech32_address("cosmos", &[1u8; 20]);

        // 篡改最后一个字符 → 校验和错误
        let mut corrupted = address.clone();
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == 'q' { 'p' } else { 'q' });
        assert!(matches!(
            classifier.classify(&corrupted),
            AddressShape::Unclassifiable { .. }
        ));

        // 大小写混用
        let mut mixed = address.clone();
        mixed.replace_range(0..1, "C");
        assert!(matches!(
            classifier.classify(&mixed),
            AddressShape::Unclassifiable { .. }
        ));
    }

    #[test]
    fn test_name_service_candidate() {
        let classifier = AddressClassifier::default();
        assert_eq!(
            classifier.classify("alice_01.osmo"),
            AddressShape::NameServiceCandidate {
                label: "alice_01".into(),
                tld: "osmo".into(),
            }
        );

        // 未识别的顶级域
        assert!(matches!(
            classifier.classify("alice.eth"),
            AddressShape::Unclassifiable { .. }
        ));
        // 顶级域必须小写
        assert!(matches!(
            classifier.classify("alice.OSMO"),
            AddressShape::Unclassifiable { .. }
        ));
        assert!(matches!(
            classifier.classify("a.b.osmo"),
            AddressShape::Unclassifiable { .. }
        ));
    }

    #[test]
    fn test_custom_tlds() {
        let classifier = AddressClassifier::new(["eth"]);
        assert!(matches!(
            classifier.classify("vitalik.eth"),
            AddressShape::NameServiceCandidate { .. }
        ));
        assert!(matches!(
            classifier.classify("alice.osmo"),
            AddressShape::Unclassifiable { .. }
        ));
    }

    #[test]
    fn test_eip55_checksum() {
        // EIP-55 规范中的示例地址
        assert!(has_valid_eip55_checksum(
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        ));
        assert!(has_valid_eip55_checksum(
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        ));
        assert!(has_valid_eip55_checksum(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        ));
        assert!(!has_valid_eip55_checksum(
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1Beaed"
        ));
        assert!(!has_valid_eip55_checksum("0x123"));
    }

    #[test]
    fn test_checksum_evm_address() {
        assert_eq!(
            checksum_evm_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").as_deref(),
            Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
        assert!(checksum_evm_address("0xGGGG").is_none());
    }

    #[test]
    fn test_well_formed_evm() {
        assert!(is_well_formed_evm("0x742d35cc6634c0532925a3b844bc9e7595f0beb6"));
        assert!(!is_well_formed_evm("0x742d35cc6634c0532925a3b844bc9e7595f0be"));
        assert!(!is_well_formed_evm("0xGGGG35Cc6634C0532925a3b844Bc9e7595f0bEb6"));
        assert!(!is_well_formed_evm("742d35cc6634c0532925a3b844bc9e7595f0beb6ab"));
    }
}
