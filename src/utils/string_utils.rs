//! 字符串工具模块
//! 提供地址展示相关的工具函数

/// 缩短地址用于展示：前 `head` 个字符 + "…" + 后 `tail` 个字符
///
/// 字符数不超过 head + tail + 1 时原样返回
pub fn shorten_middle(s: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= head + tail + 1 {
        return s.to_string();
    }
    let prefix: String = chars[..head].iter().collect();
    let suffix: String = chars[chars.len() - tail..].iter().collect();
    format!("{}…{}", prefix, suffix)
}

/// 收款人卡片上的地址展示形式
///
/// bech32 地址保留完整前缀（如 osmo1）再加 5 个字符；EVM 地址保留 0x 后 4 个字符
pub fn shorten_address(address: &str) -> String {
    let address = address.trim();
    if address
        .get(..2)
        .map(|p| p.eq_ignore_ascii_case("0x"))
        .unwrap_or(false)
    {
        return shorten_middle(address, 6, 4);
    }
    match address.rfind('1') {
        Some(sep) if sep > 0 => shorten_middle(address, sep + 1 + 5, 5),
        _ => shorten_middle(address, 8, 5),
    }
}

/// 检查字符串是否为空或只包含空白字符
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_evm_address() {
        assert_eq!(
            shorten_address("0x742d35cc6634c0532925a3b844bc9e7595f0beb6"),
            "0x742d…beb6"
        );
    }

    #[test]
    fn test_shorten_bech32_address() {
        assert_eq!(
            shorten_address("osmo1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu"),
            "osmo1qypqx…zv7xu"
        );
    }

    #[test]
    fn test_short_strings_unchanged() {
        assert_eq!(shorten_address("alice.osmo"), "alice.osmo");
        assert_eq!(shorten_middle("abcdef", 2, 2), "ab…ef");
        assert_eq!(shorten_middle("abcde", 2, 2), "abcde");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("  \n"));
        assert!(!is_blank(" a "));
    }
}
