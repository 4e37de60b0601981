// 日志脱敏模块 - 地址只以 前缀...后缀 形式进入日志

use regex::Regex;
use std::sync::LazyLock;

// EVM 地址正则（0x + 40个十六进制字符）
static EVM_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b0x[a-f0-9]{40}\b").unwrap());

// bech32 地址正则（小写 hrp + 分隔符 1 + 至少 38 个数据字符）
static BECH32_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{1,16}1[qpzry9x8gf2tvdw0s3jn54khce6mua7l]{38,}\b").unwrap());

/// 脱敏地址
///
/// - EVM：保留 0x + 前4位 和 后4位
/// - bech32：保留 hrp + 1 和 后4位
pub fn sanitize_address(addr: &str) -> String {
    let addr = addr.trim();
    if addr.len() < 12 || !addr.is_ascii() {
        return "***".to_string();
    }
    let suffix = &addr[addr.len() - 4..];
    if addr[..2].eq_ignore_ascii_case("0x") {
        return format!("{}...{}", &addr[..6], suffix);
    }
    match addr.rfind('1') {
        Some(sep) if sep > 0 && sep + 1 < addr.len() - 4 => {
            format!("{}...{}", &addr[..=sep], suffix)
        }
        _ => format!("{}...{}", &addr[..4], suffix),
    }
}

/// 脱敏字符串中的地址
pub fn sanitize_log_message(msg: &str) -> String {
    let sanitized = EVM_ADDRESS_REGEX.replace_all(msg, |caps: &regex::Captures| {
        caps.get(0)
            .map(|m| sanitize_address(m.as_str()))
            .unwrap_or_else(|| "***".to_string())
    });

    BECH32_ADDRESS_REGEX
        .replace_all(&sanitized, |caps: &regex::Captures| {
            caps.get(0)
                .map(|m| sanitize_address(m.as_str()))
                .unwrap_or_else(|| "***".to_string())
        })
        .to_string()
}
