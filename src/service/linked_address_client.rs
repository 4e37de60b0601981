//! 关联地址 REST 客户端
//!
//! 从 Cosmos LCD 查询账户公钥（secp256k1，压缩格式），按以太坊规则派生 EVM 地址：
//! Keccak256(未压缩公钥去掉 0x04 前缀) 的后 20 字节。
//! 账户从未发过交易时链上没有公钥，无法派生。

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Deserialize;
use sha3::{Digest, Keccak256};

use crate::config::LinkedAddressConfig;
use crate::service::account_bridge::{BridgeError, LinkedAddressSource};
use crate::utils::address_classifier::checksum_evm_address;

impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BridgeError::Timeout
        } else if let Some(status) = e.status() {
            BridgeError::Http {
                status: status.as_u16(),
            }
        } else {
            BridgeError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountInfoResponse {
    info: Option<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    pub_key: Option<AnyPubKey>,
}

#[derive(Debug, Deserialize)]
struct AnyPubKey {
    #[serde(rename = "@type")]
    type_url: Option<String>,
    key: Option<String>,
}

#[derive(Clone)]
pub struct RestLinkedAddressClient {
    client: reqwest::Client,
    lcd_url: String,
}

impl RestLinkedAddressClient {
    pub fn new(lcd_url: impl Into<String>, timeout: Duration) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            lcd_url: lcd_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &LinkedAddressConfig, timeout: Duration) -> Result<Self, BridgeError> {
        Self::new(config.lcd_url.clone(), timeout)
    }

    fn account_info_url(&self, address: &str) -> String {
        format!("{}/cosmos/auth/v1beta1/account_info/{}", self.lcd_url, address)
    }
}

#[async_trait]
impl LinkedAddressSource for RestLinkedAddressClient {
    async fn linked_evm_address(&self, address: &str) -> Result<String, BridgeError> {
        let url = self.account_info_url(address);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // 账户不存在
            return Err(BridgeError::MissingPublicKey);
        }
        if !status.is_success() {
            return Err(BridgeError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let pubkey = parse_account_pubkey(&body)?;
        evm_address_from_pubkey(&pubkey)
    }
}

/// 解析 account_info 响应中的公钥字节
fn parse_account_pubkey(body: &str) -> Result<Vec<u8>, BridgeError> {
    let parsed: AccountInfoResponse =
        serde_json::from_str(body).map_err(|e| BridgeError::Malformed(e.to_string()))?;

    let pub_key = parsed
        .info
        .and_then(|info| info.pub_key)
        .ok_or(BridgeError::MissingPublicKey)?;

    if let Some(type_url) = pub_key.type_url.as_deref() {
        // secp256k1 与 ethsecp256k1 都是压缩的 secp256k1 公钥
        if !type_url.ends_with("secp256k1.PubKey") {
            return Err(BridgeError::InvalidPublicKey(format!(
                "unsupported key type {}",
                type_url
            )));
        }
    }

    let key = pub_key.key.ok_or(BridgeError::MissingPublicKey)?;
    STANDARD
        .decode(key.as_bytes())
        .map_err(|e| BridgeError::InvalidPublicKey(e.to_string()))
}

/// secp256k1 公钥（压缩或未压缩）→ EIP-55 格式的 EVM 地址
pub fn evm_address_from_pubkey(pubkey: &[u8]) -> Result<String, BridgeError> {
    let public_key = k256::PublicKey::from_sec1_bytes(pubkey)
        .map_err(|e| BridgeError::InvalidPublicKey(e.to_string()))?;

    // 未压缩格式：0x04 || X || Y
    let uncompressed = public_key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    let address = format!("0x{}", hex::encode(&hash[12..]));

    checksum_evm_address(&address)
        .ok_or_else(|| BridgeError::Malformed("derived address is not 20 bytes".into()))
}
