//! 关联地址桥接：防抖、取消、超时
//!
//! 使用暂停的 tokio 时钟，所有等待都会被自动推进。

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use ironsend::config::BridgeConfig;
use ironsend::domain::{AssetInfo, RecipientInput, TransferContext};
use ironsend::repository::InMemoryNameService;
use ironsend::service::{
    AccountBridge, BridgeError, BridgeOutcome, LinkedAddressSource, LinkedAddressState,
};

enum Reply {
    Address(&'static str),
    MissingKey,
}

/// 记录调用次数的远程查询
struct CountingSource {
    calls: AtomicUsize,
    delay: Duration,
    reply: Reply,
}

impl CountingSource {
    fn new(delay: Duration, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkedAddressSource for CountingSource {
    async fn linked_evm_address(&self, _address: &str) -> Result<String, BridgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match self.reply {
            Reply::Address(address) => Ok(address.to_string()),
            Reply::MissingKey => Err(BridgeError::MissingPublicKey),
        }
    }
}

fn config() -> BridgeConfig {
    BridgeConfig {
        debounce_ms: 200,
        timeout_ms: 1_000,
        min_source_len: 40,
    }
}

fn sei_context() -> TransferContext {
    let mut ctx = TransferContext::new("sei", bech32_address("sei", 0xaa), AssetInfo::native("usei"));
    ctx.asset_is_evm_native = true;
    ctx
}

#[tokio::test(start_paused = true)]
async fn test_derives_after_debounce() {
    let source = CountingSource::new(Duration::from_millis(50), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let input = bech32_address("sei", 0x01);

    let started = tokio::time::Instant::now();
    let outcome = bridge.request(&input, &sei_context()).await;

    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(source.calls(), 1);
    let snapshot = outcome.snapshot().expect("derived snapshot");
    assert!(snapshot.answers(&input));
    assert_eq!(
        snapshot.state,
        LinkedAddressState::Derived(GENERATOR_EVM_ADDRESS.to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_rapid_inputs_only_query_the_last() {
    let source = CountingSource::new(Duration::from_millis(50), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let ctx = sei_context();
    let first = bech32_address("sei", 0x01);
    let second = bech32_address("sei", 0x02);

    let (old, latest) = tokio::join!(bridge.request(&first, &ctx), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        bridge.request(&second, &ctx).await
    });

    assert!(old.is_stale() && old.answers(&first));
    assert!(matches!(latest, BridgeOutcome::Derived(ref s) if s.answers(&second)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_result_arriving_after_newer_request_is_dropped() {
    let source = CountingSource::new(Duration::from_millis(500), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let ctx = sei_context();
    let first = bech32_address("sei", 0x01);
    let second = bech32_address("sei", 0x02);

    // 第二次请求在第一次远程查询进行中发出
    let (old, latest) = tokio::join!(bridge.request(&first, &ctx), async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        bridge.request(&second, &ctx).await
    });

    assert!(old.is_stale());
    assert!(matches!(latest, BridgeOutcome::Derived(_)));
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_debounce() {
    let source = CountingSource::new(Duration::from_millis(50), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let input = bech32_address("sei", 0x01);
    let ctx = sei_context();

    let (outcome, _) = tokio::join!(bridge.request(&input, &ctx), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        bridge.cancel();
    });

    assert_eq!(
        outcome,
        BridgeOutcome::Stale {
            source_input: input.clone()
        }
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_becomes_failure() {
    let source = CountingSource::new(Duration::from_secs(10), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let input = bech32_address("sei", 0x01);

    let outcome = bridge.request(&input, &sei_context()).await;
    assert_eq!(
        outcome.snapshot().map(|s| s.state.clone()),
        Some(LinkedAddressState::Failed("lookup timed out".to_string()))
    );
    assert!(matches!(outcome, BridgeOutcome::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_missing_public_key_becomes_failure() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::MissingKey);
    let bridge = AccountBridge::new(source.clone(), config());
    let input = bech32_address("sei", 0x01);

    let outcome = bridge.request(&input, &sei_context()).await;
    assert!(matches!(
        outcome,
        BridgeOutcome::Failed(ref s) if matches!(s.state, LinkedAddressState::Failed(_))
    ));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_reply_becomes_failure() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::Address("0x1234"));
    let bridge = AccountBridge::new(source.clone(), config());
    let input = bech32_address("sei", 0x01);

    let outcome = bridge.request(&input, &sei_context()).await;
    assert!(matches!(outcome, BridgeOutcome::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_hardware_signer_never_queries() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let mut ctx = sei_context();
    ctx.is_hardware_wallet = true;

    for input in [bech32_address("sei", 0x01), GENERATOR_EVM_ADDRESS.to_string()] {
        let outcome = bridge.request(&input, &ctx).await;
        assert_eq!(
            outcome,
            BridgeOutcome::UnsupportedOnSigner {
                source_input: input.clone()
            }
        );
    }
    assert_eq!(source.calls(), 0);

    // 支持关联地址的硬件签名器照常查询
    ctx.hardware_supports_linked_address = true;
    let outcome = bridge.request(&bech32_address("sei", 0x01), &ctx).await;
    assert!(matches!(outcome, BridgeOutcome::Derived(_)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_not_required() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let ctx = sei_context();

    // 0x 输入、过短的输入、足够长但无法解码的输入、空输入
    let garbage = "not-an-address-but-long-enough-to-pass-length";
    for input in [GENERATOR_EVM_ADDRESS, "sei1short", garbage, "  "] {
        let outcome = bridge.request(input, &ctx).await;
        assert!(matches!(outcome, BridgeOutcome::NotRequired { .. }));
        assert!(outcome.answers(input));
    }

    // 非 EVM 原生资产
    let mut ctx = ctx;
    ctx.asset_is_evm_native = false;
    let input = bech32_address("sei", 0x01);
    assert_eq!(
        bridge.request(&input, &ctx).await,
        BridgeOutcome::NotRequired {
            source_input: input.clone()
        }
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_generation_follows_call_order_not_poll_order() {
    let source = CountingSource::new(Duration::from_millis(50), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let ctx = sei_context();
    let first = bech32_address("sei", 0x01);
    let second = bech32_address("sei", 0x02);

    let older = bridge.request(&first, &ctx);
    let newer = bridge.request(&second, &ctx);

    // 先 poll 较新的请求，结果仍以调用顺序为准
    let (latest, old) = tokio::join!(newer, older);

    assert!(old.is_stale() && old.answers(&first));
    assert!(matches!(latest, BridgeOutcome::Derived(ref s) if s.answers(&second)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_begin_then_run() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let ctx = sei_context();

    let superseded = bridge.begin(&bech32_address("sei", 0x01));
    let current = bridge.begin(&bech32_address("sei", 0x02));

    assert!(bridge.run(superseded, &ctx).await.is_stale());
    assert!(matches!(bridge.run(current, &ctx).await, BridgeOutcome::Derived(_)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_engine_skips_lookup_for_unknown_prefix() {
    let source = CountingSource::new(Duration::from_millis(10), Reply::Address(GENERATOR_EVM_ADDRESS));
    let bridge = AccountBridge::new(source.clone(), config());
    let names = InMemoryNameService::new();
    let engine = engine();
    let ctx = sei_context();

    for input in [bech32_address("zzz", 0x01), "q".repeat(45)] {
        let evaluation = engine
            .evaluate_with_lookups(&RecipientInput::typed(input.clone()), &ctx, &bridge, &names)
            .await;
        assert!(!evaluation.recipient.is_pending());
        assert_ne!(evaluation.recipient.address, GENERATOR_EVM_ADDRESS);
    }
    assert_eq!(source.calls(), 0);
}
