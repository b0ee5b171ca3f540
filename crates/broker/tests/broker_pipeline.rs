//! Broker Integration Test
//!
//! Tests the submission pipeline end to end with hand-written doubles:
//! 1. Concurrent agents submit trades
//! 2. The single processing loop places them in FIFO order
//! 3. Each completion callback fires exactly once
//! 4. Executed trades are persisted, failures are not

use async_trait::async_trait;
use hermes_broker::{Broker, BrokerConfig, BrokerError};
use hermes_clock::shutdown_channel;
use hermes_core::{AccountSnapshot, AgentState, Position, Trade};
use hermes_ports::{
    GatewayError, GatewayResult, MarketGateway, StoreError, StoreResult, TradeStore,
};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fills everything at a fixed price except symbols listed as rejected
struct RecordingMarket {
    price: rust_decimal::Decimal,
    rejected: Vec<String>,
    placed: Mutex<Vec<Trade>>,
}

impl RecordingMarket {
    fn new() -> Self {
        Self {
            price: dec!(50.00),
            rejected: Vec::new(),
            placed: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(symbol: &str) -> Self {
        Self {
            rejected: vec![symbol.to_string()],
            ..Self::new()
        }
    }

    fn placed(&self) -> Vec<Trade> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketGateway for RecordingMarket {
    async fn place_order(&self, trade: &mut Trade) -> GatewayResult<()> {
        self.placed.lock().unwrap().push(trade.clone());
        if self.rejected.contains(&trade.symbol) {
            return Err(GatewayError::Rejected(format!("{} halted", trade.symbol)));
        }
        let quantity = match (trade.amount, trade.quantity) {
            (_, Some(quantity)) => quantity,
            (Some(amount), None) => amount / self.price,
            (None, None) => return Err(GatewayError::MissingSize("amount")),
        };
        trade.fill(format!("brk-{}", trade.order_id), self.price, quantity);
        Ok(())
    }

    async fn account(&self, _agent: &str) -> GatewayResult<AccountSnapshot> {
        Ok(AccountSnapshot::default())
    }

    async fn positions(&self, _agent: &str) -> GatewayResult<Vec<Position>> {
        Ok(Vec::new())
    }

    async fn is_market_open(&self) -> GatewayResult<bool> {
        Ok(true)
    }
}

#[derive(Default)]
struct RecordingStore {
    fail: bool,
    saved: Mutex<Vec<Trade>>,
}

#[async_trait]
impl TradeStore for RecordingStore {
    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Serialization("disk full".into()));
        }
        self.saved.lock().unwrap().push(trade.clone());
        Ok(())
    }
}

fn fast_broker(market: Arc<RecordingMarket>, store: Arc<RecordingStore>) -> Arc<Broker> {
    Arc::new(Broker::new(market, store).with_config(BrokerConfig {
        idle_backoff: Duration::from_millis(5),
    }))
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition reached in time");
}

#[tokio::test]
async fn test_buy_fill_reconciled_through_callback() {
    let _ = env_logger::try_init();
    let market = Arc::new(RecordingMarket::new());
    let store = Arc::new(RecordingStore::default());
    let broker = fast_broker(market.clone(), store.clone());
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();

    let state = Arc::new(Mutex::new(AgentState::new("alice", dec!(1000.00))));
    let trade = Trade::buy("alice", "XYZ", dec!(200.00));
    state.lock().unwrap().validate(&trade).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    broker.submit_trade(trade, {
        let state = state.clone();
        move |result| {
            let trade = result.expect("placed");
            state.lock().unwrap().apply_fill(&trade).unwrap();
            let _ = tx.send(trade);
        }
    });

    // Nothing applied before completion
    let filled = rx.await.unwrap();
    assert_eq!(filled.quantity, Some(dec!(4)));
    assert_eq!(filled.price, Some(dec!(50.00)));

    {
        let state = state.lock().unwrap();
        assert_eq!(state.account.cash, dec!(800.00));
        assert_eq!(state.available_quantity("XYZ"), dec!(4));
    }

    wait_until(|| store.saved.lock().unwrap().len() == 1).await;
    assert_eq!(store.saved.lock().unwrap()[0].order_id, filled.order_id);

    shutdown_handle.trigger();
    task.await.unwrap();
    assert_eq!(broker.stats().placed, 1);
}

#[tokio::test]
async fn test_placement_failure_reports_error_and_skips_persistence() {
    let market = Arc::new(RecordingMarket::rejecting("HALT"));
    let store = Arc::new(RecordingStore::default());
    let broker = fast_broker(market.clone(), store.clone());
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();

    let state = Arc::new(Mutex::new(AgentState::new("alice", dec!(1000))));
    let before = state.lock().unwrap().clone();

    let (tx, rx) = tokio::sync::oneshot::channel();
    broker.submit_trade(Trade::buy("alice", "HALT", dec!(100)), {
        let state = state.clone();
        move |result| {
            if let Err(e) = &result {
                state.lock().unwrap().record_failure(e.to_string());
            }
            let _ = tx.send(result);
        }
    });

    let result = rx.await.unwrap();
    assert!(matches!(
        result,
        Err(BrokerError::Placement(GatewayError::Rejected(_)))
    ));

    let after = state.lock().unwrap().clone();
    assert_eq!(after.holding_count(), before.holding_count());
    assert_eq!(after.account, before.account);
    assert!(after.last_error.unwrap().contains("HALT halted"));

    shutdown_handle.trigger();
    task.await.unwrap();
    assert!(store.saved.lock().unwrap().is_empty());
    assert_eq!(broker.stats().failed, 1);
}

#[tokio::test]
async fn test_persistence_failure_does_not_fail_the_trade() {
    let market = Arc::new(RecordingMarket::new());
    let store = Arc::new(RecordingStore {
        fail: true,
        ..Default::default()
    });
    let broker = fast_broker(market, store);
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();

    let receipt = broker.submit_with_receipt(Trade::sell("alice", "ABC", dec!(2)));
    let trade = receipt.await.unwrap().expect("placement succeeded");
    assert_eq!(trade.amount, Some(dec!(100.00)));

    wait_until(|| broker.stats().persist_failures == 1).await;
    shutdown_handle.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_missing_order_id_is_assigned() {
    let market = Arc::new(RecordingMarket::new());
    let broker = fast_broker(market.clone(), Arc::new(RecordingStore::default()));
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();

    let trade = Trade::buy("alice", "ABC", dec!(50)).with_order_id("");
    let placed = broker.submit_with_receipt(trade).await.unwrap().unwrap();

    assert!(placed.has_order_id());
    assert_eq!(market.placed()[0].order_id, placed.order_id);

    shutdown_handle.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_concurrent_agents_exactly_once_and_fifo() {
    const AGENTS: usize = 6;
    const PER_AGENT: usize = 40;

    let market = Arc::new(RecordingMarket::new());
    let broker = fast_broker(market.clone(), Arc::new(RecordingStore::default()));
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();
    let completions = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let broker = broker.clone();
            let completions = completions.clone();
            tokio::spawn(async move {
                for seq in 0..PER_AGENT {
                    let trade = Trade::buy(format!("agent-{agent}"), "ABC", dec!(10))
                        .with_order_id(format!("agent-{agent}-{seq:03}"));
                    let completions = completions.clone();
                    broker.submit_trade(trade, move |result| {
                        assert!(result.is_ok());
                        completions.fetch_add(1, Ordering::SeqCst);
                    });
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    wait_until(|| completions.load(Ordering::SeqCst) == AGENTS * PER_AGENT).await;
    shutdown_handle.trigger();
    task.await.unwrap();

    let placed = market.placed();
    assert_eq!(placed.len(), AGENTS * PER_AGENT);

    let mut per_agent: HashMap<String, Vec<String>> = HashMap::new();
    for trade in &placed {
        per_agent
            .entry(trade.agent_name.clone())
            .or_default()
            .push(trade.order_id.clone());
    }
    for (_, ids) in per_agent {
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted, "per-agent order preserved with no duplicates");
        assert_eq!(ids.len(), PER_AGENT);
    }

    let stats = broker.stats();
    assert_eq!(stats.submitted, (AGENTS * PER_AGENT) as u64);
    assert_eq!(stats.placed, (AGENTS * PER_AGENT) as u64);
}

#[tokio::test]
async fn test_second_processing_loop_refused() {
    let broker = fast_broker(
        Arc::new(RecordingMarket::new()),
        Arc::new(RecordingStore::default()),
    );
    let (shutdown_handle, shutdown) = shutdown_channel();

    let task = broker.process_trades(shutdown.clone()).unwrap();
    assert!(matches!(
        broker.process_trades(shutdown),
        Err(BrokerError::AlreadyRunning)
    ));

    shutdown_handle.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_completes_unplaced_trades() {
    let market = Arc::new(RecordingMarket::new());
    let broker = fast_broker(market.clone(), Arc::new(RecordingStore::default()));
    let (shutdown_handle, shutdown) = shutdown_channel();

    // Queue before the loop starts, then stop immediately
    let receipt = broker.submit_with_receipt(Trade::buy("alice", "ABC", dec!(10)));
    shutdown_handle.trigger();
    let task = broker.process_trades(shutdown).unwrap();
    task.await.unwrap();

    assert!(matches!(
        receipt.await.unwrap(),
        Err(BrokerError::ShuttingDown)
    ));
    assert!(market.placed().is_empty());
    assert_eq!(broker.pending(), 0);
}

#[tokio::test]
async fn test_submission_after_loop_stopped_completes_immediately() {
    let _ = env_logger::try_init();
    let market = Arc::new(RecordingMarket::new());
    let broker = fast_broker(market.clone(), Arc::new(RecordingStore::default()));
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();

    shutdown_handle.trigger();
    task.await.unwrap();

    // Callback runs on the submitting thread, before submit_trade returns
    let fired = Arc::new(Mutex::new(None));
    broker.submit_trade(Trade::buy("alice", "ABC", dec!(10)), {
        let fired = fired.clone();
        move |result| *fired.lock().unwrap() = Some(result)
    });
    assert!(matches!(
        fired.lock().unwrap().take(),
        Some(Err(BrokerError::ShuttingDown))
    ));

    let receipt = broker.submit_with_receipt(Trade::sell("alice", "ABC", dec!(1)));
    assert!(matches!(
        receipt.await.unwrap(),
        Err(BrokerError::ShuttingDown)
    ));

    assert_eq!(broker.pending(), 0);
    assert!(market.placed().is_empty());
    assert_eq!(broker.stats().submitted, 2);
}

#[tokio::test]
async fn test_every_callback_fires_when_shutdown_races_submitters() {
    const AGENTS: usize = 4;
    const PER_AGENT: usize = 200;

    let market = Arc::new(RecordingMarket::new());
    let broker = fast_broker(market, Arc::new(RecordingStore::default()));
    let (shutdown_handle, shutdown) = shutdown_channel();
    let task = broker.process_trades(shutdown).unwrap();
    let completions = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let broker = broker.clone();
            let completions = completions.clone();
            tokio::spawn(async move {
                for _ in 0..PER_AGENT {
                    let completions = completions.clone();
                    broker.submit_trade(
                        Trade::buy(format!("agent-{agent}"), "ABC", dec!(10)),
                        move |_| {
                            completions.fetch_add(1, Ordering::SeqCst);
                        },
                    );
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown_handle.trigger();
    task.await.unwrap();
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(completions.load(Ordering::SeqCst), AGENTS * PER_AGENT);
    assert_eq!(broker.pending(), 0);
}
