use hermes_clock::Shutdown;
use hermes_core::Trade;
use hermes_ports::{MarketGateway, TradeStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{BrokerError, Result};
use crate::queue::{TradeQueue, TradeResult, WorkItem};

/// Broker configuration
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Sleep between polls of an empty queue
    pub idle_backoff: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            idle_backoff: Duration::from_millis(100),
        }
    }
}

/// Counters readable while the loop runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStats {
    pub submitted: u64,
    pub placed: u64,
    pub failed: u64,
    pub persist_failures: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    placed: AtomicU64,
    failed: AtomicU64,
    persist_failures: AtomicU64,
}

/// Serializes trades from every agent into one outbound order stream
///
/// Submissions are non-blocking. A single processing loop places orders one at
/// a time in submission order and reports each outcome through the
/// submitter's completion callback.
pub struct Broker {
    queue: TradeQueue,
    market: Arc<dyn MarketGateway>,
    trades: Arc<dyn TradeStore>,
    config: BrokerConfig,
    started: AtomicBool,
    counters: Counters,
}

impl Broker {
    pub fn new(market: Arc<dyn MarketGateway>, trades: Arc<dyn TradeStore>) -> Self {
        Self {
            queue: TradeQueue::new(),
            market,
            trades,
            config: BrokerConfig::default(),
            started: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Builder: override the default configuration
    pub fn with_config(mut self, config: BrokerConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue `trade`; `on_complete` fires once with the placement outcome
    ///
    /// After the processing loop has stopped, `on_complete` fires immediately
    /// with [`BrokerError::ShuttingDown`].
    pub fn submit_trade(
        &self,
        trade: Trade,
        on_complete: impl FnOnce(TradeResult) + Send + 'static,
    ) {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let agent = trade.agent_name.clone();
        let summary = format!("{} {} (order {})", trade.action, trade.symbol, trade.order_id);

        match self.queue.enqueue(WorkItem::new(trade, on_complete)) {
            Ok(()) => log::debug!("[{}] Queued {}", agent, summary),
            Err(item) => {
                log::warn!("[{}] Broker stopped, rejecting {}", agent, summary);
                item.complete(Err(BrokerError::ShuttingDown));
            }
        }
    }

    /// Queue `trade` and get the outcome on a channel instead of a callback
    pub fn submit_with_receipt(&self, trade: Trade) -> oneshot::Receiver<TradeResult> {
        let (tx, rx) = oneshot::channel();
        self.submit_trade(trade, move |result| {
            let _ = tx.send(result);
        });
        rx
    }

    /// Trades waiting to be placed
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            placed: self.counters.placed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            persist_failures: self.counters.persist_failures.load(Ordering::Relaxed),
        }
    }

    /// Spawn the processing loop; only the first call starts one
    pub fn process_trades(self: &Arc<Self>, shutdown: Shutdown) -> Result<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BrokerError::AlreadyRunning);
        }
        let broker = Arc::clone(self);
        Ok(tokio::spawn(async move { broker.run(shutdown).await }))
    }

    async fn run(&self, shutdown: Shutdown) {
        log::info!(
            "Broker started against {} (idle backoff {:?})",
            self.market.name(),
            self.config.idle_backoff
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }
            match self.queue.dequeue() {
                Some(item) => self.process_one(item).await,
                None => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.idle_backoff) => {}
                    }
                }
            }
        }

        // Closed before draining so nothing can be queued behind the drain
        self.queue.close();
        let mut abandoned = 0;
        while let Some(item) = self.queue.dequeue() {
            item.complete(Err(BrokerError::ShuttingDown));
            abandoned += 1;
        }
        if abandoned > 0 {
            log::warn!("Broker stopped with {} unplaced trades", abandoned);
        }
        log::info!("Broker stopped: {:?}", self.stats());
    }

    async fn process_one(&self, item: WorkItem) {
        let (mut trade, on_complete) = item.into_parts();
        trade.ensure_order_id();
        log::info!(
            "[{}] Processing {} {} (order {})",
            trade.agent_name,
            trade.action,
            trade.symbol,
            trade.order_id
        );

        if let Err(e) = self.market.place_order(&mut trade).await {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "[{}] Order {} failed: {}",
                trade.agent_name,
                trade.order_id,
                e
            );
            on_complete(Err(BrokerError::Placement(e)));
            return;
        }

        self.counters.placed.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "[{}] Placed {} {} qty={:?} price={:?} (broker order {:?})",
            trade.agent_name,
            trade.action,
            trade.symbol,
            trade.quantity,
            trade.price,
            trade.broker_order_id
        );

        let record = trade.clone();
        on_complete(Ok(trade));

        if let Err(e) = self.trades.save_trade(&record).await {
            self.counters.persist_failures.fetch_add(1, Ordering::Relaxed);
            log::error!(
                "[{}] Failed to save trade {}: {}",
                record.agent_name,
                record.order_id,
                e
            );
        }
    }
}
