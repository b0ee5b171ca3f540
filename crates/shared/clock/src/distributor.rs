use hermes_core::Timestamp;
use hermes_ports::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::align::next_tick;
use crate::shutdown::Shutdown;
use crate::system::SystemClock;

/// Per-agent tick receiver; holds at most one undelivered tick
pub type TickReceiver = mpsc::Receiver<Timestamp>;

struct Subscriber {
    agent: String,
    tx: mpsc::Sender<Timestamp>,
}

/// Wall-clock aligned fan-out of a single timestamp to every registered agent
///
/// Sends never block: an agent still busy with its previous tick simply misses
/// this one.
pub struct TickDistributor {
    period: Duration,
    clock: Arc<dyn Clock>,
    subscribers: Vec<Subscriber>,
}

impl TickDistributor {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            clock: Arc::new(SystemClock::new()),
            subscribers: Vec::new(),
        }
    }

    /// Builder: use a custom time source for boundary alignment
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an agent and return its single-slot tick channel
    pub fn register(&mut self, agent: impl Into<String>) -> TickReceiver {
        let (tx, rx) = mpsc::channel(1);
        self.subscribers.push(Subscriber {
            agent: agent.into(),
            tx,
        });
        rx
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Offer `tick` to every subscriber, returning how many accepted it
    pub fn broadcast(&self, tick: Timestamp) -> usize {
        let mut delivered = 0;
        for sub in &self.subscribers {
            match sub.tx.try_send(tick) {
                Ok(()) => {
                    delivered += 1;
                    log::debug!("[{}] Tick {} delivered", sub.agent, tick);
                }
                Err(TrySendError::Full(_)) => {
                    log::warn!("[{}] Still busy, dropping tick {}", sub.agent, tick);
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("[{}] Tick channel closed", sub.agent);
                }
            }
        }
        delivered
    }

    /// Tick on every period boundary until shutdown
    pub async fn run(self, shutdown: Shutdown) {
        log::info!(
            "Tick distributor started: {} agents, period {:?}",
            self.subscribers.len(),
            self.period
        );

        let mut last = None;
        loop {
            let now = self.clock.now();
            let tick = next_tick(now, last, self.period);
            let wait = (tick - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            self.broadcast(tick);
            last = Some(tick);
        }

        log::info!("Tick distributor stopped");
    }
}
