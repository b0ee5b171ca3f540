//! Hermes Clock Infrastructure
//!
//! Time sources, tick distribution and the process-wide shutdown signal.
//!
//! ```text
//!   Clock ──► next_boundary(now, period)
//!                │
//!                ▼  sleep until boundary
//!          TickDistributor ──try_send──► agent-1 (capacity 1)
//!                │          ──try_send──► agent-2 (capacity 1)
//!                │          ──try_send──► ...       full → tick dropped
//!                ▼
//!          Shutdown (watch) ends the loop
//! ```

mod align;
mod distributor;
mod shutdown;
mod system;

pub use align::{next_boundary, next_tick};
pub use distributor::{TickDistributor, TickReceiver};
pub use shutdown::{Shutdown, ShutdownHandle, shutdown_channel};
pub use system::{FixedClock, SystemClock};

// Re-export the Clock trait for convenience
pub use hermes_ports::Clock;
