//! Delay strategies for simulated latency

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LatencyConfig;
use crate::ports::{Delay, SimulatedOp};

/// Sleeps on the tokio timer for the configured per-operation duration
#[derive(Debug, Clone)]
pub struct TokioDelay {
    latency: LatencyConfig,
}

impl TokioDelay {
    pub fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, op: SimulatedOp) {
        let duration = self.latency.duration(op);
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn duration(&self, op: SimulatedOp) -> Duration {
        self.latency.duration(op)
    }
}

/// Completes immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _op: SimulatedOp) {}

    fn duration(&self, _op: SimulatedOp) -> Duration {
        Duration::ZERO
    }
}
