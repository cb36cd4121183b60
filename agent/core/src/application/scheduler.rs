// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::time::Duration;

/// Tick source between agent cycles.
///
/// Production code sleeps for the configured interval; tests substitute a
/// ticker that returns immediately so cycles can be driven without real time.
#[async_trait]
pub trait Ticker: Send + Sync {
    /// Resolve when the next cycle is due.
    async fn wait(&self);
}

/// Fixed-interval sleep between cycles.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: Duration,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn wait(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
