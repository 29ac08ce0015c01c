//! Fixed-interval polling into an [`OrderView`]
//!
//! One poller owns one query. Polls run sequentially on a single task, so
//! they never overlap; a poll that fails or times out leaves the view as it
//! was and the next tick tries again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::order::{KitchenStage, Order, OrderFilter};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::view::{OrderView, PollReport};
use crate::{ClientError, ClientResult, OrderBackend};

/// A query whose full result replaces a view's contents
#[async_trait]
pub trait PollSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> ClientResult<Vec<Order>>;
}

/// Kitchen display queue, optionally one stage
pub struct KitchenQueue<B> {
    backend: Arc<B>,
    stage: Option<KitchenStage>,
}

impl<B> KitchenQueue<B> {
    pub fn new(backend: Arc<B>, stage: Option<KitchenStage>) -> Self {
        Self { backend, stage }
    }
}

#[async_trait]
impl<B: OrderBackend> PollSource for KitchenQueue<B> {
    fn name(&self) -> &'static str {
        "kitchen"
    }

    async fn fetch(&self) -> ClientResult<Vec<Order>> {
        self.backend.kitchen_queue(self.stage).await
    }
}

/// Filtered order list
pub struct OrderList<B> {
    backend: Arc<B>,
    filter: OrderFilter,
}

impl<B> OrderList<B> {
    pub fn new(backend: Arc<B>, filter: OrderFilter) -> Self {
        Self { backend, filter }
    }
}

#[async_trait]
impl<B: OrderBackend> PollSource for OrderList<B> {
    fn name(&self) -> &'static str {
        "orders"
    }

    async fn fetch(&self) -> ClientResult<Vec<Order>> {
        self.backend.list_orders(&self.filter).await
    }
}

/// The open order at one table, for the customer display
pub struct TableOrder<B> {
    backend: Arc<B>,
    table_id: String,
}

impl<B> TableOrder<B> {
    pub fn new(backend: Arc<B>, table_id: impl Into<String>) -> Self {
        Self {
            backend,
            table_id: table_id.into(),
        }
    }
}

#[async_trait]
impl<B: OrderBackend> PollSource for TableOrder<B> {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn fetch(&self) -> ClientResult<Vec<Order>> {
        Ok(self
            .backend
            .active_order_for_table(&self.table_id)
            .await?
            .into_iter()
            .collect())
    }
}

pub struct Poller<S> {
    source: S,
    view: Arc<OrderView>,
    interval: Duration,
    timeout: Duration,
    failures: AtomicU32,
}

impl<S: PollSource + 'static> Poller<S> {
    /// Poll every `interval`; each poll may take at most one interval
    pub fn new(source: S, view: Arc<OrderView>, interval: Duration) -> Self {
        Self {
            source,
            view,
            interval,
            timeout: interval,
            failures: AtomicU32::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn view(&self) -> &Arc<OrderView> {
        &self.view
    }

    /// Consecutive failed polls
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Run one poll and apply its result
    pub async fn poll_once(&self) -> ClientResult<PollReport> {
        let result = match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.timeout)),
        };

        match result {
            Ok(orders) => {
                self.failures.store(0, Ordering::Relaxed);
                let report = self.view.apply_poll(orders);
                if report.changed() {
                    tracing::debug!(
                        source = self.source.name(),
                        inserted = report.inserted,
                        updated = report.updated,
                        removed = report.removed,
                        "Poll applied"
                    );
                }
                Ok(report)
            }
            Err(e) => {
                let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    source = self.source.name(),
                    failures,
                    error = %e,
                    "Poll failed, keeping current view"
                );
                Err(e)
            }
        }
    }

    /// Poll until `cancel` fires
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                source = self.source.name(),
                interval_ms = self.interval.as_millis() as u64,
                "Poller started"
            );
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let _ = self.poll_once().await;
                    }
                }
            }
            tracing::info!(source = self.source.name(), "Poller stopped");
        })
    }
}
