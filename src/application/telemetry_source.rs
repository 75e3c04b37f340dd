// Source traits for historical and live telemetry
use crate::domain::telemetry::{HistorySnapshot, MetricKind, Sample};
use crate::error::{DashboardError, FeedError};
use async_trait::async_trait;

/// A decoded live delivery, already routed to its metric.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveMessage {
    pub kind: MetricKind,
    pub sample: Sample,
}

impl LiveMessage {
    pub fn new(kind: MetricKind, sample: Sample) -> Self {
        Self { kind, sample }
    }
}

#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the full historical dataset for the session's device
    async fn fetch_snapshot(&self) -> Result<HistorySnapshot, DashboardError>;
}

#[async_trait]
pub trait LiveFeed: Send {
    /// Connect and subscribe to every metric topic.
    /// Returns once the subscriptions have been issued.
    async fn connect(&mut self) -> Result<(), FeedError>;

    /// Next live sample in delivery order; `None` once the feed has ended.
    async fn next_message(&mut self) -> Result<Option<LiveMessage>, FeedError>;

    /// Unsubscribe from every topic and close the transport.
    async fn close(&mut self) -> Result<(), FeedError>;
}
