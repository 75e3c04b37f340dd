// Dashboard service - Drives one dashboard session from initial fetch to live updates
use crate::application::stream_merger::{MergeOutcome, StreamMerger};
use crate::application::telemetry_source::{HistorySource, LiveFeed, LiveMessage};
use crate::domain::dashboard::DashboardState;
use crate::error::DashboardError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Owns the merger and the current state; renderers only ever see the
/// immutable snapshots published on the watch channel.
pub struct DashboardSession {
    history: Arc<dyn HistorySource>,
    feed: Box<dyn LiveFeed>,
    merger: StreamMerger,
    state: Arc<DashboardState>,
    publisher: watch::Sender<Arc<DashboardState>>,
}

impl DashboardSession {
    pub fn new(
        history: Arc<dyn HistorySource>,
        feed: Box<dyn LiveFeed>,
    ) -> (Self, watch::Receiver<Arc<DashboardState>>) {
        let state = Arc::new(DashboardState::initial());
        let (publisher, snapshots) = watch::channel(state.clone());
        let session = Self {
            history,
            feed,
            merger: StreamMerger::new(),
            state,
            publisher,
        };
        (session, snapshots)
    }

    fn publish(&mut self, next: DashboardState) {
        self.state = Arc::new(next);
        self.publisher.send_replace(self.state.clone());
    }

    fn fail(&mut self, error: DashboardError) {
        tracing::error!(kind = error.code(), "{}", error);
        let next = self.state.with_error(error);
        self.publish(next);
    }

    /// Fetch history, seed the merger and publish the first populated state.
    pub async fn load_initial(&mut self) -> Result<(), DashboardError> {
        let snapshot = match self.history.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.fail(e.clone());
                return Err(e);
            }
        };

        tracing::info!(
            temperature = snapshot.temperature.len(),
            load = snapshot.load.len(),
            fuel = snapshot.fuel.len(),
            devices = snapshot.device_stats.len(),
            "initial dataset loaded"
        );

        let next = self
            .merger
            .seed(snapshot)
            .into_iter()
            .fold((*self.state).clone(), |state, summary| {
                state.with_metric(summary.kind, summary)
            });
        self.publish(next);
        Ok(())
    }

    /// Connect the live feed. A failure is published but leaves loaded history in place.
    pub async fn connect_live(&mut self) -> Result<(), DashboardError> {
        if let Err(e) = self.feed.connect().await {
            let error = DashboardError::from(e);
            self.fail(error.clone());
            return Err(error);
        }
        tracing::info!("live feed connected");
        Ok(())
    }

    /// Merge a live sample; returns whether a new state was published.
    pub fn handle_message(&mut self, message: LiveMessage) -> bool {
        let LiveMessage { kind, sample } = message;
        match self.merger.apply(kind, sample) {
            MergeOutcome::Recomputed(summary) => {
                tracing::debug!(metric = %kind, samples = summary.graph_data.len(), "metric recomputed");
                let next = self.state.with_metric(kind, summary);
                self.publish(next);
                true
            }
            MergeOutcome::Duplicate => false,
        }
    }

    /// Run the session until the feed ends, fails, or `shutdown` resolves.
    ///
    /// The live feed is always closed before returning once it was connected.
    pub async fn run<S>(mut self, shutdown: S) -> Result<(), DashboardError>
    where
        S: Future<Output = ()> + Send,
    {
        self.load_initial().await?;
        if self.connect_live().await.is_err() {
            // Degrade to the static view.
            return Ok(());
        }

        tokio::pin!(shutdown);
        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("dashboard session shutting down");
                    break;
                }
                next = self.feed.next_message() => next,
            };

            match next {
                Ok(Some(message)) => {
                    self.handle_message(message);
                }
                Ok(None) => {
                    tracing::info!("live feed ended");
                    break;
                }
                Err(e) => {
                    self.fail(e.into());
                    break;
                }
            }
        }

        if let Err(e) = self.feed.close().await {
            tracing::warn!("failed to close live feed cleanly: {}", e);
        }
        Ok(())
    }
}
