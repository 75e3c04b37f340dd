// Server lifecycle - Runs the HTTP surface alongside one dashboard session
use crate::application::dashboard_service::DashboardSession;
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve `app` and drive `session` until `shutdown` resolves.
///
/// Stopping the session drops its snapshot publisher, which ends every open
/// `/dashboard/stream` response; only then can graceful shutdown complete.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    session: DashboardSession,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let session_task = tokio::spawn(session.run(async move {
        let _ = stop_rx.await;
    }));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutdown requested");
            let _ = stop_tx.send(());
        })
        .await?;

    match session_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("dashboard session ended with error: {}", e),
        Err(e) => tracing::error!("dashboard session task failed: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_source::{HistorySource, LiveFeed, LiveMessage};
    use crate::domain::telemetry::{HistorySnapshot, Sample};
    use crate::error::{DashboardError, FeedError};
    use crate::presentation::app_state::AppState;
    use crate::presentation::handlers::router;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct OneSample;

    #[async_trait]
    impl HistorySource for OneSample {
        async fn fetch_snapshot(&self) -> Result<HistorySnapshot, DashboardError> {
            Ok(HistorySnapshot {
                load: vec![Sample::new("10:00", 3.0)],
                ..Default::default()
            })
        }
    }

    /// Connects and then stays silent until closed.
    struct IdleFeed {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl LiveFeed for IdleFeed {
        async fn connect(&mut self) -> Result<(), FeedError> {
            Ok(())
        }

        async fn next_message(&mut self) -> Result<Option<LiveMessage>, FeedError> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<(), FeedError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shutdown_completes_with_open_stream_client() {
        let closed = Arc::new(AtomicBool::new(false));
        let feed = IdleFeed {
            closed: closed.clone(),
        };
        let (session, snapshots) = DashboardSession::new(Arc::new(OneSample), Box::new(feed));
        let app = router(Arc::new(AppState { snapshots }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (trigger, triggered) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, app, session, async move {
            let _ = triggered.await;
        }));

        let mut response = reqwest::get(format!("http://{addr}/dashboard/stream"))
            .await
            .unwrap();
        assert!(response.status().is_success());
        let first = response.chunk().await.unwrap().unwrap();
        assert_eq!(first.last(), Some(&b'\n'));

        trigger.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(3), async {
            while response.chunk().await.unwrap().is_some() {}
            server.await.unwrap().unwrap();
        })
        .await
        .expect("server still running after shutdown");

        assert!(closed.load(Ordering::SeqCst));
    }
}
