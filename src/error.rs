use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to whoever watches the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("initial data request rejected: {0}")]
    FetchUnauthorized(String),
    #[error("initial data request failed: {0}")]
    FetchUnreachable(String),
    #[error("live data connection failed: {0}")]
    StreamConnectFailed(String),
}

impl DashboardError {
    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::FetchUnauthorized(_) => "unauthorized",
            DashboardError::FetchUnreachable(_) => "unreachable",
            DashboardError::StreamConnectFailed(_) => "stream_failed",
        }
    }

    /// The notification text shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            DashboardError::FetchUnauthorized(_) => "Unauthorized access!",
            DashboardError::FetchUnreachable(_) => "Server unreachable!",
            DashboardError::StreamConnectFailed(_) => "Live data request failed!",
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("MQTT connection error: {0}")]
    Connection(String),
    #[error("MQTT client error: {0}")]
    Client(String),
    #[error("no CONNACK within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("unexpected topic: {0}")]
    UnknownTopic(String),
    #[error("payload decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<FeedError> for DashboardError {
    fn from(e: FeedError) -> Self {
        DashboardError::StreamConnectFailed(e.to_string())
    }
}
