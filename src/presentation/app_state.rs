// Application state for HTTP handlers
use crate::domain::dashboard::DashboardState;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: watch::Receiver<Arc<DashboardState>>,
}

impl AppState {
    pub fn current(&self) -> Arc<DashboardState> {
        self.snapshots.borrow().clone()
    }
}
