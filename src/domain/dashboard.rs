// Dashboard domain model
use super::summary::MetricSummary;
use super::telemetry::MetricKind;
use crate::error::DashboardError;

/// The view-model handed to renderers.
///
/// Every transition returns a new value; a published state is never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub temperature: Option<MetricSummary>,
    pub load: Option<MetricSummary>,
    pub fuel: Option<MetricSummary>,
    pub connection_error: Option<DashboardError>,
}

impl DashboardState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn with_metric(&self, kind: MetricKind, summary: MetricSummary) -> Self {
        let mut next = self.clone();
        match kind {
            MetricKind::Temperature => next.temperature = Some(summary),
            MetricKind::Load => next.load = Some(summary),
            MetricKind::Fuel => next.fuel = Some(summary),
        }
        next
    }

    /// Data already loaded stays visible alongside the error.
    pub fn with_error(&self, error: DashboardError) -> Self {
        Self {
            connection_error: Some(error),
            ..self.clone()
        }
    }

    pub fn metric(&self, kind: MetricKind) -> Option<&MetricSummary> {
        match kind {
            MetricKind::Temperature => self.temperature.as_ref(),
            MetricKind::Load => self.load.as_ref(),
            MetricKind::Fuel => self.fuel.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::{Efficiency, LoadStats, MetricStats};
    use crate::domain::telemetry::Sample;

    fn load_summary(value: f64) -> MetricSummary {
        MetricSummary {
            kind: MetricKind::Load,
            graph_data: vec![Sample::new("10:00", value)],
            stats: MetricStats::Load(LoadStats {
                current: value,
                average: value,
                sum: value,
                current_perc: 1.0,
                sum_perc: 1.0,
            }),
            efficiency: Efficiency::SENTINEL,
        }
    }

    #[test]
    fn test_initial_is_empty() {
        let state = DashboardState::initial();
        for kind in MetricKind::ALL {
            assert!(state.metric(kind).is_none());
        }
        assert!(state.connection_error.is_none());
    }

    #[test]
    fn test_with_metric_leaves_others_untouched() {
        let base = DashboardState::initial()
            .with_error(DashboardError::StreamConnectFailed("refused".into()));
        let next = base.with_metric(MetricKind::Load, load_summary(12.0));

        assert!(base.load.is_none());
        assert_eq!(next.load, Some(load_summary(12.0)));
        assert!(next.temperature.is_none());
        assert!(next.fuel.is_none());
        assert_eq!(next.connection_error, base.connection_error);
    }

    #[test]
    fn test_error_keeps_loaded_data() {
        let state = DashboardState::initial()
            .with_metric(MetricKind::Load, load_summary(3.0))
            .with_error(DashboardError::StreamConnectFailed("reset".into()));

        assert!(state.load.is_some());
        assert_eq!(
            state.connection_error.as_ref().map(|e| e.user_message()),
            Some("Live data request failed!")
        );
    }
}
