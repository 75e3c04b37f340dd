// Metric summary domain models
use super::telemetry::{MetricKind, Sample};

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureStats {
    pub current: f64,
    pub average: f64,
    pub max: f64,
    pub max_time: String,
    pub current_perc: f64,
    pub max_perc: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadStats {
    pub current: f64,
    pub average: f64,
    pub sum: f64,
    pub current_perc: f64,
    pub sum_perc: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelStats {
    pub last_critical: f64,
    pub last_critical_time: String,
    pub min: f64,
    pub min_time: String,
    /// Number of readings at the minimum, only counted when the minimum is an empty tank.
    pub empty_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricStats {
    Temperature(TemperatureStats),
    Load(LoadStats),
    Fuel(FuelStats),
}

/// Useful-data ratio derived from device usage records.
///
/// When a metric has no usage records the totals are the `1/1/1` placeholder
/// and `sentinel` is set: the ratio then means "no measurement", not "100% useful".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Efficiency {
    pub collected_data: u64,
    pub used_data: u64,
    pub requests: u64,
    pub reduction_perc: f64,
    pub sentinel: bool,
}

impl Efficiency {
    pub const SENTINEL: Efficiency = Efficiency {
        collected_data: 1,
        used_data: 1,
        requests: 1,
        reduction_perc: 1.0,
        sentinel: true,
    };
}

/// Immutable statistics snapshot for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub kind: MetricKind,
    /// Ascending by `time`.
    pub graph_data: Vec<Sample>,
    pub stats: MetricStats,
    pub efficiency: Efficiency,
}

impl MetricSummary {
    pub fn temperature(&self) -> Option<&TemperatureStats> {
        match &self.stats {
            MetricStats::Temperature(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn load(&self) -> Option<&LoadStats> {
        match &self.stats {
            MetricStats::Load(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn fuel(&self) -> Option<&FuelStats> {
        match &self.stats {
            MetricStats::Fuel(stats) => Some(stats),
            _ => None,
        }
    }
}
