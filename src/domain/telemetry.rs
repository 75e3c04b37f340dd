// Telemetry data domain models
use std::fmt;

/// The three live channels a machine reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Temperature,
    Load,
    Fuel,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Temperature, MetricKind::Load, MetricKind::Fuel];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature",
            MetricKind::Load => "load",
            MetricKind::Fuel => "fuel",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped measurement.
///
/// `time` is compared as a plain string, never parsed: samples order
/// lexically and two samples are the same delivery when their strings match.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: String,
    pub value: f64,
}

impl Sample {
    pub fn new(time: impl Into<String>, value: f64) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

/// Byte and request accounting a device reports for a single metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStat {
    pub collected_bytes: u64,
    pub forwarded_bytes: u64,
    pub requests: u64,
}

impl UsageStat {
    pub fn new(collected_bytes: u64, forwarded_bytes: u64, requests: u64) -> Self {
        Self {
            collected_bytes,
            forwarded_bytes,
            requests,
        }
    }
}

/// Usage accounting for one device, all metrics at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub temperature: UsageStat,
    pub load: UsageStat,
    pub fuel: UsageStat,
}

impl DeviceStats {
    pub fn for_kind(&self, kind: MetricKind) -> UsageStat {
        match kind {
            MetricKind::Temperature => self.temperature,
            MetricKind::Load => self.load,
            MetricKind::Fuel => self.fuel,
        }
    }
}

/// Everything the initial data request returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySnapshot {
    pub temperature: Vec<Sample>,
    pub load: Vec<Sample>,
    pub fuel: Vec<Sample>,
    pub device_stats: Vec<DeviceStats>,
}

impl HistorySnapshot {
    pub fn samples(&self, kind: MetricKind) -> &[Sample] {
        match kind {
            MetricKind::Temperature => &self.temperature,
            MetricKind::Load => &self.load,
            MetricKind::Fuel => &self.fuel,
        }
    }

    /// Per-device usage records for one metric, in device order.
    pub fn usage_for(&self, kind: MetricKind) -> Vec<UsageStat> {
        self.device_stats.iter().map(|d| d.for_kind(kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_for_picks_metric_fields() {
        let snapshot = HistorySnapshot {
            device_stats: vec![
                DeviceStats {
                    temperature: UsageStat::new(100, 40, 5),
                    load: UsageStat::new(7, 3, 1),
                    fuel: UsageStat::default(),
                },
                DeviceStats {
                    temperature: UsageStat::new(50, 10, 2),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            snapshot.usage_for(MetricKind::Temperature),
            vec![UsageStat::new(100, 40, 5), UsageStat::new(50, 10, 2)]
        );
        assert_eq!(
            snapshot.usage_for(MetricKind::Load),
            vec![UsageStat::new(7, 3, 1), UsageStat::default()]
        );
    }

    #[test]
    fn test_metric_kind_names() {
        let names: Vec<String> = MetricKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["temperature", "load", "fuel"]);
    }
}
