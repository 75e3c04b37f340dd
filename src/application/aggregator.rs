// Metric aggregator - Derives summary statistics from a metric's samples
use crate::domain::summary::{
    Efficiency, FuelStats, LoadStats, MetricStats, MetricSummary, TemperatureStats,
};
use crate::domain::telemetry::{MetricKind, Sample, UsageStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

/// Which sample's time is reported when several share the extreme value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TieBreak {
    First,
    Last,
}

/// Direction and tie-break of the extreme a metric reports.
#[derive(Debug, Clone, Copy)]
struct ExtremeRule {
    extreme: Extreme,
    tie_break: TieBreak,
}

impl ExtremeRule {
    const TEMPERATURE: Self = Self {
        extreme: Extreme::Max,
        tie_break: TieBreak::First,
    };
    const FUEL: Self = Self {
        extreme: Extreme::Min,
        tie_break: TieBreak::Last,
    };
}

#[derive(Debug)]
struct Extremum<'a> {
    value: f64,
    time: &'a str,
    occurrences: usize,
}

/// `seed` must be one of the samples in `series`.
fn locate_extreme<'a>(series: &'a [Sample], seed: &'a Sample, rule: ExtremeRule) -> Extremum<'a> {
    let value = series.iter().fold(seed.value, |acc, s| match rule.extreme {
        Extreme::Max => acc.max(s.value),
        Extreme::Min => acc.min(s.value),
    });

    let mut hits = series.iter().filter(|s| s.value == value);
    let occurrences = hits.clone().count();
    // A NaN extreme matches nothing; report the seed.
    let hit = match rule.tie_break {
        TieBreak::First => hits.next(),
        TieBreak::Last => hits.last(),
    }
    .unwrap_or(seed);

    Extremum {
        value,
        time: &hit.time,
        occurrences,
    }
}

/// Sum device usage for one metric; no records yields the `1/1/1` placeholder.
///
/// A zero collected total is not guarded: the ratio comes out non-finite.
pub fn aggregate_usage(usage: &[UsageStat]) -> Efficiency {
    if usage.is_empty() {
        return Efficiency::SENTINEL;
    }

    let collected_data: u64 = usage.iter().map(|u| u.collected_bytes).sum();
    let used_data: u64 = usage.iter().map(|u| u.forwarded_bytes).sum();
    let requests: u64 = usage.iter().map(|u| u.requests).sum();

    Efficiency {
        collected_data,
        used_data,
        requests,
        reduction_perc: used_data as f64 / collected_data as f64,
        sentinel: false,
    }
}

/// Build the summary for one metric.
///
/// Returns `None` for an empty collection: there is nothing to show yet.
/// Samples are ordered by their `time` strings, ties keeping input order.
/// Percentages against a zero average are left non-finite.
pub fn summarize(samples: &[Sample], usage: &[UsageStat], kind: MetricKind) -> Option<MetricSummary> {
    let (latest, earlier) = samples.split_last()?;
    Some(summarize_with(earlier, latest, usage, kind))
}

/// Summary of `earlier` followed by `latest`.
///
/// Same result as [`summarize`] over the concatenation, but never empty.
pub fn summarize_with(
    earlier: &[Sample],
    latest: &Sample,
    usage: &[UsageStat],
    kind: MetricKind,
) -> MetricSummary {
    let mut graph_data = Vec::with_capacity(earlier.len() + 1);
    graph_data.extend_from_slice(earlier);
    graph_data.push(latest.clone());
    graph_data.sort_by(|a, b| a.time.cmp(&b.time));

    let last = graph_data.last().unwrap_or(latest);
    let sum: f64 = graph_data.iter().map(|s| s.value).sum();
    let average = sum / graph_data.len() as f64;
    let current = last.value;

    let stats = match kind {
        MetricKind::Temperature => {
            let max = locate_extreme(&graph_data, last, ExtremeRule::TEMPERATURE);
            MetricStats::Temperature(TemperatureStats {
                current,
                average,
                max: max.value,
                max_time: max.time.to_string(),
                current_perc: current / average,
                max_perc: max.value / average,
            })
        }
        MetricKind::Load => MetricStats::Load(LoadStats {
            current,
            average,
            sum,
            current_perc: current / average,
            sum_perc: sum / average,
        }),
        MetricKind::Fuel => {
            let min = locate_extreme(&graph_data, last, ExtremeRule::FUEL);
            MetricStats::Fuel(FuelStats {
                last_critical: current,
                last_critical_time: last.time.clone(),
                min: min.value,
                min_time: min.time.to_string(),
                empty_count: if min.value == 0.0 { min.occurrences } else { 0 },
            })
        }
    };

    MetricSummary {
        kind,
        graph_data,
        stats,
        efficiency: aggregate_usage(usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(&str, f64)]) -> Vec<Sample> {
        points.iter().map(|(t, v)| Sample::new(*t, *v)).collect()
    }

    #[test]
    fn test_empty_collection_is_skipped() {
        for kind in MetricKind::ALL {
            assert!(summarize(&[], &[], kind).is_none());
        }
    }

    #[test]
    fn test_graph_data_sorted_permutation() {
        let input = samples(&[("c", 3.0), ("a", 1.0), ("b", 2.0), ("a", 9.0)]);
        let summary = summarize(&input, &[], MetricKind::Load).unwrap();

        let times: Vec<&str> = summary.graph_data.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["a", "a", "b", "c"]);
        // Stable: equal times keep their delivery order.
        assert_eq!(summary.graph_data[0].value, 1.0);
        assert_eq!(summary.graph_data[1].value, 9.0);
        assert_eq!(summary.graph_data.len(), input.len());
    }

    #[test]
    fn test_string_ordering_not_numeric() {
        let input = samples(&[("10", 1.0), ("9", 2.0)]);
        let summary = summarize(&input, &[], MetricKind::Temperature).unwrap();
        let stats = summary.temperature().unwrap();

        // "9" sorts after "10".
        assert_eq!(stats.current, 2.0);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let input = samples(&[("2", 5.0), ("1", 4.0)]);
        let usage = [UsageStat::new(10, 5, 1)];
        assert_eq!(
            summarize(&input, &usage, MetricKind::Temperature),
            summarize(&input, &usage, MetricKind::Temperature)
        );
    }

    #[test]
    fn test_appended_sample_matches_full_collection() {
        let earlier = samples(&[("3", 7.0), ("1", 0.0), ("2", 0.0)]);
        let latest = Sample::new("0", 7.0);
        let mut all = earlier.clone();
        all.push(latest.clone());

        for kind in MetricKind::ALL {
            assert_eq!(
                Some(summarize_with(&earlier, &latest, &[], kind)),
                summarize(&all, &[], kind)
            );
        }
    }

    #[test]
    fn test_single_nan_sample_still_summarizes() {
        let summary = summarize_with(&[], &Sample::new("1", f64::NAN), &[], MetricKind::Fuel);
        let stats = summary.fuel().unwrap();
        assert!(stats.min.is_nan());
        assert_eq!(stats.min_time, "1");
        assert_eq!(stats.empty_count, 0);
    }

    #[test]
    fn test_temperature_max_time_takes_first() {
        let input = samples(&[("2", 5.0), ("1", 5.0), ("3", 3.0)]);
        let summary = summarize(&input, &[], MetricKind::Temperature).unwrap();
        let stats = summary.temperature().unwrap();

        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.max_time, "1");
        assert_eq!(stats.current, 3.0);
        assert!((stats.average - 13.0 / 3.0).abs() < 1e-12);
        assert!((stats.max_perc - 5.0 / (13.0 / 3.0)).abs() < 1e-12);
        assert!((stats.current_perc - 3.0 / (13.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_fuel_min_time_takes_last() {
        let input = samples(&[("1", 0.0), ("2", 0.0), ("3", 5.0)]);
        let summary = summarize(&input, &[], MetricKind::Fuel).unwrap();
        let stats = summary.fuel().unwrap();

        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.empty_count, 2);
        assert_eq!(stats.min_time, "2");
        assert_eq!(stats.last_critical, 5.0);
        assert_eq!(stats.last_critical_time, "3");
    }

    #[test]
    fn test_fuel_empty_count_only_for_empty_tank() {
        let input = samples(&[("1", 4.0), ("2", 4.0), ("3", 6.0)]);
        let summary = summarize(&input, &[], MetricKind::Fuel).unwrap();
        let stats = summary.fuel().unwrap();

        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.empty_count, 0);
        assert_eq!(stats.min_time, "2");
    }

    #[test]
    fn test_load_sum_and_percentages() {
        let input = samples(&[("1", 10.0), ("2", 20.0), ("3", 30.0)]);
        let summary = summarize(&input, &[], MetricKind::Load).unwrap();
        let stats = summary.load().unwrap();

        assert_eq!(stats.current, 30.0);
        assert_eq!(stats.average, 20.0);
        assert_eq!(stats.sum, 60.0);
        assert_eq!(stats.current_perc, 1.5);
        assert_eq!(stats.sum_perc, 3.0);
    }

    #[test]
    fn test_zero_average_propagates_non_finite() {
        let input = samples(&[("1", 0.0), ("2", 0.0)]);
        let summary = summarize(&input, &[], MetricKind::Temperature).unwrap();
        let stats = summary.temperature().unwrap();

        assert_eq!(stats.average, 0.0);
        assert!(stats.current_perc.is_nan());
        assert!(stats.max_perc.is_nan());

        let input = samples(&[("1", -1.0), ("2", 1.0)]);
        let summary = summarize(&input, &[], MetricKind::Load).unwrap();
        assert!(summary.load().unwrap().current_perc.is_infinite());
    }

    #[test]
    fn test_sentinel_usage() {
        let input = samples(&[("1", 1.0)]);
        for kind in MetricKind::ALL {
            let e = summarize(&input, &[], kind).unwrap().efficiency;
            assert_eq!(e.collected_data, 1);
            assert_eq!(e.used_data, 1);
            assert_eq!(e.requests, 1);
            assert_eq!(e.reduction_perc, 1.0);
            assert!(e.sentinel);
        }
    }

    #[test]
    fn test_usage_efficiency() {
        let usage = [UsageStat::new(100, 40, 5), UsageStat::new(50, 10, 2)];
        let e = aggregate_usage(&usage);

        assert_eq!(e.collected_data, 150);
        assert_eq!(e.used_data, 50);
        assert_eq!(e.requests, 7);
        assert!((e.reduction_perc - 1.0 / 3.0).abs() < 1e-9);
        assert!(!e.sentinel);
    }

    #[test]
    fn test_zero_collected_is_not_masked() {
        let e = aggregate_usage(&[UsageStat::new(0, 0, 0)]);
        assert!(e.reduction_perc.is_nan());

        let e = aggregate_usage(&[UsageStat::new(0, 3, 1)]);
        assert!(e.reduction_perc.is_infinite());
    }
}
