// Display cards shown next to each metric chart
use super::dashboard::DashboardState;
use super::summary::{Efficiency, MetricSummary};
use super::telemetry::MetricKind;

#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Unknown,
    Number {
        value: f64,
        precision: usize,
        unit: &'static str,
    },
    Count(usize),
    Usage {
        collected: u64,
        used: u64,
        ratio: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: Option<String>,
    pub value: CardValue,
    /// Deviation from the average in whole percent.
    pub delta: Option<i64>,
}

impl Card {
    fn new(id: &'static str, title: &'static str, value: CardValue) -> Self {
        Self {
            id,
            title,
            subtitle: None,
            value,
            delta: None,
        }
    }

    fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    fn delta(mut self, perc: Option<f64>) -> Self {
        self.delta = perc.and_then(percent_delta);
        self
    }

    pub fn display_value(&self) -> String {
        match &self.value {
            CardValue::Unknown => "Unknown".to_string(),
            CardValue::Number {
                value,
                precision,
                unit,
            } => format!("{:.*}{}", precision, value, unit),
            CardValue::Count(n) => format!("x{}", n),
            CardValue::Usage { collected, used, .. } => format!("{}/{}", used, collected),
        }
    }
}

/// `round((perc - 1) * 100)`, rounding halves upwards; `None` for non-finite input.
fn percent_delta(perc: f64) -> Option<i64> {
    let delta = ((perc - 1.0) * 100.0 + 0.5).floor();
    delta.is_finite().then_some(delta as i64)
}

fn number(value: Option<f64>, precision: usize, unit: &'static str) -> CardValue {
    match value {
        Some(value) => CardValue::Number {
            value,
            precision,
            unit,
        },
        None => CardValue::Unknown,
    }
}

fn usage_card(id: &'static str, title: &'static str, efficiency: Option<&Efficiency>) -> Card {
    let value = match efficiency {
        Some(e) => CardValue::Usage {
            collected: e.collected_data,
            used: e.used_data,
            ratio: e.reduction_perc,
        },
        None => CardValue::Unknown,
    };
    Card::new(id, title, value).subtitle("Useful data")
}

pub fn metric_cards(kind: MetricKind, summary: Option<&MetricSummary>) -> Vec<Card> {
    let efficiency = summary.map(|s| &s.efficiency);
    match kind {
        MetricKind::Temperature => {
            let stats = summary.and_then(|s| s.temperature());
            vec![
                Card::new(
                    "temperature_current",
                    "Current temperature",
                    number(stats.map(|s| s.current), 1, "°C"),
                )
                .delta(stats.map(|s| s.current_perc)),
                Card::new(
                    "temperature_average",
                    "Average temperature",
                    number(stats.map(|s| s.average), 3, "°C"),
                )
                .subtitle("(last hour)"),
                Card::new(
                    "temperature_max",
                    "Max temperature",
                    number(stats.map(|s| s.max), 1, "°C"),
                )
                .delta(stats.map(|s| s.max_perc)),
                usage_card("temperature_usage", "Device temp stats", efficiency),
            ]
        }
        MetricKind::Load => {
            let stats = summary.and_then(|s| s.load());
            vec![
                Card::new(
                    "load_current",
                    "Current load",
                    number(stats.map(|s| s.current), 1, "kg"),
                )
                .delta(stats.map(|s| s.current_perc)),
                Card::new(
                    "load_average",
                    "Average load",
                    number(stats.map(|s| s.average), 1, "kg"),
                )
                .subtitle("(last hour)"),
                Card::new("load_sum", "Load sum", number(stats.map(|s| s.sum), 1, "kg"))
                    .subtitle("(last hour)"),
                usage_card("load_usage", "Device load stats", efficiency),
            ]
        }
        MetricKind::Fuel => {
            let stats = summary.and_then(|s| s.fuel());
            let unknown = || "Unknown".to_string();
            vec![
                Card::new(
                    "fuel_last_critical",
                    "Last critical level",
                    number(stats.map(|s| s.last_critical), 1, "l"),
                )
                .subtitle(stats.map_or_else(unknown, |s| s.last_critical_time.clone())),
                Card::new(
                    "fuel_empty",
                    "Empty fuel tank",
                    stats.map_or(CardValue::Unknown, |s| CardValue::Count(s.empty_count)),
                )
                .subtitle(stats.map_or_else(unknown, |s| {
                    if s.empty_count > 0 {
                        "Be careful!".to_string()
                    } else {
                        "Good job!".to_string()
                    }
                })),
                Card::new(
                    "fuel_min",
                    "Min fuel level",
                    number(stats.map(|s| s.min), 1, "l"),
                )
                .subtitle(stats.map_or_else(unknown, |s| s.min_time.clone())),
                usage_card("fuel_usage", "Device fuel stats", efficiency),
            ]
        }
    }
}

pub fn dashboard_cards(state: &DashboardState) -> Vec<(MetricKind, Vec<Card>)> {
    MetricKind::ALL
        .iter()
        .map(|&kind| (kind, metric_cards(kind, state.metric(kind))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::summarize;
    use crate::domain::telemetry::Sample;

    #[test]
    fn test_absent_metric_renders_unknown() {
        let cards = metric_cards(MetricKind::Temperature, None);
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.display_value() == "Unknown"));
        assert!(cards.iter().all(|c| c.delta.is_none()));
    }

    #[test]
    fn test_temperature_cards() {
        let samples = vec![Sample::new("09:00", 20.0), Sample::new("10:00", 30.0)];
        let summary = summarize(&samples, &[], MetricKind::Temperature);
        let cards = metric_cards(MetricKind::Temperature, summary.as_ref());

        assert_eq!(cards[0].display_value(), "30.0°C");
        assert_eq!(cards[0].delta, Some(20));
        assert_eq!(cards[1].display_value(), "25.000°C");
        assert_eq!(cards[2].delta, Some(20));
        assert_eq!(cards[3].display_value(), "1/1");
    }

    #[test]
    fn test_fuel_empty_tank_subtitle() {
        let samples = vec![
            Sample::new("1", 0.0),
            Sample::new("2", 0.0),
            Sample::new("3", 5.0),
        ];
        let summary = summarize(&samples, &[], MetricKind::Fuel);
        let cards = metric_cards(MetricKind::Fuel, summary.as_ref());

        assert_eq!(cards[0].subtitle.as_deref(), Some("3"));
        assert_eq!(cards[1].display_value(), "x2");
        assert_eq!(cards[1].subtitle.as_deref(), Some("Be careful!"));
        assert_eq!(cards[2].display_value(), "0.0l");
        assert_eq!(cards[2].subtitle.as_deref(), Some("2"));
    }

    #[test]
    fn test_percent_delta_rounding() {
        assert_eq!(percent_delta(1.2), Some(20));
        assert_eq!(percent_delta(0.98), Some(-2));
        assert_eq!(percent_delta(f64::INFINITY), None);
        assert_eq!(percent_delta(f64::NAN), None);
    }
}
