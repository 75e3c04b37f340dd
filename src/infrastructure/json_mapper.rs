// Mapper to convert domain models to the renderer's JSON view
use crate::domain::cards::{Card, CardValue, dashboard_cards};
use crate::domain::dashboard::DashboardState;
use crate::domain::summary::{Efficiency, MetricStats, MetricSummary};
use crate::domain::telemetry::Sample;
use crate::error::DashboardError;
use serde::Serialize;

/// JSON has no infinities or NaN; those are sent as `null`.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[derive(Debug, Serialize)]
pub struct PointView {
    pub time: String,
    pub value: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageView {
    pub collected_data: u64,
    pub used_data: u64,
    pub requests: u64,
    pub reduction_perc: Option<f64>,
    /// Totals are the `1/1/1` placeholder, not measurements
    pub usage_placeholder: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureView {
    pub graph_data: Vec<PointView>,
    pub current_temp: Option<f64>,
    pub current_perc: Option<f64>,
    pub avg_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub max_time: String,
    pub max_perc: Option<f64>,
    #[serde(flatten)]
    pub usage: UsageView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadView {
    pub graph_data: Vec<PointView>,
    pub current_load: Option<f64>,
    pub current_perc: Option<f64>,
    pub avg_load: Option<f64>,
    pub sum_load: Option<f64>,
    pub sum_perc: Option<f64>,
    #[serde(flatten)]
    pub usage: UsageView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelView {
    pub graph_data: Vec<PointView>,
    pub last_critical_fuel: Option<f64>,
    pub last_critical_time: String,
    pub min_fuel: Option<f64>,
    pub min_time: String,
    pub empty: usize,
    #[serde(flatten)]
    pub usage: UsageView,
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub kind: &'static str,
    pub message: &'static str,
    pub detail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub temperature: Option<TemperatureView>,
    pub load: Option<LoadView>,
    pub fuel: Option<FuelView>,
    pub connection_error: Option<ErrorView>,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: Option<String>,
    pub display: String,
    pub delta: Option<i64>,
    pub ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CardGroupView {
    pub metric: &'static str,
    pub cards: Vec<CardView>,
}

pub fn dashboard_to_view(state: &DashboardState) -> DashboardView {
    DashboardView {
        temperature: state.temperature.as_ref().and_then(temperature_to_view),
        load: state.load.as_ref().and_then(load_to_view),
        fuel: state.fuel.as_ref().and_then(fuel_to_view),
        connection_error: state.connection_error.as_ref().map(error_to_view),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

pub fn cards_to_view(state: &DashboardState) -> Vec<CardGroupView> {
    dashboard_cards(state)
        .into_iter()
        .map(|(kind, cards)| CardGroupView {
            metric: kind.as_str(),
            cards: cards.iter().map(card_to_view).collect(),
        })
        .collect()
}

fn card_to_view(card: &Card) -> CardView {
    let ratio = match card.value {
        CardValue::Usage { ratio, .. } => finite(ratio),
        _ => None,
    };
    CardView {
        id: card.id,
        title: card.title,
        subtitle: card.subtitle.clone(),
        display: card.display_value(),
        delta: card.delta,
        ratio,
    }
}

fn error_to_view(error: &DashboardError) -> ErrorView {
    ErrorView {
        kind: error.code(),
        message: error.user_message(),
        detail: error.to_string(),
    }
}

fn points(graph_data: &[Sample]) -> Vec<PointView> {
    graph_data
        .iter()
        .map(|s| PointView {
            time: s.time.clone(),
            value: finite(s.value),
        })
        .collect()
}

fn usage_to_view(efficiency: &Efficiency) -> UsageView {
    UsageView {
        collected_data: efficiency.collected_data,
        used_data: efficiency.used_data,
        requests: efficiency.requests,
        reduction_perc: finite(efficiency.reduction_perc),
        usage_placeholder: efficiency.sentinel,
    }
}

fn temperature_to_view(summary: &MetricSummary) -> Option<TemperatureView> {
    let MetricStats::Temperature(stats) = &summary.stats else {
        return None;
    };
    Some(TemperatureView {
        graph_data: points(&summary.graph_data),
        current_temp: finite(stats.current),
        current_perc: finite(stats.current_perc),
        avg_temp: finite(stats.average),
        max_temp: finite(stats.max),
        max_time: stats.max_time.clone(),
        max_perc: finite(stats.max_perc),
        usage: usage_to_view(&summary.efficiency),
    })
}

fn load_to_view(summary: &MetricSummary) -> Option<LoadView> {
    let MetricStats::Load(stats) = &summary.stats else {
        return None;
    };
    Some(LoadView {
        graph_data: points(&summary.graph_data),
        current_load: finite(stats.current),
        current_perc: finite(stats.current_perc),
        avg_load: finite(stats.average),
        sum_load: finite(stats.sum),
        sum_perc: finite(stats.sum_perc),
        usage: usage_to_view(&summary.efficiency),
    })
}

fn fuel_to_view(summary: &MetricSummary) -> Option<FuelView> {
    let MetricStats::Fuel(stats) = &summary.stats else {
        return None;
    };
    Some(FuelView {
        graph_data: points(&summary.graph_data),
        last_critical_fuel: finite(stats.last_critical),
        last_critical_time: stats.last_critical_time.clone(),
        min_fuel: finite(stats.min),
        min_time: stats.min_time.clone(),
        empty: stats.empty_count,
        usage: usage_to_view(&summary.efficiency),
    })
}
