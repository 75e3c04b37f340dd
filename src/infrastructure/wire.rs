// Wire formats of the data endpoint and the live topics
use crate::domain::telemetry::{DeviceStats, HistorySnapshot, Sample, UsageStat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SampleDto {
    pub time: String,
    pub value: f64,
}

impl From<SampleDto> for Sample {
    fn from(dto: SampleDto) -> Self {
        Sample::new(dto.time, dto.value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatsDto {
    pub temp_data_bytes: u64,
    pub temp_data_bytes_forwarded: u64,
    pub temp_data_requests: u64,
    pub load_data_bytes: u64,
    pub load_data_bytes_forwarded: u64,
    pub load_data_requests: u64,
    pub fuel_data_bytes: u64,
    pub fuel_data_bytes_forwarded: u64,
    pub fuel_data_requests: u64,
}

impl From<DeviceStatsDto> for DeviceStats {
    fn from(dto: DeviceStatsDto) -> Self {
        DeviceStats {
            temperature: UsageStat::new(
                dto.temp_data_bytes,
                dto.temp_data_bytes_forwarded,
                dto.temp_data_requests,
            ),
            load: UsageStat::new(
                dto.load_data_bytes,
                dto.load_data_bytes_forwarded,
                dto.load_data_requests,
            ),
            fuel: UsageStat::new(
                dto.fuel_data_bytes,
                dto.fuel_data_bytes_forwarded,
                dto.fuel_data_requests,
            ),
        }
    }
}

/// Body of `GET /data`. Missing or `null` arrays count as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    #[serde(default)]
    pub temperature_data: Option<Vec<SampleDto>>,
    #[serde(default)]
    pub load_data: Option<Vec<SampleDto>>,
    #[serde(default)]
    pub fuel_data: Option<Vec<SampleDto>>,
    #[serde(default)]
    pub device_stats: Option<Vec<DeviceStatsDto>>,
}

fn samples(dtos: Option<Vec<SampleDto>>) -> Vec<Sample> {
    dtos.unwrap_or_default().into_iter().map(Sample::from).collect()
}

impl From<DataResponse> for HistorySnapshot {
    fn from(response: DataResponse) -> Self {
        HistorySnapshot {
            temperature: samples(response.temperature_data),
            load: samples(response.load_data),
            fuel: samples(response.fuel_data),
            device_stats: response
                .device_stats
                .unwrap_or_default()
                .into_iter()
                .map(DeviceStats::from)
                .collect(),
        }
    }
}

/// Decode one live payload: `{"time": "...", "value": n}`
pub fn decode_sample(payload: &[u8]) -> Result<Sample, serde_json::Error> {
    serde_json::from_slice::<SampleDto>(payload).map(Sample::from)
}
