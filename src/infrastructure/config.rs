use crate::domain::telemetry::MetricKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub broker: BrokerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// Bearer token for the data endpoint
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl BackendSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Device whose topics are subscribed
    pub device: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[serde(default = "default_qos")]
    pub qos: u8,
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
    /// Extra wait between CONNACK and subscribing
    #[serde(default)]
    pub settle_delay_ms: u64,
    /// Consecutive failed reconnects before the live feed gives up
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    /// Wait before the first reconnect; grows linearly per attempt
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default)]
    pub topics: TopicSettings,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_qos() -> u8 {
    1
}

fn default_handshake_timeout_secs() -> u64 {
    10
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct TopicSettings {
    #[serde(default = "default_temperature_topic")]
    pub temperature: String,
    #[serde(default = "default_load_topic")]
    pub load: String,
    #[serde(default = "default_fuel_topic")]
    pub fuel: String,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature_topic(),
            load: default_load_topic(),
            fuel: default_fuel_topic(),
        }
    }
}

fn default_temperature_topic() -> String {
    "devices/${device}/temperature".into()
}

fn default_load_topic() -> String {
    "devices/${device}/load".into()
}

fn default_fuel_topic() -> String {
    "devices/${device}/fuel_level".into()
}

impl BrokerSettings {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Concrete topic for one metric, with `${device}` filled in
    pub fn topic_for(&self, kind: MetricKind) -> String {
        let template = match kind {
            MetricKind::Temperature => &self.topics.temperature,
            MetricKind::Load => &self.topics.load,
            MetricKind::Fuel => &self.topics.fuel,
        };
        let mut vars = HashMap::new();
        vars.insert("device".to_string(), self.device.clone());
        prepare_topic(template, &vars)
    }
}

impl DashboardConfig {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.backend.base_url.is_empty(),
            "backend.base_url must be non-empty"
        );
        anyhow::ensure!(!self.broker.host.is_empty(), "broker.host must be non-empty");
        anyhow::ensure!(self.broker.port > 0, "broker.port must be > 0");
        anyhow::ensure!(
            !self.broker.device.is_empty(),
            "broker.device must be non-empty"
        );
        anyhow::ensure!(
            self.broker.qos <= 2,
            "broker.qos must be 0, 1 or 2, got {}",
            self.broker.qos
        );
        Ok(())
    }
}

/// Load `config/dashboard.*`, overridden by `DASHBOARD__SECTION__KEY` variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    build_config(
        config::Config::builder()
            .add_source(config::File::with_name("config/dashboard").required(false))
            .add_source(
                config::Environment::with_prefix("DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            ),
    )
}

/// Parse and validate a TOML document.
#[cfg(test)]
pub fn parse_dashboard_config(s: &str) -> anyhow::Result<DashboardConfig> {
    build_config(
        config::Config::builder().add_source(config::File::from_str(s, config::FileFormat::Toml)),
    )
}

fn build_config(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<DashboardConfig> {
    let config: DashboardConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Replace `${name}` placeholders in a topic template
pub fn prepare_topic(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
