// MQTT live feed - One subscription per metric topic
use crate::application::telemetry_source::{LiveFeed, LiveMessage};
use crate::domain::telemetry::MetricKind;
use crate::error::FeedError;
use crate::infrastructure::config::BrokerSettings;
use crate::infrastructure::wire::decode_sample;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

// Use the MQTT v5 API surface only
use rumqttc::v5 as mqtt5;
use rumqttc::Transport;

pub type MqttOptions = mqtt5::MqttOptions;
pub type AsyncClient = mqtt5::AsyncClient;
pub type EventLoop = mqtt5::EventLoop;

const REQUEST_CHANNEL_CAPACITY: usize = 50;
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub fn build_options(settings: &BrokerSettings) -> MqttOptions {
    let client_id = format!("machine-telemetry-{}", Uuid::new_v4());
    let mut opts = MqttOptions::new(client_id, settings.host.clone(), settings.port);
    opts.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));
    opts.set_clean_start(true);
    if let (Some(u), Some(p)) = (&settings.username, &settings.password) {
        opts.set_credentials(u.clone(), p.clone());
    }
    if settings.port == 8883 {
        opts.set_transport(Transport::tls_with_default_config());
    }
    opts
}

pub fn qos(v: u8) -> mqtt5::mqttbytes::QoS {
    match v {
        2 => mqtt5::mqttbytes::QoS::ExactlyOnce,
        0 => mqtt5::mqttbytes::QoS::AtMostOnce,
        _ => mqtt5::mqttbytes::QoS::AtLeastOnce,
    }
}

/// Route a publish to its metric by exact topic match and decode the payload.
pub fn decode_publish(
    routes: &[(String, MetricKind)],
    topic: &[u8],
    payload: &[u8],
) -> Result<LiveMessage, FeedError> {
    let topic = String::from_utf8_lossy(topic);
    let kind = routes
        .iter()
        .find(|(t, _)| t.as_str() == topic)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| FeedError::UnknownTopic(topic.to_string()))?;
    let sample = decode_sample(payload)?;
    Ok(LiveMessage::new(kind, sample))
}

/// Poll until the broker acknowledges the connection.
async fn await_connack(eventloop: &mut EventLoop) -> Result<(), FeedError> {
    loop {
        match eventloop.poll().await {
            Ok(mqtt5::Event::Incoming(mqtt5::Incoming::ConnAck(_))) => return Ok(()),
            Ok(_) => continue,
            Err(e) => return Err(FeedError::Connection(e.to_string())),
        }
    }
}

/// Linear backoff over a bounded run of consecutive connection failures.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempts: 0,
        }
    }

    /// Wait before the next attempt, or `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay * self.attempts)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

/// Subscribe every route on `client`.
async fn subscribe_all(
    client: &AsyncClient,
    routes: &[(String, MetricKind)],
    level: u8,
) -> Result<(), FeedError> {
    for (topic, kind) in routes {
        client
            .subscribe(topic.clone(), qos(level))
            .await
            .map_err(|e| FeedError::Client(e.to_string()))?;
        tracing::debug!(metric = %kind, topic = %topic, "subscribed");
    }
    Ok(())
}

pub struct MqttLiveFeed {
    settings: BrokerSettings,
    routes: Vec<(String, MetricKind)>,
    connection: Option<(AsyncClient, EventLoop)>,
    reconnect: ReconnectPolicy,
    /// Set after a dropped connection; clean sessions lose their subscriptions.
    resubscribe: bool,
}

impl MqttLiveFeed {
    pub fn new(settings: BrokerSettings) -> Self {
        let routes = MetricKind::ALL
            .iter()
            .map(|&kind| (settings.topic_for(kind), kind))
            .collect();
        let reconnect =
            ReconnectPolicy::new(settings.reconnect_attempts, settings.reconnect_delay());
        Self {
            settings,
            routes,
            connection: None,
            reconnect,
            resubscribe: false,
        }
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(topic, _)| topic.as_str())
    }
}

#[async_trait]
impl LiveFeed for MqttLiveFeed {
    async fn connect(&mut self) -> Result<(), FeedError> {
        let (client, mut eventloop) =
            AsyncClient::new(build_options(&self.settings), REQUEST_CHANNEL_CAPACITY);

        let timeout = self.settings.handshake_timeout();
        tokio::time::timeout(timeout, await_connack(&mut eventloop))
            .await
            .map_err(|_| FeedError::HandshakeTimeout(timeout))??;
        tracing::info!(
            host = %self.settings.host,
            port = self.settings.port,
            "connected to MQTT broker"
        );

        let settle = self.settings.settle_delay();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        subscribe_all(&client, &self.routes, self.settings.qos).await?;
        tracing::info!(topics = ?self.topics().collect::<Vec<_>>(), "live topics subscribed");
        self.connection = Some((client, eventloop));
        self.reconnect.reset();
        self.resubscribe = false;
        Ok(())
    }

    /// Next decoded publish. A dropped connection is retried by polling on,
    /// which makes the event loop reconnect; subscriptions are restored on CONNACK.
    async fn next_message(&mut self) -> Result<Option<LiveMessage>, FeedError> {
        let Some((client, eventloop)) = self.connection.as_mut() else {
            return Ok(None);
        };

        loop {
            match eventloop.poll().await {
                Ok(mqtt5::Event::Incoming(mqtt5::Incoming::Publish(p))) => {
                    match decode_publish(&self.routes, &p.topic, &p.payload) {
                        Ok(message) => return Ok(Some(message)),
                        Err(e) => tracing::warn!("skipping live message: {}", e),
                    }
                }
                Ok(mqtt5::Event::Incoming(mqtt5::Incoming::ConnAck(_))) => {
                    self.reconnect.reset();
                    if self.resubscribe {
                        subscribe_all(client, &self.routes, self.settings.qos).await?;
                        self.resubscribe = false;
                        tracing::info!("reconnected to MQTT broker; topics resubscribed");
                    }
                }
                Ok(_) => continue,
                Err(e) => {
                    let Some(delay) = self.reconnect.next_delay() else {
                        return Err(FeedError::Connection(e.to_string()));
                    };
                    tracing::warn!(
                        attempt = self.reconnect.attempts(),
                        "MQTT connection lost: {}; retrying in {:?}",
                        e,
                        delay
                    );
                    self.resubscribe = true;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), FeedError> {
        let Some((client, mut eventloop)) = self.connection.take() else {
            return Ok(());
        };

        for (topic, _) in &self.routes {
            client
                .unsubscribe(topic.clone())
                .await
                .map_err(|e| FeedError::Client(e.to_string()))?;
        }
        client
            .disconnect()
            .await
            .map_err(|e| FeedError::Client(e.to_string()))?;

        // Requests only leave once the event loop is polled.
        let _ = tokio::time::timeout(CLOSE_DRAIN_TIMEOUT, async {
            while eventloop.poll().await.is_ok() {}
        })
        .await;

        tracing::info!("unsubscribed and disconnected from MQTT broker");
        Ok(())
    }
}
