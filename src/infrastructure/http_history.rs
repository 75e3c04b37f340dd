// HTTP history source - Initial dataset from the backend's data endpoint
use crate::application::telemetry_source::HistorySource;
use crate::domain::telemetry::HistorySnapshot;
use crate::error::DashboardError;
use crate::infrastructure::wire::DataResponse;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpHistorySource {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpHistorySource {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn data_url(&self) -> String {
        format!("{}/data", self.base_url)
    }
}

#[async_trait]
impl HistorySource for HttpHistorySource {
    async fn fetch_snapshot(&self) -> Result<HistorySnapshot, DashboardError> {
        let token = match self.token.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(DashboardError::FetchUnauthorized(
                    "no bearer token configured".into(),
                ));
            }
        };

        let url = self.data_url();
        tracing::debug!("Fetching initial dataset from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::FetchUnreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DashboardError::FetchUnauthorized(status.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::FetchUnreachable(format!(
                "data request failed with status {}: {}",
                status, body
            )));
        }

        let data = response
            .json::<DataResponse>()
            .await
            .map_err(|e| DashboardError::FetchUnreachable(format!("invalid data response: {}", e)))?;

        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::Sample;

    fn source(url: String, token: Option<&str>) -> HttpHistorySource {
        HttpHistorySource::new(url, token.map(String::from), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"temperatureData":[{"time":"09:00","value":20}],
                    "loadData":[],"fuelData":[{"time":"09:00","value":55.5}],
                    "deviceStats":[]}"#,
            )
            .create_async()
            .await;

        let snapshot = source(format!("{}/", server.url()), Some("secret"))
            .fetch_snapshot()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.temperature, vec![Sample::new("09:00", 20.0)]);
        assert!(snapshot.load.is_empty());
        assert_eq!(snapshot.fuel, vec![Sample::new("09:00", 55.5)]);
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(401)
            .create_async()
            .await;

        let err = source(server.url(), Some("expired"))
            .fetch_snapshot()
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::FetchUnauthorized(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(503)
            .create_async()
            .await;

        let err = source(server.url(), Some("secret"))
            .fetch_snapshot()
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Server unreachable!");
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let err = source("http://127.0.0.1:9".into(), Some(""))
            .fetch_snapshot()
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::FetchUnauthorized(_)));
    }
}
