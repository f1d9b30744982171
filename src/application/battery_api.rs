// Typed calls against the battery prediction service
use crate::application::api_client::{AuthenticatedClient, ClientError, RequestOptions};
use crate::application::http_transport::ApiResponse;
use crate::domain::telemetry::{
    HealthStatus, HistoryPayload, PredictionPayload, RetrainOutcome, TelemetrySample,
};
use reqwest::Method;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct BatteryApi {
    client: AuthenticatedClient,
}

impl BatteryApi {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// History for one battery, in the order the server returns it.
    pub async fn fetch_history(&self, battery_id: &str) -> Result<Vec<TelemetrySample>, ClientError> {
        let path = format!("/battery-history/{}", urlencoding::encode(battery_id));
        let payload: HistoryPayload = self.get_json(&path).await?;
        Ok(payload.into_samples(battery_id))
    }

    pub async fn fetch_prediction(&self, battery_id: &str) -> Result<PredictionPayload, ClientError> {
        let path = format!("/predict-rul/{}", urlencoding::encode(battery_id));
        self.get_json(&path).await
    }

    pub async fn submit_sample(&self, sample: &TelemetrySample) -> Result<(), ClientError> {
        let options = RequestOptions::json(sample)?;
        let response = self.client.request(Method::POST, "/battery-data", options).await?;
        ensure_success(response)?;
        Ok(())
    }

    pub async fn retrain(&self) -> Result<RetrainOutcome, ClientError> {
        let response = self
            .client
            .request(Method::POST, "/retrain-model", RequestOptions::default())
            .await?;
        Ok(ensure_success(response)?.json()?)
    }

    /// Unauthenticated service health probe.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self
            .client
            .request_public(Method::GET, "/health", RequestOptions::default())
            .await?;
        Ok(ensure_success(response)?.json()?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.request(Method::GET, path, RequestOptions::default()).await?;
        Ok(ensure_success(response)?.json()?)
    }
}

/// Turns a non-2xx response into [`ClientError::Server`].
pub fn ensure_success(response: ApiResponse) -> Result<ApiResponse, ClientError> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Server {
            status: response.status,
            body: response.text(),
        })
    }
}
