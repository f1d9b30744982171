// Dashboard service - Write use cases that feed the refresh pipeline
use crate::application::api_client::ClientError;
use crate::application::battery_api::BatteryApi;
use crate::application::refresh_scheduler::{CycleReport, RefreshScheduler};
use crate::application::sample_generator::SampleGenerator;
use crate::domain::telemetry::{RetrainOutcome, TelemetrySample};
use crate::domain::validation::{ValidationError, validate_sample};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<BatteryApi>,
    scheduler: Arc<RefreshScheduler>,
    generator: SampleGenerator,
}

impl DashboardService {
    pub fn new(api: Arc<BatteryApi>, scheduler: Arc<RefreshScheduler>, generator: SampleGenerator) -> Self {
        Self {
            api,
            scheduler,
            generator,
        }
    }

    /// Validates, stores and then refreshes. Nothing is sent when validation fails.
    pub async fn submit_reading(&self, sample: TelemetrySample) -> Result<CycleReport, SubmitError> {
        validate_sample(&sample)?;
        self.api.submit_sample(&sample).await?;
        tracing::info!(
            battery_id = %sample.battery_id,
            cycle_number = sample.cycle_number,
            "Reading stored"
        );
        Ok(self.refresh_after_write().await?)
    }

    /// Generates the next reading for the tracked battery from its latest
    /// stored one and submits it.
    pub async fn add_synthetic_sample(&self) -> Result<(TelemetrySample, CycleReport), SubmitError> {
        let battery_id = self.scheduler.battery_id();
        let history = self.api.fetch_history(battery_id).await?;
        let sample = {
            let mut rng = rand::thread_rng();
            self.generator.next_sample(battery_id, history.last(), &mut rng)
        };
        tracing::debug!(?sample, "Generated synthetic reading");

        let report = self.submit_reading(sample.clone()).await?;
        Ok((sample, report))
    }

    /// Fires a retrain and hands back what the server said. No retry.
    pub async fn retrain(&self) -> Result<RetrainOutcome, ClientError> {
        let outcome = self.api.retrain().await?;
        if outcome.success {
            tracing::info!("Model retrained");
        } else {
            tracing::warn!("Model retraining failed: {}", outcome.message);
        }
        Ok(outcome)
    }

    async fn refresh_after_write(&self) -> Result<CycleReport, ClientError> {
        Ok(self.scheduler.refresh().await?)
    }
}
