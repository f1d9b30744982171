// Telemetry data domain models
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One reading for one charge/discharge cycle of a battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    #[serde(default)]
    pub battery_id: String,
    pub cycle_number: u32,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl TelemetrySample {
    pub fn new(
        battery_id: String,
        cycle_number: u32,
        voltage: f64,
        current: f64,
        temperature: f64,
        capacity: f64,
    ) -> Self {
        Self {
            battery_id,
            cycle_number,
            voltage,
            current,
            temperature,
            capacity,
            timestamp: None,
        }
    }
}

/// History as served by `/battery-history/{id}`: either the bare list
/// or wrapped in an envelope carrying the battery id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    Envelope {
        #[serde(default)]
        battery_id: Option<String>,
        data: Vec<TelemetrySample>,
    },
    Bare(Vec<TelemetrySample>),
}

impl HistoryPayload {
    /// Unwraps the samples, filling in missing battery ids.
    pub fn into_samples(self, tracked_id: &str) -> Vec<TelemetrySample> {
        let (envelope_id, mut samples) = match self {
            HistoryPayload::Envelope { battery_id, data } => (battery_id, data),
            HistoryPayload::Bare(data) => (None, data),
        };
        let fill = envelope_id.unwrap_or_else(|| tracked_id.to_string());
        for sample in samples.iter_mut().filter(|s| s.battery_id.is_empty()) {
            sample.battery_id = fill.clone();
        }
        samples
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictionPayload {
    #[serde(alias = "rul")]
    pub predicted_rul: f64,
    pub confidence: f64,
    #[serde(default)]
    pub current_cycle: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub predicted_rul: f64,
    pub confidence: f64,
    pub current_cycle: u32,
}

impl PredictionResult {
    /// Builds a result from the wire payload. `fallback_cycle` stands in for a
    /// missing `current_cycle`.
    pub fn from_payload(payload: PredictionPayload, fallback_cycle: u32) -> Self {
        let confidence = if (0.0..=1.0).contains(&payload.confidence) {
            payload.confidence
        } else {
            tracing::warn!("Prediction confidence {} outside [0, 1], clamping", payload.confidence);
            payload.confidence.clamp(0.0, 1.0)
        };

        Self {
            predicted_rul: payload.predicted_rul,
            confidence,
            current_cycle: payload.current_cycle.unwrap_or(fallback_cycle),
        }
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrainOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_trained: bool,
}
