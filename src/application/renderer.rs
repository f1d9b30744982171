// Rendering collaborator interface
use crate::domain::chart::DashboardSeries;
use crate::domain::telemetry::{PredictionResult, TelemetrySample};
use std::fmt;

/// What the status area of the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardStatus {
    /// History came back empty.
    NoData,
    /// History could not be fetched; series on screen are from an earlier cycle.
    Unavailable(String),
    /// Prediction could not be fetched.
    PredictionUnavailable(String),
}

impl fmt::Display for DashboardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardStatus::NoData => f.write_str("No data recorded yet"),
            DashboardStatus::Unavailable(reason) => write!(f, "Data unavailable: {}", reason),
            DashboardStatus::PredictionUnavailable(reason) => {
                write!(f, "Prediction unavailable: {}", reason)
            }
        }
    }
}

pub trait Renderer: Send + Sync {
    /// Replaces all three series at once.
    fn render_series(&self, series: &DashboardSeries);

    /// Shows the raw metrics of the most recent sample.
    fn render_latest(&self, sample: &TelemetrySample);

    fn render_prediction(&self, prediction: &PredictionResult);

    fn render_status(&self, status: &DashboardStatus);
}
