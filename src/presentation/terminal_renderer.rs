// Terminal rendering of the dashboard
use crate::application::renderer::{DashboardStatus, Renderer};
use crate::domain::chart::{ChartSeries, DashboardSeries};
use crate::domain::telemetry::{PredictionResult, TelemetrySample};
use std::io::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;

pub struct TerminalRenderer {
    history_rows: usize,
}

impl TerminalRenderer {
    pub fn new(history_rows: usize) -> Self {
        Self { history_rows }
    }

    fn emit(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing a refresh over.
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

impl Renderer for TerminalRenderer {
    fn render_series(&self, series: &DashboardSeries) {
        let updated = chrono::Local::now().format("%H:%M:%S");
        let mut text = format!("── Battery history ({} cycles, updated {}) ──\n", series.labels().len(), updated);
        for s in series.as_array() {
            text.push_str(&format_series_line(s));
            text.push('\n');
        }
        text.push_str(&format_table(series, self.history_rows));
        self.emit(&text);
    }

    fn render_latest(&self, sample: &TelemetrySample) {
        self.emit(&format_latest(sample));
    }

    fn render_prediction(&self, prediction: &PredictionResult) {
        self.emit(&format_prediction(prediction));
    }

    fn render_status(&self, status: &DashboardStatus) {
        self.emit(&format!("⚠ {}", status));
    }
}

/// Unicode sparkline over the last `SPARK_WIDTH` values.
pub fn sparkline(values: &[f64]) -> String {
    let tail = &values[values.len().saturating_sub(SPARK_WIDTH)..];
    let finite = tail.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = max - min;

    tail.iter()
        .map(|&v| {
            if !v.is_finite() {
                ' '
            } else if span <= f64::EPSILON {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

fn format_series_line(series: &ChartSeries) -> String {
    let range = series
        .values
        .iter()
        .copied()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        });
    match range {
        Some((lo, hi)) => format!(
            "{:<32} {} [{:.2}..{:.2} {}]",
            series.title,
            sparkline(&series.values),
            lo,
            hi,
            series.unit
        ),
        None => format!("{:<32} (no points)", series.title),
    }
}

fn format_table(series: &DashboardSeries, rows: usize) -> String {
    let mut table = format!("{:>7} {:>10} {:>9} {:>9}\n", "cycle", "capacity", "voltage", "temp");
    let start = series.labels().len().saturating_sub(rows);
    for i in start..series.labels().len() {
        table.push_str(&format!(
            "{:>7} {:>10.2} {:>9.2} {:>9.1}\n",
            series.labels()[i],
            series.capacity.values[i],
            series.voltage.values[i],
            series.temperature.values[i]
        ));
    }
    table
}

pub fn format_latest(sample: &TelemetrySample) -> String {
    format!(
        "Current status (cycle {})\n  Voltage: {:.2} V\n  Current: {:.2} A\n  Temperature: {:.1} °C\n  Capacity: {:.2} Ah",
        sample.cycle_number, sample.voltage, sample.current, sample.temperature, sample.capacity
    )
}

pub fn format_prediction(prediction: &PredictionResult) -> String {
    format!(
        "Predicted RUL: {} cycles\nConfidence: {:.1}%\nCurrent cycle: {} cycles",
        prediction.predicted_rul,
        prediction.confidence_percent(),
        prediction.current_cycle
    )
}
