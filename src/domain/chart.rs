// Chart series domain models
use super::telemetry::TelemetrySample;

/// One metric plotted against cycle number.
///
/// `labels` and `values` always have the same length and are only ever
/// built together, never patched one at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub id: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
    pub labels: Vec<u32>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn collect(
        id: &'static str,
        title: &'static str,
        unit: &'static str,
        samples: &[TelemetrySample],
        metric: fn(&TelemetrySample) -> f64,
    ) -> Self {
        let (labels, values) = samples.iter().map(|s| (s.cycle_number, metric(s))).unzip();
        Self {
            id,
            title,
            unit,
            labels,
            values,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The three series the dashboard plots, sharing one cycle axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSeries {
    pub capacity: ChartSeries,
    pub voltage: ChartSeries,
    pub temperature: ChartSeries,
}

impl DashboardSeries {
    pub fn as_array(&self) -> [&ChartSeries; 3] {
        [&self.capacity, &self.voltage, &self.temperature]
    }

    pub fn labels(&self) -> &[u32] {
        &self.capacity.labels
    }
}

/// Maps history into chart series. Keeps input order and length as-is;
/// ordering is the data source's contract.
pub fn transform(samples: &[TelemetrySample]) -> DashboardSeries {
    DashboardSeries {
        capacity: ChartSeries::collect("capacity", "Capacity Degradation Over Time", "Ah", samples, |s| s.capacity),
        voltage: ChartSeries::collect("voltage", "Voltage Over Time", "V", samples, |s| s.voltage),
        temperature: ChartSeries::collect("temperature", "Temperature Over Time", "°C", samples, |s| s.temperature),
    }
}
